/*
 * transformer.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Entry points that run the whole transform.
 */

use serde::Serialize;

use crate::Result;
use crate::collect::collect;
use crate::config::TransformConfig;
use crate::imports::ImportSet;
use crate::parser::parse;
use crate::printer::print;
use crate::transform::{Exports, TransformContext, TransformPipeline};
use crate::transforms::default_pipeline;

/// Result of a successful transform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformOutput {
    /// CSS-module text
    pub css: String,
    /// Shared tokens the output imports
    pub imports: ImportSet,
    /// Symbols the output exports
    pub exports: Exports,
}

/// Runs the parse, collect, rewrite and print steps with one configuration.
///
/// A `Transformer` holds no per-call state and can be shared between
/// threads.
pub struct Transformer {
    config: TransformConfig,
    pipeline: TransformPipeline,
}

impl Transformer {
    pub fn new(config: TransformConfig) -> Self {
        Self {
            config,
            pipeline: default_pipeline(),
        }
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    /// Transform one stylesheet.
    ///
    /// # Errors
    ///
    /// Any [`TransformError`](crate::TransformError). Nothing is returned for
    /// a failed call.
    pub fn run(&self, source: &str) -> Result<TransformOutput> {
        let mut sheet = parse(source)?;
        let (usage, definitions) = collect(&sheet);
        tracing::debug!(symbols = usage.len(), "collected symbol usage");

        let mut ctx = TransformContext::new(&self.config, usage, definitions);
        self.pipeline.execute(&mut sheet, &mut ctx)?;

        let css = print(&sheet, &ctx.imports, &ctx.exports);
        Ok(TransformOutput {
            css,
            imports: ctx.imports,
            exports: ctx.exports,
        })
    }
}

impl Default for Transformer {
    fn default() -> Self {
        Self::new(TransformConfig::default())
    }
}

/// Transform stylesheet source with the default configuration.
///
/// # Example
///
/// ```
/// let css = modcss_core::transform(".a { color: red; .b { color: blue; } }").unwrap();
/// assert_eq!(css, ".a {\n  color: red;\n}\n\n.a .b {\n  color: blue;\n}\n");
/// ```
pub fn transform(source: &str) -> Result<String> {
    Transformer::default().run(source).map(|output| output.css)
}
