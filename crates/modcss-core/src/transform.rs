/*
 * transform.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Stylesheet transformation pipeline infrastructure.
 */

//! Stylesheet transformation pipeline infrastructure.
//!
//! This module provides the core abstractions for rewriting a parsed
//! stylesheet:
//!
//! - [`StylesheetTransform`] - The trait implemented by every stage
//! - [`TransformPipeline`] - Ordered collection of stages to execute
//! - [`TransformContext`] - Usage analysis and configuration shared by the
//!   stages, plus the imports and exports they accumulate
//!
//! # Architecture
//!
//! Stages run in a flat, ordered sequence (insertion order). Each stage can:
//! - Mutate the rule tree (replace, remove or rewrite nodes)
//! - Record shared-token imports and exported symbols on the context
//! - Read the usage table built before the pipeline started
//!
//! The usage table is never written by a stage. Whether a symbol counts as
//! used is decided once, over the untouched tree.
//!
//! # Example
//!
//! ```
//! use modcss_core::transform::{StylesheetTransform, TransformContext, TransformPipeline};
//! use modcss_core::{Result, Stylesheet};
//!
//! struct DropEverything;
//!
//! impl StylesheetTransform for DropEverything {
//!     fn name(&self) -> &str { "drop-everything" }
//!
//!     fn transform(&self, sheet: &mut Stylesheet, _ctx: &mut TransformContext<'_>) -> Result<()> {
//!         sheet.nodes.clear();
//!         Ok(())
//!     }
//! }
//!
//! let mut pipeline = TransformPipeline::new();
//! pipeline.push(Box::new(DropEverything));
//! assert_eq!(pipeline.transform_names(), vec!["drop-everything"]);
//! ```

use indexmap::IndexMap;
use serde::Serialize;

use crate::Result;
use crate::ast::Stylesheet;
use crate::collect::{Definitions, UsageTable};
use crate::config::TransformConfig;
use crate::imports::ImportSet;

/// Symbols declared in the file and never used in it.
///
/// They are emitted in a reusable form so that other modules can consume
/// them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Exports {
    /// Exported variables and their resolved values
    pub variables: IndexMap<String, String>,
    /// Placeholders emitted as CSS-module classes
    pub placeholders: Vec<String>,
    /// Mixins emitted as `@define-mixin` blocks
    pub mixins: Vec<String>,
}

impl Exports {
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty() && self.placeholders.is_empty() && self.mixins.is_empty()
    }
}

/// State shared by the stages of one transform call.
#[derive(Debug)]
pub struct TransformContext<'a> {
    pub config: &'a TransformConfig,
    /// File-wide usage, computed before any stage ran
    pub usage: UsageTable,
    pub definitions: Definitions,
    pub imports: ImportSet,
    pub exports: Exports,
}

impl<'a> TransformContext<'a> {
    pub fn new(config: &'a TransformConfig, usage: UsageTable, definitions: Definitions) -> Self {
        Self {
            config,
            usage,
            definitions,
            imports: ImportSet::new(),
            exports: Exports::default(),
        }
    }
}

/// Trait for stylesheet transformations.
///
/// # Thread Safety
///
/// Stages must be `Send + Sync` so that one pipeline can serve transforms
/// running on several threads.
pub trait StylesheetTransform: Send + Sync {
    /// Human-readable name for this stage.
    ///
    /// Used for logging and debugging.
    fn name(&self) -> &str;

    /// Apply the stage to the tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the stylesheet cannot be rewritten. The whole
    /// transform fails with it.
    fn transform(&self, sheet: &mut Stylesheet, ctx: &mut TransformContext<'_>) -> Result<()>;
}

/// A pipeline of stages to execute in order.
pub struct TransformPipeline {
    transforms: Vec<Box<dyn StylesheetTransform>>,
}

impl TransformPipeline {
    /// Create a new empty pipeline.
    pub fn new() -> Self {
        Self {
            transforms: Vec::new(),
        }
    }

    /// Add a stage to the pipeline.
    ///
    /// Stages run in the order they are added.
    pub fn push(&mut self, transform: Box<dyn StylesheetTransform>) {
        self.transforms.push(transform);
    }

    /// Add multiple stages to the pipeline.
    pub fn extend(&mut self, transforms: impl IntoIterator<Item = Box<dyn StylesheetTransform>>) {
        self.transforms.extend(transforms);
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Execute all stages in insertion order.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered. Execution stops on error.
    pub fn execute(&self, sheet: &mut Stylesheet, ctx: &mut TransformContext<'_>) -> Result<()> {
        for transform in &self.transforms {
            tracing::debug!(transform = transform.name(), "Running transform");
            transform.transform(sheet, ctx)?;
        }

        Ok(())
    }

    /// List the names of all stages in execution order.
    pub fn transform_names(&self) -> Vec<&str> {
        self.transforms.iter().map(|t| t.name()).collect()
    }
}

impl Default for TransformPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Node, RuleNode};
    use crate::error::TransformError;
    use std::sync::{Arc, Mutex};

    /// Appends a marker rule so execution order is visible in the tree.
    struct MarkerTransform {
        name: &'static str,
        runs: Arc<Mutex<Vec<&'static str>>>,
    }

    impl StylesheetTransform for MarkerTransform {
        fn name(&self) -> &str {
            self.name
        }

        fn transform(&self, sheet: &mut Stylesheet, _ctx: &mut TransformContext<'_>) -> Result<()> {
            self.runs.lock().unwrap().push(self.name);
            sheet
                .nodes
                .push(Node::Rule(RuleNode::new(format!(".{}", self.name), vec![])));
            Ok(())
        }
    }

    struct FailingTransform;

    impl StylesheetTransform for FailingTransform {
        fn name(&self) -> &str {
            "failing"
        }

        fn transform(&self, _sheet: &mut Stylesheet, _ctx: &mut TransformContext<'_>) -> Result<()> {
            Err(TransformError::MixinRecursion {
                name: "loop".to_string(),
            })
        }
    }

    fn marker(name: &'static str, runs: &Arc<Mutex<Vec<&'static str>>>) -> Box<dyn StylesheetTransform> {
        Box::new(MarkerTransform {
            name,
            runs: runs.clone(),
        })
    }

    fn run(pipeline: &TransformPipeline) -> (Stylesheet, Result<()>) {
        let config = TransformConfig::default();
        let mut ctx = TransformContext::new(&config, UsageTable::new(), Definitions::default());
        let mut sheet = Stylesheet::default();
        let result = pipeline.execute(&mut sheet, &mut ctx);
        (sheet, result)
    }

    #[test]
    fn test_empty_pipeline() {
        let pipeline = TransformPipeline::new();
        assert!(pipeline.is_empty());
        assert_eq!(pipeline.len(), 0);
        let (sheet, result) = run(&pipeline);
        assert!(result.is_ok());
        assert!(sheet.is_empty());
    }

    #[test]
    fn test_insertion_order() {
        let runs = Arc::new(Mutex::new(Vec::new()));
        let mut pipeline = TransformPipeline::new();
        pipeline.push(marker("first", &runs));
        pipeline.extend([marker("second", &runs), marker("third", &runs)]);

        let (sheet, result) = run(&pipeline);
        result.unwrap();

        assert_eq!(*runs.lock().unwrap(), vec!["first", "second", "third"]);
        assert_eq!(sheet.nodes.len(), 3);
        assert_eq!(pipeline.transform_names(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_error_stops_execution() {
        let runs = Arc::new(Mutex::new(Vec::new()));
        let mut pipeline = TransformPipeline::new();
        pipeline.push(marker("before-fail", &runs));
        pipeline.push(Box::new(FailingTransform));
        pipeline.push(marker("after-fail", &runs));

        let (_, result) = run(&pipeline);

        assert!(matches!(result, Err(TransformError::MixinRecursion { .. })));
        assert_eq!(*runs.lock().unwrap(), vec!["before-fail"]);
    }
}
