/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * SCSS to CSS-modules transform.
 */

//! SCSS to CSS-modules transform.
//!
//! This crate converts a nested, variable- and mixin-bearing stylesheet into
//! a flat stylesheet for CSS modules, plus the `@value` imports it needs from
//! shared design-token modules.
//!
//! # Pipeline
//!
//! 1. [`parse`] the source into a rule tree ([`ast`])
//! 2. [`collect`] file-wide symbol usage over the untouched tree
//! 3. Run the rewrite stages ([`transforms`]) in order: extend, mixins,
//!    media macro, variables, flatten
//! 4. [`printer::print`] the flat tree with its imports and exports
//!
//! [`Transformer`] runs all four steps; [`transform`] does so with the
//! default [`TransformConfig`].
//!
//! # Example
//!
//! ```
//! use modcss_core::{TransformConfig, Transformer};
//!
//! let transformer = Transformer::new(TransformConfig::default());
//! let output = transformer
//!     .run(".button {\n  color: $fe-brary-colour-primary-dark;\n  &:hover { opacity: 0.8; }\n}")
//!     .unwrap();
//!
//! assert!(output.css.starts_with("@value fe-brary-colour-primary-dark from"));
//! assert!(output.css.contains(".button:hover {"));
//! assert_eq!(output.imports.len(), 1);
//! ```

pub mod ast;
pub mod collect;
pub mod config;
pub mod error;
pub mod imports;
pub mod media;
pub mod parser;
pub mod printer;
pub mod selector;
pub mod source;
pub mod text;
pub mod transform;
pub mod transformer;
pub mod transforms;
pub mod vars;

pub use ast::{AtRuleKind, AtRuleNode, Declaration, Node, RuleNode, SourceLocation, Stylesheet};
pub use collect::{Definitions, SymbolKind, Usage, UsageTable, collect};
pub use config::{HelperLibrary, NamespaceConfig, TransformConfig};
pub use error::{Result, TransformError};
pub use imports::{ImportGroup, ImportSet};
pub use parser::parse;
pub use transform::{Exports, StylesheetTransform, TransformContext, TransformPipeline};
pub use transformer::{TransformOutput, Transformer, transform};
