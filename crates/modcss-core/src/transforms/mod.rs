/*
 * transforms/mod.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Rewrite stages of the stylesheet pipeline.
 */

//! Rewrite stages of the stylesheet pipeline.
//!
//! - [`ExtendTransform`] - Inlines or exports placeholders, resolves `@extend`
//! - [`MixinTransform`] - Expands or exports mixins
//! - [`MediaMacroTransform`] - Expands `@include media(...)` into `@media`
//! - [`VariableTransform`] - Resolves `$variables` and records shared imports
//! - [`FlattenTransform`] - Flattens nested rules to top-level rules
//!
//! [`default_pipeline`] assembles them in the order they must run: extend and
//! mixin bodies are inlined first so that their nested rules, macros and
//! variables are handled by the later stages at the call site.

mod extend;
mod flatten;
mod media;
mod mixins;
mod variables;

pub use extend::ExtendTransform;
pub use flatten::FlattenTransform;
pub use media::MediaMacroTransform;
pub use mixins::{MAX_MIXIN_DEPTH, MixinTransform};
pub use variables::VariableTransform;

use crate::transform::TransformPipeline;

/// The stages of a full transform, in execution order.
pub fn default_pipeline() -> TransformPipeline {
    let mut pipeline = TransformPipeline::new();
    pipeline.push(Box::new(ExtendTransform::new()));
    pipeline.push(Box::new(MixinTransform::new()));
    pipeline.push(Box::new(MediaMacroTransform::new()));
    pipeline.push(Box::new(VariableTransform::new()));
    pipeline.push(Box::new(FlattenTransform::new()));
    pipeline
}
