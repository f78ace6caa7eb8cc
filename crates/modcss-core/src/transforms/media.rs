/*
 * media.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Transform that expands the media() macro.
 */

use crate::ast::{AtRuleKind, Node, Stylesheet};
use crate::error::{Result, TransformError};
use crate::media::media_query;
use crate::transform::{StylesheetTransform, TransformContext};

/// Rewrites `@include media('<op><breakpoint>') { ... }` into a native
/// `@media` block with the same body.
pub struct MediaMacroTransform;

impl MediaMacroTransform {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MediaMacroTransform {
    fn default() -> Self {
        Self::new()
    }
}

impl StylesheetTransform for MediaMacroTransform {
    fn name(&self) -> &str {
        "media-macro"
    }

    fn transform(&self, sheet: &mut Stylesheet, ctx: &mut TransformContext<'_>) -> Result<()> {
        expand_all(&mut sheet.nodes, ctx)
    }
}

fn expand_all(nodes: &mut [Node], ctx: &TransformContext<'_>) -> Result<()> {
    for node in nodes.iter_mut() {
        if let Node::AtRule(at_rule) = node {
            if let AtRuleKind::MediaMacro { conditions } = &at_rule.kind {
                // Only a single condition is supported.
                let [condition] = conditions.as_slice() else {
                    return Err(TransformError::MacroArity {
                        found: conditions.len(),
                        line: at_rule.location.line,
                        column: at_rule.location.column,
                    });
                };
                let query = media_query(condition, ctx.config)?;
                tracing::debug!(condition = %condition, query = %query, "expanded media() macro");
                at_rule.kind = AtRuleKind::Media { query };
            }
        }
        if let Some(children) = node.children_mut() {
            expand_all(children, ctx)?;
        }
    }
    Ok(())
}
