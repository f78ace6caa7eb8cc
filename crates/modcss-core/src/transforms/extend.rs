/*
 * extend.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Transform that resolves placeholders and @extend.
 */

//! Placeholder resolution.
//!
//! - A placeholder `@extend`ed anywhere in the file is inlined at every
//!   `@extend` site and its definition is removed.
//! - A placeholder nobody extends is exported as the CSS-module class
//!   `.name`, so other modules can `composes` it.
//! - `@extend` of a placeholder the file does not define refers to the shared
//!   helper library and becomes `composes: name from "<helpers>"`.

use indexmap::IndexMap;

use crate::Result;
use crate::ast::{AtRuleKind, AtRuleNode, Declaration, Node, RuleNode, Stylesheet};
use crate::collect::SymbolKind;
use crate::transform::{StylesheetTransform, TransformContext};

/// Transform that resolves placeholders and `@extend`.
pub struct ExtendTransform;

impl ExtendTransform {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ExtendTransform {
    fn default() -> Self {
        Self::new()
    }
}

impl StylesheetTransform for ExtendTransform {
    fn name(&self) -> &str {
        "extend"
    }

    fn transform(&self, sheet: &mut Stylesheet, ctx: &mut TransformContext<'_>) -> Result<()> {
        let mut bodies = IndexMap::new();
        collect_placeholder_bodies(&sheet.nodes, &mut bodies);

        let mut resolver = Resolver {
            bodies: &bodies,
            ctx,
            active: Vec::new(),
        };
        let nodes = std::mem::take(&mut sheet.nodes);
        sheet.nodes = resolver.rewrite(nodes);
        Ok(())
    }
}

fn collect_placeholder_bodies(nodes: &[Node], bodies: &mut IndexMap<String, Vec<Node>>) {
    for node in nodes {
        if let Node::AtRule(AtRuleNode {
            kind: AtRuleKind::PlaceholderDefinition { name },
            body,
            ..
        }) = node
        {
            bodies.insert(name.clone(), body.clone().unwrap_or_default());
        }
        if let Some(children) = node.children() {
            collect_placeholder_bodies(children, bodies);
        }
    }
}

struct Resolver<'a, 'c> {
    bodies: &'a IndexMap<String, Vec<Node>>,
    ctx: &'a mut TransformContext<'c>,
    /// Placeholders whose bodies are being rewritten; extending one of
    /// these again would never terminate.
    active: Vec<String>,
}

impl Resolver<'_, '_> {
    fn rewrite(&mut self, nodes: Vec<Node>) -> Vec<Node> {
        let mut out = Vec::with_capacity(nodes.len());

        for node in nodes {
            match node {
                Node::AtRule(AtRuleNode {
                    kind,
                    body,
                    location,
                }) => match kind {
                    AtRuleKind::PlaceholderDefinition { name } => {
                        if self.ctx.usage.is_referenced(SymbolKind::Placeholder, &name) {
                            tracing::debug!(placeholder = %name, "placeholder inlined at its @extend sites");
                            continue;
                        }
                        self.ctx.exports.placeholders.push(name.clone());
                        let children = self.rewrite_inside(&name, body.unwrap_or_default());
                        let mut rule = RuleNode::new(format!(".{}", name), children);
                        rule.location = location;
                        out.push(Node::Rule(rule));
                    }
                    AtRuleKind::Extend { placeholder } => {
                        if self.active.contains(&placeholder) {
                            tracing::debug!(placeholder = %placeholder, "ignoring cyclic @extend");
                            continue;
                        }
                        let bodies = self.bodies;
                        match bodies.get(&placeholder) {
                            Some(body) => {
                                let inlined = self.rewrite_inside(&placeholder, body.clone());
                                out.extend(inlined);
                            }
                            None => {
                                tracing::debug!(placeholder = %placeholder, "composing placeholder from helper library");
                                let value = format!(
                                    "{} from \"{}\"",
                                    placeholder, self.ctx.config.helpers.source
                                );
                                out.push(Node::Declaration(
                                    Declaration::new("composes", value).at(location),
                                ));
                            }
                        }
                    }
                    kind => {
                        let body = body.map(|children| self.rewrite(children));
                        out.push(Node::AtRule(AtRuleNode::new(kind, body).at(location)));
                    }
                },
                Node::Rule(mut rule) => {
                    rule.children = self.rewrite(std::mem::take(&mut rule.children));
                    out.push(Node::Rule(rule));
                }
                declaration => out.push(declaration),
            }
        }

        out
    }

    fn rewrite_inside(&mut self, placeholder: &str, body: Vec<Node>) -> Vec<Node> {
        self.active.push(placeholder.to_string());
        let rewritten = self.rewrite(body);
        self.active.pop();
        rewritten
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::collect;
    use crate::config::TransformConfig;
    use crate::parser::parse;

    fn run(source: &str) -> (Vec<Node>, Vec<String>) {
        let mut sheet = parse(source).unwrap();
        let (usage, definitions) = collect(&sheet);
        let config = TransformConfig::default();
        let mut ctx = TransformContext::new(&config, usage, definitions);
        ExtendTransform::new().transform(&mut sheet, &mut ctx).unwrap();
        (sheet.nodes, ctx.exports.placeholders)
    }

    fn rule(node: &Node) -> &RuleNode {
        match node {
            Node::Rule(rule) => rule,
            other => panic!("expected rule, got {:?}", other),
        }
    }

    fn properties(rule: &RuleNode) -> Vec<&str> {
        rule.declarations().map(|d| d.property.as_str()).collect()
    }

    #[test]
    fn test_used_placeholder_is_inlined_and_removed() {
        let (nodes, exported) = run(
            "%message-shared { border: 1px solid #ccc; padding: 10px; }\n\
             .message { @extend %message-shared; }\n\
             .success { @extend %message-shared; border-color: green; }",
        );
        assert_eq!(nodes.len(), 2);
        assert_eq!(properties(rule(&nodes[0])), vec!["border", "padding"]);
        assert_eq!(
            properties(rule(&nodes[1])),
            vec!["border", "padding", "border-color"]
        );
        assert!(exported.is_empty());
    }

    #[test]
    fn test_unused_placeholder_is_exported_as_class() {
        let (nodes, exported) = run("%fe-pa-listing-details-main { padding: 18px 0; }");
        assert_eq!(rule(&nodes[0]).selector, ".fe-pa-listing-details-main");
        assert_eq!(exported, vec!["fe-pa-listing-details-main"]);
    }

    #[test]
    fn test_non_local_placeholder_composes_from_helpers() {
        let (nodes, _) = run(".arrow { @extend %button-normalize; position: absolute; }");
        let decls: Vec<(&str, &str)> = rule(&nodes[0])
            .declarations()
            .map(|d| (d.property.as_str(), d.value.as_str()))
            .collect();
        assert_eq!(
            decls,
            vec![
                ("composes", "button-normalize from \"fe-brary/helpers.module.css\""),
                ("position", "absolute"),
            ]
        );
    }

    #[test]
    fn test_extend_before_definition_is_inlined() {
        let (nodes, _) = run(".a { @extend %late; }\n%late { color: red; }");
        assert_eq!(nodes.len(), 1);
        assert_eq!(properties(rule(&nodes[0])), vec!["color"]);
    }

    #[test]
    fn test_chained_placeholders() {
        let (nodes, _) = run(
            "%base { margin: 0; }\n%card { @extend %base; padding: 4px; }\n.a { @extend %card; }",
        );
        assert_eq!(nodes.len(), 1);
        assert_eq!(properties(rule(&nodes[0])), vec!["margin", "padding"]);
    }

    #[test]
    fn test_self_extend_terminates() {
        let (nodes, exported) = run("%loop { color: red; @extend %loop; }");
        assert_eq!(exported, vec!["loop"]);
        assert_eq!(properties(rule(&nodes[0])), vec!["color"]);
    }
}
