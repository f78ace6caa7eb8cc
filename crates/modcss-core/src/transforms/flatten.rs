/*
 * flatten.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Transform that flattens nested rules.
 */

//! Selector flattening.
//!
//! Every nested rule becomes a top-level rule whose selector is composed
//! from its ancestors (see [`compose`]). Rules are emitted depth-first in
//! encounter order, each rule before the rules nested in it, and a rule
//! with nothing of its own to print is skipped.
//!
//! `@media` blocks nested in a rule bubble up: their body is flattened
//! against the enclosing selector and wrapped in a top-level `@media`.
//! A `@media` nested in another one is merged into a single query joined
//! with `and`. Declarations directly inside a file-level `@media` stay in
//! it. Other block at-rules (`@supports`, ...) bubble the same way
//! but are never merged.
//!
//! Exported mixin bodies are flattened against `&`, so the mixin stays a
//! single self-contained block.

use crate::Result;
use crate::ast::{AtRuleKind, AtRuleNode, Node, RuleNode, SourceLocation, Stylesheet};
use crate::selector::{PARENT_REFERENCE, compose, join};
use crate::transform::{StylesheetTransform, TransformContext};

/// Transform that flattens nested rules.
pub struct FlattenTransform;

impl FlattenTransform {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FlattenTransform {
    fn default() -> Self {
        Self::new()
    }
}

impl StylesheetTransform for FlattenTransform {
    fn name(&self) -> &str {
        "flatten"
    }

    fn transform(&self, sheet: &mut Stylesheet, _ctx: &mut TransformContext<'_>) -> Result<()> {
        let nodes = std::mem::take(&mut sheet.nodes);
        sheet.nodes = flatten(nodes);
        Ok(())
    }
}

/// Flatten top-level nodes.
pub fn flatten(nodes: Vec<Node>) -> Vec<Node> {
    let mut own = Vec::new();
    let mut out = Vec::new();
    flatten_into(nodes, &[], &mut own, &mut out);
    out
}

/// Flatten `children`, the body of a block selected by `selectors`.
///
/// Statements that belong to the block itself go to `own`. Everything that
/// must be emitted at the top level goes to `out`. With no selectors (the
/// file's top level) statements go straight to `out`, and declarations,
/// which cannot appear there, are dropped.
fn flatten_into(
    children: Vec<Node>,
    selectors: &[String],
    own: &mut Vec<Node>,
    out: &mut Vec<Node>,
) {
    let top_level = selectors.is_empty();

    for child in children {
        match child {
            Node::Declaration(decl) => {
                if top_level {
                    tracing::warn!(
                        property = %decl.property,
                        location = %decl.location,
                        "dropping declaration outside of any rule"
                    );
                } else {
                    own.push(Node::Declaration(decl));
                }
            }
            Node::Rule(rule) => flatten_rule(rule, selectors, out),
            Node::AtRule(at_rule) => {
                let AtRuleNode {
                    kind,
                    body,
                    location,
                } = at_rule;
                match (kind, body) {
                    (AtRuleKind::Media { query }, Some(body)) => {
                        let inner = flatten_wrapped(body, selectors, location);
                        wrap_media(query, inner, location, out);
                    }
                    (AtRuleKind::MixinDefinition { name, params }, Some(body)) => {
                        let body = flatten_mixin_body(body);
                        let kind = AtRuleKind::MixinDefinition { name, params };
                        out.push(Node::AtRule(AtRuleNode::new(kind, Some(body)).at(location)));
                    }
                    (kind @ AtRuleKind::Other { .. }, Some(body)) if !top_level => {
                        let inner = flatten_wrapped(body, selectors, location);
                        if !inner.is_empty() {
                            out.push(Node::AtRule(AtRuleNode::new(kind, Some(inner)).at(location)));
                        }
                    }
                    (kind, body) => {
                        // Statements and verbatim blocks (@font-face, @keyframes, calls)
                        let node = Node::AtRule(AtRuleNode::new(kind, body).at(location));
                        if top_level {
                            out.push(node);
                        } else {
                            own.push(node);
                        }
                    }
                }
            }
        }
    }
}

fn flatten_rule(rule: RuleNode, parents: &[String], out: &mut Vec<Node>) {
    let selectors = compose(parents, &rule.selector);
    let mut own = Vec::new();
    let mut nested = Vec::new();
    flatten_into(rule.children, &selectors, &mut own, &mut nested);

    if !own.is_empty() {
        let mut flat = RuleNode::new(join(&selectors), own);
        flat.location = rule.location;
        out.push(Node::Rule(flat));
    }
    out.extend(nested);
}

/// Flatten the body of a bubbling at-rule into the nodes it will wrap.
fn flatten_wrapped(body: Vec<Node>, selectors: &[String], location: SourceLocation) -> Vec<Node> {
    if selectors.is_empty() {
        // A file-level @media keeps its bare declarations
        let (mut inner, rest): (Vec<Node>, Vec<Node>) = body
            .into_iter()
            .partition(|node| matches!(node, Node::Declaration(_)));
        let mut own = Vec::new();
        flatten_into(rest, selectors, &mut own, &mut inner);
        return inner;
    }

    let mut own = Vec::new();
    let mut nested = Vec::new();
    flatten_into(body, selectors, &mut own, &mut nested);

    let mut inner = Vec::with_capacity(nested.len() + 1);
    if !own.is_empty() {
        let mut rule = RuleNode::new(join(selectors), own);
        rule.location = location;
        inner.push(Node::Rule(rule));
    }
    inner.extend(nested);
    inner
}

/// Wrap flattened nodes in `@media query`, merging nested media queries.
fn wrap_media(query: String, inner: Vec<Node>, location: SourceLocation, out: &mut Vec<Node>) {
    let media = |query: String, body: Vec<Node>, location: SourceLocation| {
        Node::AtRule(AtRuleNode::new(AtRuleKind::Media { query }, Some(body)).at(location))
    };

    let mut group = Vec::new();
    for node in inner {
        match node {
            Node::AtRule(AtRuleNode {
                kind: AtRuleKind::Media { query: nested },
                body,
                location: nested_location,
            }) => {
                if !group.is_empty() {
                    out.push(media(query.clone(), std::mem::take(&mut group), location));
                }
                out.push(media(
                    format!("{} and {}", query, nested),
                    body.unwrap_or_default(),
                    nested_location,
                ));
            }
            other => group.push(other),
        }
    }
    if !group.is_empty() {
        out.push(media(query, group, location));
    }
}

/// Flatten a mixin body against `&`: its own declarations stay in the body,
/// nested rules become `&`-prefixed rules next to them.
fn flatten_mixin_body(body: Vec<Node>) -> Vec<Node> {
    let parent = [PARENT_REFERENCE.to_string()];
    let mut own = Vec::new();
    let mut nested = Vec::new();
    flatten_into(body, &parent, &mut own, &mut nested);
    own.extend(nested);
    own
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Declaration;
    use crate::parser::parse;

    fn flat(source: &str) -> Vec<Node> {
        flatten(parse(source).unwrap().nodes)
    }

    /// `(selector, [property])` for every top-level rule.
    fn outline(nodes: &[Node]) -> Vec<(String, Vec<String>)> {
        nodes
            .iter()
            .filter_map(|node| match node {
                Node::Rule(rule) => Some((
                    rule.selector.clone(),
                    rule.declarations().map(|d| d.property.clone()).collect(),
                )),
                _ => None,
            })
            .collect()
    }

    fn entry(selector: &str, properties: &[&str]) -> (String, Vec<String>) {
        (
            selector.to_string(),
            properties.iter().map(|p| p.to_string()).collect(),
        )
    }

    #[test]
    fn test_parent_rule_comes_first() {
        let nodes = flat(
            ".button {\n  display: flex;\n  .foo { display: block; }\n  align-items: center;\n}",
        );
        assert_eq!(
            outline(&nodes),
            vec![
                entry(".button", &["display", "align-items"]),
                entry(".button .foo", &["display"]),
            ]
        );
    }

    #[test]
    fn test_rules_without_declarations_are_skipped() {
        let nodes = flat(
            ".copy {\n  display: flex;\n  &:hover {\n    .icon { opacity: 1; }\n  }\n}",
        );
        assert_eq!(
            outline(&nodes),
            vec![
                entry(".copy", &["display"]),
                entry(".copy:hover .icon", &["opacity"]),
            ]
        );
    }

    #[test]
    fn test_pseudo_nesting() {
        let nodes = flat(
            ".link {\n  margin-left: auto;\n  &:not(:last-of-type) {\n    padding-right: 12px;\n    &::after { content: ''; }\n  }\n  ::hover { color: pink; }\n  p { margin: 0; }\n}",
        );
        assert_eq!(
            outline(&nodes),
            vec![
                entry(".link", &["margin-left"]),
                entry(".link:not(:last-of-type)", &["padding-right"]),
                entry(".link:not(:last-of-type)::after", &["content"]),
                entry(".link::hover", &["color"]),
                entry(".link p", &["margin"]),
            ]
        );
    }

    #[test]
    fn test_selector_lists() {
        let nodes = flat(".copy {\n  &:focus,\n  &:hover { outline: 0; }\n}");
        assert_eq!(outline(&nodes), vec![entry(".copy:focus, .copy:hover", &["outline"])]);
    }

    #[test]
    fn test_flat_input_is_unchanged() {
        let source = ".a { color: red; }\n.b:first-of-type { color: black; }\n@media (min-width: 1px) { .c { color: blue; } }";
        let once = flat(source);
        assert_eq!(once, parse(source).unwrap().nodes);
        assert_eq!(flatten(once.clone()), once);
    }

    #[test]
    fn test_media_bubbles_with_composed_selector() {
        let nodes = flat(
            ".label {\n  display: none;\n  @media (min-width: 100px) {\n    display: inline;\n    .x { color: red; }\n  }\n}",
        );
        assert_eq!(nodes.len(), 2);
        let Node::AtRule(media) = &nodes[1] else {
            panic!("expected @media");
        };
        assert_eq!(
            media.kind,
            AtRuleKind::Media {
                query: "(min-width: 100px)".to_string()
            }
        );
        assert_eq!(
            outline(media.body.as_ref().unwrap()),
            vec![
                entry(".label", &["display"]),
                entry(".label .x", &["color"]),
            ]
        );
    }

    #[test]
    fn test_nested_media_queries_are_joined() {
        let nodes = flat(
            ".a {\n  @media screen {\n    color: red;\n    @media (min-width: 1px) { color: blue; }\n  }\n}",
        );
        let queries: Vec<&str> = nodes
            .iter()
            .filter_map(|node| match node {
                Node::AtRule(AtRuleNode {
                    kind: AtRuleKind::Media { query },
                    ..
                }) => Some(query.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(queries, vec!["screen", "screen and (min-width: 1px)"]);
    }

    #[test]
    fn test_top_level_declarations_are_dropped() {
        let nodes = flatten(vec![
            Node::Declaration(Declaration::new("width", "1px")),
            Node::Rule(RuleNode::new(
                ".a",
                vec![Node::Declaration(Declaration::new("color", "red"))],
            )),
        ]);
        assert_eq!(outline(&nodes), vec![entry(".a", &["color"])]);
        assert_eq!(nodes.len(), 1);
    }

    #[test]
    fn test_file_level_media_keeps_declarations() {
        let nodes = flat("@media (min-width: 1px) {\n  display: inline;\n  .a { .b { color: red; } }\n}");
        assert_eq!(nodes.len(), 1);
        let Node::AtRule(media) = &nodes[0] else {
            panic!("expected @media");
        };
        let body = media.body.as_ref().unwrap();
        assert!(matches!(&body[0], Node::Declaration(d) if d.property == "display"));
        assert_eq!(outline(body), vec![entry(".a .b", &["color"])]);
    }

    #[test]
    fn test_mixin_body_is_flattened_against_parent_reference() {
        let nodes = flat(
            "@mixin ad-exact($width) {\n  width: $width;\n  .bar {\n    display: flex;\n    .foo { align-items: start; }\n  }\n  display: block;\n}",
        );
        let Node::AtRule(mixin) = &nodes[0] else {
            panic!("expected mixin");
        };
        let body = mixin.body.as_ref().unwrap();
        let props: Vec<&str> = body
            .iter()
            .filter_map(|n| match n {
                Node::Declaration(d) => Some(d.property.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(props, vec!["width", "display"]);
        assert_eq!(
            outline(body),
            vec![
                entry("& .bar", &["display"]),
                entry("& .bar .foo", &["align-items"]),
            ]
        );
    }
}
