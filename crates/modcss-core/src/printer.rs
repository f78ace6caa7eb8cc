/*
 * printer.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Serializes a flattened stylesheet as CSS-module text.
 */

//! CSS-module output.
//!
//! Layout:
//!
//! ```text
//! @value <token> from "<source>";      shared imports, grouped by namespace
//!
//! @value <name>: <value>;              exported variables
//!
//! <rules, exported classes and @define-mixin blocks in source order>
//! ```
//!
//! Sections are separated by one blank line, blocks by one blank line,
//! nesting is indented by two spaces, and the text ends with a newline.
//! An empty result prints as the empty string.

use crate::ast::{AtRuleKind, AtRuleNode, Node, Stylesheet};
use crate::imports::ImportSet;
use crate::transform::Exports;

const INDENT: &str = "  ";

/// Print a transformed stylesheet with its imports and exported variables.
pub fn print(sheet: &Stylesheet, imports: &ImportSet, exports: &Exports) -> String {
    let mut sections = Vec::new();

    let statements = imports.statements();
    if !statements.is_empty() {
        sections.push(statements.join("\n"));
    }

    if !exports.variables.is_empty() {
        let values: Vec<String> = exports
            .variables
            .iter()
            .map(|(name, value)| format!("@value {}: {};", name, value))
            .collect();
        sections.push(values.join("\n"));
    }

    if !sheet.nodes.is_empty() {
        let mut body = String::new();
        write_nodes(&mut body, &sheet.nodes, 0);
        sections.push(body);
    }

    if sections.is_empty() {
        return String::new();
    }
    let mut css = sections.join("\n\n");
    css.push('\n');
    css
}

fn write_nodes(out: &mut String, nodes: &[Node], depth: usize) {
    let mut previous_was_block = false;
    for (index, node) in nodes.iter().enumerate() {
        let is_block = node.children().is_some();
        if index > 0 {
            out.push('\n');
            if is_block || previous_was_block {
                out.push('\n');
            }
        }
        write_node(out, node, depth);
        previous_was_block = is_block;
    }
}

fn write_node(out: &mut String, node: &Node, depth: usize) {
    let indent = INDENT.repeat(depth);
    match node {
        Node::Declaration(decl) => {
            out.push_str(&format!("{}{}: {};", indent, decl.property, decl.value));
        }
        Node::Rule(rule) => write_block(out, &indent, &rule.selector, &rule.children, depth),
        Node::AtRule(at_rule) => {
            let header = at_rule_header(at_rule);
            match &at_rule.body {
                Some(body) => write_block(out, &indent, &header, body, depth),
                None => out.push_str(&format!("{}{};", indent, header)),
            }
        }
    }
}

fn write_block(out: &mut String, indent: &str, header: &str, children: &[Node], depth: usize) {
    if children.is_empty() {
        out.push_str(&format!("{}{} {{}}", indent, header));
        return;
    }
    out.push_str(&format!("{}{} {{\n", indent, header));
    write_nodes(out, children, depth + 1);
    out.push_str(&format!("\n{}}}", indent));
}

/// The at-rule text before its `;` or block.
fn at_rule_header(at_rule: &AtRuleNode) -> String {
    match &at_rule.kind {
        AtRuleKind::Media { query } => format!("@media {}", query),
        AtRuleKind::MediaMacro { conditions } => {
            format!("@include media({})", conditions.join(", "))
        }
        AtRuleKind::Include { name, args } => call("@mixin", name, &args.join(", ")),
        AtRuleKind::Extend { placeholder } => format!("@extend %{}", placeholder),
        AtRuleKind::MixinDefinition { name, params } => {
            let params: Vec<String> = params.iter().map(ToString::to_string).collect();
            call("@define-mixin", name, &params.join(", "))
        }
        AtRuleKind::PlaceholderDefinition { name } => format!("%{}", name),
        AtRuleKind::VariableDeclaration { name, value } => format!("${}: {}", name, value),
        AtRuleKind::Content => "@content".to_string(),
        AtRuleKind::Other { name, prelude } => call(&format!("@{}", name), prelude, ""),
    }
}

fn call(keyword: &str, name: &str, args: &str) -> String {
    [keyword, name, args]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}
