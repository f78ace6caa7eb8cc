/*
 * variables.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Transform that resolves $variable references.
 */

//! Variable resolution.
//!
//! Each `$name` reference is resolved independently, first match wins:
//!
//! 1. a parameter of the enclosing exported mixin stays `$name`
//! 2. a shared-namespace token becomes the bare token name and is imported
//! 3. a variable declared in an enclosing rule becomes `var(--name)`, and
//!    its declaration becomes the custom property `--name`
//! 4. a file-scope variable is replaced by its value
//! 5. anything else passes through untouched
//!
//! `#{$name}` interpolations in selectors take file-scope values only.
//!
//! File-scope declarations are removed from the tree. Referenced ones have
//! been substituted; unreferenced ones are recorded as exports.

use std::collections::HashSet;

use crate::Result;
use crate::ast::{AtRuleKind, AtRuleNode, Declaration, Node, Stylesheet};
use crate::collect::SymbolKind;
use crate::transform::{StylesheetTransform, TransformContext};
use crate::vars::{has_variable_references, replace_variables};

/// Transform that resolves `$variable` references.
pub struct VariableTransform;

impl VariableTransform {
    pub fn new() -> Self {
        Self
    }
}

impl Default for VariableTransform {
    fn default() -> Self {
        Self::new()
    }
}

impl StylesheetTransform for VariableTransform {
    fn name(&self) -> &str {
        "variables"
    }

    fn transform(&self, sheet: &mut Stylesheet, ctx: &mut TransformContext<'_>) -> Result<()> {
        let mut resolver = Resolver {
            ctx,
            scopes: Vec::new(),
        };
        let nodes = std::mem::take(&mut sheet.nodes);
        sheet.nodes = resolver.rewrite_file(nodes);
        Ok(())
    }
}

/// Names bound by one enclosing block.
#[derive(Default)]
struct Scope {
    params: HashSet<String>,
    locals: HashSet<String>,
}

struct Resolver<'a, 'c> {
    ctx: &'a mut TransformContext<'c>,
    scopes: Vec<Scope>,
}

impl Resolver<'_, '_> {
    fn rewrite_file(&mut self, nodes: Vec<Node>) -> Vec<Node> {
        let mut out = Vec::with_capacity(nodes.len());
        for node in nodes {
            match node {
                Node::AtRule(AtRuleNode {
                    kind: AtRuleKind::VariableDeclaration { name, value },
                    ..
                }) => {
                    if self.ctx.usage.is_referenced(SymbolKind::Variable, &name) {
                        tracing::debug!(variable = %name, "variable inlined at its references");
                        continue;
                    }
                    let value = self.resolve_text(&value);
                    self.ctx.exports.variables.insert(name, value);
                }
                node => out.push(self.rewrite_node(node)),
            }
        }
        out
    }

    fn rewrite_block(&mut self, nodes: Vec<Node>, params: HashSet<String>) -> Vec<Node> {
        let locals = nodes
            .iter()
            .filter_map(|node| match node {
                Node::AtRule(AtRuleNode {
                    kind: AtRuleKind::VariableDeclaration { name, .. },
                    ..
                }) => Some(name.clone()),
                _ => None,
            })
            .collect();

        self.scopes.push(Scope { params, locals });
        let rewritten = nodes
            .into_iter()
            .map(|node| self.rewrite_node(node))
            .collect();
        self.scopes.pop();
        rewritten
    }

    fn rewrite_body(&mut self, body: Option<Vec<Node>>) -> Option<Vec<Node>> {
        body.map(|nodes| self.rewrite_block(nodes, HashSet::new()))
    }

    fn rewrite_node(&mut self, node: Node) -> Node {
        match node {
            Node::Declaration(mut decl) => {
                decl.value = self.resolve_text(&decl.value);
                Node::Declaration(decl)
            }
            Node::Rule(mut rule) => {
                rule.selector = self.resolve_selector(&rule.selector);
                rule.children = self.rewrite_block(std::mem::take(&mut rule.children), HashSet::new());
                Node::Rule(rule)
            }
            Node::AtRule(AtRuleNode {
                kind,
                body,
                location,
            }) => {
                let (kind, body) = match kind {
                    AtRuleKind::VariableDeclaration { name, value } => {
                        let value = self.resolve_text(&value);
                        return Node::Declaration(
                            Declaration::new(format!("--{}", name), value).at(location),
                        );
                    }
                    AtRuleKind::MixinDefinition { name, mut params } => {
                        // Each default sees the parameters declared before it
                        self.scopes.push(Scope::default());
                        for param in &mut params {
                            if let Some(default) = param.default.take() {
                                param.default = Some(self.resolve_text(&default));
                            }
                            if let Some(scope) = self.scopes.last_mut() {
                                scope.params.insert(param.name.clone());
                            }
                        }
                        self.scopes.pop();

                        let bound = params.iter().map(|p| p.name.clone()).collect();
                        let body = body.map(|nodes| self.rewrite_block(nodes, bound));
                        (AtRuleKind::MixinDefinition { name, params }, body)
                    }
                    AtRuleKind::Include { name, args } => {
                        let args = args.iter().map(|arg| self.resolve_text(arg)).collect();
                        (AtRuleKind::Include { name, args }, self.rewrite_body(body))
                    }
                    AtRuleKind::Media { query } => {
                        let query = self.resolve_text(&query);
                        (AtRuleKind::Media { query }, self.rewrite_body(body))
                    }
                    AtRuleKind::Other { name, prelude } => {
                        let prelude = self.resolve_text(&prelude);
                        (AtRuleKind::Other { name, prelude }, self.rewrite_body(body))
                    }
                    other => (other, self.rewrite_body(body)),
                };
                Node::AtRule(AtRuleNode::new(kind, body).at(location))
            }
        }
    }

    fn resolve_text(&mut self, text: &str) -> String {
        replace_variables(text, |name| self.resolve_reference(name))
    }

    fn resolve_reference(&mut self, name: &str) -> Option<String> {
        if self.scopes.iter().any(|scope| scope.params.contains(name)) {
            return None;
        }
        if let Some(token) = self.shared_token(name) {
            return Some(token);
        }
        if self.scopes.iter().any(|scope| scope.locals.contains(name)) {
            return Some(format!("var(--{})", name));
        }
        if self.ctx.definitions.variables.contains_key(name) {
            return self.file_value(name, &mut Vec::new());
        }
        tracing::debug!(variable = %name, "passing through external variable");
        None
    }

    /// Resolve `#{$name}` interpolations in a selector.
    ///
    /// Only file-scope values can be spliced into a selector. Parameters of
    /// an exported mixin and block-local variables stay as written.
    fn resolve_selector(&mut self, selector: &str) -> String {
        if !has_variable_references(selector) {
            return selector.to_string();
        }
        replace_variables(selector, |name| {
            if self.scopes.iter().any(|scope| scope.params.contains(name)) {
                return None;
            }
            if self.ctx.definitions.variables.contains_key(name) {
                return self.file_value(name, &mut Vec::new());
            }
            tracing::debug!(variable = %name, "leaving selector interpolation unresolved");
            None
        })
    }

    /// Resolve a shared token and record its import.
    fn shared_token(&mut self, name: &str) -> Option<String> {
        let config = self.ctx.config;
        let namespace = config.shared_namespace(name)?;
        self.ctx.imports.insert(namespace, name);
        Some(name.to_string())
    }

    /// The value of a file-scope variable with its own references resolved.
    ///
    /// File-scope values only see shared tokens and other file-scope
    /// variables. A cycle leaves the offending reference as written.
    fn file_value(&mut self, name: &str, visiting: &mut Vec<String>) -> Option<String> {
        if visiting.iter().any(|v| v == name) {
            tracing::warn!(variable = %name, "circular variable definition");
            return None;
        }
        let value = self.ctx.definitions.variables.get(name)?.clone();

        visiting.push(name.to_string());
        let resolved = replace_variables(&value, |inner| {
            if let Some(token) = self.shared_token(inner) {
                return Some(token);
            }
            if self.ctx.definitions.variables.contains_key(inner) {
                return self.file_value(inner, visiting);
            }
            None
        });
        visiting.pop();
        Some(resolved)
    }
}
