/*
 * collect.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * File-wide symbol usage analysis.
 */

//! Reference collection.
//!
//! Every resolution decision that depends on "is this symbol used anywhere
//! in the file" reads the [`UsageTable`] built here. Collection is a single
//! read-only walk over the parsed tree and finishes before any stage mutates
//! it, so a placeholder extended only after its definition still counts as
//! used.
//!
//! Counting rules:
//!
//! - usage is file-scoped: a reference in a nested rule counts the same as a
//!   top-level one
//! - a reference inside the symbol's own definition body is not counted
//! - `$param` inside a mixin body refers to the parameter, not to a file
//!   variable of the same name
//! - `@include media(...)` is the media macro, not a mixin reference
//! - `#{$name}` in a selector is a variable reference like any other

use indexmap::IndexMap;
use serde::Serialize;

use crate::ast::{AtRuleKind, MixinParam, Node, SourceLocation, Stylesheet};
use crate::vars::variable_references;

/// Which namespace a symbol name lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Variable,
    Placeholder,
    Mixin,
}

/// Declaration and reference state of one symbol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Usage {
    pub declared: bool,
    pub referenced: usize,
}

/// File-wide usage of variables, placeholders and mixins.
#[derive(Debug, Clone, Default)]
pub struct UsageTable {
    entries: IndexMap<(SymbolKind, String), Usage>,
}

impl UsageTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, kind: SymbolKind, name: &str) {
        self.entry(kind, name).declared = true;
    }

    pub fn reference(&mut self, kind: SymbolKind, name: &str) {
        self.entry(kind, name).referenced += 1;
    }

    fn entry(&mut self, kind: SymbolKind, name: &str) -> &mut Usage {
        self.entries.entry((kind, name.to_string())).or_default()
    }

    pub fn get(&self, kind: SymbolKind, name: &str) -> Option<Usage> {
        self.entries.get(&(kind, name.to_string())).copied()
    }

    pub fn is_declared(&self, kind: SymbolKind, name: &str) -> bool {
        self.get(kind, name).is_some_and(|u| u.declared)
    }

    pub fn is_referenced(&self, kind: SymbolKind, name: &str) -> bool {
        self.get(kind, name).is_some_and(|u| u.referenced > 0)
    }

    /// A symbol is exported when it is declared locally and never used locally.
    pub fn is_exportable(&self, kind: SymbolKind, name: &str) -> bool {
        self.get(kind, name)
            .is_some_and(|u| u.declared && u.referenced == 0)
    }

    /// All exportable symbols of one kind, in first-seen order.
    pub fn exportable(&self, kind: SymbolKind) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(move |((k, _), usage)| {
                *k == kind && usage.declared && usage.referenced == 0
            })
            .map(|((_, name), _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (SymbolKind, &str, Usage)> {
        self.entries
            .iter()
            .map(|((kind, name), usage)| (*kind, name.as_str(), *usage))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Locally declared symbols.
#[derive(Debug, Clone, Default)]
pub struct Definitions {
    /// File-scope variables and their raw values (last declaration wins)
    pub variables: IndexMap<String, String>,
    /// Mixin signatures
    pub mixins: IndexMap<String, Vec<MixinParam>>,
    /// Placeholder definition sites
    pub placeholders: IndexMap<String, SourceLocation>,
}

/// Walk the stylesheet once and build its usage table and definitions.
pub fn collect(sheet: &Stylesheet) -> (UsageTable, Definitions) {
    let mut collector = Collector::default();
    collector.walk(&sheet.nodes, &Scope::top_level());
    (collector.usage, collector.definitions)
}

#[derive(Default)]
struct Collector {
    usage: UsageTable,
    definitions: Definitions,
}

/// What encloses the nodes being walked.
#[derive(Clone)]
struct Scope<'a> {
    top_level: bool,
    owners: Vec<(SymbolKind, &'a str)>,
    params: Vec<&'a str>,
}

impl<'a> Scope<'a> {
    fn top_level() -> Self {
        Self {
            top_level: true,
            owners: Vec::new(),
            params: Vec::new(),
        }
    }

    fn nested(&self) -> Self {
        Self {
            top_level: false,
            ..self.clone()
        }
    }

    fn owned_by(&self, kind: SymbolKind, name: &'a str) -> Self {
        let mut scope = self.nested();
        scope.owners.push((kind, name));
        scope
    }

    fn is_owner(&self, kind: SymbolKind, name: &str) -> bool {
        self.owners.iter().any(|(k, n)| *k == kind && *n == name)
    }
}

impl Collector {
    fn walk<'a>(&mut self, nodes: &'a [Node], scope: &Scope<'a>) {
        for node in nodes {
            match node {
                Node::Declaration(decl) => self.reference_variables(&decl.value, scope),
                Node::Rule(rule) => {
                    self.reference_variables(&rule.selector, scope);
                    self.walk(&rule.children, &scope.nested());
                }
                Node::AtRule(at_rule) => {
                    let body = at_rule.body.as_deref().unwrap_or_default();
                    match &at_rule.kind {
                        AtRuleKind::VariableDeclaration { name, value } => {
                            if scope.top_level {
                                self.usage.declare(SymbolKind::Variable, name);
                                self.definitions
                                    .variables
                                    .insert(name.clone(), value.clone());
                            }
                            let own = scope.owned_by(SymbolKind::Variable, name);
                            self.reference_variables(value, &own);
                        }
                        AtRuleKind::MixinDefinition { name, params } => {
                            self.usage.declare(SymbolKind::Mixin, name);
                            self.definitions.mixins.insert(name.clone(), params.clone());

                            // A default may refer to the parameters before it
                            let mut own = scope.owned_by(SymbolKind::Mixin, name);
                            for param in params {
                                if let Some(default) = &param.default {
                                    self.reference_variables(default, &own);
                                }
                                own.params.push(param.name.as_str());
                            }
                            self.walk(body, &own);
                        }
                        AtRuleKind::PlaceholderDefinition { name } => {
                            self.usage.declare(SymbolKind::Placeholder, name);
                            self.definitions
                                .placeholders
                                .insert(name.clone(), at_rule.location);
                            self.walk(body, &scope.owned_by(SymbolKind::Placeholder, name));
                        }
                        AtRuleKind::Extend { placeholder } => {
                            if !scope.is_owner(SymbolKind::Placeholder, placeholder) {
                                self.usage.reference(SymbolKind::Placeholder, placeholder);
                            }
                        }
                        AtRuleKind::Include { name, args } => {
                            if !scope.is_owner(SymbolKind::Mixin, name) {
                                self.usage.reference(SymbolKind::Mixin, name);
                            }
                            for arg in args {
                                self.reference_variables(arg, scope);
                            }
                            self.walk(body, &scope.nested());
                        }
                        AtRuleKind::Media { query } => {
                            self.reference_variables(query, scope);
                            self.walk(body, &scope.nested());
                        }
                        AtRuleKind::Other { prelude, .. } => {
                            self.reference_variables(prelude, scope);
                            self.walk(body, &scope.nested());
                        }
                        AtRuleKind::MediaMacro { .. } => self.walk(body, &scope.nested()),
                        AtRuleKind::Content => {}
                    }
                }
            }
        }
    }

    fn reference_variables(&mut self, text: &str, scope: &Scope<'_>) {
        for name in variable_references(text) {
            if scope.params.iter().any(|p| *p == name) || scope.is_owner(SymbolKind::Variable, name) {
                continue;
            }
            self.usage.reference(SymbolKind::Variable, name);
        }
    }
}
