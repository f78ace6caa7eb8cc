/*
 * imports.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Shared design-token imports derived during variable resolution.
 */

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::config::NamespaceConfig;

/// Symbols imported from one shared namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportGroup {
    /// Module the symbols are imported from
    pub source: String,
    /// Symbol names in first-seen order
    pub symbols: IndexSet<String>,
}

/// Deduplicated `(namespace, symbol)` pairs grouped by namespace.
///
/// Namespaces and the symbols inside each namespace keep first-seen order,
/// which is the order their import statements are printed in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ImportSet {
    groups: IndexMap<String, ImportGroup>,
}

impl ImportSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a symbol from `namespace`. Returns `false` if it was already present.
    pub fn insert(&mut self, namespace: &NamespaceConfig, symbol: &str) -> bool {
        self.groups
            .entry(namespace.namespace.clone())
            .or_insert_with(|| ImportGroup {
                source: namespace.source.clone(),
                symbols: IndexSet::new(),
            })
            .symbols
            .insert(symbol.to_string())
    }

    pub fn contains(&self, namespace: &str, symbol: &str) -> bool {
        self.groups
            .get(namespace)
            .is_some_and(|group| group.symbols.contains(symbol))
    }

    /// Number of `(namespace, symbol)` pairs.
    pub fn len(&self) -> usize {
        self.groups.values().map(|g| g.symbols.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn groups(&self) -> impl Iterator<Item = (&str, &ImportGroup)> {
        self.groups.iter().map(|(ns, group)| (ns.as_str(), group))
    }

    /// `@value <symbol> from "<source>";` for every pair, namespace-grouped.
    pub fn statements(&self) -> Vec<String> {
        self.groups
            .values()
            .flat_map(|group| {
                group
                    .symbols
                    .iter()
                    .map(move |symbol| format!("@value {} from \"{}\";", symbol, group.source))
            })
            .collect()
    }
}
