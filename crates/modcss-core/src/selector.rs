/*
 * selector.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Selector composition for nested rules.
 */

//! Selector composition for nested rules.

use crate::text::split_top_level;

/// The parent-reference token.
pub const PARENT_REFERENCE: char = '&';

/// How a nested selector attaches to its ancestor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Composition {
    /// The selector contains `&`; every occurrence is replaced by the parent.
    ParentReference,
    /// The selector starts with `:` (`::after`, `:hover`) and attaches to the
    /// parent with no space.
    ImplicitParent,
    /// Anything else is a descendant of the parent.
    Descendant,
}

impl Composition {
    pub fn of(selector: &str) -> Self {
        if selector.contains(PARENT_REFERENCE) {
            Self::ParentReference
        } else if selector.starts_with(':') {
            Self::ImplicitParent
        } else {
            Self::Descendant
        }
    }

    /// Attach a single `selector` to a single `parent`.
    pub fn apply(self, parent: &str, selector: &str) -> String {
        match self {
            Self::ParentReference => selector.replace(PARENT_REFERENCE, parent),
            Self::ImplicitParent => format!("{}{}", parent, selector),
            Self::Descendant => format!("{} {}", parent, selector),
        }
    }
}

/// Split a selector list on top-level commas.
pub fn split_selector_list(selector: &str) -> Vec<String> {
    split_top_level(selector, ',')
}

/// Compose a nested selector list against the already composed parent list.
///
/// Both lists are combined pairwise, parent-major. With no parents the
/// selector list is returned as written.
pub fn compose(parents: &[String], selector: &str) -> Vec<String> {
    let children = split_selector_list(selector);
    if parents.is_empty() {
        return children;
    }

    parents
        .iter()
        .flat_map(|parent| {
            children
                .iter()
                .map(move |child| Composition::of(child).apply(parent, child))
        })
        .collect()
}

/// Join a selector list for output.
pub fn join(selectors: &[String]) -> String {
    selectors.join(", ")
}
