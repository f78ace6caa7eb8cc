/*
 * vars.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * `$variable` reference scanning and substitution.
 */

//! `$variable` reference scanning and substitution.
//!
//! Values are text. A reference is any `$name` token, or a `#{$name}`
//! interpolation, anywhere in a declaration value, include argument, media
//! query or variable value. Resolution replaces tokens in place and leaves
//! the surrounding text untouched, so `1px solid $colour` keeps its other
//! components.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Matches `#{$name}` (group 1) or a bare `$name` (group 2).
static VARIABLE_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"#\{\s*\$([A-Za-z_][A-Za-z0-9_-]*)\s*\}|\$([A-Za-z_][A-Za-z0-9_-]*)").unwrap()
});

fn captured_name<'t>(caps: &Captures<'t>) -> Option<&'t str> {
    caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str())
}

/// Names (without `$`) of every variable referenced in `text`, in order.
pub fn variable_references(text: &str) -> impl Iterator<Item = &str> {
    VARIABLE_REFERENCE
        .captures_iter(text)
        .filter_map(|caps| captured_name(&caps))
}

/// Whether `text` references any variable.
pub fn has_variable_references(text: &str) -> bool {
    VARIABLE_REFERENCE.is_match(text)
}

/// Replace each variable reference for which `resolve` returns a value.
///
/// References that `resolve` declines are left exactly as written.
pub fn replace_variables<F>(text: &str, mut resolve: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    VARIABLE_REFERENCE
        .replace_all(text, |caps: &Captures<'_>| {
            let original = caps.get(0).map_or("", |m| m.as_str()).to_string();
            match captured_name(caps) {
                Some(name) => resolve(name).unwrap_or(original),
                None => original,
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finds_every_reference() {
        let refs: Vec<&str> = variable_references(
            "$map-marker-arrow-size, $map-marker-arrow-size, 'down', $fe-brary-colour-white",
        )
        .collect();
        assert_eq!(
            refs,
            vec![
                "map-marker-arrow-size",
                "map-marker-arrow-size",
                "fe-brary-colour-white"
            ]
        );
    }

    #[test]
    fn test_interpolation_is_a_reference() {
        let refs: Vec<&str> = variable_references("calc(100% - #{$gutter})").collect();
        assert_eq!(refs, vec!["gutter"]);
    }

    #[test]
    fn test_no_references() {
        assert!(!has_variable_references("1px solid #ccc"));
        assert!(has_variable_references("1px solid $border"));
        assert_eq!(variable_references("price: 5$").count(), 0);
    }

    #[test]
    fn test_replace_keeps_surrounding_text() {
        let out = replace_variables("1px solid $fe-brary-colour-neutral-300", |name| {
            Some(name.to_string())
        });
        assert_eq!(out, "1px solid fe-brary-colour-neutral-300");
    }

    #[test]
    fn test_replace_leaves_declined_references() {
        let out = replace_variables("$a $b", |name| (name == "a").then(|| "1px".to_string()));
        assert_eq!(out, "1px $b");
    }

    #[test]
    fn test_replace_interpolation_drops_braces() {
        let out = replace_variables("calc(100% - #{$gutter})", |_| Some("8px".to_string()));
        assert_eq!(out, "calc(100% - 8px)");

        let kept = replace_variables("calc(100% - #{$gutter})", |_| None);
        assert_eq!(kept, "calc(100% - #{$gutter})");
    }
}
