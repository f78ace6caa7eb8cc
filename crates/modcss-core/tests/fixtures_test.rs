/*
 * fixtures_test.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Transform tests against stylesheet fixtures.
 */

use std::fs;
use std::path::{Path, PathBuf};

use modcss_core::{SymbolKind, Transformer, collect, parse};
use pretty_assertions::assert_eq;

/// Helper to get the path to test fixtures
fn fixture_path(name: &str) -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    Path::new(manifest_dir).join("test-fixtures").join(name)
}

fn read_fixture(name: &str) -> String {
    fs::read_to_string(fixture_path(name))
        .unwrap_or_else(|_| panic!("Failed to read fixture: {}", name))
}

/// Transform `<name>.scss` and compare with `<name>.module.css`.
fn assert_fixture(name: &str) {
    let source = read_fixture(&format!("{}.scss", name));
    let expected = read_fixture(&format!("{}.module.css", name));
    let output = Transformer::default()
        .run(&source)
        .unwrap_or_else(|err| panic!("Failed to transform {}: {}", name, err));
    assert_eq!(output.css, expected);
}

#[test]
fn test_component_fixture() {
    assert_fixture("listing-details");
}

#[test]
fn test_helper_library_fixture() {
    assert_fixture("helpers");
}

#[test]
fn test_component_fixture_usage() {
    let sheet = parse(&read_fixture("listing-details.scss")).unwrap();
    let (usage, definitions) = collect(&sheet);

    assert!(!usage.is_exportable(SymbolKind::Placeholder, "card-base"));
    assert!(!usage.is_exportable(SymbolKind::Mixin, "truncate"));
    assert!(!usage.is_exportable(SymbolKind::Variable, "gutter"));
    assert!(usage.is_referenced(SymbolKind::Placeholder, "button-normalize"));
    assert!(!usage.is_declared(SymbolKind::Placeholder, "button-normalize"));
    assert_eq!(definitions.mixins.len(), 1);
}

#[test]
fn test_helper_library_exports() {
    let output = Transformer::default()
        .run(&read_fixture("helpers.scss"))
        .unwrap();

    assert_eq!(output.exports.placeholders, vec!["visually-hidden"]);
    assert_eq!(output.exports.mixins, vec!["focus-ring"]);
    assert!(output.exports.variables.is_empty());
    assert!(
        output
            .imports
            .contains("fe-brary", "fe-brary-colour-primary-dark")
    );
}
