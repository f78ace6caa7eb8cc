/*
 * cli_test.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * End-to-end tests for the modcss binary.
 */

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use pretty_assertions::assert_eq;
use tempfile::TempDir;

const BUTTON: &str = "\
.button {
  color: $fe-brary-colour-primary-dark;

  &:hover {
    color: red;
  }
}
";

const BUTTON_CSS: &str = "\
@value fe-brary-colour-primary-dark from \"fe-brary/tokens.module.css\";

.button {
  color: fe-brary-colour-primary-dark;
}

.button:hover {
  color: red;
}
";

fn modcss(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_modcss"))
        .args(args)
        .current_dir(cwd)
        .env("RUST_LOG", "modcss=warn")
        .output()
        .expect("Failed to run modcss")
}

#[test]
fn test_convert_writes_module_next_to_input() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("button.scss"), BUTTON).unwrap();

    let output = modcss(&["convert", "button.scss"], temp.path());
    assert!(output.status.success(), "{:?}", output);

    let css = fs::read_to_string(temp.path().join("button.module.css")).unwrap();
    assert_eq!(css, BUTTON_CSS);
}

#[test]
fn test_convert_to_out_dir() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("button.scss"), BUTTON).unwrap();

    let output = modcss(
        &["convert", "button.scss", "--out-dir", "dist/css"],
        temp.path(),
    );
    assert!(output.status.success(), "{:?}", output);
    assert!(temp.path().join("dist/css/button.module.css").exists());
    assert!(!temp.path().join("button.module.css").exists());
}

#[test]
fn test_convert_to_stdout() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("button.scss"), BUTTON).unwrap();

    let output = modcss(&["convert", "--stdout", "button.scss"], temp.path());
    assert!(output.status.success(), "{:?}", output);
    assert_eq!(String::from_utf8_lossy(&output.stdout), BUTTON_CSS);
    assert!(!temp.path().join("button.module.css").exists());
}

#[test]
fn test_convert_continues_past_failures() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("broken.scss"),
        ".a {\n  @include media('>=desktop', 'landscape') {\n    color: red;\n  }\n}\n",
    )
    .unwrap();
    fs::write(temp.path().join("button.scss"), BUTTON).unwrap();

    let output = modcss(&["convert", "broken.scss", "button.scss"], temp.path());
    assert!(!output.status.success());
    assert!(temp.path().join("button.module.css").exists());
    assert!(!temp.path().join("broken.module.css").exists());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("broken.scss"), "{}", stderr);
    assert!(stderr.contains("1 of 2 file(s) failed"), "{}", stderr);
}

#[test]
fn test_convert_with_config_file() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("modcss.toml"),
        "[breakpoints]\nwide = \"1440px\"\n",
    )
    .unwrap();
    fs::write(
        temp.path().join("layout.scss"),
        ".grid {\n  @include media('>=wide') {\n    gap: 2rem;\n  }\n}\n",
    )
    .unwrap();

    let output = modcss(
        &["convert", "--stdout", "--config", "modcss.toml", "layout.scss"],
        temp.path(),
    );
    assert!(output.status.success(), "{:?}", output);
    assert!(
        String::from_utf8_lossy(&output.stdout).contains("@media (min-width: 1440px)")
    );
}

#[test]
fn test_inspect_prints_imports_and_exports() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("tokens.scss"),
        "$gap: 8px;\n\n%card {\n  padding: 4px;\n}\n\n.button {\n  color: $fe-brary-colour-primary-dark;\n}\n",
    )
    .unwrap();

    let output = modcss(&["inspect", "tokens.scss"], temp.path());
    assert!(output.status.success(), "{:?}", output);

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["exports"]["variables"]["gap"], "8px");
    assert_eq!(report["exports"]["placeholders"][0], "card");
    assert_eq!(
        report["imports"]["fe-brary"]["symbols"][0],
        "fe-brary-colour-primary-dark"
    );
}

#[test]
fn test_missing_input_fails() {
    let temp = TempDir::new().unwrap();
    let output = modcss(&["convert", "missing.scss"], temp.path());
    assert!(!output.status.success());
}
