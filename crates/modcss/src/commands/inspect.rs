/*
 * inspect.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Inspect command implementation.
 */

//! Inspect command implementation.
//!
//! Prints what a stylesheet imports from shared namespaces and what it
//! exports, as pretty JSON:
//!
//! ```json
//! {
//!   "imports": { "fe-brary": { "source": "...", "symbols": ["..."] } },
//!   "exports": { "variables": {}, "placeholders": [], "mixins": [] }
//! }
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use modcss_core::Transformer;

use super::load_config;

/// Arguments for the inspect command
#[derive(Debug)]
pub struct InspectArgs {
    pub input: PathBuf,
    pub config: Option<PathBuf>,
}

/// Execute the inspect command
pub fn execute(args: InspectArgs) -> Result<()> {
    println!("{}", report(&args)?);
    Ok(())
}

fn report(args: &InspectArgs) -> Result<String> {
    let config = load_config(args.config.as_deref())?;
    let source = fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let output = Transformer::new(config)
        .run(&source)
        .with_context(|| format!("Failed to convert {}", args.input.display()))?;

    let report = serde_json::json!({
        "imports": output.imports,
        "exports": output.exports,
    });
    Ok(serde_json::to_string_pretty(&report)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_input_is_reported() {
        let args = InspectArgs {
            input: PathBuf::from("/nonexistent/button.scss"),
            config: None,
        };
        let err = report(&args).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read"));
    }
}
