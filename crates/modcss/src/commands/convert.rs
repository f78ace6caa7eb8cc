/*
 * convert.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Convert command implementation
 */

//! Convert command implementation.
//!
//! `modcss convert a.scss b.scss` writes `a.module.css` and `b.module.css`
//! next to their inputs, or under `--out-dir`. A file that fails to convert
//! is reported and skipped; the command fails once all inputs were tried.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{error, info};

use modcss_core::Transformer;

use super::load_config;

/// Arguments for the convert command
#[derive(Debug)]
pub struct ConvertArgs {
    /// Input stylesheets
    pub inputs: Vec<PathBuf>,
    /// Configuration file
    pub config: Option<PathBuf>,
    /// Output directory
    pub out_dir: Option<PathBuf>,
    /// Print results instead of writing files
    pub stdout: bool,
}

/// Execute the convert command
pub fn execute(args: ConvertArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let transformer = Transformer::new(config);

    if let Some(dir) = &args.out_dir {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    }

    let mut failed = 0usize;
    for input in &args.inputs {
        match convert_file(&transformer, input, &args) {
            Ok(Some(output)) => {
                info!(input = %input.display(), output = %output.display(), "converted");
            }
            Ok(None) => {}
            Err(err) => {
                error!("{:#}", err);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        anyhow::bail!(
            "{} of {} file(s) failed to convert",
            failed,
            args.inputs.len()
        );
    }
    Ok(())
}

/// Convert one file. Returns the written path, or `None` when printing.
fn convert_file(
    transformer: &Transformer,
    input: &Path,
    args: &ConvertArgs,
) -> Result<Option<PathBuf>> {
    let source = fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let output = transformer
        .run(&source)
        .with_context(|| format!("Failed to convert {}", input.display()))?;

    if args.stdout {
        print!("{}", output.css);
        return Ok(None);
    }

    let path = output_path(input, args.out_dir.as_deref());
    fs::write(&path, &output.css)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(Some(path))
}

/// `dir/name.scss` becomes `name.module.css` next to the input or in `out_dir`.
pub fn output_path(input: &Path, out_dir: Option<&Path>) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "stylesheet".to_string());
    // `name.module.scss` must not become `name.module.module.css`
    let stem = stem.strip_suffix(".module").unwrap_or(&stem);
    let file_name = format!("{}.module.css", stem);

    match out_dir {
        Some(dir) => dir.join(file_name),
        None => input.with_file_name(file_name),
    }
}
