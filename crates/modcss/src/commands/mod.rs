/*
 * mod.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Command implementations for the modcss CLI.
 */

//! Command implementations for the modcss CLI
//!
//! Each command module handles the CLI interface and delegates to
//! modcss-core for the transform itself.

pub mod convert;
pub mod inspect;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use modcss_core::TransformConfig;

/// Load the transform configuration, or the defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<TransformConfig> {
    let Some(path) = path else {
        return Ok(TransformConfig::default());
    };

    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config = TransformConfig::from_toml_str(&text)
        .with_context(|| format!("Failed to load config file {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded configuration");
    Ok(config)
}
