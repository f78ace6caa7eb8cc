/*
 * config.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Transform configuration.
 */

//! Transform configuration.
//!
//! The configuration holds the tables the transform consults but never
//! derives itself:
//!
//! - the recognized shared design-token namespaces, keyed by variable name
//!   prefix, and the module each one is imported from
//! - the shared helper library that non-local `@extend` targets come from
//! - the breakpoint table used by the `media()` macro
//!
//! # Configuration File
//!
//! ```toml
//! [[namespaces]]
//! prefix = "fe-brary-"
//! namespace = "fe-brary"
//! source = "fe-brary/tokens.module.css"
//!
//! [helpers]
//! source = "fe-brary/helpers.module.css"
//!
//! [breakpoints]
//! phone = "320px"
//! tablet = "768px"
//! desktop = "1024px"
//! ```
//!
//! Every section is optional; missing sections use [`TransformConfig::default`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A recognized shared design-token namespace.
///
/// Variables whose name starts with `prefix` are never inlined. They are
/// imported from `source` instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NamespaceConfig {
    /// Variable name prefix, without the `$` (e.g. `fe-brary-`)
    pub prefix: String,

    /// Namespace name used to group import statements
    pub namespace: String,

    /// Module the namespace's tokens are imported from
    pub source: String,
}

/// The shared helper library that provides placeholders not defined locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HelperLibrary {
    /// Module the helper classes are composed from
    pub source: String,
}

impl Default for HelperLibrary {
    fn default() -> Self {
        Self {
            source: "fe-brary/helpers.module.css".to_string(),
        }
    }
}

/// Tables consulted by the transform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransformConfig {
    /// Recognized shared namespaces
    pub namespaces: Vec<NamespaceConfig>,

    /// Source of non-local `@extend` targets
    pub helpers: HelperLibrary,

    /// Breakpoint name to length (e.g. `desktop = "1024px"`)
    pub breakpoints: IndexMap<String, String>,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            namespaces: vec![NamespaceConfig {
                prefix: "fe-brary-".to_string(),
                namespace: "fe-brary".to_string(),
                source: "fe-brary/tokens.module.css".to_string(),
            }],
            helpers: HelperLibrary::default(),
            breakpoints: IndexMap::from([
                ("phone".to_string(), "320px".to_string()),
                ("tablet".to_string(), "768px".to_string()),
                ("desktop".to_string(), "1024px".to_string()),
            ]),
        }
    }
}

impl TransformConfig {
    /// Parse a configuration from TOML text.
    ///
    /// # Example
    ///
    /// ```
    /// use modcss_core::TransformConfig;
    ///
    /// let config = TransformConfig::from_toml_str(r#"
    /// [breakpoints]
    /// wide = "1440px"
    /// "#).unwrap();
    /// assert_eq!(config.breakpoint("wide"), Some("1440px"));
    /// // Unspecified sections keep their defaults
    /// assert!(config.shared_namespace("fe-brary-colour-white").is_some());
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// The shared namespace a variable belongs to, if any.
    ///
    /// `variable` is the name without `$`. When several prefixes match, the
    /// longest one wins.
    pub fn shared_namespace(&self, variable: &str) -> Option<&NamespaceConfig> {
        self.namespaces
            .iter()
            .filter(|ns| !ns.prefix.is_empty() && variable.starts_with(&ns.prefix))
            .max_by_key(|ns| ns.prefix.len())
    }

    /// Look up a breakpoint length by name.
    pub fn breakpoint(&self, name: &str) -> Option<&str> {
        self.breakpoints.get(name).map(String::as_str)
    }
}
