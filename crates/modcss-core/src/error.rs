/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Error types for stylesheet transforms.
 */

//! Error types for stylesheet transforms.

use thiserror::Error;

use crate::ast::SourceLocation;

/// Errors that abort a transform.
///
/// Every variant is fatal to the call: a failed transform produces no
/// output text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// The source is not well-formed (unbalanced braces, malformed at-rules, ...)
    #[error("Parse error at {line}:{column}: {message}")]
    Parse {
        message: String,
        line: u32,
        column: u32,
    },

    /// The media macro was called with other than exactly one condition
    #[error(
        "media() expects exactly one condition, found {found} at {line}:{column}; combining conditions is not supported"
    )]
    MacroArity { found: usize, line: u32, column: u32 },

    /// The media macro condition could not be mapped to a native query
    #[error("Invalid media() condition '{condition}': {reason}")]
    MediaCondition { condition: String, reason: String },

    /// A local mixin was included with the wrong number of arguments
    #[error("Mixin '{name}' expects {expected} argument(s), found {found}")]
    MixinArguments {
        name: String,
        expected: usize,
        found: usize,
    },

    /// Mixin expansion did not terminate
    #[error("Mixin '{name}' includes itself recursively")]
    MixinRecursion { name: String },

    /// The transform configuration could not be read
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl TransformError {
    /// Create a parse error at a source location.
    pub fn parse(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::Parse {
            message: message.into(),
            line: location.line,
            column: location.column,
        }
    }

    /// Source location of the error, when it has one.
    pub fn location(&self) -> Option<SourceLocation> {
        match self {
            Self::Parse { line, column, .. } | Self::MacroArity { line, column, .. } => {
                Some(SourceLocation::new(*line, *column))
            }
            _ => None,
        }
    }
}

impl From<toml::de::Error> for TransformError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type for transform operations.
pub type Result<T> = std::result::Result<T, TransformError>;
