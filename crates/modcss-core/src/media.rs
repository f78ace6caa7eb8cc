/*
 * media.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Breakpoint conditions for the `media()` macro.
 */

//! Breakpoint conditions for the `media()` macro.
//!
//! A condition is an operator followed by a breakpoint name or a literal
//! length, e.g. `'>=desktop'` or `'<600px'`. Strict comparisons are mapped
//! onto the inclusive `min-width`/`max-width` features by shifting pixel
//! values by one pixel. Lengths in other units are used unchanged.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::TransformConfig;
use crate::error::{Result, TransformError};
use crate::text::unquote;

static LENGTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+(?:\.\d+)?|\.\d+)([A-Za-z%]*)$").unwrap());

/// Comparison operator of a macro condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// `>=`
    AtLeast,
    /// `>`
    Above,
    /// `<=`
    AtMost,
    /// `<`
    Below,
}

impl Comparison {
    /// Split the operator off the front of a condition.
    fn split(condition: &str) -> Option<(Self, &str)> {
        [
            (">=", Self::AtLeast),
            ("<=", Self::AtMost),
            (">", Self::Above),
            ("<", Self::Below),
        ]
        .into_iter()
        .find_map(|(token, op)| condition.strip_prefix(token).map(|rest| (op, rest.trim())))
    }

    fn feature(self) -> &'static str {
        match self {
            Self::AtLeast | Self::Above => "min-width",
            Self::AtMost | Self::Below => "max-width",
        }
    }

    fn pixel_offset(self) -> f64 {
        match self {
            Self::Above => 1.0,
            Self::Below => -1.0,
            Self::AtLeast | Self::AtMost => 0.0,
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            Self::AtLeast => ">=",
            Self::Above => ">",
            Self::AtMost => "<=",
            Self::Below => "<",
        };
        f.write_str(token)
    }
}

/// Translate one macro condition into a native media query such as
/// `(min-width: 1024px)`.
///
/// # Errors
///
/// [`TransformError::MediaCondition`] when the operator is missing or the
/// breakpoint is neither configured nor a literal length.
pub fn media_query(condition: &str, config: &TransformConfig) -> Result<String> {
    let raw = unquote(condition);
    let invalid = |reason: String| TransformError::MediaCondition {
        condition: raw.to_string(),
        reason,
    };

    let (op, target) = Comparison::split(raw)
        .ok_or_else(|| invalid("expected one of '>=', '>', '<=', '<' before the breakpoint".to_string()))?;
    if target.is_empty() {
        return Err(invalid(format!("missing breakpoint after '{}'", op)));
    }

    let length = match config.breakpoint(target) {
        Some(length) => length,
        None if LENGTH.is_match(target) => target,
        None => {
            let known: Vec<&str> = config.breakpoints.keys().map(String::as_str).collect();
            return Err(invalid(format!(
                "unknown breakpoint '{}' (known: {})",
                target,
                known.join(", ")
            )));
        }
    };

    let value = adjust(length, op.pixel_offset())
        .ok_or_else(|| invalid(format!("breakpoint value '{}' is not a length", length)))?;
    Ok(format!("({}: {})", op.feature(), value))
}

/// Apply a pixel offset to a `px` length. Other units pass through.
fn adjust(length: &str, offset: f64) -> Option<String> {
    let caps = LENGTH.captures(length.trim())?;
    let unit = caps.get(2).map_or("", |m| m.as_str());
    if offset == 0.0 || !unit.eq_ignore_ascii_case("px") {
        return Some(length.trim().to_string());
    }
    let number: f64 = caps.get(1)?.as_str().parse().ok()?;
    Some(format!("{}{}", number + offset, unit))
}
