/*
 * text.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Small string helpers shared by the parser and the stages.
 */

//! Small string helpers shared by the parser and the stages.

/// Split `input` on `separator`, ignoring separators nested in parentheses,
/// brackets or quoted strings. Pieces are trimmed; empty pieces are dropped.
pub fn split_top_level(input: &str, separator: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for ch in input.chars() {
        if let Some(q) = quote {
            current.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }

        match ch {
            '"' | '\'' => {
                quote = Some(ch);
                current.push(ch);
            }
            '(' | '[' => {
                depth += 1;
                current.push(ch);
            }
            ')' | ']' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            c if c == separator && depth == 0 => {
                push_piece(&mut parts, &current);
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    push_piece(&mut parts, &current);
    parts
}

fn push_piece(parts: &mut Vec<String>, piece: &str) {
    let trimmed = piece.trim();
    if !trimmed.is_empty() {
        parts.push(trimmed.to_string());
    }
}

/// Collapse runs of whitespace outside quoted strings into a single space
/// and trim both ends.
pub fn normalize_whitespace(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut pending_space = false;

    for ch in input.trim().chars() {
        if let Some(q) = quote {
            out.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }

        if ch.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        if ch == '"' || ch == '\'' {
            quote = Some(ch);
        }
        out.push(ch);
    }
    out
}

/// Strip one pair of matching surrounding quotes, if present.
pub fn unquote(input: &str) -> &str {
    let trimmed = input.trim();
    for q in ['"', '\''] {
        if trimmed.len() >= 2 && trimmed.starts_with(q) && trimmed.ends_with(q) {
            return &trimmed[1..trimmed.len() - 1];
        }
    }
    trimmed
}

/// Split `name(args)` into the name and its top-level comma separated
/// arguments. A bare `name` has no arguments.
pub fn split_call(input: &str) -> (String, Vec<String>) {
    let trimmed = input.trim();
    match trimmed.find('(') {
        Some(open) if trimmed.ends_with(')') => {
            let name = trimmed[..open].trim().to_string();
            let args = split_top_level(&trimmed[open + 1..trimmed.len() - 1], ',');
            (name, args)
        }
        _ => (trimmed.to_string(), Vec::new()),
    }
}
