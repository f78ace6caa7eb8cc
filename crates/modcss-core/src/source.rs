/*
 * source.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Source pre-pass: comment removal and brace balance checking.
 */

//! Source pre-pass run before structural parsing.
//!
//! Authoring files mix `/* block */` and `// line` comments. The CSS
//! tokenizer only understands the former, so both kinds are blanked here:
//! every comment character except newlines becomes a space, which keeps
//! line numbers in later diagnostics pointing at the original text.
//!
//! The same scan verifies that braces are balanced and that strings and
//! block comments are terminated. The tokenizer silently closes open blocks
//! at end of input, so unbalanced braces must be caught here.

use crate::ast::SourceLocation;
use crate::error::{Result, TransformError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    String(char),
    BlockComment,
    LineComment,
    Url,
}

/// Blank out comments and validate brace/string/comment termination.
pub fn blank_comments(source: &str) -> Result<String> {
    let mut out = String::with_capacity(source.len());
    let mut state = State::Normal;
    let mut escaped = false;
    let mut open_braces: Vec<SourceLocation> = Vec::new();
    let mut state_start = SourceLocation::new(1, 1);
    let mut location = SourceLocation::new(1, 1);

    let mut chars = source.chars().peekable();
    while let Some(ch) = chars.next() {
        let here = location;
        if ch == '\n' {
            location.line += 1;
            location.column = 1;
        } else {
            location.column += 1;
        }

        match state {
            State::Normal => match ch {
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    location.column += 1;
                    out.push_str("  ");
                    state = State::BlockComment;
                    state_start = here;
                }
                '/' if chars.peek() == Some(&'/') => {
                    chars.next();
                    location.column += 1;
                    out.push_str("  ");
                    state = State::LineComment;
                }
                '"' | '\'' => {
                    out.push(ch);
                    state = State::String(ch);
                    state_start = here;
                }
                '(' => {
                    let after_url = out
                        .len()
                        .checked_sub(3)
                        .and_then(|start| out.get(start..))
                        .is_some_and(|tail| tail.eq_ignore_ascii_case("url"));
                    if after_url {
                        state = State::Url;
                        state_start = here;
                    }
                    out.push(ch);
                }
                '{' => {
                    open_braces.push(here);
                    out.push(ch);
                }
                '}' => {
                    if open_braces.pop().is_none() {
                        return Err(TransformError::parse("unexpected '}'", here));
                    }
                    out.push(ch);
                }
                _ => out.push(ch),
            },
            State::String(quote) => {
                if escaped {
                    escaped = false;
                } else if ch == '\\' {
                    escaped = true;
                } else if ch == quote {
                    state = State::Normal;
                } else if ch == '\n' {
                    return Err(TransformError::parse("unterminated string", state_start));
                }
                out.push(ch);
            }
            State::BlockComment => {
                if ch == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    location.column += 1;
                    out.push_str("  ");
                    state = State::Normal;
                } else {
                    out.push(blank(ch));
                }
            }
            State::LineComment => {
                if ch == '\n' {
                    out.push('\n');
                    state = State::Normal;
                } else {
                    out.push(blank(ch));
                }
            }
            State::Url => {
                if ch == ')' {
                    state = State::Normal;
                } else if ch == '\n' {
                    return Err(TransformError::parse("unterminated url()", state_start));
                }
                out.push(ch);
            }
        }
    }

    match state {
        State::BlockComment => {
            return Err(TransformError::parse("unterminated comment", state_start));
        }
        State::String(_) => {
            return Err(TransformError::parse("unterminated string", state_start));
        }
        State::Url => {
            return Err(TransformError::parse("unterminated url()", state_start));
        }
        State::Normal | State::LineComment => {}
    }

    if let Some(unclosed) = open_braces.last() {
        return Err(TransformError::parse("unclosed block", *unclosed));
    }

    Ok(out)
}

fn blank(ch: char) -> char {
    if ch == '\n' { '\n' } else { ' ' }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_comments_are_blanked() {
        let out = blank_comments("// note\n.a { color: red; }").unwrap();
        assert_eq!(out, "       \n.a { color: red; }");
    }

    #[test]
    fn test_block_comments_keep_newlines() {
        let out = blank_comments("/* a\nb */.a{}").unwrap();
        assert_eq!(out, "    \n    .a{}");
        assert_eq!(out.lines().count(), 2);
    }

    #[test]
    fn test_urls_and_strings_are_not_comments() {
        let src = ".a { background: url(http://x.test/a.png); content: '//'; }";
        assert_eq!(blank_comments(src).unwrap(), src);
    }

    #[test]
    fn test_braces_in_strings_are_ignored() {
        let src = ".a { content: '{'; }";
        assert_eq!(blank_comments(src).unwrap(), src);
    }

    #[test]
    fn test_unclosed_block_is_an_error() {
        let err = blank_comments(".a {\n  color: red;\n").unwrap_err();
        assert_eq!(
            err,
            TransformError::Parse {
                message: "unclosed block".to_string(),
                line: 1,
                column: 4,
            }
        );
    }

    #[test]
    fn test_stray_close_is_an_error() {
        let err = blank_comments(".a { }\n}").unwrap_err();
        assert_eq!(err.location(), Some(SourceLocation::new(2, 1)));
    }

    #[test]
    fn test_unterminated_comment_is_an_error() {
        let err = blank_comments(".a { } /* open").unwrap_err();
        assert!(err.to_string().contains("unterminated comment"));
    }
}
