/*
 * parser.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Stylesheet parser built on the cssparser tokenizer.
 */

//! Stylesheet parser.
//!
//! Parsing happens in two steps:
//!
//! 1. [`blank_comments`](crate::source::blank_comments) removes `//` and
//!    `/* */` comments and rejects unbalanced input.
//! 2. A recursive block reader walks the `cssparser` token stream. Each item
//!    in a block ends either at a top-level `;` (a statement) or at a `{ ... }`
//!    block (a rule or an at-rule with a body). Parenthesized groups,
//!    function calls and `#{...}` interpolations are consumed whole, so
//!    `@include media('>=desktop') {`, `width: calc(100% - 2px);` and
//!    `.icon-#{$name} {` end where they should.
//!
//! The text of each item is sliced from the source and classified into a
//! [`Node`]. The reader never interprets values.

use cssparser::{ParseError, ParseErrorKind, Parser, ParserInput, SourcePosition, Token};

use crate::ast::{
    AtRuleKind, AtRuleNode, Declaration, MixinParam, Node, RuleNode, SourceLocation, Stylesheet,
};
use crate::error::{Result, TransformError};
use crate::source::blank_comments;
use crate::text::{normalize_whitespace, split_call};

/// Custom error payload carried through cssparser's `ParseError`.
#[derive(Debug, Clone)]
struct Malformed(String);

type CssResult<'i, T> = std::result::Result<T, ParseError<'i, Malformed>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    TopLevel,
    Nested,
}

/// How the scan of a block item ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Terminator {
    Semicolon,
    Block,
    StrayClose,
    End,
}

/// Parse stylesheet source text into a rule tree.
///
/// # Errors
///
/// Returns [`TransformError::Parse`] for unbalanced braces, unterminated
/// strings or comments, declarations without a `:`, blocks without a
/// selector and malformed SCSS directives.
///
/// # Example
///
/// ```
/// use modcss_core::{parse, Node};
///
/// let sheet = parse("// header\n.a { color: red; .b { color: blue } }").unwrap();
/// assert_eq!(sheet.nodes.len(), 1);
/// let Node::Rule(rule) = &sheet.nodes[0] else { panic!("expected a rule") };
/// assert_eq!(rule.selector, ".a");
/// assert_eq!(rule.nested_rules().count(), 1);
/// ```
pub fn parse(source: &str) -> Result<Stylesheet> {
    let cleaned = blank_comments(source)?;
    let mut input = ParserInput::new(&cleaned);
    let mut parser = Parser::new(&mut input);
    let nodes = parse_block(&mut parser, Level::TopLevel).map_err(into_transform_error)?;
    Ok(Stylesheet::new(nodes))
}

fn parse_block<'i>(input: &mut Parser<'i, '_>, level: Level) -> CssResult<'i, Vec<Node>> {
    let mut nodes = Vec::new();

    loop {
        input.skip_whitespace();
        let css_location = input.current_source_location();
        let start = input.position();

        let (end, terminator) = scan_item(input)?;

        let prelude = normalize_whitespace(input.slice(start..end));
        let location = to_location(css_location);

        match terminator {
            Terminator::End if prelude.is_empty() => break,
            Terminator::Semicolon if prelude.is_empty() => continue,
            Terminator::StrayClose => {
                return Err(malformed(css_location, "unexpected '}'"));
            }
            Terminator::Semicolon | Terminator::End => {
                let node = parse_statement(&prelude, location, level)
                    .map_err(|message| malformed(css_location, message))?;
                nodes.push(node);
                if terminator == Terminator::End {
                    break;
                }
            }
            Terminator::Block => {
                let children = input.parse_nested_block(|nested| parse_block(nested, Level::Nested))?;
                let node = parse_block_item(&prelude, children, location)
                    .map_err(|message| malformed(css_location, message))?;
                nodes.push(node);
            }
        }
    }

    Ok(nodes)
}

/// Consume one block item up to its terminator.
///
/// Returns the position just past the item's last token. Function calls,
/// parenthesized groups and `#{...}` interpolations are consumed whole, so a
/// `;` or `{` inside them never ends the item.
fn scan_item<'i>(input: &mut Parser<'i, '_>) -> CssResult<'i, (SourcePosition, Terminator)> {
    let mut end = input.position();
    let mut after_hash = false;

    loop {
        let token = match input.next_including_whitespace() {
            Ok(token) => token.clone(),
            Err(_) => return Ok((end, Terminator::End)),
        };
        match token {
            Token::Semicolon => return Ok((end, Terminator::Semicolon)),
            Token::CurlyBracketBlock if after_hash => skip_nested_block(input)?,
            Token::CurlyBracketBlock => return Ok((end, Terminator::Block)),
            Token::CloseCurlyBracket => return Ok((end, Terminator::StrayClose)),
            Token::Function(_) | Token::ParenthesisBlock | Token::SquareBracketBlock => {
                skip_nested_block(input)?;
            }
            _ => {}
        }
        after_hash = matches!(token, Token::Delim('#'));
        if !matches!(token, Token::WhiteSpace(_)) {
            end = input.position();
        }
    }
}

fn skip_nested_block<'i>(input: &mut Parser<'i, '_>) -> CssResult<'i, ()> {
    input.parse_nested_block(|nested| {
        while nested.next_including_whitespace().is_ok() {}
        Ok(())
    })
}

/// Classify a `;`-terminated item.
fn parse_statement(
    prelude: &str,
    location: SourceLocation,
    level: Level,
) -> std::result::Result<Node, String> {
    if let Some(rest) = prelude.strip_prefix('$') {
        return parse_variable_declaration(rest, location);
    }

    if let Some(rest) = prelude.strip_prefix('@') {
        let (name, rest) = split_at_keyword(rest);
        let kind = match name {
            "extend" => parse_extend(rest)?,
            "include" => parse_include(rest)?,
            "content" => AtRuleKind::Content,
            "mixin" | "media" => return Err(format!("@{} requires a block", name)),
            "" => return Err("missing at-rule name after '@'".to_string()),
            _ => AtRuleKind::Other {
                name: name.to_string(),
                prelude: rest.to_string(),
            },
        };
        return Ok(Node::AtRule(AtRuleNode::new(kind, None).at(location)));
    }

    if level == Level::TopLevel {
        return Err(format!("declaration outside of a rule: '{}'", prelude));
    }

    let (property, value) = prelude
        .split_once(':')
        .ok_or_else(|| format!("expected 'property: value', found '{}'", prelude))?;
    let property = property.trim();
    if property.is_empty() {
        return Err(format!("missing property name in '{}'", prelude));
    }
    Ok(Node::Declaration(
        Declaration::new(property, value.trim()).at(location),
    ))
}

/// Classify an item followed by a `{ ... }` block.
fn parse_block_item(
    prelude: &str,
    children: Vec<Node>,
    location: SourceLocation,
) -> std::result::Result<Node, String> {
    if prelude.is_empty() {
        return Err("missing selector before '{'".to_string());
    }

    if let Some(rest) = prelude.strip_prefix('@') {
        let (name, rest) = split_at_keyword(rest);
        let kind = match name {
            "media" => {
                if rest.is_empty() {
                    return Err("@media requires a query".to_string());
                }
                AtRuleKind::Media {
                    query: rest.to_string(),
                }
            }
            "include" => parse_include(rest)?,
            "mixin" => parse_mixin_signature(rest)?,
            "extend" => return Err("@extend cannot have a block".to_string()),
            "" => return Err("missing at-rule name after '@'".to_string()),
            _ => AtRuleKind::Other {
                name: name.to_string(),
                prelude: rest.to_string(),
            },
        };
        return Ok(Node::AtRule(AtRuleNode::new(kind, Some(children)).at(location)));
    }

    if let Some(name) = prelude.strip_prefix('%') {
        if name.is_empty() {
            return Err("missing placeholder name after '%'".to_string());
        }
        let kind = AtRuleKind::PlaceholderDefinition {
            name: name.to_string(),
        };
        return Ok(Node::AtRule(AtRuleNode::new(kind, Some(children)).at(location)));
    }

    if prelude.starts_with('$') {
        return Err(format!("variable '{}' cannot have a block", prelude));
    }

    let mut rule = RuleNode::new(prelude, children);
    rule.location = location;
    Ok(Node::Rule(rule))
}

fn parse_variable_declaration(
    rest: &str,
    location: SourceLocation,
) -> std::result::Result<Node, String> {
    let (name, value) = rest
        .split_once(':')
        .ok_or_else(|| format!("expected '${}: value'", rest))?;
    let name = name.trim();
    if name.is_empty() || !name.chars().all(is_name_char) {
        return Err(format!("invalid variable name '${}'", name));
    }

    let mut value = value.trim();
    // Flags only affect SCSS assignment semantics.
    loop {
        let stripped = value
            .strip_suffix("!default")
            .or_else(|| value.strip_suffix("!global"));
        match stripped {
            Some(s) => value = s.trim_end(),
            None => break,
        }
    }
    if value.is_empty() {
        return Err(format!("variable '${}' has no value", name));
    }

    let kind = AtRuleKind::VariableDeclaration {
        name: name.to_string(),
        value: value.to_string(),
    };
    Ok(Node::AtRule(AtRuleNode::new(kind, None).at(location)))
}

fn parse_extend(rest: &str) -> std::result::Result<AtRuleKind, String> {
    let target = rest.strip_suffix("!optional").unwrap_or(rest).trim();
    if target.is_empty() {
        return Err("@extend requires a target".to_string());
    }
    Ok(match target.strip_prefix('%') {
        Some(name) if !name.is_empty() => AtRuleKind::Extend {
            placeholder: name.to_string(),
        },
        _ => AtRuleKind::Other {
            name: "extend".to_string(),
            prelude: target.to_string(),
        },
    })
}

fn parse_include(rest: &str) -> std::result::Result<AtRuleKind, String> {
    let (name, args) = split_call(rest);
    if name.is_empty() {
        return Err("@include requires a mixin name".to_string());
    }
    if name == "media" {
        return Ok(AtRuleKind::MediaMacro { conditions: args });
    }
    Ok(AtRuleKind::Include { name, args })
}

fn parse_mixin_signature(rest: &str) -> std::result::Result<AtRuleKind, String> {
    let (name, raw_params) = split_call(rest);
    if name.is_empty() {
        return Err("@mixin requires a name".to_string());
    }

    let mut params = Vec::with_capacity(raw_params.len());
    for raw in raw_params {
        let Some(param) = raw.strip_prefix('$') else {
            return Err(format!("mixin parameter '{}' must start with '$'", raw));
        };
        let (param_name, default) = match param.split_once(':') {
            Some((n, d)) => (n.trim(), Some(d.trim().to_string())),
            None => (param.trim(), None),
        };
        if param_name.is_empty() {
            return Err(format!("empty parameter name in @mixin {}", name));
        }
        params.push(MixinParam {
            name: param_name.to_string(),
            default,
        });
    }

    Ok(AtRuleKind::MixinDefinition { name, params })
}

/// Split `name rest` after an `@`.
fn split_at_keyword(rest: &str) -> (&str, &str) {
    let end = rest
        .find(|c: char| !is_name_char(c))
        .unwrap_or(rest.len());
    (&rest[..end], rest[end..].trim())
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn to_location(location: cssparser::SourceLocation) -> SourceLocation {
    SourceLocation::new(location.line + 1, location.column)
}

fn malformed<'i>(
    location: cssparser::SourceLocation,
    message: impl Into<String>,
) -> ParseError<'i, Malformed> {
    ParseError {
        kind: ParseErrorKind::Custom(Malformed(message.into())),
        location,
    }
}

fn into_transform_error(err: ParseError<'_, Malformed>) -> TransformError {
    let location = to_location(err.location);
    let message = match err.kind {
        ParseErrorKind::Custom(Malformed(message)) => message,
        ParseErrorKind::Basic(kind) => format!("unexpected input ({:?})", kind),
    };
    TransformError::parse(message, location)
}
