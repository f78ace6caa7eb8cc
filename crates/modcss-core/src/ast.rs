/*
 * ast.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Rule tree produced by the stylesheet parser.
 */

//! Rule tree for SCSS-like sources.
//!
//! The tree keeps the authoring structure intact: rules own their
//! declarations and nested rules in source order, and SCSS directives
//! (`@mixin`, `@include`, `@extend`, `$variables`, placeholders) are
//! represented as [`AtRuleNode`]s with a typed [`AtRuleKind`].
//!
//! Nodes do not point back at their parents. Stages that need the enclosing
//! selector chain (the flattener, the variable resolver) carry it down the
//! recursion instead.

use std::fmt;

use serde::Serialize;

/// 1-based position in the original source text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A parsed stylesheet: the ordered top-level nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stylesheet {
    pub nodes: Vec<Node>,
}

impl Stylesheet {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// A single entry in a block.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Declaration(Declaration),
    Rule(RuleNode),
    AtRule(AtRuleNode),
}

impl Node {
    pub fn location(&self) -> SourceLocation {
        match self {
            Node::Declaration(decl) => decl.location,
            Node::Rule(rule) => rule.location,
            Node::AtRule(at_rule) => at_rule.location,
        }
    }

    /// The nested nodes of this node, if it has a block.
    pub fn children(&self) -> Option<&[Node]> {
        match self {
            Node::Declaration(_) => None,
            Node::Rule(rule) => Some(&rule.children),
            Node::AtRule(at_rule) => at_rule.body.as_deref(),
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Declaration(_) => None,
            Node::Rule(rule) => Some(&mut rule.children),
            Node::AtRule(at_rule) => at_rule.body.as_mut(),
        }
    }
}

/// `property: value`
///
/// The value is kept as text. Variable references inside it are resolved by
/// substitution, never by evaluating an expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
    pub location: SourceLocation,
}

impl Declaration {
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
            location: SourceLocation::default(),
        }
    }

    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = location;
        self
    }
}

/// A style rule with a selector and a block.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleNode {
    /// Selector text as written (may contain `&`).
    pub selector: String,
    /// Declarations, nested rules and at-rules in source order.
    pub children: Vec<Node>,
    pub location: SourceLocation,
}

impl RuleNode {
    pub fn new(selector: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            selector: selector.into(),
            children,
            location: SourceLocation::default(),
        }
    }

    /// The rule's own declarations, in order.
    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.children.iter().filter_map(|node| match node {
            Node::Declaration(decl) => Some(decl),
            _ => None,
        })
    }

    /// Rules nested directly inside this rule, in order.
    pub fn nested_rules(&self) -> impl Iterator<Item = &RuleNode> {
        self.children.iter().filter_map(|node| match node {
            Node::Rule(rule) => Some(rule),
            _ => None,
        })
    }
}

/// A mixin parameter: `$name` or `$name: default`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MixinParam {
    /// Name without the leading `$`.
    pub name: String,
    pub default: Option<String>,
}

impl fmt::Display for MixinParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.default {
            Some(default) => write!(f, "${}: {}", self.name, default),
            None => write!(f, "${}", self.name),
        }
    }
}

/// The directive an [`AtRuleNode`] represents.
#[derive(Debug, Clone, PartialEq)]
pub enum AtRuleKind {
    /// Native `@media <query>`.
    Media { query: String },
    /// `@include media(<conditions>)`.
    MediaMacro { conditions: Vec<String> },
    /// `@include name(<args>)`.
    Include { name: String, args: Vec<String> },
    /// `@extend %name`.
    Extend { placeholder: String },
    /// `@mixin name(<params>) { ... }`.
    MixinDefinition {
        name: String,
        params: Vec<MixinParam>,
    },
    /// `%name { ... }`.
    PlaceholderDefinition { name: String },
    /// `$name: value`.
    VariableDeclaration { name: String, value: String },
    /// `@content` inside a mixin body.
    Content,
    /// Any other at-rule (`@font-face`, `@supports`, `@import`, ...), kept as written.
    Other { name: String, prelude: String },
}

/// An at-rule or SCSS directive, with its block if it has one.
#[derive(Debug, Clone, PartialEq)]
pub struct AtRuleNode {
    pub kind: AtRuleKind,
    pub body: Option<Vec<Node>>,
    pub location: SourceLocation,
}

impl AtRuleNode {
    pub fn new(kind: AtRuleKind, body: Option<Vec<Node>>) -> Self {
        Self {
            kind,
            body,
            location: SourceLocation::default(),
        }
    }

    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = location;
        self
    }
}
