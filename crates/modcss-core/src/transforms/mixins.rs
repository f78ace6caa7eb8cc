/*
 * mixins.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Transform that expands or exports mixins.
 */

//! Mixin resolution.
//!
//! A mixin included anywhere in the file is expanded at each `@include`
//! with its arguments bound to its parameters, and the definition is
//! removed. A mixin nobody includes is kept, unexpanded, to be exported as a
//! `@define-mixin` block. An `@include` of a mixin the file does not define
//! is left for the printer to emit as a `@mixin` call.
//!
//! Arguments bind positionally, then by keyword (`$name: value`), then fall
//! back to the parameter default. Defaults may refer to earlier parameters.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::ast::{AtRuleKind, AtRuleNode, MixinParam, Node, Stylesheet};
use crate::collect::SymbolKind;
use crate::error::{Result, TransformError};
use crate::transform::{StylesheetTransform, TransformContext};
use crate::vars::replace_variables;

/// Nesting limit for mixin expansion.
pub const MAX_MIXIN_DEPTH: usize = 32;

/// Transform that expands or exports mixins.
pub struct MixinTransform;

impl MixinTransform {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MixinTransform {
    fn default() -> Self {
        Self::new()
    }
}

impl StylesheetTransform for MixinTransform {
    fn name(&self) -> &str {
        "mixins"
    }

    fn transform(&self, sheet: &mut Stylesheet, ctx: &mut TransformContext<'_>) -> Result<()> {
        let mut mixins = IndexMap::new();
        collect_mixins(&sheet.nodes, &mut mixins);

        let mut expander = Expander {
            mixins: &mixins,
            ctx,
            exporting: Vec::new(),
        };
        let nodes = std::mem::take(&mut sheet.nodes);
        sheet.nodes = expander.rewrite(nodes, 0)?;
        Ok(())
    }
}

struct Mixin {
    params: Vec<MixinParam>,
    body: Vec<Node>,
}

fn collect_mixins(nodes: &[Node], mixins: &mut IndexMap<String, Mixin>) {
    for node in nodes {
        if let Node::AtRule(AtRuleNode {
            kind: AtRuleKind::MixinDefinition { name, params },
            body,
            ..
        }) = node
        {
            mixins.insert(
                name.clone(),
                Mixin {
                    params: params.clone(),
                    body: body.clone().unwrap_or_default(),
                },
            );
        }
        if let Some(children) = node.children() {
            collect_mixins(children, mixins);
        }
    }
}

struct Expander<'a, 'c> {
    mixins: &'a IndexMap<String, Mixin>,
    ctx: &'a mut TransformContext<'c>,
    /// Exported mixins whose bodies are being rewritten. An include of one
    /// of these stays a call.
    exporting: Vec<String>,
}

impl Expander<'_, '_> {
    fn rewrite(&mut self, nodes: Vec<Node>, depth: usize) -> Result<Vec<Node>> {
        let mut out = Vec::with_capacity(nodes.len());

        for node in nodes {
            match node {
                Node::AtRule(AtRuleNode {
                    kind,
                    body,
                    location,
                }) => match kind {
                    AtRuleKind::MixinDefinition { name, params } => {
                        if self.ctx.usage.is_referenced(SymbolKind::Mixin, &name) {
                            tracing::debug!(mixin = %name, "mixin expanded at its @include sites");
                            continue;
                        }
                        self.ctx.exports.mixins.push(name.clone());
                        self.exporting.push(name.clone());
                        let body = body.map(|b| self.rewrite(b, depth)).transpose();
                        self.exporting.pop();

                        let kind = AtRuleKind::MixinDefinition { name, params };
                        out.push(Node::AtRule(AtRuleNode::new(kind, body?).at(location)));
                    }
                    AtRuleKind::Include { name, args } => {
                        let mixins = self.mixins;
                        match mixins.get(&name) {
                            Some(mixin) if !self.exporting.contains(&name) => {
                                let content = body.map(|b| self.rewrite(b, depth)).transpose()?;
                                let expanded =
                                    self.expand(&name, mixin, &args, content.as_deref(), depth + 1)?;
                                out.extend(expanded);
                            }
                            _ => {
                                tracing::debug!(mixin = %name, "passing through mixin call");
                                let body = body.map(|b| self.rewrite(b, depth)).transpose()?;
                                let kind = AtRuleKind::Include { name, args };
                                out.push(Node::AtRule(AtRuleNode::new(kind, body).at(location)));
                            }
                        }
                    }
                    kind => {
                        let body = body.map(|b| self.rewrite(b, depth)).transpose()?;
                        out.push(Node::AtRule(AtRuleNode::new(kind, body).at(location)));
                    }
                },
                Node::Rule(mut rule) => {
                    rule.children = self.rewrite(std::mem::take(&mut rule.children), depth)?;
                    out.push(Node::Rule(rule));
                }
                declaration => out.push(declaration),
            }
        }

        Ok(out)
    }

    fn expand(
        &mut self,
        name: &str,
        mixin: &Mixin,
        args: &[String],
        content: Option<&[Node]>,
        depth: usize,
    ) -> Result<Vec<Node>> {
        if depth > MAX_MIXIN_DEPTH {
            return Err(TransformError::MixinRecursion {
                name: name.to_string(),
            });
        }

        let bindings = bind_arguments(name, &mixin.params, args)?;
        let body = substitute(mixin.body.clone(), &bindings, content);
        self.rewrite(body, depth)
    }
}

/// Bind include arguments to mixin parameters.
fn bind_arguments(
    name: &str,
    params: &[MixinParam],
    args: &[String],
) -> Result<IndexMap<String, String>> {
    let mismatch = || TransformError::MixinArguments {
        name: name.to_string(),
        expected: params.len(),
        found: args.len(),
    };

    let mut positional = Vec::new();
    let mut keyword = HashMap::new();
    for arg in args {
        match keyword_argument(arg) {
            Some((key, value)) => {
                keyword.insert(key, value);
            }
            None => positional.push(arg.as_str()),
        }
    }
    if positional.len() > params.len() {
        return Err(mismatch());
    }

    let mut bindings: IndexMap<String, String> = IndexMap::new();
    for (index, param) in params.iter().enumerate() {
        let value = if let Some(arg) = positional.get(index) {
            arg.to_string()
        } else if let Some(value) = keyword.remove(param.name.as_str()) {
            value
        } else if let Some(default) = &param.default {
            replace_variables(default, |var| bindings.get(var).cloned())
        } else {
            return Err(mismatch());
        };
        bindings.insert(param.name.clone(), value);
    }

    if !keyword.is_empty() {
        return Err(mismatch());
    }
    Ok(bindings)
}

/// `$name: value` as passed to `@include`.
fn keyword_argument(arg: &str) -> Option<(&str, String)> {
    let rest = arg.strip_prefix('$')?;
    let (name, value) = rest.split_once(':')?;
    let name = name.trim();
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    valid.then(|| (name, value.trim().to_string()))
}

/// Copy a mixin body with parameters replaced by their bound values and
/// `@content` replaced by the include's block.
fn substitute(
    nodes: Vec<Node>,
    bindings: &IndexMap<String, String>,
    content: Option<&[Node]>,
) -> Vec<Node> {
    let bind = |text: &str| replace_variables(text, |var| bindings.get(var).cloned());
    let mut out = Vec::with_capacity(nodes.len());

    for node in nodes {
        match node {
            Node::Declaration(mut decl) => {
                decl.value = bind(&decl.value);
                out.push(Node::Declaration(decl));
            }
            Node::Rule(mut rule) => {
                rule.selector = bind(&rule.selector);
                rule.children = substitute(std::mem::take(&mut rule.children), bindings, content);
                out.push(Node::Rule(rule));
            }
            Node::AtRule(AtRuleNode {
                kind: AtRuleKind::Content,
                ..
            }) => {
                if let Some(content) = content {
                    out.extend(content.iter().cloned());
                }
            }
            Node::AtRule(AtRuleNode {
                kind,
                body,
                location,
            }) => {
                let kind = match kind {
                    AtRuleKind::VariableDeclaration { name, value } => {
                        AtRuleKind::VariableDeclaration {
                            name,
                            value: bind(&value),
                        }
                    }
                    AtRuleKind::Include { name, args } => AtRuleKind::Include {
                        name,
                        args: args.iter().map(|arg| bind(arg)).collect(),
                    },
                    AtRuleKind::Media { query } => AtRuleKind::Media {
                        query: bind(&query),
                    },
                    AtRuleKind::Other { name, prelude } => AtRuleKind::Other {
                        name,
                        prelude: bind(&prelude),
                    },
                    other => other,
                };
                let body = body.map(|b| substitute(b, bindings, content));
                out.push(Node::AtRule(AtRuleNode::new(kind, body).at(location)));
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::RuleNode;
    use crate::collect::collect;
    use crate::config::TransformConfig;
    use crate::parser::parse;

    fn run(source: &str) -> Result<(Vec<Node>, Vec<String>)> {
        let mut sheet = parse(source).unwrap();
        let (usage, definitions) = collect(&sheet);
        let config = TransformConfig::default();
        let mut ctx = TransformContext::new(&config, usage, definitions);
        MixinTransform::new().transform(&mut sheet, &mut ctx)?;
        Ok((sheet.nodes, ctx.exports.mixins))
    }

    fn rule(node: &Node) -> &RuleNode {
        match node {
            Node::Rule(rule) => rule,
            other => panic!("expected rule, got {:?}", other),
        }
    }

    fn declarations(rule: &RuleNode) -> Vec<(String, String)> {
        rule.declarations()
            .map(|d| (d.property.clone(), d.value.clone()))
            .collect()
    }

    fn pairs(list: &[(&str, &str)]) -> Vec<(String, String)> {
        list.iter()
            .map(|(p, v)| (p.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_referenced_mixin_is_expanded() {
        let (nodes, exported) = run(
            "@mixin ad-exact($width, $height) {\n  width: $width;\n  height: $height;\n  color: $fe-brary-colour-primary-dark;\n}\n\
             .ad { color: blue; @include ad-exact(125px, 700px); }",
        )
        .unwrap();
        assert_eq!(nodes.len(), 1);
        assert!(exported.is_empty());
        assert_eq!(
            declarations(rule(&nodes[0])),
            pairs(&[
                ("color", "blue"),
                ("width", "125px"),
                ("height", "700px"),
                ("color", "$fe-brary-colour-primary-dark"),
            ])
        );
    }

    #[test]
    fn test_unreferenced_mixin_is_kept_for_export() {
        let (nodes, exported) = run("@mixin ad-exact($width, $height) { width: $width; }").unwrap();
        assert_eq!(exported, vec!["ad-exact"]);
        assert!(matches!(
            &nodes[0],
            Node::AtRule(AtRuleNode { kind: AtRuleKind::MixinDefinition { name, .. }, .. }) if name == "ad-exact"
        ));
    }

    #[test]
    fn test_defaults_and_keywords() {
        let (nodes, _) = run(
            "@mixin box($w, $h: $w, $colour: red) { width: $w; height: $h; color: $colour; }\n\
             .a { @include box(4px, $colour: blue); }",
        )
        .unwrap();
        assert_eq!(
            declarations(rule(&nodes[0])),
            pairs(&[("width", "4px"), ("height", "4px"), ("color", "blue")])
        );
    }

    #[test]
    fn test_content_block_is_placed() {
        let (nodes, _) = run(
            "@mixin on-hover { &:hover { @content; } }\n.a { @include on-hover { color: red; } }",
        )
        .unwrap();
        let a = rule(&nodes[0]);
        let hover = a.nested_rules().next().unwrap();
        assert_eq!(hover.selector, "&:hover");
        assert_eq!(declarations(hover), pairs(&[("color", "red")]));
    }

    #[test]
    fn test_non_local_include_is_kept() {
        let (nodes, _) = run(".a { @include simple-arrow(8px, 'down'); }").unwrap();
        let a = rule(&nodes[0]);
        assert!(matches!(
            &a.children[0],
            Node::AtRule(AtRuleNode { kind: AtRuleKind::Include { name, args }, .. })
                if name == "simple-arrow" && args.len() == 2
        ));
    }

    #[test]
    fn test_too_many_arguments() {
        let err = run("@mixin m($a) { width: $a; }\n.a { @include m(1px, 2px); }").unwrap_err();
        assert_eq!(
            err,
            TransformError::MixinArguments {
                name: "m".to_string(),
                expected: 1,
                found: 2
            }
        );
    }

    #[test]
    fn test_missing_required_argument() {
        let err = run("@mixin m($a, $b) { width: $a; }\n.a { @include m(1px); }").unwrap_err();
        assert!(matches!(err, TransformError::MixinArguments { found: 1, .. }));
    }

    #[test]
    fn test_recursive_mixin_is_an_error() {
        let err = run("@mixin loop($n) { @include loop($n); }\n.a { @include loop(1); }").unwrap_err();
        assert_eq!(
            err,
            TransformError::MixinRecursion {
                name: "loop".to_string()
            }
        );
    }

    #[test]
    fn test_exported_mixin_calling_itself_stays_a_call() {
        let (nodes, exported) = run("@mixin loop($n) { width: $n; @include loop($n); }").unwrap();
        assert_eq!(exported, vec!["loop"]);
        let Node::AtRule(definition) = &nodes[0] else {
            panic!("expected mixin definition");
        };
        let body = definition.body.as_ref().unwrap();
        assert!(matches!(
            &body[1],
            Node::AtRule(AtRuleNode { kind: AtRuleKind::Include { name, .. }, .. }) if name == "loop"
        ));
    }
}
