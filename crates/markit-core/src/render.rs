//! HTML rendering
//!
//! One [`RenderRules`] table drives both the token-stream renderer and the
//! tree renderer. Rules never look behind or ahead; block spacing is done
//! with [`HtmlWriter::cr`], which depends only on the output so far, so the
//! two walks produce the same bytes.

use std::collections::HashMap;

use crate::escape::{escape_html, escape_text};
use crate::meta::{meta_bool, meta_int, meta_str, Attrs, Meta};
use crate::options::Options;
use crate::span::SourceSpan;
use crate::token::{Nesting, Token};
use crate::tree::{NodeId, Tree};

/// Output buffer with HTML helpers
pub struct HtmlWriter<'a> {
    out: String,
    options: &'a Options,
}

impl<'a> HtmlWriter<'a> {
    pub fn new(options: &'a Options) -> Self {
        Self {
            out: String::with_capacity(1024),
            options,
        }
    }

    pub fn options(&self) -> &Options {
        self.options
    }

    /// Start a new line unless at the start of output or of a line
    pub fn cr(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
    }

    /// Escaped text
    pub fn text(&mut self, s: &str) {
        self.out.push_str(&escape_text(s));
    }

    /// Unescaped output
    pub fn raw(&mut self, s: &str) {
        self.out.push_str(s);
    }

    pub fn open(&mut self, tag: &str, attrs: &[(String, String)]) {
        self.out.push('<');
        self.out.push_str(tag);
        self.write_attrs(attrs);
        self.out.push('>');
    }

    pub fn close(&mut self, tag: &str) {
        self.out.push_str("</");
        self.out.push_str(tag);
        self.out.push('>');
    }

    /// A void element, `<br />` in XHTML mode and `<br>` otherwise
    pub fn void(&mut self, tag: &str, attrs: &[(String, String)]) {
        self.out.push('<');
        self.out.push_str(tag);
        self.write_attrs(attrs);
        if self.options.xhtml_out {
            self.out.push_str(" />");
        } else {
            self.out.push('>');
        }
    }

    pub fn finish(self) -> String {
        self.out
    }

    fn write_attrs(&mut self, attrs: &[(String, String)]) {
        for (key, value) in attrs {
            self.out.push(' ');
            self.out.push_str(key);
            self.out.push_str("=\"");
            self.out.push_str(&escape_html(value));
            self.out.push('"');
        }
    }
}

/// Read-only view of a token or tree node handed to render rules
pub struct RenderNode<'a> {
    pub kind: &'a str,
    pub attrs: &'a Attrs,
    pub meta: &'a Meta,
    pub content: &'a str,
    pub span: Option<SourceSpan>,
    hook_attrs: Vec<(String, String)>,
}

impl<'a> RenderNode<'a> {
    pub fn new(kind: &'a str, attrs: &'a Attrs, meta: &'a Meta, content: &'a str) -> Self {
        Self {
            kind,
            attrs,
            meta,
            content,
            span: None,
            hook_attrs: Vec::new(),
        }
    }

    pub fn meta_str(&self, key: &str) -> &str {
        meta_str(self.meta, key)
    }

    pub fn meta_int(&self, key: &str) -> Option<i64> {
        meta_int(self.meta, key)
    }

    pub fn meta_bool(&self, key: &str) -> bool {
        meta_bool(self.meta, key)
    }

    /// Rule attributes first, then the node's own, then hook attributes.
    /// Repeated `class` values are joined, other repeated keys overwrite.
    pub fn attrs_with(&self, leading: &[(&str, String)]) -> Vec<(String, String)> {
        let mut merged: Vec<(String, String)> = leading
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        let rest = self
            .attrs
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .chain(self.hook_attrs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        for (key, value) in rest {
            match merged.iter_mut().find(|(k, _)| k == key) {
                Some((_, existing)) if key == "class" => {
                    existing.push(' ');
                    existing.push_str(value);
                }
                Some((_, existing)) => *existing = value.to_string(),
                None => merged.push((key.to_string(), value.to_string())),
            }
        }
        merged
    }

    /// Node attributes plus hook attributes
    pub fn all_attrs(&self) -> Vec<(String, String)> {
        self.attrs_with(&[])
    }
}

pub type RenderFn = fn(&RenderNode, &mut HtmlWriter);

/// Receives the plain text of the node's descendants
pub type FlattenFn = fn(&RenderNode, &str, &mut HtmlWriter);

/// Extra attribute computed at render time, e.g. `data-sourcepos`
pub type AttrHook = fn(&RenderNode) -> Option<(String, String)>;

/// How a node kind renders
#[derive(Clone, Copy)]
pub enum RenderRule {
    /// Output around the children
    Container { open: RenderFn, close: RenderFn },
    /// Self-contained output; children are ignored
    Leaf(RenderFn),
    /// Self-contained output built from the children's plain text
    Flatten(FlattenFn),
}

/// Render rule per node kind
#[derive(Clone)]
pub struct RenderRules {
    rules: HashMap<String, RenderRule>,
}

impl RenderRules {
    /// An empty table; every kind renders its children transparently
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    pub fn set(&mut self, kind: &str, rule: RenderRule) -> &mut Self {
        self.rules.insert(kind.to_string(), rule);
        self
    }

    pub fn get(&self, kind: &str) -> Option<&RenderRule> {
        self.rules.get(kind)
    }
}

impl Default for RenderRules {
    /// Rules for every built-in kind
    fn default() -> Self {
        crate::html_rules::default_rules()
    }
}

/// Renders token streams and trees with one rule table
pub struct Renderer<'a> {
    rules: &'a RenderRules,
    hooks: &'a [AttrHook],
    options: &'a Options,
}

impl<'a> Renderer<'a> {
    pub fn new(rules: &'a RenderRules, options: &'a Options) -> Self {
        Self {
            rules,
            hooks: &[],
            options,
        }
    }

    pub fn with_hooks(mut self, hooks: &'a [AttrHook]) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn render_tree(&self, tree: &Tree) -> String {
        let mut w = HtmlWriter::new(self.options);
        self.render_node(tree, tree.root(), &mut w);
        w.cr();
        w.finish()
    }

    pub fn render_tokens(&self, tokens: &[Token]) -> String {
        let mut w = HtmlWriter::new(self.options);
        let mut open = Vec::new();
        self.render_token_list(tokens, &mut open, &mut w);
        w.cr();
        w.finish()
    }

    fn view<'n>(
        &self,
        kind: &'n str,
        attrs: &'n Attrs,
        meta: &'n Meta,
        content: &'n str,
        span: Option<SourceSpan>,
    ) -> RenderNode<'n> {
        let mut node = RenderNode::new(kind, attrs, meta, content);
        node.span = span;
        node.hook_attrs = self.hooks.iter().filter_map(|hook| hook(&node)).collect();
        node
    }

    fn node_view<'t>(&self, tree: &'t Tree, id: NodeId) -> RenderNode<'t> {
        let meta = tree.meta(id);
        self.view(
            tree.kind(id),
            tree.attrs(id),
            meta,
            meta_str(meta, "content"),
            tree.span(id),
        )
    }

    fn render_node(&self, tree: &Tree, id: NodeId, w: &mut HtmlWriter) {
        // explicit stack; emphasis can nest far deeper than the call stack allows
        let mut stack = vec![Step::Enter(id)];
        while let Some(step) = stack.pop() {
            let id = match step {
                Step::Enter(id) => id,
                Step::Exit(id) => {
                    let node = self.node_view(tree, id);
                    if let Some(RenderRule::Container { close, .. }) = self.rules.get(node.kind) {
                        close(&node, w);
                    }
                    continue;
                }
            };
            let node = self.node_view(tree, id);
            match self.rules.get(node.kind) {
                Some(RenderRule::Container { open, .. }) => {
                    open(&node, w);
                    stack.push(Step::Exit(id));
                }
                Some(RenderRule::Leaf(leaf)) => {
                    leaf(&node, w);
                    continue;
                }
                Some(RenderRule::Flatten(flatten)) => {
                    let mut text = String::new();
                    for child in tree.children(id) {
                        for descendant in tree.walk(*child) {
                            let content = meta_str(tree.meta(descendant), "content");
                            push_plain_text(tree.kind(descendant), content, &mut text);
                        }
                    }
                    flatten(&node, &text, w);
                    continue;
                }
                None => {}
            }
            stack.extend(tree.children(id).iter().rev().map(|child| Step::Enter(*child)));
        }
    }

    fn render_token_list<'t>(
        &self,
        tokens: &'t [Token],
        open: &mut Vec<&'t Token>,
        w: &mut HtmlWriter,
    ) {
        let closes = if self.hooks.is_empty() {
            Vec::new()
        } else {
            close_indices(tokens)
        };
        for (i, token) in tokens.iter().enumerate() {
            if token.hidden {
                continue;
            }
            if token.kind == "inline" {
                self.render_token_list(&token.children, open, w);
                continue;
            }
            match token.nesting {
                Nesting::Open => {
                    // hooks see the span of the whole scope, as tree nodes do
                    let span = match closes.get(i) {
                        Some(&close) => scope_span(token, tokens.get(close)),
                        None => token.span,
                    };
                    let node = self.view(
                        token.node_kind(),
                        &token.attrs,
                        &token.meta,
                        &token.content,
                        span,
                    );
                    match self.rules.get(node.kind) {
                        Some(RenderRule::Container { open: enter, .. }) => enter(&node, w),
                        Some(RenderRule::Leaf(leaf)) => leaf(&node, w),
                        Some(RenderRule::Flatten(flatten)) => flatten(&node, "", w),
                        None => {}
                    }
                    open.push(token);
                }
                Nesting::Close => {
                    let Some(opener) = open.pop() else {
                        continue;
                    };
                    let node = self.token_view(opener);
                    if let Some(RenderRule::Container { close, .. }) = self.rules.get(node.kind) {
                        close(&node, w);
                    }
                }
                Nesting::SelfClosing => {
                    let node = self.token_view(token);
                    match self.rules.get(node.kind) {
                        Some(RenderRule::Container { open: enter, close }) => {
                            enter(&node, w);
                            self.render_token_list(&token.children, open, w);
                            close(&node, w);
                        }
                        Some(RenderRule::Leaf(leaf)) => leaf(&node, w),
                        Some(RenderRule::Flatten(flatten)) => {
                            let mut text = String::new();
                            plain_text_of_tokens(&token.children, &mut text);
                            flatten(&node, &text, w);
                        }
                        None => self.render_token_list(&token.children, open, w),
                    }
                }
            }
        }
    }

    fn token_view<'t>(&self, token: &'t Token) -> RenderNode<'t> {
        self.view(
            token.node_kind(),
            &token.attrs,
            &token.meta,
            &token.content,
            token.span,
        )
    }
}

enum Step {
    Enter(NodeId),
    Exit(NodeId),
}

/// Index of the matching close token for every open token; other
/// positions hold `usize::MAX`
fn close_indices(tokens: &[Token]) -> Vec<usize> {
    let mut closes = vec![usize::MAX; tokens.len()];
    let mut open = Vec::new();
    for (i, token) in tokens.iter().enumerate() {
        match token.nesting {
            Nesting::Open => open.push(i),
            Nesting::Close => {
                if let Some(start) = open.pop() {
                    closes[start] = i;
                }
            }
            Nesting::SelfClosing => {}
        }
    }
    closes
}

/// Span from an open token through its close token
fn scope_span(open: &Token, close: Option<&Token>) -> Option<SourceSpan> {
    let start = open.span?;
    Some(match close.and_then(|token| token.span) {
        Some(end) => SourceSpan {
            start: start.start,
            end: end.end,
        },
        None => start,
    })
}

fn push_plain_text(kind: &str, content: &str, out: &mut String) {
    match kind {
        "softbreak" | "hardbreak" => out.push('\n'),
        _ => out.push_str(content),
    }
}

fn plain_text_of_tokens(tokens: &[Token], out: &mut String) {
    for token in tokens {
        push_plain_text(token.node_kind(), &token.content, out);
        plain_text_of_tokens(&token.children, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::NodeData;

    #[test]
    fn test_cr_only_between_lines() {
        let options = Options::default();
        let mut w = HtmlWriter::new(&options);
        w.cr();
        w.raw("<p>");
        w.cr();
        w.cr();
        assert_eq!(w.finish(), "<p>\n");
    }

    #[test]
    fn test_void_respects_xhtml() {
        let mut options = Options::default();
        let mut w = HtmlWriter::new(&options);
        w.void("br", &[]);
        assert_eq!(w.finish(), "<br />");
        options.xhtml_out = false;
        let mut w = HtmlWriter::new(&options);
        w.void("br", &[]);
        assert_eq!(w.finish(), "<br>");
    }

    #[test]
    fn test_attrs_with_joins_class() {
        let mut attrs = Attrs::new();
        attrs.insert("class".into(), "b".into());
        attrs.insert("id".into(), "x".into());
        let meta = Meta::new();
        let node = RenderNode::new("p", &attrs, &meta, "");
        assert_eq!(
            node.attrs_with(&[("class", "a".to_string())]),
            vec![
                ("class".to_string(), "a b".to_string()),
                ("id".to_string(), "x".to_string())
            ]
        );
    }

    #[test]
    fn test_token_and_tree_paths_agree() {
        let options = Options::default();
        let rules = RenderRules::default();
        let renderer = Renderer::new(&rules, &options);

        let mut inline = Token::new("inline", Nesting::SelfClosing);
        inline.children.push(Token::text("a < b"));
        let tokens = vec![
            Token::new("paragraph_open", Nesting::Open),
            inline,
            Token::new("paragraph_close", Nesting::Close),
        ];

        let mut tree = Tree::new(None);
        let p = tree.create(NodeData::new("paragraph"));
        let mut text = NodeData::new("text");
        text.meta.insert("content".into(), "a < b".into());
        let text = tree.create(text);
        tree.append(p, text).unwrap();
        tree.append(tree.root(), p).unwrap();

        assert_eq!(renderer.render_tokens(&tokens), "<p>a &lt; b</p>\n");
        assert_eq!(renderer.render_tree(&tree), "<p>a &lt; b</p>\n");
    }

    #[test]
    fn test_unknown_kind_is_transparent() {
        let options = Options::default();
        let rules = RenderRules::empty();
        let renderer = Renderer::new(&rules, &options);
        let mut tree = Tree::new(None);
        let wrapper = tree.create(NodeData::new("mystery"));
        tree.append(tree.root(), wrapper).unwrap();
        assert_eq!(renderer.render_tree(&tree), "");
    }

    #[test]
    fn test_hooks_add_attrs() {
        fn mark(_: &RenderNode) -> Option<(String, String)> {
            Some(("data-x".into(), "1".into()))
        }
        let options = Options::default();
        let rules = RenderRules::default();
        let hooks: [AttrHook; 1] = [mark];
        let renderer = Renderer::new(&rules, &options).with_hooks(&hooks);
        let tokens = vec![Token::new("hr", Nesting::SelfClosing)];
        assert_eq!(renderer.render_tokens(&tokens), "<hr data-x=\"1\" />\n");
    }

    #[test]
    fn test_deep_nesting_renders_on_both_paths() {
        let depth = 50_000;
        let options = Options::default();
        let rules = RenderRules::default();
        let renderer = Renderer::new(&rules, &options);

        let mut children = Vec::new();
        for _ in 0..depth {
            children.push(Token::new("em_open", Nesting::Open));
        }
        children.push(Token::text("a"));
        for _ in 0..depth {
            children.push(Token::new("em_close", Nesting::Close));
        }
        let mut inline = Token::new("inline", Nesting::SelfClosing);
        inline.children = children;

        let mut tree = Tree::new(None);
        let ems: Vec<_> = (0..depth).map(|_| tree.create(NodeData::new("em"))).collect();
        let mut text = NodeData::new("text");
        text.meta.insert("content".into(), "a".into());
        let text = tree.create(text);
        tree.set_children(ems[depth - 1], vec![text]).unwrap();
        for pair in ems.windows(2).rev() {
            tree.set_children(pair[0], vec![pair[1]]).unwrap();
        }
        tree.set_children(tree.root(), vec![ems[0]]).unwrap();

        let expected = format!("{}a{}\n", "<em>".repeat(depth), "</em>".repeat(depth));
        assert_eq!(renderer.render_tokens(&[inline]), expected);
        assert_eq!(renderer.render_tree(&tree), expected);
    }
}
