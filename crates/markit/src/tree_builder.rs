//! Token stream to [`Tree`]
//!
//! One pass with an explicit stack. A node is allocated when its scope
//! closes, so its span can cover both the open and the close token.
//! `inline` tokens and hidden paragraphs produce no node; what they
//! contain is attached to the enclosing node.

use markit_core::{Nesting, NodeData, NodeId, SourceSpan, Token, Tree};
use tracing::trace;

use crate::inline::join_spans;

struct Frame {
    /// `None` for a hidden scope
    data: Option<NodeData>,
    kind: String,
    children: Vec<NodeId>,
}

struct Builder {
    tree: Tree,
    stack: Vec<Frame>,
}

fn node_data(token: &Token) -> NodeData {
    let mut data = NodeData::new(token.node_kind());
    data.attrs = token.attrs.clone();
    data.meta = token.meta.clone();
    if !token.content.is_empty() {
        data.meta
            .insert("content".to_string(), token.content.as_str().into());
    }
    data.span = token.span;
    data
}

impl Builder {
    fn top(&mut self) -> &mut Frame {
        // the root frame is never popped while tokens remain
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn attach(&mut self, data: NodeData, children: Vec<NodeId>) -> NodeId {
        let id = self.tree.create(data);
        if let Err(err) = self.tree.set_children(id, children) {
            panic!("tree builder produced an invalid child list: {err}");
        }
        id
    }

    fn pop(&mut self, kind: &str) -> Frame {
        if self.stack.len() < 2 {
            panic!("closing `{kind}` without a matching open token");
        }
        let Some(frame) = self.stack.pop() else {
            unreachable!()
        };
        if frame.kind != kind {
            panic!("closing `{kind}` does not match open `{}`", frame.kind);
        }
        frame
    }

    fn finish(&mut self, frame: Frame, close_span: Option<SourceSpan>) {
        match frame.data {
            Some(mut data) => {
                if let (Some(open), Some(close)) = (data.span, close_span) {
                    data.span = join_spans(Some(open), Some(close));
                }
                let id = self.attach(data, frame.children);
                self.top().children.push(id);
            }
            None => self.top().children.extend(frame.children),
        }
    }

    fn push_all(&mut self, tokens: &[Token]) {
        for token in tokens {
            if token.kind == "inline" {
                self.push_all(&token.children);
                continue;
            }
            match token.nesting {
                Nesting::Open => self.stack.push(Frame {
                    data: (!token.hidden).then(|| node_data(token)),
                    kind: token.node_kind().to_string(),
                    children: Vec::new(),
                }),
                Nesting::Close => {
                    let frame = self.pop(token.node_kind());
                    self.finish(frame, token.span);
                }
                Nesting::SelfClosing => {
                    if token.hidden {
                        continue;
                    }
                    self.stack.push(Frame {
                        data: Some(node_data(token)),
                        kind: token.kind.clone(),
                        children: Vec::new(),
                    });
                    self.push_all(&token.children);
                    let frame = self.pop(&token.kind);
                    self.finish(frame, None);
                }
            }
        }
    }
}

/// Build a tree from a balanced token stream
///
/// # Panics
///
/// On an orphan close token, an unclosed scope or a close token whose kind
/// differs from its open token. Scanners never produce such streams.
pub fn build_tree(tokens: &[Token], root_span: Option<SourceSpan>) -> Tree {
    let mut builder = Builder {
        tree: Tree::new(root_span),
        stack: vec![Frame {
            data: None,
            kind: "root".to_string(),
            children: Vec::new(),
        }],
    };
    builder.push_all(tokens);

    if builder.stack.len() > 1 {
        let open: Vec<&str> = builder.stack[1..].iter().map(|f| f.kind.as_str()).collect();
        panic!("unclosed scopes at end of token stream: {}", open.join(", "));
    }
    let root = builder.stack.pop().map(|f| f.children).unwrap_or_default();
    let mut tree = builder.tree;
    let root_id = tree.root();
    if let Err(err) = tree.set_children(root_id, root) {
        panic!("tree builder produced an invalid child list: {err}");
    }
    trace!(tokens = tokens.len(), nodes = tree.len(), "built tree");
    tree
}

#[cfg(test)]
mod tests {
    use markit_core::{meta_str, LineIndex};

    use super::*;

    fn inline(children: Vec<Token>) -> Token {
        let mut token = Token::new("inline", Nesting::SelfClosing);
        token.children = children;
        token
    }

    fn kinds(tree: &Tree) -> Vec<&str> {
        tree.walk(tree.root()).map(|id| tree.kind(id)).collect()
    }

    #[test]
    fn test_inline_spliced_into_block() {
        let tokens = vec![
            Token::new("paragraph_open", Nesting::Open),
            inline(vec![
                Token::text("a"),
                Token::new("em_open", Nesting::Open),
                Token::text("b"),
                Token::new("em_close", Nesting::Close),
            ]),
            Token::new("paragraph_close", Nesting::Close),
        ];
        let tree = build_tree(&tokens, None);
        assert_eq!(kinds(&tree), vec!["root", "paragraph", "text", "em", "text"]);
        let paragraph = tree.children(tree.root())[0];
        let text = tree.children(paragraph)[0];
        assert_eq!(meta_str(tree.meta(text), "content"), "a");
        assert_eq!(tree.parent(paragraph), Some(tree.root()));
    }

    #[test]
    fn test_hidden_paragraph_spliced() {
        let mut open = Token::new("paragraph_open", Nesting::Open);
        open.hidden = true;
        let mut close = Token::new("paragraph_close", Nesting::Close);
        close.hidden = true;
        let tokens = vec![
            Token::new("list_item_open", Nesting::Open),
            open,
            inline(vec![Token::text("x")]),
            close,
            Token::new("list_item_close", Nesting::Close),
        ];
        let tree = build_tree(&tokens, None);
        assert_eq!(kinds(&tree), vec!["root", "list_item", "text"]);
    }

    #[test]
    fn test_self_closing_children_become_nodes() {
        let mut code = Token::new("code_inline", Nesting::SelfClosing);
        code.set_meta("marker", "`");
        code.children.push(Token::text("x"));
        let tree = build_tree(&[inline(vec![code])], None);
        assert_eq!(kinds(&tree), vec!["root", "code_inline", "text"]);
    }

    #[test]
    fn test_span_joins_open_and_close() {
        let index = LineIndex::new("**b**");
        let mut open = Token::new("strong_open", Nesting::Open);
        open.span = Some(index.span(0, 2));
        let mut close = Token::new("strong_close", Nesting::Close);
        close.span = Some(index.span(3, 5));
        let tree = build_tree(&[inline(vec![open, Token::text("b"), close])], Some(index.span(0, 5)));
        let strong = tree.children(tree.root())[0];
        assert_eq!(tree.span(strong).map(|s| s.to_string()).as_deref(), Some("0:5"));
        assert_eq!(tree.span(tree.root()).map(|s| s.to_string()).as_deref(), Some("0:5"));
    }

    #[test]
    fn test_attrs_and_meta_from_open_token() {
        let mut open = Token::new("heading_open", Nesting::Open);
        open.set_meta("level", 2usize);
        open.set_attr("id", "intro");
        let mut close = Token::new("heading_close", Nesting::Close);
        close.set_meta("level", 9usize);
        let tree = build_tree(&[open, close], None);
        let heading = tree.children(tree.root())[0];
        assert_eq!(tree.attrs(heading).get("id").map(String::as_str), Some("intro"));
        assert_eq!(markit_core::meta_int(tree.meta(heading), "level"), Some(2));
    }

    #[test]
    #[should_panic(expected = "closing `em` does not match open `strong`")]
    fn test_kind_mismatch_panics() {
        let tokens = vec![
            Token::new("strong_open", Nesting::Open),
            Token::new("em_close", Nesting::Close),
        ];
        build_tree(&tokens, None);
    }

    #[test]
    #[should_panic(expected = "without a matching open token")]
    fn test_orphan_close_panics() {
        build_tree(&[Token::new("paragraph_close", Nesting::Close)], None);
    }

    #[test]
    #[should_panic(expected = "unclosed scopes")]
    fn test_unclosed_scope_panics() {
        build_tree(&[Token::new("blockquote_open", Nesting::Open)], None);
    }
}
