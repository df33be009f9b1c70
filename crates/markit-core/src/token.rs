//! Flat parse output
//!
//! Scanners emit a balanced stream of open/close/self-contained tokens.
//! Inline-bearing block tokens (kind `inline`) carry their raw text in
//! [`InlineSource`] and receive child tokens once inline scanning ran.

use crate::meta::{Attrs, Meta, MetaValue};
use crate::span::SourceSpan;

/// Nesting delta of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nesting {
    /// Opens a scope (+1)
    Open,
    /// Closes the innermost scope (-1)
    Close,
    /// Self-contained (0)
    SelfClosing,
}

impl Nesting {
    pub fn delta(self) -> i32 {
        match self {
            Nesting::Open => 1,
            Nesting::Close => -1,
            Nesting::SelfClosing => 0,
        }
    }
}

/// Raw inline text plus a map from content offsets back to source offsets
///
/// Each `(content_offset, source_offset)` pair starts a contiguous segment;
/// segments are sorted by content offset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineSource {
    pub text: String,
    pub map: Vec<(usize, usize)>,
}

impl InlineSource {
    pub fn new(text: String, map: Vec<(usize, usize)>) -> Self {
        Self { text, map }
    }

    /// Source offset of a content offset
    pub fn source_offset(&self, offset: usize) -> usize {
        let idx = match self.map.binary_search_by(|(c, _)| c.cmp(&offset)) {
            Ok(i) => i,
            Err(0) => return offset,
            Err(i) => i - 1,
        };
        let (content, source) = self.map[idx];
        source + (offset - content)
    }

    /// Source offset of an exclusive end offset
    pub fn source_end(&self, offset: usize) -> usize {
        if offset == 0 {
            self.source_offset(0)
        } else {
            self.source_offset(offset - 1) + 1
        }
    }

    /// The sub-range `start..end` with its own offset map
    pub fn slice(&self, start: usize, end: usize) -> InlineSource {
        let end = end.min(self.text.len()).max(start);
        let mut map = vec![(0, self.source_offset(start))];
        map.extend(
            self.map
                .iter()
                .filter(|(c, _)| *c > start && *c < end)
                .map(|(c, s)| (c - start, *s)),
        );
        InlineSource {
            text: self.text[start..end].to_string(),
            map,
        }
    }
}

/// A single parse token
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Kind tag, e.g. `heading_open`, `text`, `paragraph_close`
    pub kind: String,
    pub nesting: Nesting,
    /// Block-level token (as opposed to inline)
    pub block: bool,
    /// Skipped when rendering; used for paragraphs in tight lists
    pub hidden: bool,
    /// Present only when position tracking is on
    pub span: Option<SourceSpan>,
    pub attrs: Attrs,
    pub meta: Meta,
    /// Literal content (text, code, raw html)
    pub content: String,
    /// Inline children, only on `inline` tokens and images
    pub children: Vec<Token>,
    /// Raw inline text for `inline` tokens
    pub inline_source: Option<InlineSource>,
}

impl Token {
    pub fn new(kind: &str, nesting: Nesting) -> Self {
        Self {
            kind: kind.to_string(),
            nesting,
            block: false,
            hidden: false,
            span: None,
            attrs: Attrs::new(),
            meta: Meta::new(),
            content: String::new(),
            children: Vec::new(),
            inline_source: None,
        }
    }

    /// A self-contained text token
    pub fn text(content: &str) -> Self {
        let mut token = Self::new("text", Nesting::SelfClosing);
        token.content = content.to_string();
        token
    }

    /// Kind of the node this token opens, closes or stands for
    pub fn node_kind(&self) -> &str {
        let kind = self.kind.as_str();
        match self.nesting {
            Nesting::Open => kind.strip_suffix("_open").unwrap_or(kind),
            Nesting::Close => kind.strip_suffix("_close").unwrap_or(kind),
            Nesting::SelfClosing => kind,
        }
    }

    pub fn with_meta(mut self, key: &str, value: impl Into<MetaValue>) -> Self {
        self.meta.insert(key.to_string(), value.into());
        self
    }

    pub fn set_meta(&mut self, key: &str, value: impl Into<MetaValue>) {
        self.meta.insert(key.to_string(), value.into());
    }

    pub fn set_attr(&mut self, key: &str, value: impl Into<String>) {
        self.attrs.insert(key.to_string(), value.into());
    }

    /// Append to an attribute, space separated (used for `class`)
    pub fn join_attr(&mut self, key: &str, value: &str) {
        match self.attrs.get_mut(key) {
            Some(existing) if !existing.is_empty() => {
                existing.push(' ');
                existing.push_str(value);
            }
            _ => {
                self.attrs.insert(key.to_string(), value.to_string());
            }
        }
    }
}

/// Sum of nesting deltas; zero for a well-formed stream
pub fn nesting_balance(tokens: &[Token]) -> i32 {
    tokens.iter().map(|t| t.nesting.delta()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_kind_strips_suffix() {
        assert_eq!(Token::new("heading_open", Nesting::Open).node_kind(), "heading");
        assert_eq!(Token::new("heading_close", Nesting::Close).node_kind(), "heading");
        assert_eq!(Token::new("hr", Nesting::SelfClosing).node_kind(), "hr");
    }

    #[test]
    fn test_join_attr() {
        let mut token = Token::new("list_item_open", Nesting::Open);
        token.join_attr("class", "a");
        token.join_attr("class", "b");
        assert_eq!(token.attrs.get("class").map(String::as_str), Some("a b"));
    }

    #[test]
    fn test_inline_source_offsets() {
        // "a\nb" built from "  a\n  b"
        let source = InlineSource::new("a\nb".into(), vec![(0, 2), (2, 6)]);
        assert_eq!(source.source_offset(0), 2);
        assert_eq!(source.source_offset(1), 3);
        assert_eq!(source.source_offset(2), 6);
        assert_eq!(source.source_offset(3), 7);
        assert_eq!(source.source_end(1), 3);
    }

    #[test]
    fn test_inline_source_slice() {
        let source = InlineSource::new("ab\ncd".into(), vec![(0, 10), (3, 20)]);
        let sub = source.slice(1, 5);
        assert_eq!(sub.text, "b\ncd");
        assert_eq!(sub.source_offset(0), 11);
        assert_eq!(sub.source_offset(2), 20);
    }

    #[test]
    fn test_nesting_balance() {
        let tokens = vec![
            Token::new("paragraph_open", Nesting::Open),
            Token::text("x"),
            Token::new("paragraph_close", Nesting::Close),
        ];
        assert_eq!(nesting_balance(&tokens), 0);
    }
}
