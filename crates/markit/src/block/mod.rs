//! Block-level scanning
//!
//! The source is split into lines once; every line records where its
//! content starts (`b_marks` + `t_shift`), where it ends (`e_marks`) and its
//! visual indent with tabs expanded (`s_count`). Container rules (lists,
//! blockquotes, footnotes) patch these arrays in place, call
//! [`BlockState::tokenize`] on the inner lines and restore them afterwards.

pub mod blockquote;
pub mod code;
pub mod fence;
pub mod heading;
pub mod hr;
pub mod html_block;
pub mod lheading;
pub mod list;
pub mod paragraph;
pub mod reference;
pub mod table;

use markit_core::{InlineSource, LineIndex, Nesting, Options, SourceSpan, Token};
use tracing::trace;

use crate::env::Env;
use crate::rules::Ruler;
use crate::utilities::is_space;

/// `fn(state, start_line, end_line, silent) -> matched`
///
/// In silent mode a rule only reports whether it would match and leaves the
/// state untouched.
pub type BlockRuleFn = fn(&mut BlockState, usize, usize, bool) -> bool;

/// Container the scanner is currently inside
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentType {
    Root,
    Blockquote,
    List,
    Paragraph,
    Reference,
    Footnote,
}

/// Terminator list consulted by a rule that may be interrupted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminators {
    Paragraph,
    Reference,
    Blockquote,
    List,
}

/// Enabled block rules of one parse, in chain order
#[derive(Clone, Default)]
pub struct BlockRules {
    all: Vec<BlockRuleFn>,
    paragraph: Vec<BlockRuleFn>,
    reference: Vec<BlockRuleFn>,
    blockquote: Vec<BlockRuleFn>,
    list: Vec<BlockRuleFn>,
}

impl BlockRules {
    pub fn new(ruler: &Ruler<BlockRuleFn>) -> Self {
        Self {
            all: ruler.active(),
            paragraph: ruler.active_for("paragraph"),
            reference: ruler.active_for("reference"),
            blockquote: ruler.active_for("blockquote"),
            list: ruler.active_for("list"),
        }
    }

    fn terminators(&self, which: Terminators) -> &[BlockRuleFn] {
        match which {
            Terminators::Paragraph => &self.paragraph,
            Terminators::Reference => &self.reference,
            Terminators::Blockquote => &self.blockquote,
            Terminators::List => &self.list,
        }
    }
}

pub struct BlockState<'a> {
    pub src: &'a str,
    pub env: &'a mut Env,
    pub options: &'a Options,
    rules: &'a BlockRules,
    line_index: &'a LineIndex,

    pub tokens: Vec<Token>,

    /// Line start offsets
    pub b_marks: Vec<usize>,
    /// Line end offsets, before the `\n`
    pub e_marks: Vec<usize>,
    /// Bytes of leading whitespace
    pub t_shift: Vec<usize>,
    /// Visual indent with tabs expanded
    pub s_count: Vec<i32>,
    /// Visual column where the line content starts inside nested containers
    pub bs_count: Vec<i32>,

    /// Required indent of the current container
    pub blk_indent: i32,
    pub line: usize,
    /// Index past the last real line; `b_marks[line_max]` is a sentinel
    pub line_max: usize,
    /// Loose lists set this to false
    pub tight: bool,
    /// Indent of the current list item, -1 outside lists
    pub list_indent: i32,
    pub parent_type: ParentType,
    /// Open token depth
    pub level: usize,
}

impl<'a> BlockState<'a> {
    pub fn new(
        src: &'a str,
        options: &'a Options,
        rules: &'a BlockRules,
        env: &'a mut Env,
        line_index: &'a LineIndex,
    ) -> Self {
        let mut state = Self {
            src,
            env,
            options,
            rules,
            line_index,
            tokens: Vec::new(),
            b_marks: Vec::new(),
            e_marks: Vec::new(),
            t_shift: Vec::new(),
            s_count: Vec::new(),
            bs_count: Vec::new(),
            blk_indent: 0,
            line: 0,
            line_max: 0,
            tight: false,
            list_indent: -1,
            parent_type: ParentType::Root,
            level: 0,
        };

        let bytes = src.as_bytes();
        let len = bytes.len();
        let mut start = 0;
        let mut indent = 0;
        let mut offset = 0;
        let mut indent_found = false;
        let mut pos = 0;
        while pos < len {
            let ch = bytes[pos];
            if !indent_found {
                if is_space(ch) {
                    indent += 1;
                    if ch == b'\t' {
                        offset += 4 - offset % 4;
                    } else {
                        offset += 1;
                    }
                    pos += 1;
                    continue;
                }
                indent_found = true;
            }
            if ch == b'\n' || pos == len - 1 {
                let end = if ch == b'\n' { pos } else { pos + 1 };
                state.b_marks.push(start);
                state.e_marks.push(end);
                state.t_shift.push(indent);
                state.s_count.push(offset);
                state.bs_count.push(0);
                indent_found = false;
                indent = 0;
                offset = 0;
                start = end + 1;
                pos = end;
            }
            pos += 1;
        }

        // sentinel line
        state.b_marks.push(len);
        state.e_marks.push(len);
        state.t_shift.push(0);
        state.s_count.push(0);
        state.bs_count.push(0);
        state.line_max = state.b_marks.len() - 1;
        state
    }

    /// Byte at `pos`, 0 past the end
    pub fn byte(&self, pos: usize) -> u8 {
        self.src.as_bytes().get(pos).copied().unwrap_or(0)
    }

    pub fn push(&mut self, kind: &str, nesting: Nesting) -> &mut Token {
        let mut token = Token::new(kind, nesting);
        token.block = true;
        match nesting {
            Nesting::Open => self.level += 1,
            Nesting::Close => self.level = self.level.saturating_sub(1),
            Nesting::SelfClosing => {}
        }
        let idx = self.tokens.len();
        self.tokens.push(token);
        &mut self.tokens[idx]
    }

    /// An `inline` token holding text for the inline scanner; its span
    /// covers the mapped source of `content`
    pub fn push_inline(&mut self, content: String, map: Vec<(usize, usize)>) -> &mut Token {
        let source = InlineSource::new(content.clone(), map);
        let span = self.span(source.source_offset(0), source.source_end(content.len()));
        let token = self.push("inline", Nesting::SelfClosing);
        token.inline_source = Some(source);
        token.content = content;
        token.span = span;
        token
    }

    pub fn is_empty(&self, line: usize) -> bool {
        self.b_marks[line] + self.t_shift[line] >= self.e_marks[line]
    }

    pub fn skip_empty_lines(&self, mut line: usize) -> usize {
        while line < self.line_max && self.is_empty(line) {
            line += 1;
        }
        line
    }

    pub fn skip_spaces(&self, mut pos: usize) -> usize {
        while pos < self.src.len() && is_space(self.byte(pos)) {
            pos += 1;
        }
        pos
    }

    /// Skip spaces backwards, not below `min`
    pub fn skip_spaces_back(&self, mut pos: usize, min: usize) -> usize {
        while pos > min && is_space(self.byte(pos - 1)) {
            pos -= 1;
        }
        pos
    }

    pub fn skip_chars(&self, mut pos: usize, code: u8) -> usize {
        while pos < self.src.len() && self.byte(pos) == code {
            pos += 1;
        }
        pos
    }

    pub fn skip_chars_back(&self, mut pos: usize, code: u8, min: usize) -> usize {
        while pos > min && self.byte(pos - 1) == code {
            pos -= 1;
        }
        pos
    }

    /// Text of lines `begin..end` with up to `indent` columns stripped, plus
    /// the content-to-source offset map
    pub fn get_lines(
        &self,
        begin: usize,
        end: usize,
        indent: usize,
        keep_last_lf: bool,
    ) -> (String, Vec<(usize, usize)>) {
        let mut out = String::new();
        let mut map = Vec::new();
        let bytes = self.src.as_bytes();
        for line in begin..end {
            let line_start = self.b_marks[line];
            let mut first = line_start;
            let last = if line + 1 < end || keep_last_lf {
                (self.e_marks[line] + 1).min(self.src.len())
            } else {
                self.e_marks[line]
            };
            let mut line_indent = 0usize;
            while first < last && line_indent < indent {
                let ch = bytes[first];
                if is_space(ch) {
                    if ch == b'\t' {
                        line_indent += 4 - (line_indent + self.bs_count[line] as usize) % 4;
                    } else {
                        line_indent += 1;
                    }
                } else if first - line_start < self.t_shift[line] {
                    // markers of enclosing containers count as spaces
                    line_indent += 1;
                } else {
                    break;
                }
                first += 1;
            }
            if line_indent > indent {
                // partially consumed tab
                out.push_str(&" ".repeat(line_indent - indent));
            }
            map.push((out.len(), first));
            if first < last {
                out.push_str(&self.src[first..last]);
            }
        }
        (out, map)
    }

    /// Span of byte offsets, `None` when positions are not tracked
    pub fn span(&self, start: usize, end: usize) -> Option<SourceSpan> {
        self.options
            .track_positions
            .then(|| self.line_index.span(start, end))
    }

    /// Span from the content start of `start` to the end of the last
    /// non-blank line before `end`
    pub fn lines_span(&self, start: usize, end: usize) -> Option<SourceSpan> {
        let mut last = end.clamp(start + 1, self.line_max.max(start + 1));
        while last > start + 1 && self.is_empty(last - 1) {
            last -= 1;
        }
        let from = (self.b_marks[start] + self.t_shift[start]).min(self.e_marks[start]);
        let to = self.e_marks[last - 1].max(from);
        self.span(from, to)
    }

    /// Whether an enabled rule of the given terminator list starts at `line`
    pub fn terminated(&mut self, which: Terminators, line: usize, end: usize) -> bool {
        let rules = self.rules;
        rules
            .terminators(which)
            .iter()
            .any(|rule| rule(self, line, end, true))
    }

    /// Run the block chain over `start_line..end_line`
    pub fn tokenize(&mut self, start_line: usize, end_line: usize) {
        let rules = self.rules;
        let mut line = start_line;
        let mut has_empty_lines = false;

        while line < end_line {
            line = self.skip_empty_lines(line);
            self.line = line;
            if line >= end_line {
                break;
            }
            // nested call reached the end of its container
            if self.s_count[line] < self.blk_indent {
                break;
            }
            if self.level >= self.options.max_nesting {
                self.fallback(line, end_line, true);
                break;
            }

            let prev_line = self.line;
            let matched = rules.all.iter().any(|rule| rule(self, line, end_line, false));
            if !matched {
                self.fallback(line, end_line, false);
            }
            assert!(
                self.line > prev_line,
                "block rule did not advance past line {prev_line}"
            );

            // an empty line before the current block makes the list loose
            self.tight = !has_empty_lines;
            // paragraphs may eat one trailing blank line in nested lists
            if self.is_empty(self.line - 1) {
                has_empty_lines = true;
            }
            line = self.line;
            if line < end_line && self.is_empty(line) {
                has_empty_lines = true;
                line += 1;
                self.line = line;
            }
        }
    }

    /// Lines no rule accepts become a bare `inline` token, up to the next
    /// line some enabled rule would start (or everything when `greedy`)
    fn fallback(&mut self, start: usize, end: usize, greedy: bool) {
        let rules = self.rules;
        let mut next = start + 1;
        while next < end && !greedy {
            if !self.is_empty(next) {
                if self.s_count[next] < self.blk_indent {
                    break;
                }
                if rules.all.iter().any(|rule| rule(self, next, end, true)) {
                    break;
                }
            }
            next += 1;
        }
        if greedy {
            next = end;
        }
        let mut last = next;
        while last > start + 1 && self.is_empty(last - 1) {
            last -= 1;
        }
        let indent = self.blk_indent.max(0) as usize;
        let (content, map) = self.get_lines(start, last, indent, false);
        self.line = next;
        self.push_inline(content, map);
    }
}

/// Trim spaces, tabs and newlines from both ends, keeping the map aligned
pub fn trim_mapped(text: &str, map: &[(usize, usize)]) -> (String, Vec<(usize, usize)>) {
    let is_ws = |c: char| c == ' ' || c == '\t' || c == '\n';
    let lead = text.len() - text.trim_start_matches(is_ws).len();
    let trimmed = text.trim_matches(is_ws);
    let mut out: Vec<(usize, usize)> = Vec::new();
    for &(content, source) in map {
        if content <= lead {
            out.clear();
            out.push((0, source + (lead - content)));
        } else if content - lead < trimmed.len() {
            out.push((content - lead, source));
        }
    }
    (trimmed.to_string(), out)
}

/// Scan `src` into block tokens; inline tokens are left unscanned
pub fn parse(
    src: &str,
    options: &Options,
    rules: &BlockRules,
    env: &mut Env,
    line_index: &LineIndex,
) -> Vec<Token> {
    let mut state = BlockState::new(src, options, rules, env, line_index);
    let end = state.line_max;
    state.tokenize(0, end);
    trace!(tokens = state.tokens.len(), "block scan finished");
    state.tokens
}
