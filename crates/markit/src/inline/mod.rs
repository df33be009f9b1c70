//! Inline scanning
//!
//! Every `inline` token carries its text as an [`InlineSource`]. The scanner
//! walks it left to right, trying the enabled inline rules at each position;
//! text nobody claims accumulates in `pending` and is flushed as a single
//! `text` token. Emphasis-like markers are pushed as plain text tokens and
//! recorded on a delimiter list, which the post rules (`inline2` chain)
//! pair up and rewrite into open/close tokens afterwards.

pub mod autolink;
pub mod autolink_ext;
pub mod backticks;
pub mod balance_pairs;
pub mod emphasis;
pub mod entity;
pub mod escape;
pub mod fragments_join;
pub mod helpers;
pub mod html_inline;
pub mod image;
pub mod link;
pub mod linkify;
pub mod newline;
pub mod strikethrough;
pub mod text;

use std::collections::HashMap;

use markit_core::{InlineSource, LineIndex, Nesting, Options, SourceSpan, Token};

use crate::env::Env;
use crate::rules::Ruler;
use crate::utilities::{is_md_ascii_punct, is_punct_char, is_white_space};

/// `fn(state, silent) -> matched`; a match must advance `state.pos`
pub type InlineRuleFn = fn(&mut InlineState, bool) -> bool;

/// Pass over the finished token list of one inline scan
pub type PostRuleFn = fn(&mut InlineState);

/// Characters the text rule stops at
const TERMINATORS: &[u8] = b"\n!#$%&*+-:<=>@[\\]^_`{}~";

/// Enabled inline and post rules of one parse
#[derive(Clone)]
pub struct InlineRules {
    rules: Vec<InlineRuleFn>,
    post: Vec<PostRuleFn>,
    terminators: [bool; 128],
}

impl InlineRules {
    pub fn new(inline: &Ruler<InlineRuleFn>, post: &Ruler<PostRuleFn>) -> Self {
        let mut terminators = [false; 128];
        for &b in TERMINATORS {
            terminators[b as usize] = true;
        }
        // `www.` autolinks are detected at the dot
        if inline.is_enabled("autolink_ext") {
            terminators[b'.' as usize] = true;
        }
        Self {
            rules: inline.active(),
            post: post.active(),
            terminators,
        }
    }

    pub fn is_terminator(&self, b: u8) -> bool {
        b < 128 && self.terminators[b as usize]
    }
}

/// A marker run recorded for the post rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiter {
    /// `*`, `_` or `~`
    pub marker: u8,
    /// Length of the whole run; 0 turns off the rule of three
    pub length: usize,
    /// Index of the text token holding this marker
    pub token: usize,
    /// Index of the matching closer, set by balance_pairs
    pub end: Option<usize>,
    pub open: bool,
    pub close: bool,
}

/// Result of [`InlineState::scan_delims`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelimRun {
    pub can_open: bool,
    pub can_close: bool,
    pub length: usize,
}

pub struct InlineState<'a> {
    pub src: &'a str,
    pub source: &'a InlineSource,
    pub env: &'a mut Env,
    pub options: &'a Options,
    rules: &'a InlineRules,
    line_index: &'a LineIndex,

    pub tokens: Vec<Token>,
    /// Delimiters found inside each open token, parallel to `tokens`
    pub tokens_meta: Vec<Option<Vec<Delimiter>>>,

    pub pos: usize,
    pub pos_max: usize,
    pub level: usize,
    pub pending: String,
    /// Content offset where `pending` starts
    pending_start: usize,

    pub delimiters: Vec<Delimiter>,
    prev_delimiters: Vec<Vec<Delimiter>>,
    open_stack: Vec<usize>,

    /// `skip_token` results by start position
    cache: HashMap<usize, usize>,
    /// Backtick run length -> last position a closer of that length was seen
    pub backticks: HashMap<usize, usize>,
    pub backticks_scanned: bool,
    /// Depth of links being tokenized; nested autolinks are refused
    pub link_level: usize,
}

impl<'a> InlineState<'a> {
    pub fn new(
        source: &'a InlineSource,
        options: &'a Options,
        rules: &'a InlineRules,
        env: &'a mut Env,
        line_index: &'a LineIndex,
    ) -> Self {
        Self {
            src: &source.text,
            source,
            env,
            options,
            rules,
            line_index,
            tokens: Vec::new(),
            tokens_meta: Vec::new(),
            pos: 0,
            pos_max: source.text.len(),
            level: 0,
            pending: String::new(),
            pending_start: 0,
            delimiters: Vec::new(),
            prev_delimiters: Vec::new(),
            open_stack: Vec::new(),
            cache: HashMap::new(),
            backticks: HashMap::new(),
            backticks_scanned: false,
            link_level: 0,
        }
    }

    pub fn rules(&self) -> &'a InlineRules {
        self.rules
    }

    /// Byte at `pos`, 0 past the end
    pub fn byte(&self, pos: usize) -> u8 {
        self.src.as_bytes().get(pos).copied().unwrap_or(0)
    }

    /// Offset just past the character starting at `pos`
    pub fn next_char_end(&self, pos: usize) -> usize {
        self.src
            .get(pos..)
            .and_then(|rest| rest.chars().next())
            .map_or(pos + 1, |c| pos + c.len_utf8())
    }

    /// Span of the content range `start..end`
    pub fn span(&self, start: usize, end: usize) -> Option<SourceSpan> {
        self.options.track_positions.then(|| {
            self.line_index
                .span(self.source.source_offset(start), self.source.source_end(end))
        })
    }

    /// Append `src[start..end]` to the pending text
    pub fn add_pending(&mut self, start: usize, end: usize) {
        let src = self.src;
        if self.pending.is_empty() {
            self.pending_start = start;
        }
        self.pending.push_str(&src[start..end]);
    }

    /// Is `src[start..end]` the tail of the pending text
    pub fn pending_covers(&self, start: usize, end: usize) -> bool {
        !self.pending.is_empty()
            && self.pending_start <= start
            && self.pending_start + self.pending.len() == end
    }

    /// Flush the pending text as a `text` token
    pub fn push_pending(&mut self) {
        let content = std::mem::take(&mut self.pending);
        let mut token = Token::new("text", Nesting::SelfClosing);
        token.span = self.span(self.pending_start, self.pending_start + content.len());
        token.content = content;
        self.tokens.push(token);
        self.tokens_meta.push(None);
    }

    pub fn push(&mut self, kind: &str, nesting: Nesting) -> &mut Token {
        if !self.pending.is_empty() {
            self.push_pending();
        }
        match nesting {
            Nesting::Close => {
                self.level = self.level.saturating_sub(1);
                let outer = self.prev_delimiters.pop().unwrap_or_default();
                let inner = std::mem::replace(&mut self.delimiters, outer);
                if let Some(open) = self.open_stack.pop() {
                    self.tokens_meta[open] = Some(inner);
                }
            }
            Nesting::Open => {
                self.level += 1;
                self.prev_delimiters
                    .push(std::mem::take(&mut self.delimiters));
                self.open_stack.push(self.tokens.len());
            }
            Nesting::SelfClosing => {}
        }
        self.tokens.push(Token::new(kind, nesting));
        self.tokens_meta.push(None);
        let idx = self.tokens.len() - 1;
        &mut self.tokens[idx]
    }

    /// Measure the marker run at `start` and apply the flanking rules
    ///
    /// `can_split_word` is false for `_`, which may not open or close
    /// inside a word.
    pub fn scan_delims(&self, start: usize, can_split_word: bool) -> DelimRun {
        let max = self.pos_max;
        let marker = self.byte(start);
        // line start and end count as whitespace
        let last = self.src[..start].chars().next_back().unwrap_or(' ');
        let mut pos = start;
        while pos < max && self.byte(pos) == marker {
            pos += 1;
        }
        let next = self.src[pos..max].chars().next().unwrap_or(' ');

        let last_punct = is_ascii_punct_char(last) || is_punct_char(last);
        let next_punct = is_ascii_punct_char(next) || is_punct_char(next);
        let last_white = is_white_space(last);
        let next_white = is_white_space(next);

        let left_flanking = !next_white && (!next_punct || last_white || last_punct);
        let right_flanking = !last_white && (!last_punct || next_white || next_punct);

        DelimRun {
            can_open: left_flanking && (can_split_word || !right_flanking || last_punct),
            can_close: right_flanking && (can_split_word || !left_flanking || next_punct),
            length: pos - start,
        }
    }

    /// Run the inline chain from `pos` to `pos_max`
    pub fn tokenize(&mut self) {
        let rules = self.rules;
        let end = self.pos_max;
        while self.pos < end {
            let prev = self.pos;
            let matched = self.level < self.options.max_nesting
                && rules.rules.iter().any(|rule| rule(self, false));
            if matched {
                assert!(self.pos > prev, "inline rule did not advance past {prev}");
                if self.pos >= end {
                    break;
                }
                continue;
            }
            let next = self.next_char_end(self.pos);
            self.add_pending(self.pos, next);
            self.pos = next;
        }
        if !self.pending.is_empty() {
            self.push_pending();
        }
    }

    /// Advance past one token without emitting it; used by label scanning
    pub fn skip_token(&mut self) {
        let pos = self.pos;
        if let Some(&cached) = self.cache.get(&pos) {
            self.pos = cached;
            return;
        }
        let rules = self.rules;
        let mut matched = false;
        if self.level < self.options.max_nesting {
            for rule in &rules.rules {
                // count the probe as nesting so recursion stays bounded
                self.level += 1;
                matched = rule(self, true);
                self.level -= 1;
                if matched {
                    assert!(self.pos > pos, "inline rule did not advance past {pos}");
                    break;
                }
            }
        } else {
            self.pos = self.pos_max;
        }
        if !matched {
            self.pos = self.next_char_end(self.pos);
        }
        self.cache.insert(pos, self.pos);
    }

    /// Scan a sub-range of this source (image descriptions, inline notes)
    /// into its own token list with the full chain and post rules
    pub fn parse_nested(&mut self, start: usize, end: usize) -> Vec<Token> {
        let source = self.source.slice(start, end);
        parse(&source, self.options, self.rules, self.env, self.line_index)
    }
}

fn is_ascii_punct_char(c: char) -> bool {
    c.is_ascii() && is_md_ascii_punct(c as u8)
}

/// Span from the start of `a` to the end of `b`, either side optional
pub fn join_spans(a: Option<SourceSpan>, b: Option<SourceSpan>) -> Option<SourceSpan> {
    match (a, b) {
        (Some(a), Some(b)) => Some(SourceSpan {
            start: a.start,
            end: b.end,
        }),
        (a, b) => a.or(b),
    }
}

/// Scan one inline source into tokens
pub fn parse(
    source: &InlineSource,
    options: &Options,
    rules: &InlineRules,
    env: &mut Env,
    line_index: &LineIndex,
) -> Vec<Token> {
    let mut state = InlineState::new(source, options, rules, env, line_index);
    state.tokenize();
    for post in &rules.post {
        post(&mut state);
    }
    state.tokens
}
