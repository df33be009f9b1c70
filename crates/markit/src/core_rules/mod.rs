//! Core chain: the passes that drive the scanners and rewrite the finished
//! token stream
//!
//! `block` scans the source into block tokens, `inline` fills the children
//! of every `inline` token; the rules after it work on the complete stream.

pub mod linkify;
pub mod normalize;
pub mod replacements;
pub mod smartquotes;
pub mod text_join;

use markit_core::{LineIndex, Options, Token};
use tracing::trace;

use crate::block::{self, BlockRules};
use crate::env::Env;
use crate::inline::{self, InlineRules};

pub type CoreRuleFn = fn(&mut CoreState);

/// State of one parse call
pub struct CoreState<'a> {
    /// Source text; `normalize` rewrites it before scanning
    pub src: String,
    pub tokens: Vec<Token>,
    pub env: Env,
    pub options: &'a Options,
    pub block_rules: &'a BlockRules,
    pub inline_rules: &'a InlineRules,
    pub line_index: LineIndex,
}

impl<'a> CoreState<'a> {
    pub fn new(
        src: &str,
        options: &'a Options,
        block_rules: &'a BlockRules,
        inline_rules: &'a InlineRules,
    ) -> Self {
        Self {
            src: src.to_string(),
            tokens: Vec::new(),
            env: Env::default(),
            options,
            block_rules,
            inline_rules,
            line_index: LineIndex::new(src),
        }
    }
}

pub fn block(state: &mut CoreState) {
    state.tokens = block::parse(
        &state.src,
        state.options,
        state.block_rules,
        &mut state.env,
        &state.line_index,
    );
}

pub fn inline(state: &mut CoreState) {
    let mut count = 0;
    for token in &mut state.tokens {
        let Some(source) = &token.inline_source else {
            continue;
        };
        let children = inline::parse(
            source,
            state.options,
            state.inline_rules,
            &mut state.env,
            &state.line_index,
        );
        count += children.len();
        token.children = children;
    }
    trace!(tokens = count, "inline scan finished");
}

/// Nesting level of every token in an inline child list
///
/// Open and close tokens share the level outside of them.
pub(crate) fn levels(tokens: &[Token]) -> Vec<usize> {
    let mut level = 0usize;
    tokens
        .iter()
        .map(|token| match token.nesting {
            markit_core::Nesting::Open => {
                level += 1;
                level - 1
            }
            markit_core::Nesting::Close => {
                level = level.saturating_sub(1);
                level
            }
            markit_core::Nesting::SelfClosing => level,
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::rules::presets::Preset;
    use crate::rules::Registry;

    /// Run the core chain of `registry` over `src`
    pub(crate) fn run(registry: &Registry, options: &Options, src: &str) -> Vec<Token> {
        let block_rules = BlockRules::new(&registry.block);
        let inline_rules = InlineRules::new(&registry.inline, &registry.inline2);
        let mut state = CoreState::new(src, options, &block_rules, &inline_rules);
        for rule in registry.core.active() {
            rule(&mut state);
        }
        state.tokens
    }

    /// Children of the first inline token
    pub(crate) fn first_inline(tokens: &[Token]) -> &[Token] {
        tokens
            .iter()
            .find(|t| t.kind == "inline")
            .map(|t| t.children.as_slice())
            .unwrap_or(&[])
    }

    #[test]
    fn test_inline_fills_children() {
        let registry = Preset::CommonMark.registry();
        let tokens = run(&registry, &Preset::CommonMark.options(), "a *b*");
        let kinds: Vec<&str> = first_inline(&tokens).iter().map(|t| t.kind.as_str()).collect();
        assert_eq!(kinds, vec!["text", "em_open", "text", "em_close"]);
    }

    #[test]
    fn test_levels() {
        let tokens = vec![
            Token::new("em_open", markit_core::Nesting::Open),
            Token::text("a"),
            Token::new("em_close", markit_core::Nesting::Close),
        ];
        assert_eq!(levels(&tokens), vec![0, 1, 0]);
    }
}
