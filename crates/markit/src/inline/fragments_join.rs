//! Merge adjacent text tokens left behind by unmatched delimiters and drop
//! the empty ones strong emphasis leaves

use super::{join_spans, InlineState};

pub fn rule(state: &mut InlineState) {
    let tokens = std::mem::take(&mut state.tokens);
    let mut out: Vec<markit_core::Token> = Vec::with_capacity(tokens.len());
    for token in tokens {
        if token.kind == "text" {
            if token.content.is_empty() {
                continue;
            }
            if let Some(last) = out.last_mut().filter(|last| last.kind == "text") {
                last.content.push_str(&token.content);
                last.span = join_spans(last.span, token.span);
                continue;
            }
        }
        out.push(token);
    }
    state.tokens = out;
    // delimiter indices are stale from here on
    state.delimiters.clear();
    state.tokens_meta.clear();
}
