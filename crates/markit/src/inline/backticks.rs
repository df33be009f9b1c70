//! Code spans

use markit_core::{Nesting, Token};

use super::InlineState;

pub fn rule(state: &mut InlineState, silent: bool) -> bool {
    let start = state.pos;
    if state.byte(start) != b'`' {
        return false;
    }
    let max = state.pos_max;
    let mut pos = start + 1;
    while pos < max && state.byte(pos) == b'`' {
        pos += 1;
    }
    let opener_len = pos - start;

    // an earlier scan proved no closer of this length follows
    if state.backticks_scanned && state.backticks.get(&opener_len).copied().unwrap_or(0) <= start {
        if !silent {
            state.add_pending(start, pos);
        }
        state.pos = pos;
        return true;
    }

    let src = state.src;
    let mut match_end = pos;
    while let Some(found) = src[match_end..max].find('`') {
        let match_start = match_end + found;
        match_end = match_start + 1;
        while match_end < max && state.byte(match_end) == b'`' {
            match_end += 1;
        }
        let closer_len = match_end - match_start;
        if closer_len == opener_len {
            if !silent {
                let content = code_content(&src[pos..match_start]);
                let span = state.span(start, match_end);
                let token = state.push("code_inline", Nesting::SelfClosing);
                token.set_meta("marker", "`");
                token.set_meta("marker_len", opener_len);
                token.span = span;
                let mut text = Token::text(&content);
                text.span = state.span(pos, match_start);
                let idx = state.tokens.len() - 1;
                state.tokens[idx].children.push(text);
            }
            state.pos = match_end;
            return true;
        }
        // remember where a closer of this other length sits
        state.backticks.insert(closer_len, match_start);
    }

    state.backticks_scanned = true;
    if !silent {
        state.add_pending(start, pos);
    }
    state.pos = pos;
    true
}

/// Line endings become spaces; one surrounding space is stripped when both
/// ends have one and the content is not all spaces
fn code_content(raw: &str) -> String {
    let content = raw.replace('\n', " ");
    let bytes = content.as_bytes();
    if bytes.len() >= 2
        && bytes[0] == b' '
        && bytes[bytes.len() - 1] == b' '
        && bytes.iter().any(|b| *b != b' ')
    {
        content[1..content.len() - 1].to_string()
    } else {
        content
    }
}
