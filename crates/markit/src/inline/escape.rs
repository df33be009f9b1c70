//! Backslash escapes and backslash hard breaks

use markit_core::Nesting;

use super::InlineState;
use crate::utilities::is_space;

const ESCAPABLE: &[u8] = b"\\!\"#$%&'()*+,./:;<=>?@[]^_`{|}~-";

pub fn rule(state: &mut InlineState, silent: bool) -> bool {
    let start = state.pos;
    let max = state.pos_max;
    if state.byte(start) != b'\\' {
        return false;
    }
    let mut pos = start + 1;
    // a backslash ending the block is literal
    if pos >= max {
        return false;
    }

    let ch = state.byte(pos);
    if ch == b'\n' {
        if !silent {
            let span = state.span(start, pos + 1);
            state.push("hardbreak", Nesting::SelfClosing).span = span;
        }
        pos += 1;
        while pos < max && is_space(state.byte(pos)) {
            pos += 1;
        }
        state.pos = pos;
        return true;
    }

    let end = state.next_char_end(pos);
    if !silent {
        let src = state.src;
        let original = &src[start..end];
        let content = if ESCAPABLE.contains(&ch) {
            &src[pos..end]
        } else {
            original
        };
        let span = state.span(start, end);
        let token = state.push("text_special", Nesting::SelfClosing);
        token.content = content.to_string();
        token.set_meta("markup", original);
        token.set_meta("info", "escape");
        token.span = span;
    }
    state.pos = end;
    true
}

#[cfg(test)]
mod tests {
    use crate::inline::tests::{kinds, scan};
    use crate::rules::presets::Preset;

    #[test]
    fn test_escapes() {
        let tokens = scan(Preset::CommonMark, r"\*a\q");
        assert_eq!(kinds(&tokens), vec!["text_special", "text", "text_special"]);
        assert_eq!(tokens[0].content, "*");
        assert_eq!(tokens[2].content, r"\q");
    }

    #[test]
    fn test_backslash_hard_break() {
        let tokens = scan(Preset::CommonMark, "a\\\n   b");
        assert_eq!(kinds(&tokens), vec!["text", "hardbreak", "text"]);
        assert_eq!(tokens[2].content, "b");
    }
}
