//! Runs of characters no other inline rule starts with

use super::InlineState;

pub fn rule(state: &mut InlineState, silent: bool) -> bool {
    let rules = state.rules();
    let mut pos = state.pos;
    while pos < state.pos_max && !rules.is_terminator(state.byte(pos)) {
        pos += 1;
    }
    if pos == state.pos {
        return false;
    }
    if !silent {
        state.add_pending(state.pos, pos);
    }
    state.pos = pos;
    true
}

#[cfg(test)]
mod tests {
    use crate::inline::tests::{kinds, scan};
    use crate::rules::presets::Preset;

    #[test]
    fn test_multibyte_text() {
        let tokens = scan(Preset::CommonMark, "héllo wörld ✓");
        assert_eq!(kinds(&tokens), vec!["text"]);
        assert_eq!(tokens[0].content, "héllo wörld ✓");
    }
}
