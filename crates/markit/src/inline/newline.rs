//! Line endings: soft breaks, and hard breaks after two or more spaces

use markit_core::Nesting;

use super::InlineState;
use crate::utilities::is_space;

pub fn rule(state: &mut InlineState, silent: bool) -> bool {
    let mut pos = state.pos;
    if state.byte(pos) != b'\n' {
        return false;
    }
    let max = state.pos_max;

    if !silent {
        let trailing = state.pending.len() - state.pending.trim_end_matches(' ').len();
        let kind = if trailing >= 2 { "hardbreak" } else { "softbreak" };
        let keep = state.pending.len() - trailing;
        state.pending.truncate(keep);
        let start = pos - trailing;
        let span = state.span(start, pos + 1);
        state.push(kind, Nesting::SelfClosing).span = span;
    }

    pos += 1;
    // leading spaces of the next line
    while pos < max && is_space(state.byte(pos)) {
        pos += 1;
    }
    state.pos = pos;
    true
}

#[cfg(test)]
mod tests {
    use crate::inline::tests::{kinds, scan};
    use crate::rules::presets::Preset;

    #[test]
    fn test_soft_and_hard_breaks() {
        let tokens = scan(Preset::CommonMark, "a \n  b  \nc");
        assert_eq!(kinds(&tokens), vec!["text", "softbreak", "text", "hardbreak", "text"]);
        assert_eq!(tokens[0].content, "a");
        assert_eq!(tokens[2].content, "b");
    }
}
