//! Thematic breaks: `***`, `---`, `___`

use markit_core::Nesting;

use super::BlockState;
use crate::utilities::is_space;

pub fn rule(state: &mut BlockState, start_line: usize, _end_line: usize, silent: bool) -> bool {
    let max = state.e_marks[start_line];
    if state.s_count[start_line] - state.blk_indent >= 4 {
        return false;
    }

    let mut pos = state.b_marks[start_line] + state.t_shift[start_line];
    let marker = state.byte(pos);
    if marker != b'*' && marker != b'-' && marker != b'_' {
        return false;
    }
    pos += 1;

    // markers may be mixed with spaces, at least 3 of them
    let mut count = 1;
    while pos < max {
        let ch = state.byte(pos);
        pos += 1;
        if ch != marker && !is_space(ch) {
            return false;
        }
        if ch == marker {
            count += 1;
        }
    }
    if count < 3 {
        return false;
    }
    if silent {
        return true;
    }

    let span = state.lines_span(start_line, start_line + 1);
    state.line = start_line + 1;
    let token = state.push("hr", Nesting::SelfClosing);
    token.span = span;
    token.set_meta("marker", (marker as char).to_string());
    token.set_meta("marker_len", count as i64);
    true
}
