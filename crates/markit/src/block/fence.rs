//! Fenced code blocks: ``` or ~~~ with an optional info string

use markit_core::Nesting;

use super::BlockState;
use crate::utilities::unescape_all;

pub fn rule(state: &mut BlockState, start_line: usize, end_line: usize, silent: bool) -> bool {
    let mut pos = state.b_marks[start_line] + state.t_shift[start_line];
    let mut max = state.e_marks[start_line];

    if state.s_count[start_line] - state.blk_indent >= 4 {
        return false;
    }
    if pos + 3 > max {
        return false;
    }

    let marker = state.byte(pos);
    if marker != b'~' && marker != b'`' {
        return false;
    }

    let mut mem = pos;
    pos = state.skip_chars(pos, marker);
    let len = pos - mem;
    if len < 3 {
        return false;
    }

    let params = &state.src[pos..max];
    // backtick fences cannot carry backticks in the info string
    if marker == b'`' && params.contains('`') {
        return false;
    }
    if silent {
        return true;
    }
    let info = unescape_all(params).trim().to_string();

    // search the end of the block
    let mut next_line = start_line;
    let mut have_end_marker = false;
    loop {
        next_line += 1;
        if next_line >= end_line {
            // unclosed block runs to the end of its container
            break;
        }

        pos = state.b_marks[next_line] + state.t_shift[next_line];
        mem = pos;
        max = state.e_marks[next_line];

        if pos < max && state.s_count[next_line] < state.blk_indent {
            // non-empty outdented line closes the enclosing list item
            break;
        }
        if state.byte(pos) != marker {
            continue;
        }
        if state.s_count[next_line] - state.blk_indent >= 4 {
            continue;
        }
        pos = state.skip_chars(pos, marker);
        if pos - mem < len {
            continue;
        }
        pos = state.skip_spaces(pos);
        if pos < max {
            continue;
        }
        have_end_marker = true;
        break;
    }

    // indentation of the opening fence is removed from the body
    let indent = state.s_count[start_line].max(0) as usize;
    let (content, _) = state.get_lines(start_line + 1, next_line, indent, true);
    state.line = next_line + usize::from(have_end_marker);
    let span = state.lines_span(start_line, state.line);

    let token = state.push("fence", Nesting::SelfClosing);
    token.content = content;
    token.span = span;
    token.set_meta("info", info);
    token.set_meta("marker", (marker as char).to_string());
    token.set_meta("marker_len", len as i64);
    true
}
