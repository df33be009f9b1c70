//! Indented code blocks

use markit_core::Nesting;

use super::BlockState;

pub fn rule(state: &mut BlockState, start_line: usize, end_line: usize, silent: bool) -> bool {
    if state.s_count[start_line] - state.blk_indent < 4 {
        return false;
    }

    let mut next_line = start_line + 1;
    let mut last = next_line;
    while next_line < end_line {
        if state.is_empty(next_line) {
            next_line += 1;
            continue;
        }
        if state.s_count[next_line] - state.blk_indent >= 4 {
            next_line += 1;
            last = next_line;
            continue;
        }
        break;
    }
    if silent {
        return true;
    }

    let indent = (4 + state.blk_indent).max(0) as usize;
    let (mut content, _) = state.get_lines(start_line, last, indent, false);
    content.push('\n');
    let span = state.lines_span(start_line, last);
    state.line = last;

    let token = state.push("code_block", Nesting::SelfClosing);
    token.content = content;
    token.span = span;
    true
}
