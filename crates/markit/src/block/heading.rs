//! ATX headings: `# title`

use markit_core::Nesting;

use super::BlockState;
use crate::utilities::is_space;

pub fn rule(state: &mut BlockState, start_line: usize, _end_line: usize, silent: bool) -> bool {
    let mut pos = state.b_marks[start_line] + state.t_shift[start_line];
    let mut max = state.e_marks[start_line];

    if state.s_count[start_line] - state.blk_indent >= 4 {
        return false;
    }
    if state.byte(pos) != b'#' || pos >= max {
        return false;
    }

    let mut level = 1;
    pos += 1;
    while state.byte(pos) == b'#' && pos < max && level <= 6 {
        level += 1;
        pos += 1;
    }
    if level > 6 || (pos < max && !is_space(state.byte(pos))) {
        return false;
    }
    if silent {
        return true;
    }

    // cut tails like `    ###  `
    max = state.skip_spaces_back(max, pos);
    let tmp = state.skip_chars_back(max, b'#', pos);
    if tmp > pos && is_space(state.byte(tmp - 1)) {
        max = tmp;
    }
    let content_start = state.skip_spaces(pos).min(max);
    let content_end = state.skip_spaces_back(max, content_start);

    let span = state.lines_span(start_line, start_line + 1);
    state.line = start_line + 1;

    let content = state.src[content_start..content_end].to_string();
    let open = state.push("heading_open", Nesting::Open);
    open.span = span;
    open.set_meta("level", level as i64);
    state.push_inline(content, vec![(0, content_start)]);
    state.push("heading_close", Nesting::Close);
    true
}
