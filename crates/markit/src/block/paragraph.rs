//! Paragraphs, the block rule that accepts any remaining line

use markit_core::Nesting;

use super::{trim_mapped, BlockState, ParentType, Terminators};

pub fn rule(state: &mut BlockState, start_line: usize, _end_line: usize, silent: bool) -> bool {
    if silent {
        return true;
    }
    // a blockquote that was terminated shrinks line_max to stop lazy lines
    let end_line = state.line_max;
    let old_parent = state.parent_type;
    state.parent_type = ParentType::Paragraph;

    let mut next_line = start_line + 1;
    while next_line < end_line && !state.is_empty(next_line) {
        // lazy continuation, whatever it looks like
        if state.s_count[next_line] - state.blk_indent > 3 || state.s_count[next_line] < 0 {
            next_line += 1;
            continue;
        }
        if state.terminated(Terminators::Paragraph, next_line, end_line) {
            break;
        }
        next_line += 1;
    }

    let indent = state.blk_indent.max(0) as usize;
    let (raw, map) = state.get_lines(start_line, next_line, indent, false);
    let (content, map) = trim_mapped(&raw, &map);
    let span = state.lines_span(start_line, next_line);
    state.line = next_line;

    state.push("paragraph_open", Nesting::Open).span = span;
    state.push_inline(content, map);
    state.push("paragraph_close", Nesting::Close);
    state.parent_type = old_parent;
    true
}
