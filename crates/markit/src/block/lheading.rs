//! Setext headings: text underlined with `===` or `---`

use markit_core::Nesting;

use super::{trim_mapped, BlockState, ParentType, Terminators};

pub fn rule(state: &mut BlockState, start_line: usize, end_line: usize, silent: bool) -> bool {
    if state.s_count[start_line] - state.blk_indent >= 4 {
        return false;
    }
    let old_parent = state.parent_type;
    state.parent_type = ParentType::Paragraph;
    let found = scan(state, start_line, end_line);
    state.parent_type = old_parent;

    let Some((next_line, level, marker)) = found else {
        return false;
    };
    if silent {
        return true;
    }

    let indent = state.blk_indent.max(0) as usize;
    let (raw, map) = state.get_lines(start_line, next_line, indent, false);
    let (content, map) = trim_mapped(&raw, &map);
    state.line = next_line + 1;
    let span = state.lines_span(start_line, state.line);

    let open = state.push("lheading_open", Nesting::Open);
    open.span = span;
    open.set_meta("level", level);
    open.set_meta("marker", (marker as char).to_string());
    state.push_inline(content, map);
    state.push("lheading_close", Nesting::Close);
    true
}

/// Find the underline; returns its line, the level and the marker
fn scan(state: &mut BlockState, start_line: usize, end_line: usize) -> Option<(usize, i64, u8)> {
    let mut next_line = start_line + 1;
    while next_line < end_line && !state.is_empty(next_line) {
        // would be code, but after a paragraph it is a lazy continuation
        if state.s_count[next_line] - state.blk_indent > 3 {
            next_line += 1;
            continue;
        }

        if state.s_count[next_line] >= state.blk_indent {
            let mut pos = state.b_marks[next_line] + state.t_shift[next_line];
            let max = state.e_marks[next_line];
            if pos < max {
                let marker = state.byte(pos);
                if marker == b'-' || marker == b'=' {
                    pos = state.skip_chars(pos, marker);
                    pos = state.skip_spaces(pos);
                    if pos >= max {
                        let level = if marker == b'=' { 1 } else { 2 };
                        return Some((next_line, level, marker));
                    }
                }
            }
        }

        // blockquote lazy line, already checked there
        if state.s_count[next_line] < 0 {
            next_line += 1;
            continue;
        }
        if state.terminated(Terminators::Paragraph, next_line, end_line) {
            return None;
        }
        next_line += 1;
    }
    None
}
