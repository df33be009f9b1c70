//! Block quotes: lines prefixed with `>`, plus lazy continuation lines

use markit_core::Nesting;

use super::{BlockState, ParentType, Terminators};
use crate::utilities::is_space;

/// Line marks overwritten while the quote body is scanned
struct SavedLine {
    b_mark: usize,
    bs_count: i32,
    s_count: i32,
    t_shift: usize,
}

pub fn rule(state: &mut BlockState, start_line: usize, end_line: usize, silent: bool) -> bool {
    let old_line_max = state.line_max;

    if state.s_count[start_line] - state.blk_indent >= 4 {
        return false;
    }
    if state.byte(state.b_marks[start_line] + state.t_shift[start_line]) != b'>' {
        return false;
    }
    // the rest cannot fail
    if silent {
        return true;
    }

    let mut saved: Vec<SavedLine> = Vec::new();
    let old_parent = state.parent_type;
    state.parent_type = ParentType::Blockquote;
    let mut last_line_empty = false;

    // The quote ends with an empty line outside it, an empty line inside it
    // followed by an unquoted line, or a line another block rule claims.
    let mut next_line = start_line;
    while next_line < end_line {
        // inside a list item and indented less than the item
        let is_outdented = state.s_count[next_line] < state.blk_indent;
        let mut pos = state.b_marks[next_line] + state.t_shift[next_line];
        let max = state.e_marks[next_line];
        if pos >= max {
            break;
        }

        if state.byte(pos) == b'>' && !is_outdented {
            pos += 1;
            // offset past `>` and the optional space
            let mut initial = state.s_count[next_line] + 1;
            let space_after_marker;
            let mut adjust_tab = false;
            match state.byte(pos) {
                b' ' => {
                    pos += 1;
                    initial += 1;
                    space_after_marker = true;
                }
                b'\t' => {
                    space_after_marker = true;
                    if (state.bs_count[next_line] + initial) % 4 == 3 {
                        // tab has width 1 here
                        pos += 1;
                        initial += 1;
                    } else {
                        adjust_tab = true;
                    }
                }
                _ => space_after_marker = false,
            }

            let mut offset = initial;
            saved.push(save(state, next_line));
            state.b_marks[next_line] = pos;

            while pos < max {
                let ch = state.byte(pos);
                if !is_space(ch) {
                    break;
                }
                if ch == b'\t' {
                    offset += 4 - (offset + state.bs_count[next_line] + i32::from(adjust_tab)) % 4;
                } else {
                    offset += 1;
                }
                pos += 1;
            }

            last_line_empty = pos >= max;
            state.bs_count[next_line] =
                state.s_count[next_line] + 1 + i32::from(space_after_marker);
            state.s_count[next_line] = offset - initial;
            state.t_shift[next_line] = pos - state.b_marks[next_line];
            next_line += 1;
            continue;
        }

        // unquoted line right after an empty quoted one
        if last_line_empty {
            break;
        }

        if state.terminated(Terminators::Blockquote, next_line, end_line) {
            // paragraphs inside must not continue past this line
            state.line_max = next_line;
            if state.blk_indent != 0 {
                // recompute offsets as if blk_indent had been zero
                saved.push(save(state, next_line));
                state.s_count[next_line] -= state.blk_indent;
            }
            break;
        }

        // lazy paragraph continuation
        saved.push(save(state, next_line));
        state.s_count[next_line] = -1;
        next_line += 1;
    }

    let old_indent = state.blk_indent;
    state.blk_indent = 0;

    let open_idx = state.tokens.len();
    state.push("blockquote_open", Nesting::Open);
    state.tokenize(start_line, next_line);
    state.push("blockquote_close", Nesting::Close);

    state.line_max = old_line_max;
    state.parent_type = old_parent;

    for (i, line) in saved.into_iter().enumerate() {
        let idx = start_line + i;
        state.b_marks[idx] = line.b_mark;
        state.t_shift[idx] = line.t_shift;
        state.s_count[idx] = line.s_count;
        state.bs_count[idx] = line.bs_count;
    }
    state.blk_indent = old_indent;

    let span = state.lines_span(start_line, state.line);
    state.tokens[open_idx].span = span;
    true
}

fn save(state: &BlockState, line: usize) -> SavedLine {
    SavedLine {
        b_mark: state.b_marks[line],
        bs_count: state.bs_count[line],
        s_count: state.s_count[line],
        t_shift: state.t_shift[line],
    }
}
