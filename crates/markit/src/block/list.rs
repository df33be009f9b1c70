//! Bullet and ordered lists

use markit_core::{Nesting, Token};

use super::{BlockState, ParentType, Terminators};
use crate::utilities::is_space;

/// `[-+*]` followed by a space or line end; position after the marker
fn skip_bullet_marker(state: &BlockState, line: usize) -> Option<usize> {
    let max = state.e_marks[line];
    let mut pos = state.b_marks[line] + state.t_shift[line];
    let marker = state.byte(pos);
    if marker != b'*' && marker != b'-' && marker != b'+' {
        return None;
    }
    pos += 1;
    if pos < max && !is_space(state.byte(pos)) {
        // `-test` is not an item
        return None;
    }
    Some(pos)
}

/// `\d{1,9}[.)]` followed by a space or line end; position after the marker
fn skip_ordered_marker(state: &BlockState, line: usize) -> Option<usize> {
    let start = state.b_marks[line] + state.t_shift[line];
    let max = state.e_marks[line];
    let mut pos = start;
    if pos + 1 >= max {
        return None;
    }
    if !state.byte(pos).is_ascii_digit() {
        return None;
    }
    pos += 1;
    loop {
        if pos >= max {
            return None;
        }
        let ch = state.byte(pos);
        pos += 1;
        if ch.is_ascii_digit() {
            if pos - start >= 10 {
                return None;
            }
            continue;
        }
        if ch == b')' || ch == b'.' {
            break;
        }
        return None;
    }
    if pos < max && !is_space(state.byte(pos)) {
        return None;
    }
    Some(pos)
}

/// Hide paragraphs that sit directly inside the items of the list opened
/// at `list_idx`
fn mark_tight_paragraphs(tokens: &mut [Token], list_idx: usize) {
    let mut depth = 0i32;
    for token in &mut tokens[list_idx..] {
        if token.nesting == Nesting::Close {
            depth -= 1;
        }
        if depth == 2 && matches!(token.kind.as_str(), "paragraph_open" | "paragraph_close") {
            token.hidden = true;
        }
        if token.nesting == Nesting::Open {
            depth += 1;
        }
    }
}

pub fn rule(state: &mut BlockState, start_line: usize, end_line: usize, silent: bool) -> bool {
    let mut next_line = start_line;
    let mut tight = true;

    if state.s_count[next_line] - state.blk_indent >= 4 {
        return false;
    }

    // deeply indented marker under a list item is a paragraph continuation
    if state.list_indent >= 0
        && state.s_count[next_line] - state.list_indent >= 4
        && state.s_count[next_line] < state.blk_indent
    {
        return false;
    }

    // a list may interrupt a paragraph only under extra conditions
    let is_terminating_paragraph = silent
        && state.parent_type == ParentType::Paragraph
        && state.s_count[next_line] >= state.blk_indent;

    let marker_start = state.b_marks[next_line] + state.t_shift[next_line];
    let mut marker_value = 1;
    let (is_ordered, mut pos_after_marker) = if let Some(pos) = skip_ordered_marker(state, next_line) {
        marker_value = state.src[marker_start..pos - 1].parse::<i64>().unwrap_or(1);
        if is_terminating_paragraph && marker_value != 1 {
            return false;
        }
        (true, pos)
    } else if let Some(pos) = skip_bullet_marker(state, next_line) {
        (false, pos)
    } else {
        return false;
    };

    // an empty item cannot interrupt a paragraph
    if is_terminating_paragraph && state.skip_spaces(pos_after_marker) >= state.e_marks[next_line] {
        return false;
    }
    if silent {
        return true;
    }

    // a different marker character ends the list
    let marker_char = state.byte(pos_after_marker - 1);

    let list_idx = state.tokens.len();
    let open = state.push(
        if is_ordered { "ordered_list_open" } else { "bullet_list_open" },
        Nesting::Open,
    );
    if is_ordered {
        open.set_meta("start", marker_value);
    }
    open.set_meta("marker", (marker_char as char).to_string());

    let mut prev_empty_end = false;
    let old_parent = state.parent_type;
    state.parent_type = ParentType::List;

    while next_line < end_line {
        let mut pos = pos_after_marker;
        let max = state.e_marks[next_line];
        let initial = state.s_count[next_line]
            + (pos_after_marker - (state.b_marks[next_line] + state.t_shift[next_line])) as i32;
        let mut offset = initial;

        while pos < max {
            match state.byte(pos) {
                b'\t' => offset += 4 - (offset + state.bs_count[next_line]) % 4,
                b' ' => offset += 1,
                _ => break,
            }
            pos += 1;
        }

        let content_start = pos;
        // `-    \n  3`: the trailing spaces do not count
        let mut indent_after_marker = if content_start >= max {
            1
        } else {
            offset - initial
        };
        // more than 4 spaces starts an indented code block inside the item
        if indent_after_marker > 4 {
            indent_after_marker = 1;
        }
        let indent = initial + indent_after_marker;

        let item_line = next_line;
        let item_idx = state.tokens.len();
        state.push("list_item_open", Nesting::Open);

        let old_tight = state.tight;
        let old_t_shift = state.t_shift[next_line];
        let old_s_count = state.s_count[next_line];
        let old_list_indent = state.list_indent;
        state.list_indent = state.blk_indent;
        state.blk_indent = indent;
        state.tight = true;
        state.t_shift[next_line] = content_start - state.b_marks[next_line];
        state.s_count[next_line] = offset;

        if content_start >= max && state.is_empty(next_line + 1) {
            // empty item followed by a blank line ends the list
            state.line = (state.line + 2).min(end_line);
        } else {
            state.tokenize(next_line, end_line);
        }

        // one loose item makes the whole list loose
        if !state.tight || prev_empty_end {
            tight = false;
        }
        // an item ending in a blank line is loose unless it is the last one
        prev_empty_end = state.line - next_line > 1 && state.is_empty(state.line - 1);

        state.blk_indent = state.list_indent;
        state.list_indent = old_list_indent;
        state.t_shift[next_line] = old_t_shift;
        state.s_count[next_line] = old_s_count;
        state.tight = old_tight;

        state.push("list_item_close", Nesting::Close);
        next_line = state.line;
        state.tokens[item_idx].span = state.lines_span(item_line, next_line);

        if next_line >= end_line {
            break;
        }
        if state.s_count[next_line] < state.blk_indent {
            break;
        }
        if state.s_count[next_line] - state.blk_indent >= 4 {
            break;
        }
        if state.terminated(Terminators::List, next_line, end_line) {
            break;
        }

        let next_marker = if is_ordered {
            skip_ordered_marker(state, next_line)
        } else {
            skip_bullet_marker(state, next_line)
        };
        let Some(pos) = next_marker else {
            break;
        };
        pos_after_marker = pos;
        if marker_char != state.byte(pos_after_marker - 1) {
            break;
        }
    }

    state.push(
        if is_ordered { "ordered_list_close" } else { "bullet_list_close" },
        Nesting::Close,
    );
    state.line = next_line;
    state.parent_type = old_parent;

    let span = state.lines_span(start_line, next_line);
    let open = &mut state.tokens[list_idx];
    open.span = span;
    open.set_meta("tight", tight);
    if tight {
        mark_tight_paragraphs(&mut state.tokens, list_idx);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_tight_paragraphs_only_direct_children() {
        let kinds = [
            ("bullet_list_open", Nesting::Open),
            ("list_item_open", Nesting::Open),
            ("paragraph_open", Nesting::Open),
            ("inline", Nesting::SelfClosing),
            ("paragraph_close", Nesting::Close),
            ("blockquote_open", Nesting::Open),
            ("paragraph_open", Nesting::Open),
            ("paragraph_close", Nesting::Close),
            ("blockquote_close", Nesting::Close),
            ("list_item_close", Nesting::Close),
            ("bullet_list_close", Nesting::Close),
        ];
        let mut tokens: Vec<Token> = kinds.iter().map(|(k, n)| Token::new(k, *n)).collect();
        mark_tight_paragraphs(&mut tokens, 0);
        let hidden: Vec<bool> = tokens.iter().map(|t| t.hidden).collect();
        assert_eq!(
            hidden,
            vec![false, false, true, false, true, false, false, false, false, false, false]
        );
    }
}
