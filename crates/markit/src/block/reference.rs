//! Link reference definitions: `[label]: destination "title"`
//!
//! Definitions emit no tokens; they land in [`Env::references`] for the
//! inline link rules.
//!
//! [`Env::references`]: crate::env::Env

use super::{BlockState, ParentType, Terminators};
use crate::env::LinkReference;
use crate::inline::helpers::{parse_link_destination, parse_link_title};
use crate::utilities::{is_space, normalize_link, normalize_reference, validate_link};

pub fn rule(state: &mut BlockState, start_line: usize, _end_line: usize, silent: bool) -> bool {
    let mut pos = state.b_marks[start_line] + state.t_shift[start_line];
    let max = state.e_marks[start_line];

    if state.s_count[start_line] - state.blk_indent >= 4 {
        return false;
    }
    if state.byte(pos) != b'[' {
        return false;
    }

    // quick reject of `[link](url)` at the start of a line
    pos += 1;
    while pos < max {
        if state.byte(pos) == b']' && state.byte(pos - 1) != b'\\' {
            if pos + 1 == max || state.byte(pos + 1) != b':' {
                return false;
            }
            break;
        }
        pos += 1;
    }

    let old_parent = state.parent_type;
    state.parent_type = ParentType::Reference;
    let parsed = scan(state, start_line);
    state.parent_type = old_parent;

    let Some((label, reference, lines)) = parsed else {
        return false;
    };
    if silent {
        return true;
    }
    state.env.references.entry(label).or_insert(reference);
    state.line = start_line + lines + 1;
    true
}

fn scan(state: &mut BlockState, start_line: usize) -> Option<(String, LinkReference, usize)> {
    let end_line = state.line_max;
    let mut next_line = start_line + 1;
    while next_line < end_line && !state.is_empty(next_line) {
        if state.s_count[next_line] - state.blk_indent > 3 || state.s_count[next_line] < 0 {
            next_line += 1;
            continue;
        }
        if state.terminated(Terminators::Reference, next_line, end_line) {
            break;
        }
        next_line += 1;
    }

    let indent = state.blk_indent.max(0) as usize;
    let (raw, _) = state.get_lines(start_line, next_line, indent, false);
    let text = raw.trim_matches(|c| c == ' ' || c == '\t' || c == '\n');
    let bytes = text.as_bytes();
    let max = bytes.len();
    let mut lines = 0;

    let mut label_end = None;
    let mut pos = 1;
    while pos < max {
        match bytes[pos] {
            b'[' => return None,
            b']' => {
                label_end = Some(pos);
                break;
            }
            b'\n' => lines += 1,
            b'\\' => {
                pos += 1;
                if pos < max && bytes[pos] == b'\n' {
                    lines += 1;
                }
            }
            _ => {}
        }
        pos += 1;
    }
    let label_end = label_end?;
    if bytes.get(label_end + 1) != Some(&b':') {
        return None;
    }

    // optional whitespace before the destination
    pos = label_end + 2;
    while pos < max {
        match bytes[pos] {
            b'\n' => lines += 1,
            ch if is_space(ch) => {}
            _ => break,
        }
        pos += 1;
    }

    let destination = parse_link_destination(text, pos, max)?;
    let href = normalize_link(&destination.value);
    if !validate_link(&href) {
        return None;
    }
    pos = destination.pos;
    lines += destination.lines;

    // rollback point when the title turns out invalid
    let dest_end = pos;
    let dest_lines = lines;

    let before_title = pos;
    while pos < max {
        match bytes[pos] {
            b'\n' => lines += 1,
            ch if is_space(ch) => {}
            _ => break,
        }
        pos += 1;
    }

    let mut title = None;
    match parse_link_title(text, pos, max) {
        Some(parsed) if pos < max && before_title != pos => {
            title = Some(parsed.value);
            pos = parsed.pos;
            lines += parsed.lines;
        }
        _ => {
            pos = dest_end;
            lines = dest_lines;
        }
    }

    // only spaces may follow on the last line
    while pos < max && is_space(bytes[pos]) {
        pos += 1;
    }
    if pos < max && bytes[pos] != b'\n' && title.is_some() {
        // garbage after the title, retry without it
        title = None;
        pos = dest_end;
        lines = dest_lines;
        while pos < max && is_space(bytes[pos]) {
            pos += 1;
        }
    }
    if pos < max && bytes[pos] != b'\n' {
        return None;
    }

    let label = normalize_reference(&text[1..label_end]);
    if label.is_empty() {
        return None;
    }
    Some((
        label,
        LinkReference {
            destination: href,
            title,
        },
        lines,
    ))
}
