//! GFM tables

use markit_core::{MetaValue, Nesting};

use super::{trim_mapped, BlockState, Terminators};
use crate::utilities::is_space;

/// Cell text with its content-to-source map
type Cell = (String, Vec<(usize, usize)>);

/// Split a row on unescaped pipes; `\|` becomes `|`
fn escaped_split(line: &str, base: usize) -> Vec<Cell> {
    fn segment(cell: &mut Cell, line: &str, start: usize, end: usize, base: usize) {
        if start < end || cell.1.is_empty() {
            cell.1.push((cell.0.len(), base + start));
        }
        cell.0.push_str(&line[start..end]);
    }

    let bytes = line.as_bytes();
    let mut cells = Vec::new();
    let mut current: Cell = (String::new(), Vec::new());
    let mut last_pos = 0;
    let mut escaped = false;
    for (pos, &ch) in bytes.iter().enumerate() {
        if ch == b'|' {
            if escaped {
                segment(&mut current, line, last_pos, pos - 1, base);
                last_pos = pos;
            } else {
                segment(&mut current, line, last_pos, pos, base);
                cells.push(std::mem::take(&mut current));
                last_pos = pos + 1;
            }
        }
        escaped = ch == b'\\';
    }
    segment(&mut current, line, last_pos, bytes.len(), base);
    cells.push(current);
    cells
}

/// Row text without surrounding whitespace and its source offset
fn row_text<'s>(state: &BlockState<'s>, line: usize) -> (&'s str, usize) {
    let pos = state.b_marks[line] + state.t_shift[line];
    let max = state.e_marks[line];
    let src: &'s str = state.src;
    let text = &src[pos.min(max)..max];
    let trimmed = text.trim_end_matches(|c| c == ' ' || c == '\t');
    let lead = trimmed.len() - trimmed.trim_start_matches(|c| c == ' ' || c == '\t').len();
    (&trimmed[lead..], pos.min(max) + lead)
}

/// Row cells with one leading and one trailing empty cell dropped
fn row_cells(state: &BlockState, line: usize) -> Vec<Cell> {
    let (text, base) = row_text(state, line);
    let mut cells = escaped_split(text, base);
    if cells.first().is_some_and(|c| c.0.is_empty()) {
        cells.remove(0);
    }
    if cells.last().is_some_and(|c| c.0.is_empty()) {
        cells.pop();
    }
    cells
}

/// Parse the delimiter row into per-column alignments
fn alignments(state: &BlockState, line: usize) -> Option<Vec<&'static str>> {
    let (text, _) = row_text(state, line);
    let columns: Vec<&str> = text.split('|').collect();
    let mut aligns = Vec::new();
    for (i, column) in columns.iter().enumerate() {
        let t = column.trim();
        if t.is_empty() {
            // empty columns allowed only at the edges
            if i == 0 || i == columns.len() - 1 {
                continue;
            }
            return None;
        }
        let body = t.strip_prefix(':').unwrap_or(t);
        let body = body.strip_suffix(':').unwrap_or(body);
        if body.is_empty() || !body.bytes().all(|b| b == b'-') {
            return None;
        }
        aligns.push(match (t.starts_with(':'), t.ends_with(':')) {
            (true, true) => "center",
            (false, true) => "right",
            (true, false) => "left",
            (false, false) => "",
        });
    }
    Some(aligns)
}

pub fn rule(state: &mut BlockState, start_line: usize, end_line: usize, silent: bool) -> bool {
    // header plus delimiter row
    if start_line + 2 > end_line {
        return false;
    }
    let delim_line = start_line + 1;
    if state.s_count[delim_line] < state.blk_indent {
        return false;
    }
    if state.s_count[delim_line] - state.blk_indent >= 4 {
        return false;
    }

    // delimiter row: equivalent of /^[-:|][-:|\s]*$/
    let mut pos = state.b_marks[delim_line] + state.t_shift[delim_line];
    let max = state.e_marks[delim_line];
    if pos >= max {
        return false;
    }
    let first = state.byte(pos);
    pos += 1;
    if first != b'|' && first != b'-' && first != b':' {
        return false;
    }
    if pos >= max {
        return false;
    }
    let second = state.byte(pos);
    pos += 1;
    if second != b'|' && second != b'-' && second != b':' && !is_space(second) {
        return false;
    }
    // `- ` would be a list item
    if first == b'-' && is_space(second) {
        return false;
    }
    while pos < max {
        let ch = state.byte(pos);
        if ch != b'|' && ch != b'-' && ch != b':' && !is_space(ch) {
            return false;
        }
        pos += 1;
    }

    let Some(aligns) = alignments(state, delim_line) else {
        return false;
    };

    let (header_text, _) = row_text(state, start_line);
    if !header_text.contains('|') {
        return false;
    }
    if state.s_count[start_line] - state.blk_indent >= 4 {
        return false;
    }
    let header = row_cells(state, start_line);
    // the header fixes the column count; the delimiter row must agree
    let column_count = header.len();
    if column_count == 0 || column_count != aligns.len() {
        return false;
    }
    if silent {
        return true;
    }

    let table_idx = state.tokens.len();
    let alignment_meta: Vec<MetaValue> = aligns.iter().map(|a| MetaValue::from(*a)).collect();
    state
        .push("table_open", Nesting::Open)
        .set_meta("alignments", alignment_meta);

    let head_span = state.lines_span(start_line, start_line + 1);
    state.push("thead_open", Nesting::Open).span = head_span;
    state.push("trow_open", Nesting::Open).span = head_span;
    for (i, cell) in header.into_iter().enumerate() {
        push_cell(state, cell, true, aligns[i]);
    }
    state.push("trow_close", Nesting::Close);
    state.push("thead_close", Nesting::Close);

    let body_start = start_line + 2;
    let mut body_idx = None;
    let mut next_line = body_start;
    while next_line < end_line {
        if state.s_count[next_line] < state.blk_indent {
            break;
        }
        if state.terminated(Terminators::Blockquote, next_line, end_line) {
            break;
        }
        let (text, _) = row_text(state, next_line);
        if text.is_empty() {
            break;
        }
        if state.s_count[next_line] - state.blk_indent >= 4 {
            break;
        }
        let mut cells = row_cells(state, next_line);

        if body_idx.is_none() {
            body_idx = Some(state.tokens.len());
            state.push("tbody_open", Nesting::Open);
        }
        let row_span = state.lines_span(next_line, next_line + 1);
        state.push("trow_open", Nesting::Open).span = row_span;
        // rows are padded or cut to the header's column count
        cells.resize_with(column_count, || {
            let end = row_span.map_or(0, |s| s.end.offset);
            (String::new(), vec![(0, end)])
        });
        for (i, cell) in cells.into_iter().enumerate() {
            push_cell(state, cell, false, aligns[i]);
        }
        state.push("trow_close", Nesting::Close);
        next_line += 1;
    }

    if let Some(idx) = body_idx {
        state.push("tbody_close", Nesting::Close);
        state.tokens[idx].span = state.lines_span(body_start, next_line);
    }
    state.push("table_close", Nesting::Close);
    state.tokens[table_idx].span = state.lines_span(start_line, next_line);
    state.line = next_line;
    true
}

fn push_cell(state: &mut BlockState, cell: Cell, header: bool, align: &str) {
    let (content, map) = trim_mapped(&cell.0, &cell.1);
    let open_idx = state.tokens.len();
    let open = state.push("tcell_open", Nesting::Open);
    open.set_meta("header", header);
    open.set_meta("align", align);
    let span = state.push_inline(content, map).span;
    state.tokens[open_idx].span = span;
    state.push("tcell_close", Nesting::Close);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escaped_split() {
        let cells: Vec<String> = escaped_split(r"| a | b \| c |", 0)
            .into_iter()
            .map(|(text, _)| text)
            .collect();
        assert_eq!(cells, vec!["", " a ", " b | c ", ""]);
    }

    #[test]
    fn test_escaped_split_maps_offsets() {
        let cells = escaped_split(r"a\|b|c", 10);
        assert_eq!(cells[0].0, "a|b");
        assert_eq!(cells[0].1, vec![(0, 10), (1, 12)]);
        assert_eq!(cells[1].1, vec![(0, 15)]);
    }
}
