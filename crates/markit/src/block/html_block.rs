//! Raw HTML blocks, the seven CommonMark start conditions

use markit_core::Nesting;
use once_cell::sync::Lazy;
use regex::Regex;

use super::BlockState;
use crate::utilities::{HTML_BLOCK_NAMES, HTML_OPEN_CLOSE_TAG_RE};

/// Start pattern, end pattern, whether it may interrupt a paragraph
struct Sequence {
    open: Regex,
    close: Regex,
    interrupts: bool,
}

fn sequence(open: &str, close: &str, interrupts: bool) -> Sequence {
    Sequence {
        open: Regex::new(open).expect("valid html block start"),
        close: Regex::new(close).expect("valid html block end"),
        interrupts,
    }
}

static SEQUENCES: Lazy<Vec<Sequence>> = Lazy::new(|| {
    let names = HTML_BLOCK_NAMES.join("|");
    vec![
        sequence(
            r"(?i)^<(?:script|pre|style|textarea)(?:\s|>|$)",
            r"(?i)</(?:script|pre|style|textarea)>",
            true,
        ),
        sequence(r"^<!--", r"-->", true),
        sequence(r"^<\?", r"\?>", true),
        sequence(r"^<![A-Za-z]", r">", true),
        sequence(r"^<!\[CDATA\[", r"\]\]>", true),
        sequence(&format!(r"(?i)^</?(?:{names})(?:\s|/?>|$)"), r"^$", true),
        sequence(
            &format!(r"{}\s*$", HTML_OPEN_CLOSE_TAG_RE.as_str()),
            r"^$",
            false,
        ),
    ]
});

pub fn rule(state: &mut BlockState, start_line: usize, end_line: usize, silent: bool) -> bool {
    let pos = state.b_marks[start_line] + state.t_shift[start_line];
    let max = state.e_marks[start_line];

    if state.s_count[start_line] - state.blk_indent >= 4 {
        return false;
    }
    if state.byte(pos) != b'<' {
        return false;
    }

    let line_text = &state.src[pos..max];
    let Some(seq) = SEQUENCES.iter().find(|seq| seq.open.is_match(line_text)) else {
        return false;
    };
    if silent {
        return seq.interrupts;
    }

    let mut next_line = start_line + 1;
    // roll down to the end condition unless the first line already meets it
    if !seq.close.is_match(line_text) {
        while next_line < end_line {
            if state.s_count[next_line] < state.blk_indent {
                break;
            }
            let pos = state.b_marks[next_line] + state.t_shift[next_line];
            let max = state.e_marks[next_line];
            let text = &state.src[pos.min(max)..max];
            if seq.close.is_match(text) {
                if !text.is_empty() {
                    next_line += 1;
                }
                break;
            }
            next_line += 1;
        }
    }

    let indent = state.s_count[start_line].max(0) as usize;
    let (content, _) = state.get_lines(start_line, next_line, indent, true);
    let span = state.lines_span(start_line, next_line);
    state.line = next_line;

    let token = state.push("html_block", Nesting::SelfClosing);
    token.content = content;
    token.span = span;
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn starts(line: &str) -> Option<usize> {
        SEQUENCES.iter().position(|seq| seq.open.is_match(line))
    }

    #[test]
    fn test_start_conditions() {
        assert_eq!(starts("<script type=\"x\">"), Some(0));
        assert_eq!(starts("<!-- note"), Some(1));
        assert_eq!(starts("<?php"), Some(2));
        assert_eq!(starts("<!DOCTYPE html>"), Some(3));
        assert_eq!(starts("<![CDATA["), Some(4));
        assert_eq!(starts("<DIV class=\"a\">"), Some(5));
        assert_eq!(starts("<custom-tag a=\"1\">"), Some(6));
        assert_eq!(starts("<custom-tag> text"), None);
        assert_eq!(starts("<divx>"), Some(6));
    }
}
