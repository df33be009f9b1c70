//! `[text](destination "title")` and reference links `[text][label]`

use markit_core::Nesting;

use super::helpers::{parse_link_destination, parse_link_label, parse_link_title};
use super::InlineState;
use crate::utilities::{is_space, normalize_link, normalize_reference, validate_link};

/// Destination, title and end position of a link or image tail
pub(crate) struct LinkTarget {
    pub url: String,
    pub title: Option<String>,
    pub end: usize,
}

fn skip_whitespace(state: &InlineState, mut pos: usize) -> usize {
    while pos < state.pos_max && (is_space(state.byte(pos)) || state.byte(pos) == b'\n') {
        pos += 1;
    }
    pos
}

/// Parse what follows the label `]` at `label_end`: an inline
/// `(dest "title")` part or a reference, in CommonMark precedence
pub(crate) fn parse_target(
    state: &mut InlineState,
    label_start: usize,
    label_end: usize,
) -> Option<LinkTarget> {
    let max = state.pos_max;
    let src = state.src;
    let mut pos = label_end + 1;
    let mut url = String::new();
    let mut title = None;
    let mut parse_reference = true;

    if pos < max && state.byte(pos) == b'(' {
        // a valid inline tail rules out a reference
        parse_reference = false;
        pos = skip_whitespace(state, pos + 1);
        if pos >= max {
            return None;
        }

        if let Some(dest) = parse_link_destination(src, pos, max) {
            let href = normalize_link(&dest.value);
            if validate_link(&href) {
                url = href;
                pos = dest.pos;
            }
            let before_title = pos;
            pos = skip_whitespace(state, pos);
            if pos < max && before_title != pos {
                if let Some(parsed) = parse_link_title(src, pos, max) {
                    title = Some(parsed.value);
                    pos = skip_whitespace(state, parsed.pos);
                }
            }
        }

        if pos >= max || state.byte(pos) != b')' {
            // not an inline link after all, maybe a shortcut reference
            parse_reference = true;
        }
        pos += 1;
    }

    if parse_reference {
        let mut label = None;
        if pos < max && state.byte(pos) == b'[' {
            let start = pos + 1;
            match parse_link_label(state, pos, false) {
                Some(end) => {
                    label = Some(&src[start..end]);
                    pos = end + 1;
                }
                None => pos = label_end + 1,
            }
        } else {
            pos = label_end + 1;
        }

        // `[foo][]` and `[foo]` use the link text as label
        let label = match label {
            Some(label) if !label.is_empty() => label,
            _ => &src[label_start..label_end],
        };
        let reference = state.env.references.get(&normalize_reference(label))?;
        url = reference.destination.clone();
        title = reference.title.clone();
    }

    Some(LinkTarget { url, title, end: pos })
}

pub fn rule(state: &mut InlineState, silent: bool) -> bool {
    let start = state.pos;
    if state.byte(start) != b'[' {
        return false;
    }
    let max = state.pos_max;
    let label_start = start + 1;
    let Some(label_end) = parse_link_label(state, start, true) else {
        return false;
    };
    let Some(target) = parse_target(state, label_start, label_end) else {
        state.pos = start;
        return false;
    };

    if !silent {
        state.pos = label_start;
        state.pos_max = label_end;
        let span = state.span(start, target.end);
        let open = state.push("link_open", Nesting::Open);
        open.set_meta("url", target.url);
        if let Some(title) = target.title {
            open.set_meta("title", title);
        }
        open.span = span;
        state.link_level += 1;
        state.tokenize();
        state.link_level -= 1;
        state.push("link_close", Nesting::Close);
    }

    state.pos = target.end;
    state.pos_max = max;
    true
}
