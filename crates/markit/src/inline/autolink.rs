//! `<https://example.com>` and `<user@example.com>`

use markit_core::{Nesting, Token};
use once_cell::sync::Lazy;
use regex::Regex;

use super::InlineState;
use crate::utilities::{normalize_link, normalize_link_text, validate_link};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("valid email pattern")
});

static AUTOLINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.\-]{1,31}:[^<>\x00-\x20]*$").expect("valid autolink pattern")
});

/// Push `kind_open`, a text child and `kind_close`
pub(crate) fn push_link(state: &mut InlineState, kind: &str, url: String, text: String, start: usize, end: usize) {
    let span = state.span(start, end);
    let open = state.push(&format!("{kind}_open"), Nesting::Open);
    open.set_meta("url", url);
    open.span = span;
    let mut text = Token::text(&text);
    text.span = span;
    state.tokens.push(text);
    state.tokens_meta.push(None);
    state.push(&format!("{kind}_close"), Nesting::Close);
}

pub fn rule(state: &mut InlineState, silent: bool) -> bool {
    let start = state.pos;
    if state.byte(start) != b'<' {
        return false;
    }
    let max = state.pos_max;
    let mut pos = start;
    loop {
        pos += 1;
        if pos >= max {
            return false;
        }
        match state.byte(pos) {
            b'<' => return false,
            b'>' => break,
            _ => {}
        }
    }

    let src = state.src;
    let inner = &src[start + 1..pos];
    let url = if AUTOLINK_RE.is_match(inner) {
        normalize_link(inner)
    } else if EMAIL_RE.is_match(inner) {
        normalize_link(&format!("mailto:{inner}"))
    } else {
        return false;
    };
    if !validate_link(&url) {
        return false;
    }

    if !silent {
        push_link(state, "autolink", url, normalize_link_text(inner), start, pos + 1);
    }
    state.pos = pos + 1;
    true
}
