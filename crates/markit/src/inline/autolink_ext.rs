//! GFM extended autolinks: bare `www.`, `http://`, `https://` and e-mail
//! addresses
//!
//! The text rule stops at `.`, `:` and `@`; from there the rule looks back
//! over the pending text for the start of the link.

use super::autolink::push_link;
use super::InlineState;
use crate::utilities::{normalize_link, normalize_link_text, validate_link};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flavor {
    Www,
    Protocol,
    Email,
}

/// Characters allowed before a link
fn is_boundary(b: u8) -> bool {
    b.is_ascii_whitespace() || matches!(b, b'*' | b'_' | b'~' | b'(')
}

fn is_domain_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b'.' || b >= 0x80
}

fn is_local_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'.' | b'-' | b'_' | b'+')
}

/// End of a valid domain starting at `start`, trailing dots excluded
fn scan_domain(bytes: &[u8], start: usize, max: usize) -> Option<usize> {
    let mut end = start;
    while end < max && is_domain_byte(bytes[end]) {
        end += 1;
    }
    while end > start && bytes[end - 1] == b'.' {
        end -= 1;
    }
    let domain = std::str::from_utf8(&bytes[start..end]).ok()?;
    let segments: Vec<&str> = domain.split('.').collect();
    if segments.len() < 2 || segments.iter().any(|s| s.is_empty()) {
        return None;
    }
    // no underscores in the last two segments
    if segments[segments.len() - 2..].iter().any(|s| s.contains('_')) {
        return None;
    }
    Some(end)
}

/// Drop trailing punctuation, unbalanced `)` and entity references
fn trim_trailing(link: &str) -> &str {
    let mut link = link;
    loop {
        let Some(last) = link.bytes().last() else {
            return link;
        };
        if matches!(last, b'?' | b'!' | b'.' | b',' | b':' | b'*' | b'_' | b'~') {
            link = &link[..link.len() - 1];
        } else if last == b')' && link.matches(')').count() > link.matches('(').count() {
            link = &link[..link.len() - 1];
        } else if last == b';' {
            let body = &link[..link.len() - 1];
            let name_start = body.trim_end_matches(|c: char| c.is_ascii_alphanumeric()).len();
            if name_start < body.len() && name_start > 0 && body.as_bytes()[name_start - 1] == b'&' {
                link = &link[..name_start - 1];
            } else {
                return link;
            }
        } else {
            return link;
        }
    }
}

/// Start, end and flavor of a link around the trigger at `pos`
fn find(state: &InlineState, pos: usize) -> Option<(usize, usize, Flavor)> {
    let src = state.src;
    let bytes = src.as_bytes();
    let max = state.pos_max;
    let boundary_ok = |start: usize| start == 0 || is_boundary(bytes[start - 1]);

    match bytes[pos] {
        b'.' => {
            let start = pos.checked_sub(3)?;
            let www = src.get(start..pos).is_some_and(|s| s.eq_ignore_ascii_case("www"));
            if !www || !boundary_ok(start) {
                return None;
            }
            scan_domain(bytes, start, max)?;
            Some((start, path_end(bytes, start, max), Flavor::Www))
        }
        b':' => {
            if !src[pos..max].starts_with("://") {
                return None;
            }
            let before = &src[..pos];
            let scheme_len = if before.to_ascii_lowercase().ends_with("https") {
                5
            } else if before.to_ascii_lowercase().ends_with("http") {
                4
            } else {
                return None;
            };
            let start = pos - scheme_len;
            if !boundary_ok(start) {
                return None;
            }
            scan_domain(bytes, pos + 3, max)?;
            Some((start, path_end(bytes, pos + 3, max), Flavor::Protocol))
        }
        b'@' => {
            let mut start = pos;
            while start > 0 && is_local_byte(bytes[start - 1]) {
                start -= 1;
            }
            if start == pos || (start > 0 && matches!(bytes[start - 1], b'/' | b':')) {
                return None;
            }
            let end = scan_domain(bytes, pos + 1, max)?;
            if matches!(bytes[end - 1], b'-' | b'_') {
                return None;
            }
            Some((start, end, Flavor::Email))
        }
        _ => None,
    }
}

/// First whitespace or `<` at or after `from`
fn path_end(bytes: &[u8], from: usize, max: usize) -> usize {
    let mut end = from;
    while end < max && !bytes[end].is_ascii_whitespace() && bytes[end] != b'<' {
        end += 1;
    }
    end
}

pub fn rule(state: &mut InlineState, silent: bool) -> bool {
    let pos = state.pos;
    if state.link_level > 0 || !matches!(state.byte(pos), b'.' | b':' | b'@') {
        return false;
    }
    let Some((start, raw_end, flavor)) = find(state, pos) else {
        return false;
    };
    let prefix = pos - start;
    // the part before the trigger must still be plain pending text
    if !silent && !state.pending_covers(start, pos) {
        return false;
    }

    let src = state.src;
    let link = match flavor {
        Flavor::Email => &src[start..raw_end],
        _ => trim_trailing(&src[start..raw_end]),
    };
    let end = start + link.len();
    if end <= pos {
        return false;
    }
    let href = normalize_link(&match flavor {
        Flavor::Www => format!("http://{link}"),
        Flavor::Protocol => link.to_string(),
        Flavor::Email => format!("mailto:{link}"),
    });
    if !validate_link(&href) {
        return false;
    }

    if !silent {
        let keep = state.pending.len() - prefix;
        state.pending.truncate(keep);
        push_link(state, "linkify", href, normalize_link_text(link), start, end);
    }
    state.pos = end;
    true
}
