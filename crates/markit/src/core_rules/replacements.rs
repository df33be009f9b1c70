//! Typographic replacements: `(c)` `(r)` `(tm)`, `+-`, ellipses and dashes
//!
//! Text inside autolinks is kept as written.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::CoreState;

static SCOPED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\((c|tm|r)\)").expect("valid scoped pattern"));
static RARE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\+-|\.\.|\?\?\?\?|!!!!|,,|--").expect("valid rare pattern"));
static ELLIPSIS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.{2,}").expect("valid pattern"));
static PUNCT_ELLIPSIS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([?!])…").expect("valid pattern"));
static REPEATED_PUNCT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([?!]){4,}").expect("valid pattern"));
static COMMAS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r",{2,}").expect("valid pattern"));

fn scoped(text: &str) -> Cow<'_, str> {
    SCOPED_RE.replace_all(text, |caps: &Captures| {
        match caps[1].to_ascii_lowercase().as_str() {
            "c" => "©",
            "r" => "®",
            _ => "™",
        }
        .to_string()
    })
}

/// `---` becomes an em dash, `--` an en dash when both sides are spaces or
/// both are not; longer runs stay
fn dashes(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] != '-' {
            out.push(chars[i]);
            i += 1;
            continue;
        }
        let start = i;
        while i < chars.len() && chars[i] == '-' {
            i += 1;
        }
        let before = start.checked_sub(1).map(|j| chars[j]);
        let after = chars.get(i).copied();
        let spaced = |c: Option<char>| c.map_or(true, char::is_whitespace);
        let solid = |c: Option<char>| c.map_or(true, |c| !c.is_whitespace());
        match i - start {
            3 => out.push('\u{2014}'),
            2 if (spaced(before) && spaced(after)) || (solid(before) && solid(after)) => {
                out.push('\u{2013}')
            }
            len => out.extend(std::iter::repeat('-').take(len)),
        }
    }
    out
}

fn rare(text: &str) -> String {
    let text = text.replace("+-", "±");
    let text = ELLIPSIS_RE.replace_all(&text, "…");
    let text = PUNCT_ELLIPSIS_RE.replace_all(&text, "$1..");
    let text = REPEATED_PUNCT_RE.replace_all(&text, "$1$1$1");
    let text = COMMAS_RE.replace_all(&text, ",");
    dashes(&text)
}

/// Replace inside one text token's content
pub fn replace(text: &str) -> String {
    let text = scoped(text);
    if RARE_RE.is_match(&text) {
        rare(&text)
    } else {
        text.into_owned()
    }
}

pub fn rule(state: &mut CoreState) {
    for token in &mut state.tokens {
        if token.kind != "inline" {
            continue;
        }
        let mut auto_depth = 0usize;
        for child in &mut token.children {
            match child.kind.as_str() {
                "autolink_open" | "linkify_open" => auto_depth += 1,
                "autolink_close" | "linkify_close" => auto_depth = auto_depth.saturating_sub(1),
                "text" if auto_depth == 0 => child.content = replace(&child.content),
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbols() {
        assert_eq!(replace("(c) (C) (r) (tm) (TM)"), "© © ® ™ ™");
        assert_eq!(replace("+-1"), "±1");
    }

    #[test]
    fn test_ellipsis_and_punctuation() {
        assert_eq!(replace("wait... what?..... no!!!!!"), "wait… what?.. no!!!");
        assert_eq!(replace("a,, b"), "a, b");
    }

    #[test]
    fn test_dashes() {
        assert_eq!(replace("a---b"), "a\u{2014}b");
        assert_eq!(replace("a -- b"), "a \u{2013} b");
        assert_eq!(replace("1--2"), "1\u{2013}2");
        assert_eq!(replace("a --b"), "a --b");
        assert_eq!(replace("a----b"), "a----b");
    }
}
