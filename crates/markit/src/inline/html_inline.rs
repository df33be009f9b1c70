//! Raw inline HTML: tags, comments, processing instructions, declarations

use markit_core::Nesting;
use once_cell::sync::Lazy;
use regex::Regex;

use super::InlineState;
use crate::utilities::HTML_TAG_RE;

pub(crate) static LINK_OPEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^<a[>\s]").expect("valid pattern"));
pub(crate) static LINK_CLOSE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^</a\s*>").expect("valid pattern"));

pub fn rule(state: &mut InlineState, silent: bool) -> bool {
    let pos = state.pos;
    let max = state.pos_max;
    if state.byte(pos) != b'<' || pos + 2 >= max {
        return false;
    }
    let second = state.byte(pos + 1);
    if second != b'!' && second != b'?' && second != b'/' && !second.is_ascii_alphabetic() {
        return false;
    }

    let src = state.src;
    let Some(found) = HTML_TAG_RE.find(&src[pos..max]) else {
        return false;
    };
    let html = found.as_str();

    if !silent {
        let span = state.span(pos, pos + html.len());
        let token = state.push("html_inline", Nesting::SelfClosing);
        token.content = html.to_string();
        token.span = span;
        if LINK_OPEN_RE.is_match(html) {
            state.link_level += 1;
        }
        if LINK_CLOSE_RE.is_match(html) {
            state.link_level = state.link_level.saturating_sub(1);
        }
    }
    state.pos += html.len();
    true
}

#[cfg(test)]
mod tests {
    use crate::inline::tests::{kinds, scan};
    use crate::rules::presets::Preset;

    #[test]
    fn test_tags_and_comments() {
        let tokens = scan(Preset::CommonMark, "a <b class=\"x\">c</b> <!-- d -->");
        assert_eq!(
            kinds(&tokens),
            vec!["text", "html_inline", "text", "html_inline", "text", "html_inline"]
        );
        assert_eq!(tokens[1].content, "<b class=\"x\">");
    }

    #[test]
    fn test_not_a_tag() {
        let tokens = scan(Preset::CommonMark, "a < b <1>");
        assert_eq!(kinds(&tokens), vec!["text"]);
    }
}
