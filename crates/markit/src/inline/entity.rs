//! `&amp;`, `&#35;`, `&#x22;`

use markit_core::Nesting;
use once_cell::sync::Lazy;
use regex::Regex;

use super::InlineState;
use crate::utilities::decode_entity;

static DIGITAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^&#(x[a-f0-9]{1,6}|[0-9]{1,7});").expect("valid entity pattern"));
static NAMED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^&([a-z][a-z0-9]{1,31});").expect("valid entity pattern"));

pub fn rule(state: &mut InlineState, silent: bool) -> bool {
    let pos = state.pos;
    let max = state.pos_max;
    if state.byte(pos) != b'&' || pos + 1 >= max {
        return false;
    }

    let src = state.src;
    let rest = &src[pos..max];
    let pattern: &Regex = if state.byte(pos + 1) == b'#' {
        &DIGITAL_RE
    } else {
        &NAMED_RE
    };
    let Some(caps) = pattern.captures(rest) else {
        return false;
    };
    let whole = caps.get(0).map_or("", |m| m.as_str());
    let body = caps.get(1).map_or("", |m| m.as_str());
    let body = if whole.starts_with("&#") {
        format!("#{body}")
    } else {
        body.to_string()
    };
    let Some(decoded) = decode_entity(&body) else {
        return false;
    };

    if !silent {
        let span = state.span(pos, pos + whole.len());
        let token = state.push("text_special", Nesting::SelfClosing);
        token.content = decoded;
        token.set_meta("markup", whole);
        token.set_meta("info", "entity");
        token.span = span;
    }
    state.pos += whole.len();
    true
}

#[cfg(test)]
mod tests {
    use crate::inline::tests::scan;
    use crate::rules::presets::Preset;

    #[test]
    fn test_named_and_numeric() {
        let tokens = scan(Preset::CommonMark, "&copy;&#35;&#x22;&#0;");
        let contents: Vec<&str> = tokens.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["©", "#", "\"", "\u{FFFD}"]);
    }

    #[test]
    fn test_unknown_entity_is_text() {
        let tokens = scan(Preset::CommonMark, "&nosuchthing;");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, "text");
        assert_eq!(tokens[0].content, "&nosuchthing;");
    }
}
