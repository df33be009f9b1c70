//! Protocol links in running text, e.g. `see https://example.com`
//!
//! The rule fires at the `:` of `scheme://`; the scheme itself is already
//! pending text and is taken back from it. A scheme glued to an entity, as
//! in `&#104;ttp://`, is not a scheme.

use linkify::{LinkFinder, LinkKind};
use once_cell::sync::Lazy;
use regex::Regex;

use super::autolink::push_link;
use super::InlineState;
use crate::utilities::{normalize_link, normalize_link_text, validate_link};

static SCHEME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:^|[^a-z0-9.+-])([a-z][a-z0-9.+-]*)$").expect("valid scheme pattern")
});

static ENTITY_END_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)&(?:#x[0-9a-f]{1,6}|#[0-9]{1,7}|[a-z][a-z0-9]{1,31});$")
        .expect("valid entity pattern")
});

pub fn rule(state: &mut InlineState, silent: bool) -> bool {
    let pos = state.pos;
    let max = state.pos_max;
    if state.link_level > 0 || pos + 3 > max {
        return false;
    }
    if &state.src.as_bytes()[pos..pos + 3] != b"://" {
        return false;
    }
    let src = state.src;
    let Some(start) = SCHEME_RE
        .captures(&src[..pos])
        .and_then(|caps| caps.get(1))
        .map(|m| m.start())
    else {
        return false;
    };
    let glued = ENTITY_END_RE.is_match(&src[..start]);
    if glued || (!silent && !state.pending_covers(start, pos)) {
        return false;
    }
    let proto_len = pos - start;

    let mut finder = LinkFinder::new();
    finder.kinds(&[LinkKind::Url]);
    let Some(link) = src.get(start..max).and_then(|rest| finder.links(rest).next()) else {
        return false;
    };
    if link.start() != 0 || link.end() <= proto_len {
        return false;
    }
    // a trailing `*` belongs to emphasis
    let url = link.as_str().trim_end_matches('*');
    if url.len() <= proto_len {
        return false;
    }
    let href = normalize_link(url);
    if !validate_link(&href) {
        return false;
    }

    let end = start + url.len();
    if !silent {
        let keep = state.pending.len() - proto_len;
        state.pending.truncate(keep);
        push_link(state, "linkify", href, normalize_link_text(url), start, end);
    }
    state.pos = end;
    true
}

#[cfg(test)]
mod tests {
    use markit_core::{meta_str, InlineSource, LineIndex};

    use crate::env::Env;
    use crate::inline::tests::kinds;
    use crate::inline::{parse, InlineRules};
    use crate::rules::presets::Preset;

    fn scan_linkify(text: &str) -> Vec<markit_core::Token> {
        let mut registry = Preset::CommonMark.registry();
        registry.set_enabled("linkify", true).unwrap();
        let rules = InlineRules::new(&registry.inline, &registry.inline2);
        let options = Preset::CommonMark.options();
        let mut env = Env::default();
        let index = LineIndex::new(text);
        let source = InlineSource::new(text.into(), vec![(0, 0)]);
        parse(&source, &options, &rules, &mut env, &index)
    }

    #[test]
    fn test_protocol_link() {
        let tokens = scan_linkify("see https://example.com/a.");
        assert_eq!(
            kinds(&tokens),
            vec!["text", "linkify_open", "text", "linkify_close", "text"]
        );
        assert_eq!(tokens[0].content, "see ");
        assert_eq!(meta_str(&tokens[1].meta, "url"), "https://example.com/a");
        assert_eq!(tokens[4].content, ".");
    }

    #[test]
    fn test_scheme_after_entity_is_text() {
        let tokens = scan_linkify("&#104;ttp://a.example");
        assert!(tokens.iter().all(|t| t.kind != "linkify_open"));
    }

    #[test]
    fn test_scheme_after_multibyte_label_text() {
        let tokens = scan_linkify("m[\u{1f600}://");
        assert!(tokens.iter().all(|t| t.kind != "linkify_open"));
        let text: String = tokens.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(text, "m[\u{1f600}://");
    }

    #[test]
    fn test_not_inside_links() {
        let tokens = scan_linkify("[https://a.com](/x)");
        assert_eq!(tokens.iter().filter(|t| t.kind == "linkify_open").count(), 0);
    }
}
