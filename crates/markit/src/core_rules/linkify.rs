//! Bare links in text found by the `linkify` crate
//!
//! Text inside links, autolinks and raw `<a>` tags is left alone. URLs
//! without a scheme get `http://`, e-mail addresses `mailto:`.

use linkify::{LinkFinder, LinkKind};
use markit_core::{LineIndex, Nesting, SourceSpan, Token};

use super::CoreState;
use crate::inline::html_inline::{LINK_CLOSE_RE, LINK_OPEN_RE};
use crate::utilities::{normalize_link, normalize_link_text, validate_link};

fn href(kind: &LinkKind, link: &str) -> String {
    match kind {
        LinkKind::Email => normalize_link(&format!("mailto:{link}")),
        _ if link.contains("://") => normalize_link(link),
        _ => normalize_link(&format!("http://{link}")),
    }
}

/// Span of `start..end` inside a text token, when its content maps one to
/// one onto the source
fn sub_span(
    index: &LineIndex,
    token: &Token,
    start: usize,
    end: usize,
) -> Option<SourceSpan> {
    let span = token.span?;
    if span.len() != token.content.len() {
        return Some(span);
    }
    Some(index.span(span.start.offset + start, span.start.offset + end))
}

/// `glued` is set when the text directly follows an entity or escape, which
/// then belongs to a link starting at offset 0
fn split(finder: &LinkFinder, index: &LineIndex, token: Token, glued: bool, out: &mut Vec<Token>) {
    let links: Vec<(usize, usize, String)> = finder
        .links(&token.content)
        .filter(|link| !(glued && link.start() == 0))
        .filter_map(|link| {
            let url = href(link.kind(), link.as_str());
            validate_link(&url).then(|| (link.start(), link.end(), url))
        })
        .collect();
    if links.is_empty() {
        out.push(token);
        return;
    }

    let content = token.content.as_str();
    let mut last = 0;
    for (start, end, url) in links {
        if start > last {
            let mut text = Token::text(&content[last..start]);
            text.span = sub_span(index, &token, last, start);
            out.push(text);
        }
        let span = sub_span(index, &token, start, end);
        let mut open = Token::new("linkify_open", Nesting::Open).with_meta("url", url);
        open.span = span;
        let mut text = Token::text(&normalize_link_text(&content[start..end]));
        text.span = span;
        out.extend([open, text, Token::new("linkify_close", Nesting::Close)]);
        last = end;
    }
    if last < content.len() {
        let mut text = Token::text(&content[last..]);
        text.span = sub_span(index, &token, last, content.len());
        out.push(text);
    }
}

fn linkify_children(finder: &LinkFinder, index: &LineIndex, children: Vec<Token>) -> Vec<Token> {
    let mut out = Vec::with_capacity(children.len());
    let mut link_depth = 0usize;
    let mut html_link_level = 0usize;
    let mut after_special = false;
    for token in children {
        let glued = std::mem::replace(&mut after_special, token.kind == "text_special");
        match token.kind.as_str() {
            "link_open" | "autolink_open" | "linkify_open" => link_depth += 1,
            "link_close" | "autolink_close" | "linkify_close" => {
                link_depth = link_depth.saturating_sub(1)
            }
            "html_inline" => {
                if LINK_OPEN_RE.is_match(&token.content) {
                    html_link_level += 1;
                }
                if LINK_CLOSE_RE.is_match(&token.content) {
                    html_link_level = html_link_level.saturating_sub(1);
                }
            }
            "text" if link_depth == 0 && html_link_level == 0 => {
                split(finder, index, token, glued, &mut out);
                continue;
            }
            _ => {}
        }
        out.push(token);
    }
    out
}

pub fn rule(state: &mut CoreState) {
    let mut finder = LinkFinder::new();
    finder
        .kinds(&[LinkKind::Url, LinkKind::Email])
        .url_must_have_scheme(false);
    for token in &mut state.tokens {
        if token.kind != "inline" {
            continue;
        }
        let children = std::mem::take(&mut token.children);
        token.children = linkify_children(&finder, &state.line_index, children);
    }
}

#[cfg(test)]
mod tests {
    use markit_core::meta_str;

    use crate::core_rules::tests::{first_inline, run};
    use crate::rules::presets::Preset;

    fn linkified(src: &str) -> Vec<markit_core::Token> {
        let mut registry = Preset::CommonMark.registry();
        registry.set_enabled("linkify", true).unwrap();
        let tokens = run(&registry, &Preset::CommonMark.options(), src);
        first_inline(&tokens).to_vec()
    }

    #[test]
    fn test_fuzzy_links_and_email() {
        let children = linkified("see www.example.com or me@example.com");
        let urls: Vec<&str> = children
            .iter()
            .filter(|t| t.kind == "linkify_open")
            .map(|t| meta_str(&t.meta, "url"))
            .collect();
        assert_eq!(urls, vec!["http://www.example.com", "mailto:me@example.com"]);
        assert_eq!(children[0].content, "see ");
    }

    #[test]
    fn test_link_span_inside_text() {
        let children = linkified("go www.example.com");
        let open = children.iter().find(|t| t.kind == "linkify_open").unwrap();
        let span = open.span.unwrap();
        assert_eq!((span.start.offset, span.end.offset), (3, 18));
    }

    #[test]
    fn test_entity_is_not_part_of_scheme() {
        let children = linkified("&#104;ttp://a.example");
        assert!(children.iter().all(|t| t.kind != "linkify_open"));
        let children = linkified("&amp; www.example.com");
        assert_eq!(children.iter().filter(|t| t.kind == "linkify_open").count(), 1);
    }

    #[test]
    fn test_skips_link_text() {
        let children = linkified("[www.example.com](/x)");
        assert!(children.iter().all(|t| t.kind != "linkify_open"));
    }
}
