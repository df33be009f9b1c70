//! GitHub-style heading ids with a leading anchor link

use std::collections::HashMap;

use markit_core::{HtmlWriter, Nesting, RenderNode, Token};

use crate::core_rules::CoreState;

/// Lowercase, drop punctuation, spaces to `-`
pub fn slugify(text: &str) -> String {
    text.trim()
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                Some(c.to_lowercase().collect::<String>())
            } else if c.is_whitespace() {
                Some("-".to_string())
            } else {
                None
            }
        })
        .collect()
}

fn plain_text(tokens: &[Token], out: &mut String) {
    for token in tokens {
        match token.kind.as_str() {
            "text" | "text_special" => out.push_str(&token.content),
            "softbreak" | "hardbreak" => out.push(' '),
            _ => plain_text(&token.children, out),
        }
    }
}

pub fn rule(state: &mut CoreState) {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let tokens = &mut state.tokens;
    for i in 0..tokens.len().saturating_sub(1) {
        if !matches!(tokens[i].kind.as_str(), "heading_open" | "lheading_open") {
            continue;
        }
        if tokens[i + 1].kind != "inline" {
            continue;
        }
        let mut text = String::new();
        plain_text(&tokens[i + 1].children, &mut text);
        let base = slugify(&text);
        let count = seen.entry(base.clone()).or_insert(0);
        let slug = match *count {
            0 => base,
            n => format!("{base}-{n}"),
        };
        *count += 1;

        tokens[i].set_attr("id", slug.as_str());
        let anchor = Token::new("heading_anchor", Nesting::SelfClosing)
            .with_meta("href", format!("#{slug}"));
        tokens[i + 1].children.insert(0, anchor);
    }
}

pub fn render(node: &RenderNode, w: &mut HtmlWriter) {
    let attrs = node.attrs_with(&[
        ("class", "anchor".to_string()),
        ("aria-hidden", "true".to_string()),
        ("href", node.meta_str("href").to_string()),
    ]);
    w.open("a", &attrs);
    w.close("a");
}
