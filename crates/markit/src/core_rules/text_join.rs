//! Turn `text_special` back into plain text and merge adjacent text tokens

use markit_core::Token;

use super::CoreState;
use crate::inline::join_spans;

fn join(tokens: &mut Vec<Token>) {
    for token in tokens.iter_mut() {
        if token.kind == "text_special" {
            token.kind = "text".to_string();
            token.meta.clear();
        }
        if !token.children.is_empty() {
            join(&mut token.children);
        }
    }

    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    for token in tokens.drain(..) {
        if token.kind == "text" {
            if let Some(last) = out.last_mut().filter(|last| last.kind == "text") {
                last.content.push_str(&token.content);
                last.span = join_spans(last.span, token.span);
                continue;
            }
        }
        out.push(token);
    }
    *tokens = out;
}

pub fn rule(state: &mut CoreState) {
    for token in &mut state.tokens {
        if token.kind == "inline" {
            join(&mut token.children);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::core_rules::tests::{first_inline, run};
    use crate::rules::presets::Preset;

    #[test]
    fn test_escapes_merge_into_text() {
        let registry = Preset::CommonMark.registry();
        let tokens = run(&registry, &Preset::CommonMark.options(), r"a \* b &amp; c");
        let children = first_inline(&tokens);
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].kind, "text");
        assert_eq!(children[0].content, "a * b & c");
        let span = children[0].span.unwrap();
        assert_eq!((span.start.offset, span.end.offset), (0, 14));
    }

    #[test]
    fn test_disabled_keeps_text_special() {
        let mut registry = Preset::CommonMark.registry();
        registry.set_enabled("text_join", false).unwrap();
        let tokens = run(&registry, &Preset::CommonMark.options(), r"a \*");
        let kinds: Vec<&str> = first_inline(&tokens).iter().map(|t| t.kind.as_str()).collect();
        assert_eq!(kinds, vec!["text", "text_special"]);
    }
}
