//! `![description](src "title")`

use markit_core::Nesting;

use super::helpers::parse_link_label;
use super::link::parse_target;
use super::InlineState;

pub fn rule(state: &mut InlineState, silent: bool) -> bool {
    let start = state.pos;
    if state.byte(start) != b'!' || state.byte(start + 1) != b'[' {
        return false;
    }
    let label_start = start + 2;
    let Some(label_end) = parse_link_label(state, start + 1, false) else {
        return false;
    };
    let Some(target) = parse_target(state, label_start, label_end) else {
        state.pos = start;
        return false;
    };

    if !silent {
        let children = state.parse_nested(label_start, label_end);
        let span = state.span(start, target.end);
        let token = state.push("image", Nesting::SelfClosing);
        token.set_meta("url", target.url);
        if let Some(title) = target.title {
            token.set_meta("title", title);
        }
        token.children = children;
        token.span = span;
    }
    state.pos = target.end;
    true
}

#[cfg(test)]
mod tests {
    use markit_core::meta_str;

    use crate::inline::tests::{kinds, scan};
    use crate::rules::presets::Preset;

    #[test]
    fn test_image_children() {
        let tokens = scan(Preset::CommonMark, "![a *b*](/i.png 't')");
        assert_eq!(kinds(&tokens), vec!["image"]);
        assert_eq!(meta_str(&tokens[0].meta, "url"), "/i.png");
        assert_eq!(meta_str(&tokens[0].meta, "title"), "t");
        assert_eq!(kinds(&tokens[0].children), vec!["text", "em_open", "text", "em_close"]);
        let span = tokens[0].children[0].span.unwrap();
        assert_eq!(span.start.offset, 2);
    }
}
