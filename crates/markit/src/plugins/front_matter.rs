//! YAML-style front matter: `---` on the first line up to the next `---`

use markit_core::Nesting;

use crate::block::{BlockState, ParentType};

fn is_fence(state: &BlockState, line: usize) -> bool {
    let text = &state.src[state.b_marks[line]..state.e_marks[line]];
    text.trim_end() == "---"
}

pub fn rule(state: &mut BlockState, start_line: usize, end_line: usize, silent: bool) -> bool {
    if start_line != 0 || state.parent_type != ParentType::Root || state.blk_indent != 0 {
        return false;
    }
    if !is_fence(state, start_line) {
        return false;
    }
    let mut close = start_line + 1;
    while close < end_line && !is_fence(state, close) {
        close += 1;
    }
    if close >= end_line {
        return false;
    }
    if silent {
        return true;
    }

    let (content, _) = state.get_lines(start_line + 1, close, 0, true);
    let span = state.lines_span(start_line, close + 1);
    state.line = close + 1;
    let token = state.push("front_matter", Nesting::SelfClosing);
    token.content = content;
    token.span = span;
    true
}

#[cfg(test)]
mod tests {
    use crate::core_rules::tests::run;
    use crate::rules::presets::Preset;

    #[test]
    fn test_front_matter_block() {
        let mut registry = Preset::CommonMark.registry();
        registry.set_enabled("front_matter", true).unwrap();
        let tokens = run(
            &registry,
            &Preset::CommonMark.options(),
            "---\ntitle: x\n---\n# Hi\n",
        );
        assert_eq!(tokens[0].kind, "front_matter");
        assert_eq!(tokens[0].content, "title: x\n");
        assert_eq!(tokens[1].kind, "heading_open");
    }

    #[test]
    fn test_unclosed_is_not_front_matter() {
        let mut registry = Preset::CommonMark.registry();
        registry.set_enabled("front_matter", true).unwrap();
        let tokens = run(&registry, &Preset::CommonMark.options(), "---\ntext\n");
        assert_eq!(tokens[0].kind, "hr");
    }
}
