//! GFM task list items: `- [ ] todo`, `- [x] done`

use markit_core::{HtmlWriter, LineIndex, Nesting, RenderNode, Token};

use crate::core_rules::CoreState;

/// Checked state when `children` start with a task marker
fn marker(children: &[Token]) -> Option<bool> {
    let first = children.first().filter(|t| t.kind == "text")?;
    let bytes = first.content.as_bytes();
    if bytes.len() < 3 || bytes[0] != b'[' || bytes[2] != b']' {
        return None;
    }
    let checked = match bytes[1] {
        b' ' => false,
        b'x' | b'X' => true,
        _ => return None,
    };
    match bytes.get(3) {
        None | Some(b' ') | Some(b'\t') => Some(checked),
        _ => None,
    }
}

/// Replace the `[x]` prefix of the first text child with a checkbox
fn insert_checkbox(inline: &mut Token, checked: bool, index: &LineIndex) {
    let first = &mut inline.children[0];
    let mut checkbox = Token::new("todo_checkbox", Nesting::SelfClosing)
        .with_meta("checked", checked)
        .with_meta("disabled", true);
    if let Some(span) = first.span {
        let start = span.start.offset;
        checkbox.span = Some(index.span(start, (start + 3).min(span.end.offset)));
        first.span = Some(index.span((start + 3).min(span.end.offset), span.end.offset));
    }
    first.content.replace_range(..3, "");
    if first.content.is_empty() {
        inline.children.remove(0);
    }
    inline.children.insert(0, checkbox);
}

/// Index of the list opening the item at `item`
fn enclosing_list(tokens: &[Token], item: usize) -> Option<usize> {
    let mut depth = 0usize;
    for j in (0..item).rev() {
        match tokens[j].nesting {
            Nesting::Close => depth += 1,
            Nesting::Open if depth == 0 => return Some(j),
            Nesting::Open => depth -= 1,
            Nesting::SelfClosing => {}
        }
    }
    None
}

fn add_class(token: &mut Token, class: &str) {
    let present = token
        .attrs
        .get("class")
        .is_some_and(|c| c.split(' ').any(|c| c == class));
    if !present {
        token.join_attr("class", class);
    }
}

pub fn rule(state: &mut CoreState) {
    let tokens = &mut state.tokens;
    for i in 2..tokens.len() {
        if tokens[i].kind != "inline"
            || tokens[i - 1].kind != "paragraph_open"
            || tokens[i - 2].kind != "list_item_open"
        {
            continue;
        }
        let Some(checked) = marker(&tokens[i].children) else {
            continue;
        };
        insert_checkbox(&mut tokens[i], checked, &state.line_index);
        add_class(&mut tokens[i - 2], "task-list-item");
        if let Some(list) = enclosing_list(tokens, i - 2) {
            add_class(&mut tokens[list], "contains-task-list");
        }
    }
}

pub fn render(node: &RenderNode, w: &mut HtmlWriter) {
    let mut leading = vec![("class", "task-list-item-checkbox".to_string())];
    if node.meta_bool("checked") {
        leading.push(("checked", String::new()));
    }
    if node.meta_bool("disabled") {
        leading.push(("disabled", String::new()));
    }
    leading.push(("type", "checkbox".to_string()));
    w.void("input", &node.attrs_with(&leading));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_rules::tests::run;
    use crate::rules::presets::Preset;

    #[test]
    fn test_marker() {
        assert_eq!(marker(&[Token::text("[ ] a")]), Some(false));
        assert_eq!(marker(&[Token::text("[X] a")]), Some(true));
        assert_eq!(marker(&[Token::text("[x]a")]), None);
        assert_eq!(marker(&[Token::text("[-] a")]), None);
    }

    #[test]
    fn test_items_and_list_get_classes() {
        let registry = Preset::Gfm.registry();
        let tokens = run(&registry, &Preset::Gfm.options(), "- [x] done\n- [ ] todo\n");
        assert_eq!(tokens[0].attrs["class"], "contains-task-list");
        assert_eq!(tokens[1].attrs["class"], "task-list-item");
        let inline = &tokens[3];
        assert_eq!(inline.children[0].kind, "todo_checkbox");
        assert_eq!(inline.children[1].content, " done");
        let span = inline.children[1].span.unwrap();
        assert_eq!((span.start.offset, span.end.offset), (5, 10));
    }
}
