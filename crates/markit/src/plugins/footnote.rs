//! Footnotes
//!
//! - definitions `[^label]: text`, continued by lines indented four spaces
//! - references `[^label]` to a defined label
//! - inline notes `^[text]`
//!
//! Notes are numbered in order of first reference. The core pass moves the
//! referenced definitions out of the document flow into a trailing
//! `footnote_container`; unreferenced definitions are dropped.

use std::collections::HashMap;

use markit_core::{meta_str, HtmlWriter, MetaValue, Nesting, RenderNode, Token};

use crate::block::{BlockState, ParentType};
use crate::core_rules::CoreState;
use crate::inline::helpers::parse_link_label;
use crate::inline::InlineState;
use crate::utilities::normalize_reference;

pub fn definition(state: &mut BlockState, start_line: usize, end_line: usize, silent: bool) -> bool {
    let start = state.b_marks[start_line] + state.t_shift[start_line];
    let max = state.e_marks[start_line];

    if state.s_count[start_line] - state.blk_indent >= 4 {
        return false;
    }
    // at least `[^x]:`
    if start + 4 > max || state.byte(start) != b'[' || state.byte(start + 1) != b'^' {
        return false;
    }
    let mut pos = start + 2;
    while pos < max {
        match state.byte(pos) {
            b' ' => return false,
            b']' => break,
            _ => pos += 1,
        }
    }
    if pos == start + 2 || pos + 1 >= max || state.byte(pos + 1) != b':' {
        return false;
    }
    if silent {
        return true;
    }

    let label = state.src[start + 2..pos].to_string();
    state
        .env
        .footnotes
        .defined
        .entry(normalize_reference(&label))
        .or_insert_with(|| label.clone());

    let open_idx = state.tokens.len();
    state
        .push("footnote_def_open", Nesting::Open)
        .set_meta("label", label);

    let old_b_mark = state.b_marks[start_line];
    let old_t_shift = state.t_shift[start_line];
    let old_s_count = state.s_count[start_line];
    let old_parent = state.parent_type;

    let pos_after_colon = pos + 2;
    let initial = state.s_count[start_line] + (pos_after_colon - start) as i32;
    let mut offset = initial;
    let mut pos = pos_after_colon;
    while pos < max {
        match state.byte(pos) {
            b'\t' => offset += 4 - offset % 4,
            b' ' => offset += 1,
            _ => break,
        }
        pos += 1;
    }

    state.t_shift[start_line] = pos - pos_after_colon;
    state.s_count[start_line] = offset - initial;
    state.b_marks[start_line] = pos_after_colon;
    state.blk_indent += 4;
    state.parent_type = ParentType::Footnote;
    if state.s_count[start_line] < state.blk_indent {
        state.s_count[start_line] += state.blk_indent;
    }

    state.tokenize(start_line, end_line);

    state.parent_type = old_parent;
    state.blk_indent -= 4;
    state.t_shift[start_line] = old_t_shift;
    state.s_count[start_line] = old_s_count;
    state.b_marks[start_line] = old_b_mark;

    state.tokens[open_idx].span = state.lines_span(start_line, state.line);
    state.push("footnote_def_close", Nesting::Close);
    true
}

/// `[^label]`
fn reference(state: &mut InlineState, silent: bool) -> bool {
    let start = state.pos;
    let max = state.pos_max;
    if start + 3 > max || state.byte(start + 1) != b'^' {
        return false;
    }
    if state.env.footnotes.defined.is_empty() {
        return false;
    }
    let mut pos = start + 2;
    while pos < max {
        match state.byte(pos) {
            b' ' | b'\n' => return false,
            b']' => break,
            _ => pos += 1,
        }
    }
    if pos == start + 2 || pos >= max {
        return false;
    }

    let src = state.src;
    let label = &src[start + 2..pos];
    if silent {
        if !state.env.footnotes.defined.contains_key(&normalize_reference(label)) {
            return false;
        }
    } else {
        let Some((def_id, ref_id)) = state.env.footnotes.reference(label) else {
            return false;
        };
        let span = state.span(start, pos + 1);
        let token = state.push("footnote_ref", Nesting::SelfClosing);
        token.set_meta("def_id", def_id);
        token.set_meta("ref_id", ref_id);
        token.set_meta("label", label);
        token.span = span;
    }
    state.pos = pos + 1;
    true
}

/// `^[text]`
fn inline_note(state: &mut InlineState, silent: bool) -> bool {
    let start = state.pos;
    if start + 2 >= state.pos_max || state.byte(start + 1) != b'[' {
        return false;
    }
    let Some(label_end) = parse_link_label(state, start + 1, false) else {
        return false;
    };

    if !silent {
        let def_id = state.env.footnotes.inline_note();
        let tokens = state.parse_nested(start + 2, label_end);
        state.env.footnotes.list[def_id].inline = Some(tokens);
        let span = state.span(start, label_end + 1);
        let token = state.push("footnote_ref", Nesting::SelfClosing);
        token.set_meta("def_id", def_id);
        token.set_meta("ref_id", 0usize);
        token.span = span;
    }
    state.pos = label_end + 1;
    true
}

pub fn inline_rule(state: &mut InlineState, silent: bool) -> bool {
    match state.byte(state.pos) {
        b'[' => reference(state, silent),
        b'^' => inline_note(state, silent),
        _ => false,
    }
}

fn block_token(kind: &str, nesting: Nesting) -> Token {
    let mut token = Token::new(kind, nesting);
    token.block = true;
    token
}

/// Definition bodies by normalized label; the first definition wins
fn extract_definitions(tokens: Vec<Token>) -> (Vec<Token>, HashMap<String, (Token, Vec<Token>)>) {
    let mut kept = Vec::with_capacity(tokens.len());
    let mut bodies = HashMap::new();
    let mut iter = tokens.into_iter();
    while let Some(token) = iter.next() {
        if token.kind != "footnote_def_open" {
            kept.push(token);
            continue;
        }
        let key = normalize_reference(meta_str(&token.meta, "label"));
        let mut body = Vec::new();
        let mut depth = 1usize;
        for inner in iter.by_ref() {
            match inner.nesting {
                Nesting::Open => depth += 1,
                Nesting::Close => depth -= 1,
                Nesting::SelfClosing => {}
            }
            if depth == 0 {
                break;
            }
            body.push(inner);
        }
        bodies.entry(key).or_insert((token, body));
    }
    (kept, bodies)
}

pub fn tail(state: &mut CoreState) {
    let tokens = std::mem::take(&mut state.tokens);
    let (mut tokens, mut bodies) = extract_definitions(tokens);
    let list = std::mem::take(&mut state.env.footnotes.list);
    if list.is_empty() {
        state.tokens = tokens;
        return;
    }

    tokens.push(block_token("footnote_container_open", Nesting::Open));
    for (def_id, entry) in list.into_iter().enumerate() {
        let inline_note = entry.inline.is_some();
        let (mut open, mut body) = match (entry.inline, entry.label) {
            (Some(children), _) => {
                let mut inline = block_token("inline", Nesting::SelfClosing);
                inline.children = children;
                let body = vec![
                    block_token("paragraph_open", Nesting::Open),
                    inline,
                    block_token("paragraph_close", Nesting::Close),
                ];
                (block_token("footnote_def_open", Nesting::Open), body)
            }
            (None, Some(label)) => bodies
                .remove(&normalize_reference(&label))
                .unwrap_or_else(|| (block_token("footnote_def_open", Nesting::Open), Vec::new())),
            (None, None) => continue,
        };
        open.set_meta("def_id", def_id);
        open.set_meta("inline", inline_note);

        let ref_ids: Vec<MetaValue> = (0..entry.count.max(1)).map(MetaValue::from).collect();
        let anchor = Token::new("footnote_ref_anchor", Nesting::SelfClosing)
            .with_meta("def_id", def_id)
            .with_meta("ref_ids", ref_ids);
        // the back references go inside the last paragraph
        match body.last() {
            Some(last) if last.kind == "paragraph_close" => {
                let at = body.len() - 1;
                body.insert(at, anchor);
            }
            _ => body.push(anchor),
        }

        tokens.push(open);
        tokens.extend(body);
        tokens.push(block_token("footnote_def_close", Nesting::Close));
    }
    tokens.push(block_token("footnote_container_close", Nesting::Close));
    state.tokens = tokens;
}

/// 1-based number shown for a note
fn number(node: &RenderNode) -> i64 {
    node.meta_int("def_id").unwrap_or(0) + 1
}

fn ref_anchor_id(n: i64, ref_id: i64) -> String {
    if ref_id > 0 {
        format!("fnref{n}:{ref_id}")
    } else {
        format!("fnref{n}")
    }
}

pub fn render_ref(node: &RenderNode, w: &mut HtmlWriter) {
    let n = number(node);
    let id = ref_anchor_id(n, node.meta_int("ref_id").unwrap_or(0));
    w.open("sup", &node.attrs_with(&[("class", "footnote-ref".to_string())]));
    w.open(
        "a",
        &[("href".to_string(), format!("#fn{n}")), ("id".to_string(), id)],
    );
    w.text(&format!("[{n}]"));
    w.close("a");
    w.close("sup");
}

pub fn render_anchor(node: &RenderNode, w: &mut HtmlWriter) {
    let n = number(node);
    let ref_ids: Vec<i64> = match node.meta.get("ref_ids") {
        Some(MetaValue::List(ids)) => ids.iter().filter_map(MetaValue::as_int).collect(),
        _ => vec![0],
    };
    for ref_id in ref_ids {
        w.raw(" ");
        w.open(
            "a",
            &[
                ("href".to_string(), format!("#{}", ref_anchor_id(n, ref_id))),
                ("class".to_string(), "footnote-backref".to_string()),
            ],
        );
        w.raw("\u{21a9}\u{fe0e}");
        w.close("a");
    }
}

pub fn open_container(node: &RenderNode, w: &mut HtmlWriter) {
    w.cr();
    w.void("hr", &[("class".to_string(), "footnotes-sep".to_string())]);
    w.cr();
    w.open("section", &node.attrs_with(&[("class", "footnotes".to_string())]));
    w.cr();
    w.open("ol", &[("class".to_string(), "footnotes-list".to_string())]);
    w.cr();
}

pub fn close_container(_: &RenderNode, w: &mut HtmlWriter) {
    w.cr();
    w.close("ol");
    w.cr();
    w.close("section");
    w.cr();
}

pub fn open_def(node: &RenderNode, w: &mut HtmlWriter) {
    let n = number(node);
    w.cr();
    w.open(
        "li",
        &node.attrs_with(&[
            ("id", format!("fn{n}")),
            ("class", "footnote-item".to_string()),
        ]),
    );
}

pub fn close_def(_: &RenderNode, w: &mut HtmlWriter) {
    w.cr();
    w.close("li");
    w.cr();
}
