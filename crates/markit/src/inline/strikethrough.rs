//! `~~strikethrough~~`
//!
//! Markers are consumed in pairs; an odd run leaves one literal `~` in
//! front. Pairs go through the shared delimiter list with length 0, so the
//! emphasis rule of three never applies to them.

use markit_core::Nesting;

use super::{Delimiter, InlineState};

pub fn tokenize(state: &mut InlineState, silent: bool) -> bool {
    let start = state.pos;
    let marker = state.byte(start);
    if silent {
        return false;
    }
    if marker != b'~' {
        return false;
    }

    let run = state.scan_delims(start, true);
    let mut len = run.length;
    if len < 2 {
        return false;
    }

    let mut pos = start;
    if len % 2 == 1 {
        let span = state.span(pos, pos + 1);
        let token = state.push("text", Nesting::SelfClosing);
        token.content = "~".to_string();
        token.span = span;
        pos += 1;
        len -= 1;
    }
    for _ in 0..len / 2 {
        let span = state.span(pos, pos + 2);
        let token = state.push("text", Nesting::SelfClosing);
        token.content = "~~".to_string();
        token.span = span;
        let token = state.tokens.len() - 1;
        state.delimiters.push(Delimiter {
            marker,
            length: 0,
            token,
            end: None,
            open: run.can_open,
            close: run.can_close,
        });
        pos += 2;
    }
    state.pos += run.length;
    true
}

fn process(state: &mut InlineState, which: Option<usize>) {
    let InlineState {
        tokens,
        delimiters,
        tokens_meta,
        ..
    } = state;
    let delimiters: &[Delimiter] = match which {
        None => delimiters.as_slice(),
        Some(idx) => match tokens_meta[idx].as_deref() {
            Some(list) => list,
            None => return,
        },
    };

    let mut lone_markers = Vec::new();
    for start in delimiters {
        if start.marker != b'~' {
            continue;
        }
        let Some(end_idx) = start.end else {
            continue;
        };
        let end = &delimiters[end_idx];

        let open = &mut tokens[start.token];
        open.kind = "strikethrough_open".to_string();
        open.nesting = Nesting::Open;
        open.content.clear();
        open.set_meta("marker", "~~");

        let close = &mut tokens[end.token];
        close.kind = "strikethrough_close".to_string();
        close.nesting = Nesting::Close;
        close.content.clear();

        if end.token > 0 {
            let before = &tokens[end.token - 1];
            if before.kind == "text" && before.content == "~" {
                lone_markers.push(end.token - 1);
            }
        }
    }

    // `~~~~~` splits as `~` `~~` `~~`: move each lone marker behind the
    // closing tokens that follow it
    while let Some(i) = lone_markers.pop() {
        let mut j = i + 1;
        while j < tokens.len() && tokens[j].kind == "strikethrough_close" {
            j += 1;
        }
        j -= 1;
        if i != j {
            tokens.swap(i, j);
        }
    }
}

pub fn post_process(state: &mut InlineState) {
    process(state, None);
    for idx in 0..state.tokens_meta.len() {
        process(state, Some(idx));
    }
}
