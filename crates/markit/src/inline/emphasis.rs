//! `*` and `_` emphasis
//!
//! The tokenizer pushes one text token per marker character and records it
//! on the delimiter list; after balance_pairs matched openers with closers,
//! the post pass rewrites matched markers into `em`/`strong` tokens. Two
//! adjacent matched pairs collapse into one `strong`.

use markit_core::Nesting;

use super::{join_spans, Delimiter, InlineState};

pub fn tokenize(state: &mut InlineState, silent: bool) -> bool {
    let start = state.pos;
    let marker = state.byte(start);
    if silent {
        return false;
    }
    if marker != b'_' && marker != b'*' {
        return false;
    }

    let run = state.scan_delims(start, marker == b'*');
    for i in 0..run.length {
        let span = state.span(start + i, start + i + 1);
        let token = state.push("text", Nesting::SelfClosing);
        token.content = (marker as char).to_string();
        token.span = span;
        let token = state.tokens.len() - 1;
        state.delimiters.push(Delimiter {
            marker,
            length: run.length,
            token,
            end: None,
            open: run.can_open,
            close: run.can_close,
        });
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

    let mut i = delimiters.len();
    while i > 0 {
        i -= 1;
        let start = &delimiters[i];
        if start.marker != b'_' && start.marker != b'*' {
            continue;
        }
        let Some(end_idx) = start.end else {
            continue;
        };
        let end = &delimiters[end_idx];

        let is_strong = i > 0
            && delimiters[i - 1].end == Some(end_idx + 1)
            && delimiters[i - 1].marker == start.marker
            && delimiters[i - 1].token + 1 == start.token
            && delimiters.get(end_idx + 1).map(|d| d.token) == Some(end.token + 1);

        let ch = (start.marker as char).to_string();
        let (kind, markup) = if is_strong {
            ("strong", ch.repeat(2))
        } else {
            ("em", ch)
        };

        let (open_span, close_span) = if is_strong {
            let outer_open = tokens[delimiters[i - 1].token].span;
            let outer_close = tokens[delimiters[end_idx + 1].token].span;
            (
                join_spans(outer_open, tokens[start.token].span),
                join_spans(tokens[end.token].span, outer_close),
            )
        } else {
            (tokens[start.token].span, tokens[end.token].span)
        };

        let open = &mut tokens[start.token];
        open.kind = format!("{kind}_open");
        open.nesting = Nesting::Open;
        open.content.clear();
        open.span = open_span;
        open.set_meta("marker", markup.as_str());

        let close = &mut tokens[end.token];
        close.kind = format!("{kind}_close");
        close.nesting = Nesting::Close;
        close.content.clear();
        close.span = close_span;

        if is_strong {
            tokens[delimiters[i - 1].token].content.clear();
            tokens[delimiters[end_idx + 1].token].content.clear();
            i -= 1;
        }
    }
}

pub fn post_process(state: &mut InlineState) {
    process(state, None);
    for idx in 0..state.tokens_meta.len() {
        process(state, Some(idx));
    }
}

#[cfg(test)]
mod tests {
    use crate::inline::tests::{kinds, scan};
    use crate::rules::presets::Preset;

    #[test]
    fn test_em_and_strong() {
        let tokens = scan(Preset::CommonMark, "*a* **b**");
        assert_eq!(
            kinds(&tokens),
            vec!["em_open", "text", "em_close", "text", "strong_open", "text", "strong_close"]
        );
        assert_eq!(tokens[4].meta.get("marker").map(|m| m.to_string()).as_deref(), Some("**"));
    }

    #[test]
    fn test_strong_span_covers_both_markers() {
        let tokens = scan(Preset::CommonMark, "**b**");
        let open = tokens.iter().find(|t| t.kind == "strong_open").unwrap();
        let span = open.span.unwrap();
        assert_eq!((span.start.offset, span.end.offset), (0, 2));
    }

    #[test]
    fn test_intraword_underscore_stays_text() {
        let tokens = scan(Preset::CommonMark, "snake_case_name");
        assert_eq!(kinds(&tokens), vec!["text"]);
        assert_eq!(tokens[0].content, "snake_case_name");
    }

    #[test]
    fn test_rule_of_three() {
        // `*foo**bar**baz*` nests strong inside em
        let tokens = scan(Preset::CommonMark, "*foo**bar**baz*");
        assert_eq!(
            kinds(&tokens),
            vec![
                "em_open",
                "text",
                "strong_open",
                "text",
                "strong_close",
                "text",
                "em_close"
            ]
        );
    }
}
