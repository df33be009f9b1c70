//! Straight quotes to the configured curly quotes
//!
//! Quote characters are classified like emphasis delimiters (flanking on
//! whitespace and punctuation); a closer pairs with the nearest opener of
//! the same kind on the same nesting level. Unpaired single quotes become
//! apostrophes.

use markit_core::Token;

use super::{levels, CoreState};
use crate::utilities::{is_md_ascii_punct, is_punct_char, is_white_space};

const APOSTROPHE: char = '\u{2019}';

struct Opener {
    token: usize,
    pos: usize,
    single: bool,
    level: usize,
}

fn replace_at(text: &mut String, pos: usize, with: char) {
    let mut buf = [0u8; 4];
    text.replace_range(pos..pos + 1, with.encode_utf8(&mut buf));
}

/// Content used when looking across token boundaries
fn edge_content(token: &Token) -> &str {
    if token.kind == "code_inline" {
        return token.children.first().map_or("", |t| t.content.as_str());
    }
    &token.content
}

fn is_break(token: &Token) -> bool {
    token.kind == "softbreak" || token.kind == "hardbreak"
}

fn char_before(tokens: &[Token], i: usize, pos: usize) -> char {
    if let Some(c) = tokens[i].content[..pos].chars().next_back() {
        return c;
    }
    for token in tokens[..i].iter().rev() {
        if is_break(token) {
            break;
        }
        if let Some(c) = edge_content(token).chars().next_back() {
            return c;
        }
    }
    ' '
}

fn char_after(tokens: &[Token], i: usize, pos: usize) -> char {
    if let Some(c) = tokens[i].content[pos..].chars().next() {
        return c;
    }
    for token in &tokens[i + 1..] {
        if is_break(token) {
            break;
        }
        if let Some(c) = edge_content(token).chars().next() {
            return c;
        }
    }
    ' '
}

fn is_punct(c: char) -> bool {
    (c.is_ascii() && is_md_ascii_punct(c as u8)) || is_punct_char(c)
}

fn process(tokens: &mut [Token], quotes: &[char; 4]) {
    let token_levels = levels(tokens);
    let mut stack: Vec<Opener> = Vec::new();

    for i in 0..tokens.len() {
        let level = token_levels[i];
        while stack.last().is_some_and(|o| o.level > level) {
            stack.pop();
        }
        if tokens[i].kind != "text" {
            continue;
        }

        let mut pos = 0;
        'outer: while let Some(found) = tokens[i].content[pos..].find(['\'', '"']) {
            let index = pos + found;
            let single = tokens[i].content.as_bytes()[index] == b'\'';
            pos = index + 1;

            let last = char_before(tokens, i, index);
            let next = char_after(tokens, i, pos);
            let last_punct = is_punct(last);
            let next_punct = is_punct(next);
            let last_white = is_white_space(last);
            let next_white = is_white_space(next);

            let mut can_open = !(next_white || (next_punct && !last_white && !last_punct));
            let mut can_close = !(last_white || (last_punct && !next_white && !next_punct));

            // 1"" counts the first quote as an inch mark
            if next == '"' && !single && last.is_ascii_digit() {
                can_open = false;
                can_close = false;
            }
            if can_open && can_close {
                // inside punctuation runs only, never mid-word
                can_open = last_punct;
                can_close = next_punct;
            }
            if !can_open && !can_close {
                if single {
                    replace_at(&mut tokens[i].content, index, APOSTROPHE);
                    pos = index + APOSTROPHE.len_utf8();
                }
                continue;
            }

            if can_close {
                let mut j = stack.len();
                while j > 0 {
                    j -= 1;
                    if stack[j].level < level {
                        break;
                    }
                    if stack[j].single == single && stack[j].level == level {
                        let (open, close) = if single {
                            (quotes[2], quotes[3])
                        } else {
                            (quotes[0], quotes[1])
                        };
                        let opener = &stack[j];
                        // the closer sits after the opener when both share a token
                        replace_at(&mut tokens[i].content, index, close);
                        replace_at(&mut tokens[opener.token].content, opener.pos, open);
                        pos = index + close.len_utf8();
                        if opener.token == i {
                            pos += open.len_utf8() - 1;
                        }
                        stack.truncate(j);
                        continue 'outer;
                    }
                }
            }

            if can_open {
                stack.push(Opener {
                    token: i,
                    pos: index,
                    single,
                    level,
                });
            } else if can_close && single {
                replace_at(&mut tokens[i].content, index, APOSTROPHE);
                pos = index + APOSTROPHE.len_utf8();
            }
        }
    }
}

pub fn rule(state: &mut CoreState) {
    let quotes = state.options.quotes;
    for token in &mut state.tokens {
        if token.kind != "inline" || !token.content.contains(['\'', '"']) {
            continue;
        }
        process(&mut token.children, &quotes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(text: &str) -> String {
        let mut tokens = vec![Token::text(text)];
        process(&mut tokens, &['“', '”', '‘', '’']);
        tokens.remove(0).content
    }

    #[test]
    fn test_double_and_single() {
        assert_eq!(quote("\"Hello\" and 'hi'"), "“Hello” and ‘hi’");
    }

    #[test]
    fn test_apostrophe() {
        assert_eq!(quote("don't"), "don’t");
        assert_eq!(quote("rock 'n' roll's"), "rock ‘n’ roll’s");
    }

    #[test]
    fn test_inches_stay_straight() {
        assert_eq!(quote("a 1\"\" b"), "a 1\"\" b");
    }

    #[test]
    fn test_quotes_across_emphasis() {
        let mut tokens = vec![
            Token::text("\""),
            Token::new("em_open", markit_core::Nesting::Open),
            Token::text("a"),
            Token::new("em_close", markit_core::Nesting::Close),
            Token::text("\""),
        ];
        process(&mut tokens, &['“', '”', '‘', '’']);
        assert_eq!(tokens[0].content, "“");
        assert_eq!(tokens[4].content, "”");
    }
}
