//! Link component parsers shared by links, images and reference definitions

use super::InlineState;
use crate::utilities::unescape_all;

/// A parsed link component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed {
    pub value: String,
    /// Position after the component
    pub pos: usize,
    /// Newlines crossed
    pub lines: usize,
}

/// Find the `]` closing the label that opens at `start`
///
/// Returns the position of the bracket. With `disable_nested` a label
/// containing a link is rejected, links cannot contain other links.
pub fn parse_link_label(state: &mut InlineState, start: usize, disable_nested: bool) -> Option<usize> {
    let max = state.pos_max;
    let old_pos = state.pos;
    state.pos = start + 1;
    let mut level = 1;
    let mut found = false;

    while state.pos < max {
        let marker = state.byte(state.pos);
        if marker == b']' {
            level -= 1;
            if level == 0 {
                found = true;
                break;
            }
        }
        let prev_pos = state.pos;
        state.skip_token();
        if marker == b'[' {
            if prev_pos == state.pos - 1 {
                // a bare `[` that no rule claimed
                level += 1;
            } else if disable_nested {
                state.pos = old_pos;
                return None;
            }
        }
    }

    let end = found.then_some(state.pos);
    state.pos = old_pos;
    end
}

/// `<dest>` or a bare destination with balanced parentheses
pub fn parse_link_destination(text: &str, start: usize, max: usize) -> Option<Parsed> {
    let bytes = text.as_bytes();
    let mut pos = start;

    if bytes.get(pos) == Some(&b'<') {
        pos += 1;
        while pos < max {
            match bytes[pos] {
                b'\n' | b'<' => return None,
                b'>' => {
                    return Some(Parsed {
                        value: unescape_all(&text[start + 1..pos]).into_owned(),
                        pos: pos + 1,
                        lines: 0,
                    })
                }
                b'\\' if pos + 1 < max => pos += 2,
                _ => pos += 1,
            }
        }
        return None;
    }

    let mut level = 0u32;
    while pos < max {
        let code = bytes[pos];
        if code == b' ' || code < 0x20 || code == 0x7f {
            break;
        }
        if code == b'\\' && pos + 1 < max {
            if bytes[pos + 1] == b' ' {
                break;
            }
            pos += 2;
            continue;
        }
        if code == b'(' {
            level += 1;
            if level > 32 {
                return None;
            }
        }
        if code == b')' {
            if level == 0 {
                break;
            }
            level -= 1;
        }
        pos += 1;
    }

    if start == pos || level != 0 {
        return None;
    }
    Some(Parsed {
        value: unescape_all(&text[start..pos]).into_owned(),
        pos,
        lines: 0,
    })
}

/// `"title"`, `'title'` or `(title)`
pub fn parse_link_title(text: &str, start: usize, max: usize) -> Option<Parsed> {
    let bytes = text.as_bytes();
    if start >= max {
        return None;
    }
    let marker = match bytes[start] {
        b'"' => b'"',
        b'\'' => b'\'',
        b'(' => b')',
        _ => return None,
    };

    let mut lines = 0;
    let mut pos = start + 1;
    while pos < max {
        let code = bytes[pos];
        if code == marker {
            return Some(Parsed {
                value: unescape_all(&text[start + 1..pos]).into_owned(),
                pos: pos + 1,
                lines,
            });
        }
        if code == b'(' && marker == b')' {
            return None;
        }
        if code == b'\n' {
            lines += 1;
        } else if code == b'\\' && pos + 1 < max {
            pos += 1;
            if bytes[pos] == b'\n' {
                lines += 1;
            }
        }
        pos += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_angle_brackets() {
        let parsed = parse_link_destination("<a b>c", 0, 6).unwrap();
        assert_eq!(parsed.value, "a b");
        assert_eq!(parsed.pos, 5);
        assert!(parse_link_destination("<a\nb>", 0, 5).is_none());
    }

    #[test]
    fn test_destination_balanced_parens() {
        let text = "a(b)c) rest";
        let parsed = parse_link_destination(text, 0, text.len()).unwrap();
        assert_eq!(parsed.value, "a(b)c");
        assert!(parse_link_destination("a(b", 0, 3).is_none());
        assert!(parse_link_destination(") x", 0, 3).is_none());
    }

    #[test]
    fn test_destination_unescapes() {
        let text = r"foo\)bar";
        let parsed = parse_link_destination(text, 0, text.len()).unwrap();
        assert_eq!(parsed.value, "foo)bar");
    }

    #[test]
    fn test_title_forms() {
        let text = "\"a\nb\" x";
        let parsed = parse_link_title(text, 0, text.len()).unwrap();
        assert_eq!(parsed.value, "a\nb");
        assert_eq!(parsed.lines, 1);
        assert_eq!(parse_link_title("(t)", 0, 3).unwrap().value, "t");
        assert!(parse_link_title("(a(b)", 0, 5).is_none());
        assert!(parse_link_title("'open", 0, 5).is_none());
    }
}
