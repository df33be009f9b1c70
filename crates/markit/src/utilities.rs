//! Character classes, link helpers and HTML patterns shared by the rules.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;
use unicode_general_category::{get_general_category, GeneralCategory};

/// Block-level tag names that start an html block (condition 6)
pub const HTML_BLOCK_NAMES: &[&str] = &[
    "address", "article", "aside", "base", "basefont", "blockquote", "body",
    "caption", "center", "col", "colgroup", "dd", "details", "dialog", "dir",
    "div", "dl", "dt", "fieldset", "figcaption", "figure", "footer", "form",
    "frame", "frameset", "h1", "h2", "h3", "h4", "h5", "h6", "head", "header",
    "hr", "html", "iframe", "legend", "li", "link", "main", "menu", "menuitem",
    "nav", "noframes", "ol", "optgroup", "option", "p", "param", "search",
    "section", "summary", "table", "tbody", "td", "tfoot", "th", "thead",
    "title", "tr", "track", "ul",
];

const ATTR_NAME: &str = r"[a-zA-Z_:][a-zA-Z0-9:._-]*";
const ATTR_VALUE: &str = r#"(?:[^"'=<>`\x00-\x20]+|'[^']*'|"[^"]*")"#;

fn open_tag() -> String {
    format!(r"<[A-Za-z][A-Za-z0-9\-]*(?:\s+{ATTR_NAME}(?:\s*=\s*{ATTR_VALUE})?)*\s*/?>")
}

const CLOSE_TAG: &str = r"</[A-Za-z][A-Za-z0-9\-]*\s*>";
const COMMENT: &str = r"<!---?>|<!--(?:[^-]|-[^-]|--[^>])*-->";
const PROCESSING: &str = r"<[?][\s\S]*?[?]>";
const DECLARATION: &str = r"<![A-Za-z][^>]*>";
const CDATA: &str = r"<!\[CDATA\[[\s\S]*?\]\]>";

/// Any inline HTML construct anchored at the start
pub static HTML_TAG_RE: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(
        "^(?:{}|{CLOSE_TAG}|{COMMENT}|{PROCESSING}|{DECLARATION}|{CDATA})",
        open_tag()
    );
    Regex::new(&pattern).expect("valid html tag pattern")
});

/// A lone open or close tag anchored at the start
pub static HTML_OPEN_CLOSE_TAG_RE: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!("^(?:{}|{CLOSE_TAG})", open_tag());
    Regex::new(&pattern).expect("valid open/close tag pattern")
});

static UNESCAPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r##"\\([!"#$%&'()*+,./:;<=>?@\[\\\]^_`{|}~-])|&([A-Za-z#][A-Za-z0-9]{1,31});"##)
        .expect("valid unescape pattern")
});

static BAD_PROTO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:vbscript|javascript|file|data):").expect("valid pattern"));

static GOOD_DATA_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^data:image/(?:gif|png|jpeg|webp);").expect("valid pattern"));

/// Characters kept verbatim when encoding link destinations
const LINK_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b';')
    .remove(b'/')
    .remove(b'?')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b',')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'#');

/// Space or tab
pub fn is_space(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

/// Unicode whitespace as used by the flanking rules
pub fn is_white_space(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\u{0b}' | '\u{0c}' | '\r')
        || get_general_category(c) == GeneralCategory::SpaceSeparator
}

/// Unicode punctuation or symbol
pub fn is_punct_char(c: char) -> bool {
    use GeneralCategory::*;
    matches!(
        get_general_category(c),
        ConnectorPunctuation
            | DashPunctuation
            | OpenPunctuation
            | ClosePunctuation
            | InitialPunctuation
            | FinalPunctuation
            | OtherPunctuation
            | MathSymbol
            | CurrencySymbol
            | ModifierSymbol
            | OtherSymbol
    )
}

/// ASCII punctuation that Markdown treats as escapable
pub fn is_md_ascii_punct(b: u8) -> bool {
    b.is_ascii_punctuation()
}

/// Label used as link reference key: trimmed, inner whitespace collapsed,
/// case folded
pub fn normalize_reference(label: &str) -> String {
    let collapsed = label.split_whitespace().collect::<Vec<_>>().join(" ");
    // lowercase then uppercase folds ẞ/ß and similar pairs together
    collapsed.to_lowercase().to_uppercase()
}

/// Resolve an entity body (`amp`, `#35`, `#x22`) to its text
pub fn decode_entity(name: &str) -> Option<String> {
    if let Some(numeric) = name.strip_prefix('#') {
        let code = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) if (1..=6).contains(&hex.len()) => u32::from_str_radix(hex, 16).ok()?,
            Some(_) => return None,
            None if (1..=7).contains(&numeric.len()) => numeric.parse::<u32>().ok()?,
            None => return None,
        };
        let c = match code {
            0 => '\u{FFFD}',
            code => char::from_u32(code).unwrap_or('\u{FFFD}'),
        };
        return Some(c.to_string());
    }
    let raw = format!("&{name};");
    let decoded = html_escape::decode_html_entities(&raw);
    // a prefix match (`&ampx;` -> `&x;`) is not a valid entity
    if decoded == raw || (decoded != ";" && decoded.contains(';')) {
        None
    } else {
        Some(decoded.into_owned())
    }
}

/// Replace backslash escapes and entities
pub fn unescape_all(s: &str) -> Cow<'_, str> {
    if !s.contains('\\') && !s.contains('&') {
        return Cow::Borrowed(s);
    }
    UNESCAPE_RE.replace_all(s, |caps: &regex::Captures| {
        if let Some(escaped) = caps.get(1) {
            return escaped.as_str().to_string();
        }
        let whole = caps.get(0).map_or("", |m| m.as_str());
        caps.get(2)
            .and_then(|name| decode_entity(name.as_str()))
            .unwrap_or_else(|| whole.to_string())
    })
}

/// Percent-encode a link destination, keeping valid `%XX` escapes
pub fn normalize_link(url: &str) -> String {
    let bytes = url.as_bytes();
    let mut out = String::with_capacity(url.len());
    let mut buf = [0u8; 4];
    for (i, c) in url.char_indices() {
        if c == '%' {
            let valid = bytes.len() > i + 2
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            out.push_str(if valid { "%" } else { "%25" });
            continue;
        }
        out.extend(utf8_percent_encode(c.encode_utf8(&mut buf), LINK_SET));
    }
    out
}

/// Human readable form of an encoded destination
pub fn normalize_link_text(url: &str) -> String {
    match percent_encoding::percent_decode_str(url).decode_utf8() {
        Ok(text) => text.into_owned(),
        Err(_) => url.to_string(),
    }
}

/// Refuse script-capable schemes; image data urls stay allowed
pub fn validate_link(url: &str) -> bool {
    let lowered = url.trim().to_lowercase();
    !BAD_PROTO_RE.is_match(&lowered) || GOOD_DATA_RE.is_match(&lowered)
}
