//! Parser and renderer configuration

/// Options shared by the scanners and the renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Pass raw HTML through; when off, html nodes are escaped as text
    pub html: bool,

    /// Close void elements XHTML style (`<br />`)
    pub xhtml_out: bool,

    /// Render soft line breaks as `<br />`
    pub breaks: bool,

    /// CSS class prefix for fenced code languages; `None` uses the bare word
    pub lang_prefix: Option<String>,

    /// Double and single replacement quotes used by smartquotes
    pub quotes: [char; 4],

    /// Maximum container nesting depth
    pub max_nesting: usize,

    /// Attach source spans to tokens and nodes
    pub track_positions: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            html: true,
            xhtml_out: true,
            breaks: false,
            lang_prefix: Some("language-".to_string()),
            quotes: ['\u{201C}', '\u{201D}', '\u{2018}', '\u{2019}'],
            max_nesting: 100,
            track_positions: true,
        }
    }
}

impl Options {
    /// Baseline for the `zero` preset: no raw HTML, HTML5 void elements
    pub fn zero() -> Self {
        Self {
            html: false,
            xhtml_out: false,
            ..Self::default()
        }
    }
}
