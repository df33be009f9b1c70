//! Named baselines of enabled rules.

use std::fmt;
use std::str::FromStr;

use markit_core::Options;
use once_cell::sync::Lazy;

use super::Registry;
use crate::MarkitError;

const ZERO_RULES: &[&str] = &[
    // core
    "normalize",
    "block",
    "inline",
    "text_join",
    // inline
    "text",
    // inline2
    "balance_pairs",
    "fragments_join",
];

const COMMONMARK_RULES: &[&str] = &[
    // block
    "blockquote",
    "code",
    "fence",
    "heading",
    "hr",
    "html_block",
    "lheading",
    "list",
    "reference",
    "paragraph",
    // inline and inline2
    "newline",
    "escape",
    "backticks",
    "emphasis",
    "link",
    "image",
    "autolink",
    "html_inline",
    "entity",
];

const GFM_RULES: &[&str] = &["table", "strikethrough", "tasklist", "autolink_ext"];

/// Dialect baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Preset {
    /// Strict CommonMark
    #[default]
    CommonMark,
    /// CommonMark plus tables, strikethrough, task lists and extended autolinks
    Gfm,
    /// Structural rules only; renders text verbatim
    Zero,
}

static ZERO: Lazy<Registry> = Lazy::new(|| build(&[ZERO_RULES]));
static COMMONMARK: Lazy<Registry> = Lazy::new(|| build(&[ZERO_RULES, COMMONMARK_RULES]));
static GFM: Lazy<Registry> = Lazy::new(|| build(&[ZERO_RULES, COMMONMARK_RULES, GFM_RULES]));

fn build(sets: &[&[&'static str]]) -> Registry {
    let mut registry = Registry::full();
    for name in sets.iter().flat_map(|set| set.iter()) {
        // preset tables only name registered rules
        let _ = registry.set_enabled(name, true);
    }
    registry
}

impl Preset {
    pub fn name(self) -> &'static str {
        match self {
            Preset::CommonMark => "commonmark",
            Preset::Gfm => "gfm",
            Preset::Zero => "zero",
        }
    }

    /// A fresh copy of the preset's rule state
    pub fn registry(self) -> Registry {
        match self {
            Preset::CommonMark => COMMONMARK.clone(),
            Preset::Gfm => GFM.clone(),
            Preset::Zero => ZERO.clone(),
        }
    }

    pub fn options(self) -> Options {
        match self {
            Preset::CommonMark | Preset::Gfm => Options::default(),
            Preset::Zero => Options::zero(),
        }
    }
}

impl FromStr for Preset {
    type Err = MarkitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "commonmark" | "default" => Ok(Preset::CommonMark),
            "gfm" => Ok(Preset::Gfm),
            "zero" => Ok(Preset::Zero),
            other => Err(MarkitError::UnknownPreset(other.to_string())),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!("gfm".parse::<Preset>().unwrap(), Preset::Gfm);
        assert_eq!("zero".parse::<Preset>().unwrap(), Preset::Zero);
        assert!(matches!(
            "nope".parse::<Preset>(),
            Err(MarkitError::UnknownPreset(name)) if name == "nope"
        ));
    }

    #[test]
    fn test_zero_has_no_block_rules() {
        let registry = Preset::Zero.registry();
        assert!(registry.block.active().is_empty());
        assert!(registry.is_enabled("text"));
        assert!(!registry.is_enabled("heading"));
    }

    #[test]
    fn test_gfm_extends_commonmark() {
        let commonmark = Preset::CommonMark.registry().enabled();
        let gfm = Preset::Gfm.registry().enabled();
        assert!(commonmark.iter().all(|name| gfm.contains(name)));
        assert!(gfm.contains(&"table"));
        assert!(!commonmark.contains(&"table"));
    }

    #[test]
    fn test_registry_copies_are_independent() {
        let mut a = Preset::Gfm.registry();
        a.set_enabled("table", false).unwrap();
        assert!(Preset::Gfm.registry().is_enabled("table"));
    }
}
