//! Rule chains for every pipeline stage.

pub mod presets;
mod rule;

pub use rule::Ruler;

use std::fmt;

use markit_core::AttrHook;
use once_cell::sync::Lazy;

use crate::block::{self, BlockRuleFn};
use crate::core_rules::{self, CoreRuleFn};
use crate::inline::{self, InlineRuleFn, PostRuleFn};
use crate::plugins;
use crate::{MarkitError, Result};

/// Pipeline stage a chain belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Chain {
    Core,
    Block,
    Inline,
    /// Post passes over the inline delimiter list
    Inline2,
    Render,
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Chain::Core => "core",
            Chain::Block => "block",
            Chain::Inline => "inline",
            Chain::Inline2 => "inline2",
            Chain::Render => "render",
        };
        f.write_str(name)
    }
}

const TERMINATES_ALL: &[&str] = &["paragraph", "reference", "blockquote", "list"];
const TERMINATES_CONTAINERS: &[&str] = &["paragraph", "reference", "blockquote"];
const TERMINATES_TABLE: &[&str] = &["paragraph", "blockquote", "list"];

/// The five chains of one parser instance
#[derive(Clone)]
pub struct Registry {
    pub core: Ruler<CoreRuleFn>,
    pub block: Ruler<BlockRuleFn>,
    pub inline: Ruler<InlineRuleFn>,
    pub inline2: Ruler<PostRuleFn>,
    pub render: Ruler<AttrHook>,
}

impl Registry {
    /// Every known rule, all disabled
    pub fn full() -> Self {
        let mut core = Ruler::new();
        core.push("normalize", core_rules::normalize::rule as CoreRuleFn)
            .push("block", core_rules::block)
            .push("inline", core_rules::inline)
            .push("linkify", core_rules::linkify::rule)
            .push("replacements", core_rules::replacements::rule)
            .push("smartquotes", core_rules::smartquotes::rule)
            .push("tasklist", plugins::tasklist::rule)
            .push("footnote", plugins::footnote::tail)
            .push("heading_anchors", plugins::heading_anchors::rule)
            .push("text_join", core_rules::text_join::rule);

        let mut blocks = Ruler::new();
        blocks
            .push("front_matter", plugins::front_matter::rule as BlockRuleFn)
            .push_alt("table", TERMINATES_TABLE, block::table::rule)
            .push("code", block::code::rule)
            .push_alt("fence", TERMINATES_ALL, block::fence::rule)
            .push_alt("blockquote", TERMINATES_ALL, block::blockquote::rule)
            .push_alt("hr", TERMINATES_ALL, block::hr::rule)
            .push_alt("list", TERMINATES_CONTAINERS, block::list::rule)
            .push_alt("footnote", TERMINATES_CONTAINERS, plugins::footnote::definition)
            .push("reference", block::reference::rule)
            .push_alt("html_block", TERMINATES_CONTAINERS, block::html_block::rule)
            .push_alt("heading", TERMINATES_CONTAINERS, block::heading::rule)
            .push("lheading", block::lheading::rule)
            .push("paragraph", block::paragraph::rule);

        let mut inlines = Ruler::new();
        inlines
            .push("text", inline::text::rule as InlineRuleFn)
            .push("linkify", inline::linkify::rule)
            .push("newline", inline::newline::rule)
            .push("escape", inline::escape::rule)
            .push("backticks", inline::backticks::rule)
            .push("strikethrough", inline::strikethrough::tokenize)
            .push("emphasis", inline::emphasis::tokenize)
            .push("footnote", plugins::footnote::inline_rule)
            .push("link", inline::link::rule)
            .push("image", inline::image::rule)
            .push("autolink", inline::autolink::rule)
            .push("autolink_ext", inline::autolink_ext::rule)
            .push("html_inline", inline::html_inline::rule)
            .push("entity", inline::entity::rule);

        let mut inline2 = Ruler::new();
        inline2
            .push("balance_pairs", inline::balance_pairs::rule as PostRuleFn)
            .push("strikethrough", inline::strikethrough::post_process)
            .push("emphasis", inline::emphasis::post_process)
            .push("fragments_join", inline::fragments_join::rule);

        let mut render = Ruler::new();
        render.push("sourcepos", plugins::sourcepos::hook as AttrHook);

        Self {
            core,
            block: blocks,
            inline: inlines,
            inline2,
            render,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.core.contains(name)
            || self.block.contains(name)
            || self.inline.contains(name)
            || self.inline2.contains(name)
            || self.render.contains(name)
    }

    /// Toggle `name` in every chain that has it
    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> Result<()> {
        if !self.contains(name) {
            return Err(MarkitError::UnknownRule(name.to_string()));
        }
        self.core.set_enabled(name, enabled);
        self.block.set_enabled(name, enabled);
        self.inline.set_enabled(name, enabled);
        self.inline2.set_enabled(name, enabled);
        self.render.set_enabled(name, enabled);
        Ok(())
    }

    /// Validate every name, then toggle them all; the first unknown name in
    /// input order is reported and nothing changes
    pub fn set_enabled_many<I, S>(&mut self, names: I, enabled: bool) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<S> = names.into_iter().collect();
        if let Some(unknown) = names.iter().find(|n| !self.contains(n.as_ref())) {
            return Err(MarkitError::UnknownRule(unknown.as_ref().to_string()));
        }
        for name in &names {
            self.set_enabled(name.as_ref(), enabled)?;
        }
        Ok(())
    }

    /// Enabled in at least one chain
    pub fn is_enabled(&self, name: &str) -> bool {
        self.core.is_enabled(name)
            || self.block.is_enabled(name)
            || self.inline.is_enabled(name)
            || self.inline2.is_enabled(name)
            || self.render.is_enabled(name)
    }

    /// Names of one chain in execution order, with their state
    pub fn chain(&self, chain: Chain) -> Vec<(&'static str, bool)> {
        fn list<F>(ruler: &Ruler<F>) -> Vec<(&'static str, bool)>
        where
            F: Copy,
        {
            ruler.entries().iter().map(|e| (e.name, e.enabled)).collect()
        }
        match chain {
            Chain::Core => list(&self.core),
            Chain::Block => list(&self.block),
            Chain::Inline => list(&self.inline),
            Chain::Inline2 => list(&self.inline2),
            Chain::Render => list(&self.render),
        }
    }

    /// Enabled rule names across all chains, sorted and deduplicated
    pub fn enabled(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = [
            Chain::Core,
            Chain::Block,
            Chain::Inline,
            Chain::Inline2,
            Chain::Render,
        ]
        .into_iter()
        .flat_map(|chain| self.chain(chain))
        .filter(|(_, enabled)| *enabled)
        .map(|(name, _)| name)
        .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    fn all_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self
            .core
            .names()
            .chain(self.block.names())
            .chain(self.inline.names())
            .chain(self.inline2.names())
            .chain(self.render.names())
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}

static CATALOG: Lazy<Vec<&'static str>> = Lazy::new(|| Registry::full().all_names());

/// Every rule name known to the engine, sorted, whatever is enabled
pub fn catalog() -> &'static [&'static str] {
    &CATALOG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_is_sorted_and_unique() {
        let names = catalog();
        let mut sorted = names.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(names, sorted.as_slice());
        for name in ["heading", "table", "footnote", "sourcepos", "text_join"] {
            assert!(names.contains(&name), "{name} missing");
        }
    }

    #[test]
    fn test_set_enabled_spans_chains() {
        let mut registry = Registry::full();
        registry.set_enabled("strikethrough", true).unwrap();
        assert!(registry.inline.is_enabled("strikethrough"));
        assert!(registry.inline2.is_enabled("strikethrough"));
    }

    #[test]
    fn test_set_enabled_many_is_all_or_nothing() {
        let mut registry = Registry::full();
        let err = registry
            .set_enabled_many(["heading", "bogus", "worse"], true)
            .unwrap_err();
        assert!(matches!(err, MarkitError::UnknownRule(ref n) if n == "bogus"));
        assert!(!registry.is_enabled("heading"));
    }

    #[test]
    fn test_block_order_is_fixed() {
        let registry = Registry::full();
        let names: Vec<&str> = registry
            .chain(Chain::Block)
            .into_iter()
            .map(|(n, _)| n)
            .collect();
        assert_eq!(names.first(), Some(&"front_matter"));
        assert_eq!(names.last(), Some(&"paragraph"));
    }
}
