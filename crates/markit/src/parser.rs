//! MarkdownIt - the main entry point for Markdown to HTML and tree conversion.

use markit_core::{AttrHook, Options, RenderRules, Renderer, SourceSpan, Token, Tree};
use tracing::{debug, trace};

use crate::block::BlockRules;
use crate::core_rules::{CoreRuleFn, CoreState};
use crate::inline::InlineRules;
use crate::plugins;
use crate::rules::presets::Preset;
use crate::rules::{Chain, Registry};
use crate::tree_builder::build_tree;
use crate::Result;

/// A parser instance: one registry, one option set, one render table
///
/// Instances share nothing; toggling rules on one never affects another.
#[derive(Clone)]
pub struct MarkdownIt {
    preset: Preset,
    registry: Registry,
    options: Options,
    render_rules: RenderRules,
    // compiled from `registry` after every toggle
    core: Vec<CoreRuleFn>,
    block_rules: BlockRules,
    inline_rules: InlineRules,
    hooks: Vec<AttrHook>,
}

impl MarkdownIt {
    /// Create a parser from a preset name: `commonmark`, `gfm` or `zero`
    pub fn new(preset: &str) -> Result<Self> {
        Ok(Self::from_preset(preset.parse()?))
    }

    pub fn from_preset(preset: Preset) -> Self {
        let registry = preset.registry();
        let mut render_rules = RenderRules::default();
        plugins::register_render_rules(&mut render_rules);
        debug!(preset = %preset, rules = registry.enabled().len(), "created parser");
        Self {
            preset,
            core: registry.core.active(),
            block_rules: BlockRules::new(&registry.block),
            inline_rules: InlineRules::new(&registry.inline, &registry.inline2),
            hooks: registry.render.active(),
            registry,
            options: preset.options(),
            render_rules,
        }
    }

    pub fn preset(&self) -> Preset {
        self.preset
    }

    /// Enable the rule `name` in every chain that has it
    pub fn enable(&mut self, name: &str) -> Result<&mut Self> {
        self.toggle(name, true)
    }

    pub fn disable(&mut self, name: &str) -> Result<&mut Self> {
        self.toggle(name, false)
    }

    /// Enable several rules; on an unknown name nothing changes
    pub fn enable_many<I, S>(&mut self, names: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.toggle_many(names, true)
    }

    pub fn disable_many<I, S>(&mut self, names: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.toggle_many(names, false)
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.registry.is_enabled(name)
    }

    /// Enabled rule names across all chains, sorted
    pub fn enabled_rules(&self) -> Vec<&'static str> {
        self.registry.enabled()
    }

    /// Rule names of one chain in execution order, with their state
    pub fn chain(&self, chain: Chain) -> Vec<(&'static str, bool)> {
        self.registry.chain(chain)
    }

    /// Get the current options
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Get mutable access to options
    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    /// Render rules, for overriding the HTML of a node kind
    pub fn render_rules_mut(&mut self) -> &mut RenderRules {
        &mut self.render_rules
    }

    /// Scan `src` into a token stream
    pub fn parse(&self, src: &str) -> Vec<Token> {
        self.run(src).0
    }

    /// Build the document tree of `src`
    pub fn tree(&self, src: &str) -> Tree {
        let (tokens, root_span) = self.run(src);
        build_tree(&tokens, root_span)
    }

    /// Convert Markdown to HTML
    pub fn render(&self, src: &str) -> String {
        self.render_tokens(&self.parse(src))
    }

    pub fn render_tokens(&self, tokens: &[Token]) -> String {
        self.renderer().render_tokens(tokens)
    }

    /// Render a tree, including any edits made after [`MarkdownIt::tree`]
    pub fn render_tree(&self, tree: &Tree) -> String {
        self.renderer().render_tree(tree)
    }

    fn renderer(&self) -> Renderer<'_> {
        Renderer::new(&self.render_rules, &self.options).with_hooks(&self.hooks)
    }

    fn run(&self, src: &str) -> (Vec<Token>, Option<SourceSpan>) {
        let mut state = CoreState::new(src, &self.options, &self.block_rules, &self.inline_rules);
        for rule in &self.core {
            rule(&mut state);
        }
        trace!(tokens = state.tokens.len(), "parsed");
        let root_span = self
            .options
            .track_positions
            .then(|| state.line_index.span(0, state.src.len()));
        (state.tokens, root_span)
    }

    fn toggle(&mut self, name: &str, enabled: bool) -> Result<&mut Self> {
        self.registry.set_enabled(name, enabled)?;
        debug!(rule = name, enabled, "toggled rule");
        self.compile();
        Ok(self)
    }

    fn toggle_many<I, S>(&mut self, names: I, enabled: bool) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<S> = names.into_iter().collect();
        self.registry
            .set_enabled_many(names.iter().map(AsRef::as_ref), enabled)?;
        for name in &names {
            debug!(rule = name.as_ref(), enabled, "toggled rule");
        }
        self.compile();
        Ok(self)
    }

    fn compile(&mut self) {
        self.core = self.registry.core.active();
        self.block_rules = BlockRules::new(&self.registry.block);
        self.inline_rules = InlineRules::new(&self.registry.inline, &self.registry.inline2);
        self.hooks = self.registry.render.active();
    }
}

impl Default for MarkdownIt {
    fn default() -> Self {
        Self::from_preset(Preset::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MarkitError;

    #[test]
    fn test_unknown_preset() {
        assert!(matches!(
            MarkdownIt::new("nope"),
            Err(MarkitError::UnknownPreset(name)) if name == "nope"
        ));
    }

    #[test]
    fn test_toggle_chaining() {
        let mut md = MarkdownIt::new("zero").unwrap();
        md.enable("heading").unwrap().enable("emphasis").unwrap();
        assert!(md.is_enabled("heading"));
        assert_eq!(md.render("# *a*"), "<h1><em>a</em></h1>\n");
        md.disable("heading").unwrap();
        assert_eq!(md.render("# a"), "# a\n");
    }

    #[test]
    fn test_enable_many_is_all_or_nothing() {
        let mut md = MarkdownIt::new("zero").unwrap();
        let err = md.enable_many(["heading", "bogus", "also-bogus"]).err();
        assert!(matches!(err, Some(MarkitError::UnknownRule(name)) if name == "bogus"));
        assert!(!md.is_enabled("heading"));
        md.enable_many(["heading", "hr"]).unwrap();
        assert!(md.is_enabled("hr"));
    }

    #[test]
    fn test_options_apply_at_render() {
        let mut md = MarkdownIt::new("commonmark").unwrap();
        md.options_mut().xhtml_out = false;
        assert_eq!(md.render("---"), "<hr>\n");
    }

    #[test]
    fn test_positions_off() {
        let mut md = MarkdownIt::new("commonmark").unwrap();
        md.options_mut().track_positions = false;
        let tree = md.tree("# a");
        assert!(tree.walk(tree.root()).all(|id| tree.span(id).is_none()));
    }

    #[test]
    fn test_root_span_covers_normalized_source() {
        let md = MarkdownIt::new("commonmark").unwrap();
        let tree = md.tree("a\r\nb");
        assert_eq!(tree.span(tree.root()).map(|s| s.to_string()).as_deref(), Some("0:3"));
    }
}
