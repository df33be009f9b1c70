//! # markit
//!
//! Configurable Markdown to HTML and tree engine.
//!
//! Parsing runs as a fixed pipeline of named rule chains. A [`Preset`]
//! (`commonmark`, `gfm` or `zero`) decides which rules start enabled; every
//! rule can then be toggled by name on the parser instance.
//!
//! ## Design
//!
//! - **Block scanner**: line oriented state machine producing open/close
//!   block tokens, recursing into containers (lists, blockquotes).
//! - **Inline scanner**: tokenizes the text of every `inline` token and
//!   resolves emphasis and strikethrough delimiter runs in a post pass.
//! - **Tree builder**: turns the balanced token stream into a mutable
//!   [`Tree`] owned by the caller.
//! - **Renderer**: one rule table per kind, driven from tokens or from the
//!   tree with byte-identical output.
//!
//! ## Example
//!
//! ```rust
//! use markit::MarkdownIt;
//!
//! let md = MarkdownIt::new("gfm").unwrap();
//! assert_eq!(md.render("# markit rulezz!"), "<h1>markit rulezz!</h1>\n");
//! ```
//!
//! ## Example (tree)
//!
//! ```rust
//! use markit::{MarkdownIt, PrettyOptions};
//!
//! let md = MarkdownIt::new("commonmark").unwrap();
//! let tree = md.tree("- a *b*");
//! let kinds: Vec<&str> = tree.walk(tree.root()).map(|id| tree.kind(id)).collect();
//! assert_eq!(kinds, ["root", "bullet_list", "list_item", "text", "em", "text"]);
//!
//! let dump = tree.pretty(tree.root(), &PrettyOptions::default());
//! assert!(dump.starts_with("<root>\n  <bullet_list>\n"));
//! ```

mod block;
mod core_rules;
mod env;
mod inline;
mod parser;
mod plugins;
mod rules;
mod tree_builder;
mod utilities;

pub use env::{Env, FootnoteEnv, LinkReference};
pub use parser::MarkdownIt;
pub use rules::presets::Preset;
pub use rules::{catalog, Chain};
pub use tree_builder::build_tree;
pub use utilities::{normalize_link, normalize_reference, validate_link};

pub use markit_core::{
    AttrHook, HtmlWriter, MetaValue, Nesting, NodeData, NodeId, Options, Position, PrettyOptions,
    RenderNode, RenderRule, RenderRules, SourceSpan, Token, Tree, TreeError,
};

/// Error type for configuration and tree editing
#[derive(Debug, thiserror::Error)]
pub enum MarkitError {
    #[error("Unknown preset: {0}")]
    UnknownPreset(String),

    #[error("Unknown rule: {0}")]
    UnknownRule(String),

    #[error(transparent)]
    Tree(#[from] TreeError),
}

pub type Result<T> = std::result::Result<T, MarkitError>;
