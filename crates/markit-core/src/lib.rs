//! markit-core - tokens, document tree and HTML rendering
//!
//! This crate holds the data model shared by the markit scanners and the
//! renderer. It knows nothing about Markdown grammar.
//!
//! # Architecture
//!
//! ```text
//!                ┌────────────┐  tree builder  ┌──────┐
//! scanners ─────▶│ Token list │ ─────────────▶ │ Tree │
//!                └────────────┘                └──────┘
//!                      │                           │
//!                      └──────▶ Renderer ◀─────────┘
//!                            (one rule table)
//! ```
//!
//! # Example
//!
//! ```rust
//! use markit_core::{Nesting, Options, RenderRules, Renderer, Token};
//!
//! let mut inline = Token::new("inline", Nesting::SelfClosing);
//! inline.children.push(Token::text("Hello World"));
//! let tokens = vec![
//!     Token::new("paragraph_open", Nesting::Open),
//!     inline,
//!     Token::new("paragraph_close", Nesting::Close),
//! ];
//!
//! let options = Options::default();
//! let rules = RenderRules::default();
//! let html = Renderer::new(&rules, &options).render_tokens(&tokens);
//! assert_eq!(html, "<p>Hello World</p>\n");
//! ```

mod escape;
mod html_rules;
mod meta;
mod options;
mod render;
mod span;
mod token;
mod tree;

pub use escape::{escape_html, escape_text};
pub use meta::{meta_bool, meta_int, meta_str, Attrs, Meta, MetaValue};
pub use options::Options;
pub use render::{
    AttrHook, FlattenFn, HtmlWriter, RenderFn, RenderNode, RenderRule, RenderRules, Renderer,
};
pub use span::{LineIndex, Position, SourceSpan};
pub use token::{nesting_balance, InlineSource, Nesting, Token};
pub use tree::{NodeData, NodeId, PrettyOptions, Tree, TreeError, Walk};
