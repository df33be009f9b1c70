//! Extensions beyond CommonMark: footnotes, task lists, heading anchors,
//! front matter and source positions
//!
//! Their scanning rules are registered in the rule chains like the built-in
//! ones; [`register_render_rules`] adds HTML for the node kinds they emit.

pub mod footnote;
pub mod front_matter;
pub mod heading_anchors;
pub mod sourcepos;
pub mod tasklist;

use markit_core::{HtmlWriter, RenderNode, RenderRule, RenderRules};

/// Add render rules for every plugin node kind
pub fn register_render_rules(rules: &mut RenderRules) {
    rules
        .set("front_matter", RenderRule::Leaf(render_nothing))
        .set("todo_checkbox", RenderRule::Leaf(tasklist::render))
        .set("heading_anchor", RenderRule::Leaf(heading_anchors::render))
        .set("footnote_ref", RenderRule::Leaf(footnote::render_ref))
        .set("footnote_ref_anchor", RenderRule::Leaf(footnote::render_anchor))
        .set(
            "footnote_container",
            RenderRule::Container {
                open: footnote::open_container,
                close: footnote::close_container,
            },
        )
        .set(
            "footnote_def",
            RenderRule::Container {
                open: footnote::open_def,
                close: footnote::close_def,
            },
        );
}

/// Render rule that writes nothing
fn render_nothing(_: &RenderNode, _: &mut HtmlWriter) {}
