//! Default HTML for the built-in node kinds

use crate::render::{HtmlWriter, RenderNode, RenderRule, RenderRules};

pub fn default_rules() -> RenderRules {
    let mut rules = RenderRules::empty();
    rules
        // blocks
        .set("paragraph", container(open_paragraph, close_paragraph))
        .set("heading", container(open_heading, close_heading))
        .set("lheading", container(open_heading, close_heading))
        .set("blockquote", container(open_blockquote, close_blockquote))
        .set("bullet_list", container(open_bullet_list, close_bullet_list))
        .set("ordered_list", container(open_ordered_list, close_ordered_list))
        .set("list_item", container(open_list_item, close_list_item))
        .set("hr", RenderRule::Leaf(hr))
        .set("code_block", RenderRule::Leaf(code_block))
        .set("fence", RenderRule::Leaf(fence))
        .set("html_block", RenderRule::Leaf(html_block))
        .set("table", container(open_table, close_table))
        .set("thead", container(open_thead, close_thead))
        .set("tbody", container(open_tbody, close_tbody))
        .set("trow", container(open_trow, close_trow))
        .set("tcell", container(open_tcell, close_tcell))
        // inlines
        .set("text", RenderRule::Leaf(text))
        .set("text_special", RenderRule::Leaf(text))
        .set("softbreak", RenderRule::Leaf(softbreak))
        .set("hardbreak", RenderRule::Leaf(hardbreak))
        .set("html_inline", RenderRule::Leaf(html_inline))
        .set("code_inline", container(open_code_inline, close_code_inline))
        .set("em", container(open_em, close_em))
        .set("strong", container(open_strong, close_strong))
        .set("strikethrough", container(open_strike, close_strike))
        .set("link", container(open_link, close_link))
        .set("autolink", container(open_autolink, close_link))
        .set("linkify", container(open_autolink, close_link))
        .set("image", RenderRule::Flatten(image));
    rules
}

fn container(
    open: fn(&RenderNode, &mut HtmlWriter),
    close: fn(&RenderNode, &mut HtmlWriter),
) -> RenderRule {
    RenderRule::Container { open, close }
}

fn open_paragraph(node: &RenderNode, w: &mut HtmlWriter) {
    w.cr();
    w.open("p", &node.all_attrs());
}

fn close_paragraph(_: &RenderNode, w: &mut HtmlWriter) {
    w.close("p");
    w.cr();
}

fn heading_tag(node: &RenderNode) -> String {
    let level = node.meta_int("level").unwrap_or(1).clamp(1, 6);
    format!("h{level}")
}

fn open_heading(node: &RenderNode, w: &mut HtmlWriter) {
    w.cr();
    w.open(&heading_tag(node), &node.all_attrs());
}

fn close_heading(node: &RenderNode, w: &mut HtmlWriter) {
    w.close(&heading_tag(node));
    w.cr();
}

fn open_blockquote(node: &RenderNode, w: &mut HtmlWriter) {
    w.cr();
    w.open("blockquote", &node.all_attrs());
    w.cr();
}

fn close_blockquote(_: &RenderNode, w: &mut HtmlWriter) {
    w.cr();
    w.close("blockquote");
    w.cr();
}

fn open_bullet_list(node: &RenderNode, w: &mut HtmlWriter) {
    w.cr();
    w.open("ul", &node.all_attrs());
    w.cr();
}

fn close_bullet_list(_: &RenderNode, w: &mut HtmlWriter) {
    w.cr();
    w.close("ul");
    w.cr();
}

fn open_ordered_list(node: &RenderNode, w: &mut HtmlWriter) {
    let attrs = match node.meta_int("start") {
        Some(start) if start != 1 => node.attrs_with(&[("start", start.to_string())]),
        _ => node.all_attrs(),
    };
    w.cr();
    w.open("ol", &attrs);
    w.cr();
}

fn close_ordered_list(_: &RenderNode, w: &mut HtmlWriter) {
    w.cr();
    w.close("ol");
    w.cr();
}

fn open_list_item(node: &RenderNode, w: &mut HtmlWriter) {
    w.cr();
    w.open("li", &node.all_attrs());
}

fn close_list_item(_: &RenderNode, w: &mut HtmlWriter) {
    w.close("li");
    w.cr();
}

fn hr(node: &RenderNode, w: &mut HtmlWriter) {
    w.cr();
    w.void("hr", &node.all_attrs());
    w.cr();
}

fn code_block(node: &RenderNode, w: &mut HtmlWriter) {
    w.cr();
    w.raw("<pre>");
    w.open("code", &node.all_attrs());
    w.text(node.content);
    w.raw("</code></pre>");
    w.cr();
}

fn fence(node: &RenderNode, w: &mut HtmlWriter) {
    let lang = node.meta_str("info").split_whitespace().next().unwrap_or("");
    let attrs = if lang.is_empty() {
        node.all_attrs()
    } else {
        let class = match &w.options().lang_prefix {
            Some(prefix) => format!("{prefix}{lang}"),
            None => lang.to_string(),
        };
        node.attrs_with(&[("class", class)])
    };
    w.cr();
    w.raw("<pre>");
    w.open("code", &attrs);
    w.text(node.content);
    w.raw("</code></pre>");
    w.cr();
}

fn html_block(node: &RenderNode, w: &mut HtmlWriter) {
    w.cr();
    if w.options().html {
        w.raw(node.content);
    } else {
        w.text(node.content);
    }
    w.cr();
}

fn open_table(node: &RenderNode, w: &mut HtmlWriter) {
    w.cr();
    w.open("table", &node.all_attrs());
    w.cr();
}

fn close_table(_: &RenderNode, w: &mut HtmlWriter) {
    w.cr();
    w.close("table");
    w.cr();
}

fn open_thead(node: &RenderNode, w: &mut HtmlWriter) {
    w.cr();
    w.open("thead", &node.all_attrs());
    w.cr();
}

fn close_thead(_: &RenderNode, w: &mut HtmlWriter) {
    w.cr();
    w.close("thead");
    w.cr();
}

fn open_tbody(node: &RenderNode, w: &mut HtmlWriter) {
    w.cr();
    w.open("tbody", &node.all_attrs());
    w.cr();
}

fn close_tbody(_: &RenderNode, w: &mut HtmlWriter) {
    w.cr();
    w.close("tbody");
    w.cr();
}

fn open_trow(node: &RenderNode, w: &mut HtmlWriter) {
    w.cr();
    w.open("tr", &node.all_attrs());
    w.cr();
}

fn close_trow(_: &RenderNode, w: &mut HtmlWriter) {
    w.cr();
    w.close("tr");
    w.cr();
}

fn cell_tag(node: &RenderNode) -> &'static str {
    if node.meta_bool("header") {
        "th"
    } else {
        "td"
    }
}

fn open_tcell(node: &RenderNode, w: &mut HtmlWriter) {
    let attrs = match node.meta_str("align") {
        "left" | "center" | "right" => {
            node.attrs_with(&[("style", format!("text-align:{}", node.meta_str("align")))])
        }
        _ => node.all_attrs(),
    };
    w.cr();
    w.open(cell_tag(node), &attrs);
}

fn close_tcell(node: &RenderNode, w: &mut HtmlWriter) {
    w.close(cell_tag(node));
    w.cr();
}

fn text(node: &RenderNode, w: &mut HtmlWriter) {
    w.text(node.content);
}

fn softbreak(_: &RenderNode, w: &mut HtmlWriter) {
    if w.options().breaks {
        w.void("br", &[]);
    }
    w.raw("\n");
}

fn hardbreak(node: &RenderNode, w: &mut HtmlWriter) {
    w.void("br", &node.all_attrs());
    w.raw("\n");
}

fn html_inline(node: &RenderNode, w: &mut HtmlWriter) {
    if w.options().html {
        w.raw(node.content);
    } else {
        w.text(node.content);
    }
}

fn open_code_inline(node: &RenderNode, w: &mut HtmlWriter) {
    w.open("code", &node.all_attrs());
}

fn close_code_inline(_: &RenderNode, w: &mut HtmlWriter) {
    w.close("code");
}

fn open_em(node: &RenderNode, w: &mut HtmlWriter) {
    w.open("em", &node.all_attrs());
}

fn close_em(_: &RenderNode, w: &mut HtmlWriter) {
    w.close("em");
}

fn open_strong(node: &RenderNode, w: &mut HtmlWriter) {
    w.open("strong", &node.all_attrs());
}

fn close_strong(_: &RenderNode, w: &mut HtmlWriter) {
    w.close("strong");
}

fn open_strike(node: &RenderNode, w: &mut HtmlWriter) {
    w.open("s", &node.all_attrs());
}

fn close_strike(_: &RenderNode, w: &mut HtmlWriter) {
    w.close("s");
}

fn open_link(node: &RenderNode, w: &mut HtmlWriter) {
    let mut leading = vec![("href", node.meta_str("url").to_string())];
    let title = node.meta_str("title");
    if !title.is_empty() {
        leading.push(("title", title.to_string()));
    }
    w.open("a", &node.attrs_with(&leading));
}

fn open_autolink(node: &RenderNode, w: &mut HtmlWriter) {
    w.open("a", &node.attrs_with(&[("href", node.meta_str("url").to_string())]));
}

fn close_link(_: &RenderNode, w: &mut HtmlWriter) {
    w.close("a");
}

fn image(node: &RenderNode, alt: &str, w: &mut HtmlWriter) {
    let mut leading = vec![
        ("src", node.meta_str("url").to_string()),
        ("alt", alt.to_string()),
    ];
    let title = node.meta_str("title");
    if !title.is_empty() {
        leading.push(("title", title.to_string()));
    }
    w.void("img", &node.attrs_with(&leading));
}
