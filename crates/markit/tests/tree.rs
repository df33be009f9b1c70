use markit::{MarkdownIt, MetaValue, NodeData, PrettyOptions, TreeError};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn kinds(md: &MarkdownIt, src: &str) -> Vec<String> {
    let tree = md.tree(src);
    tree.walk(tree.root())
        .map(|id| tree.kind(id).to_string())
        .collect()
}

#[test]
fn test_walk_is_pre_order() {
    let md = MarkdownIt::new("commonmark").unwrap();
    assert_eq!(
        kinds(&md, "- a *b*"),
        ["root", "bullet_list", "list_item", "text", "em", "text"]
    );
}

#[test]
fn test_walk_is_restartable() {
    let md = MarkdownIt::new("commonmark").unwrap();
    let tree = md.tree("> a\n\nb");
    let first: Vec<_> = tree.walk(tree.root()).collect();
    let second: Vec<_> = tree.walk(tree.root()).collect();
    assert_eq!(first, second);
    assert_eq!(first.len(), 6);
}

#[test]
fn test_pretty_with_srcmap_and_meta() {
    let md = MarkdownIt::new("commonmark").unwrap();
    let tree = md.tree("# markdown-it rulezz!");
    let options = PrettyOptions {
        srcmap: true,
        meta: true,
        ..PrettyOptions::default()
    };
    assert_eq!(
        tree.pretty(tree.root(), &options),
        "<root srcmap=\"0:21\">\n  <heading srcmap=\"0:21\">\n    level: 1\n    <text srcmap=\"2:21\">\n      content: markdown-it rulezz!\n"
    );
}

#[test]
fn test_pretty_default_shows_structure_only() {
    let md = MarkdownIt::new("commonmark").unwrap();
    let tree = md.tree("- a *b*");
    assert_eq!(
        tree.pretty(tree.root(), &PrettyOptions::default()),
        "<root>\n  <bullet_list>\n    <list_item>\n      <text>\n      <em>\n        <text>\n"
    );
}

#[test]
fn test_list_metadata() {
    let md = MarkdownIt::new("commonmark").unwrap();
    let tree = md.tree("3. a\n\n4. b");
    let list = tree.children(tree.root())[0];
    assert_eq!(tree.kind(list), "ordered_list");
    assert_eq!(tree.meta(list).get("start"), Some(&MetaValue::Int(3)));
    assert_eq!(tree.meta(list).get("tight"), Some(&MetaValue::Bool(false)));
}

#[rstest]
#[case("# Title\n\nSome *emphasis* and **strong** text.")]
#[case("- one\n- two\n  - nested\n\n1. first\n\n2. second")]
#[case("> quote with `code` and [link](/url \"t\")\n\n---\n\n```js\nlet x;\n```")]
#[case("| a | b |\n|:--|--:|\n| 1 | 2 |\n\n~~gone~~ www.example.com")]
#[case("- [x] done\n- [ ] todo\n\n![img *alt*](/i.png)\n\nline  \nbreak")]
#[case("<div>\nraw\n</div>\n\n[ref]\n\n[ref]: /r")]
fn test_tree_and_token_paths_agree(#[case] src: &str) {
    let mut md = MarkdownIt::new("gfm").unwrap();
    assert_eq!(md.render_tree(&md.tree(src)), md.render(src));
    md.enable_many(["sourcepos", "footnote", "heading_anchors"]).unwrap();
    assert_eq!(md.render_tree(&md.tree(src)), md.render(src));
}

#[test]
fn test_footnotes_agree_across_paths() {
    let mut md = MarkdownIt::new("commonmark").unwrap();
    md.enable("footnote").unwrap();
    let src = "a[^1] b^[inline *note*]\n\n[^1]: body\n\n    more\n";
    assert_eq!(md.render_tree(&md.tree(src)), md.render(src));
}

#[test]
fn test_parsing_is_deterministic() {
    let src = "# t\n\n- a\n- b [x](y)\n\n| h |\n|---|\n| c |";
    let first = MarkdownIt::new("gfm").unwrap();
    let second = MarkdownIt::new("gfm").unwrap();
    let options = PrettyOptions {
        srcmap: true,
        meta: true,
        attrs: true,
        ..PrettyOptions::default()
    };
    let a = first.tree(src);
    let b = second.tree(src);
    assert_eq!(a.pretty(a.root(), &options), b.pretty(b.root(), &options));
    assert_eq!(first.render(src), second.render(src));
    assert_eq!(first.render(src), first.render(src));
}

#[test]
fn test_edits_are_rendered() {
    let md = MarkdownIt::new("commonmark").unwrap();
    let mut tree = md.tree("*a*");
    let paragraph = tree.children(tree.root())[0];
    let em = tree.children(paragraph)[0];

    tree.set_kind(em, "strong");
    assert_eq!(tree.kind(em), "strong");
    tree.attrs_mut(paragraph)
        .insert("class".into(), "lead".into());
    assert_eq!(md.render_tree(&tree), "<p class=\"lead\"><strong>a</strong></p>\n");

    let text = tree.create(NodeData::new("hr"));
    tree.set_children(tree.root(), vec![text, paragraph]).unwrap();
    assert_eq!(tree.children(tree.root()), [text, paragraph]);
    assert_eq!(
        md.render_tree(&tree),
        "<hr />\n<p class=\"lead\"><strong>a</strong></p>\n"
    );
}

#[test]
fn test_reparenting_detaches() {
    let md = MarkdownIt::new("commonmark").unwrap();
    let mut tree = md.tree("> a\n\nb");
    let root = tree.root();
    let quote = tree.children(root)[0];
    let outer = tree.children(root)[1];
    tree.set_children(quote, vec![outer]).unwrap();
    assert_eq!(tree.children(root), [quote]);
    assert_eq!(tree.parent(outer), Some(quote));
    assert_eq!(md.render_tree(&tree), "<blockquote>\n<p>b</p>\n</blockquote>\n");
}

#[test]
fn test_cycle_rejected_without_change() {
    let md = MarkdownIt::new("commonmark").unwrap();
    let mut tree = md.tree("> a");
    let root = tree.root();
    let quote = tree.children(root)[0];
    let err = tree.set_children(quote, vec![root]).unwrap_err();
    assert!(matches!(err, TreeError::Cycle { .. }));
    assert_eq!(tree.children(root), [quote]);
    assert_eq!(md.render_tree(&tree), "<blockquote>\n<p>a</p>\n</blockquote>\n");
}

#[test]
fn test_deep_emphasis_on_both_paths() {
    let md = MarkdownIt::new("commonmark").unwrap();
    let src = format!("{}a{}", "*".repeat(30_000), "*".repeat(30_000));
    let tree = md.tree(&src);
    assert_eq!(md.render_tree(&tree), md.render(&src));
    let dump = tree.pretty(tree.root(), &PrettyOptions::default());
    assert!(dump.ends_with("<text>\n"));
}
