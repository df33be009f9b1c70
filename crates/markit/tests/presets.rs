use markit::{catalog, Chain, MarkdownIt, MarkitError, Preset};
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
#[case("# markdown-it rulezz!", "# markdown-it rulezz!\n")]
#[case("plain *text*\nsecond line", "plain *text*\nsecond line\n")]
#[case("ends with newline\n", "ends with newline\n")]
#[case("", "")]
fn test_zero_is_identity(#[case] input: &str, #[case] expected: &str) {
    let md = MarkdownIt::new("zero").unwrap();
    assert_eq!(md.render(input), expected);
}

#[test]
fn test_zero_escapes_markup_characters() {
    let md = MarkdownIt::new("zero").unwrap();
    assert_eq!(md.render("a < b & c"), "a &lt; b &amp; c\n");
}

#[test]
fn test_zero_plus_heading() {
    let mut md = MarkdownIt::new("zero").unwrap();
    md.enable("heading").unwrap();
    assert_eq!(md.render("# markdown-it rulezz!"), "<h1>markdown-it rulezz!</h1>\n");
}

#[rstest]
#[case("commonmark")]
#[case("gfm")]
fn test_heading_enabled_by_default(#[case] preset: &str) {
    let md = MarkdownIt::new(preset).unwrap();
    assert_eq!(md.render("# markdown-it rulezz!"), "<h1>markdown-it rulezz!</h1>\n");
}

#[test]
fn test_unknown_rule() {
    let mut md = MarkdownIt::new("gfm").unwrap();
    match md.enable("unknown-rule-name") {
        Err(MarkitError::UnknownRule(name)) => assert_eq!(name, "unknown-rule-name"),
        other => panic!("expected an unknown rule error, got {:?}", other.err()),
    }
    assert!(md.disable("nope").is_err());
}

#[test]
fn test_unknown_preset_message() {
    let err = MarkdownIt::new("markdown-extra").err().unwrap();
    assert_eq!(err.to_string(), "Unknown preset: markdown-extra");
}

#[test]
fn test_enable_many_reports_first_unknown() {
    let mut md = MarkdownIt::new("zero").unwrap();
    let err = md.enable_many(["heading", "nope-1", "nope-2"]).err().unwrap();
    assert_eq!(err.to_string(), "Unknown rule: nope-1");
    assert!(!md.is_enabled("heading"));
    assert_eq!(md.render("# a"), "# a\n");
}

#[test]
fn test_disable_many() {
    let mut md = MarkdownIt::new("commonmark").unwrap();
    md.disable_many(vec!["emphasis".to_string(), "heading".to_string()])
        .unwrap();
    assert_eq!(md.render("# *a*"), "<p># *a*</p>\n");
}

#[test]
fn test_toggles_are_per_instance() {
    let mut first = MarkdownIt::new("commonmark").unwrap();
    let second = MarkdownIt::new("commonmark").unwrap();
    first.disable("heading").unwrap();
    assert_eq!(first.render("# a"), "<p># a</p>\n");
    assert_eq!(second.render("# a"), "<h1>a</h1>\n");
    assert_eq!(MarkdownIt::from_preset(Preset::CommonMark).render("# a"), "<h1>a</h1>\n");
}

#[test]
fn test_catalog_lists_every_rule() {
    let names = catalog();
    for name in ["heading", "table", "footnote", "sourcepos", "text_join", "linkify"] {
        assert!(names.contains(&name), "missing {name}");
    }
    let mut sorted = names.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(sorted, names);
}

#[test]
fn test_chain_order_is_fixed() {
    let mut md = MarkdownIt::new("commonmark").unwrap();
    let before: Vec<&str> = md.chain(Chain::Block).into_iter().map(|(n, _)| n).collect();
    md.disable("list").unwrap().enable("table").unwrap();
    let after: Vec<&str> = md.chain(Chain::Block).into_iter().map(|(n, _)| n).collect();
    assert_eq!(before, after);
    assert_eq!(&after[..3], ["front_matter", "table", "code"]);
}

#[test]
fn test_gfm_extras_enabled() {
    let md = MarkdownIt::new("gfm").unwrap();
    for name in ["table", "strikethrough", "tasklist", "autolink_ext"] {
        assert!(md.is_enabled(name), "{name} should be on");
    }
    assert!(!md.is_enabled("footnote"));
    assert!(!MarkdownIt::new("commonmark").unwrap().is_enabled("table"));
}

#[test]
fn test_preset_names_round_trip() {
    for preset in [Preset::CommonMark, Preset::Gfm, Preset::Zero] {
        assert_eq!(preset.to_string().parse::<Preset>().unwrap(), preset);
    }
}
