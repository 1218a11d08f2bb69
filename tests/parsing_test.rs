//! Structural parser behaviour on whole documents.

use proptest::prelude::*;

use folio::{Align, ContentBlock, HeadingLevel, InlineRun, parse_html_content, sanitize_html};

#[test]
fn test_order_is_preserved() {
    let blocks = parse_html_content("<h1>T</h1><p>A</p><ul><li>x</li><li>y</li></ul>");
    assert_eq!(
        blocks,
        vec![
            ContentBlock::heading(HeadingLevel::H1, vec![InlineRun::plain("T")]),
            ContentBlock::paragraph(vec![InlineRun::plain("A")]),
            ContentBlock::list_item(false, vec![InlineRun::plain("x")]),
            ContentBlock::list_item(false, vec![InlineRun::plain("y")]),
        ]
    );
}

#[test]
fn test_emphasis_accumulates() {
    let blocks = parse_html_content("<p><strong>a<em>b</em></strong></p>");
    assert_eq!(
        blocks[0].runs(),
        &[InlineRun::plain("a").bold(), InlineRun::plain("b").bold().italic()]
    );
}

#[test]
fn test_blank_paragraphs_are_elided() {
    assert!(parse_html_content("<p>&nbsp;</p>").is_empty());
    assert!(parse_html_content("<p>   </p><p><b> </b></p>").is_empty());

    let blocks = parse_html_content("<p>x</p><br><p>y</p>");
    assert_eq!(blocks.len(), 3);
    assert!(blocks[1].is_line_break());
}

#[test]
fn test_editor_document() {
    let html = r#"
        <h2 style="text-align: center">Part <em>One</em></h2>
        <p class="text-right">Signed, <b>the narrator</b></p>
        <figure class="image"><img src="map.png" width="320" height="200"><figcaption>Map</figcaption></figure>
        <ol><li>first</li><li style="text-align:justify">second</li></ol>
        <blockquote><p>quoted</p></blockquote>
    "#;
    let blocks = parse_html_content(html);
    let kinds: Vec<&str> = blocks
        .iter()
        .map(|b| match b {
            ContentBlock::Heading { .. } => "heading",
            ContentBlock::Paragraph { .. } => "paragraph",
            ContentBlock::ListItem { .. } => "item",
            ContentBlock::Image { .. } => "image",
        })
        .collect();
    assert_eq!(
        kinds,
        vec!["heading", "paragraph", "image", "item", "item", "paragraph"]
    );
    assert_eq!(blocks[0].align(), Align::Center);
    assert_eq!(blocks[0].plain_text(), "Part One");
    assert_eq!(blocks[1].align(), Align::Right);
    assert_eq!(blocks[4].align(), Align::Justify);
    assert!(matches!(
        &blocks[2],
        ContentBlock::Image { width: 320, height: 200, .. }
    ));
}

#[test]
fn test_sanitized_input_parses_without_forbidden_content() {
    let dirty = r#"<p onclick="x()">safe</p><script>alert(1)</script><form><input value="v"></form><iframe src="e"></iframe>"#;
    let blocks = parse_html_content(&sanitize_html(dirty));
    assert_eq!(blocks, vec![ContentBlock::paragraph(vec![InlineRun::plain("safe")])]);
}

fn fragment() -> impl Strategy<Value = String> {
    let word = "[a-zA-Z]{1,8}";
    prop_oneof![
        word.prop_map(|w| format!("<p>{w}</p>")),
        word.prop_map(|w| format!("<h1>{w}</h1>")),
        word.prop_map(|w| format!("<h3><em>{w}</em></h3>")),
        (word, word).prop_map(|(a, b)| format!("<p><b>{a}</b> <i>{b}</i></p>")),
        word.prop_map(|w| format!("<ul><li>{w}</li></ul>")),
        word.prop_map(|w| format!("<ol><li><u>{w}</u></li></ol>")),
        Just("<br>".to_string()),
        Just("<p> </p>".to_string()),
        Just(r#"<img src="a.png" width="10">"#.to_string()),
        word.prop_map(|w| format!("<div><p>{w}</p></div>")),
    ]
}

proptest! {
    #[test]
    fn prop_parsing_is_idempotent(parts in prop::collection::vec(fragment(), 0..20)) {
        let html = parts.concat();
        prop_assert_eq!(parse_html_content(&html), parse_html_content(&html));
    }

    #[test]
    fn prop_no_block_is_blank(parts in prop::collection::vec(fragment(), 0..20)) {
        for block in parse_html_content(&parts.concat()) {
            match &block {
                ContentBlock::Image { source, .. } => prop_assert!(!source.is_empty()),
                b if b.is_line_break() => {}
                b => prop_assert!(!b.plain_text().trim().is_empty()),
            }
        }
    }
}
