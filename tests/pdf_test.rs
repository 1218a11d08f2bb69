//! PDF output read back with `lopdf`.

use std::io::Cursor;

use base64::Engine;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId};

use folio::{
    ContentBlock, CoverSnapshot, ExportOptions, Exporter, InlineRun, PdfConfig, PdfExporter,
    build_pdf, parse_html_content,
};

const PAGE_HEIGHT: f32 = 841.89;
const MARGIN: f32 = 72.0;

fn load(bytes: &[u8]) -> Document {
    Document::load_mem(bytes).expect("valid pdf")
}

fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}

fn operations(doc: &Document, page: ObjectId) -> Vec<Operation> {
    let raw = doc.get_page_content(page).unwrap();
    Content::decode(&raw).unwrap().operations
}

/// Text painted on a page, one entry per `Tj`.
fn page_text(doc: &Document, page: ObjectId) -> Vec<String> {
    operations(doc, page)
        .into_iter()
        .filter(|op| op.operator == "Tj")
        .filter_map(|op| match op.operands.first() {
            Some(Object::String(bytes, _)) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        })
        .collect()
}

fn fonts_used(doc: &Document, page: ObjectId) -> Vec<String> {
    operations(doc, page)
        .into_iter()
        .filter(|op| op.operator == "Tf")
        .filter_map(|op| match op.operands.first() {
            Some(Object::Name(name)) => Some(String::from_utf8_lossy(name).into_owned()),
            _ => None,
        })
        .collect()
}

fn number(obj: &Object) -> f32 {
    match obj {
        Object::Integer(i) => *i as f32,
        Object::Real(r) => *r as f32,
        other => panic!("not a number: {other:?}"),
    }
}

fn draws_image(doc: &Document, page: ObjectId) -> bool {
    operations(doc, page).iter().any(|op| op.operator == "Do")
}

fn export(options: &ExportOptions) -> Document {
    load(&build_pdf(options, &parse_html_content(&options.content)).unwrap())
}

fn png_data_uri(image: DynamicImage) -> String {
    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .unwrap();
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png)
    )
}

#[test]
fn test_title_page_then_body() {
    let doc = export(&ExportOptions::new("Night Book", "<p>Body</p>").with_author("Jane Doe"));
    let pages = page_ids(&doc);
    assert_eq!(pages.len(), 2);
    assert_eq!(page_text(&doc, pages[0]), vec!["Night Book", "by Jane Doe"]);
    assert_eq!(fonts_used(&doc, pages[0]), vec!["F2", "F3"]);
    assert_eq!(page_text(&doc, pages[1]), vec!["Body"]);
}

#[test]
fn test_cover_suppresses_title_page() {
    let cover = CoverSnapshot::from_image(DynamicImage::new_rgb8(40, 60));
    let doc = export(
        &ExportOptions::new("Covered", "<p>Body</p>")
            .with_author("Jane Doe")
            .with_cover(cover),
    );
    let pages = page_ids(&doc);
    assert_eq!(pages.len(), 2);
    assert!(draws_image(&doc, pages[0]));
    assert!(page_text(&doc, pages[0]).is_empty());
    assert_eq!(page_text(&doc, pages[1]), vec!["Body"]);

    let dct = doc.objects.values().any(|obj| match obj {
        Object::Stream(s) => matches!(s.dict.get(b"Filter"), Ok(Object::Name(n)) if n == b"DCTDecode"),
        _ => false,
    });
    assert!(dct, "cover should be embedded as JPEG");
}

#[test]
fn test_has_cover_page_flag_starts_with_body() {
    let doc = export(&ExportOptions::new("Flagged", "<p>Body</p>").with_cover_page(true));
    let pages = page_ids(&doc);
    assert_eq!(pages.len(), 1);
    assert_eq!(page_text(&doc, pages[0]), vec!["Body"]);
}

#[test]
fn test_empty_body_still_has_a_page() {
    let doc = export(&ExportOptions::new("Empty", "").with_cover_page(true));
    assert_eq!(page_ids(&doc).len(), 1);
}

#[test]
fn test_lines_stay_inside_margins() {
    let html = "<p>The quick brown fox jumps over the lazy dog again and again.</p>".repeat(150);
    let doc = export(&ExportOptions::new("Long", html).with_cover_page(true));
    let pages = page_ids(&doc);
    assert!(pages.len() > 3);

    for page in pages {
        for op in operations(&doc, page).iter().filter(|op| op.operator == "Td") {
            let baseline = number(&op.operands[1]);
            assert!(baseline > MARGIN, "line below the bottom margin: {baseline}");
            assert!(baseline < PAGE_HEIGHT - MARGIN);
        }
    }
}

#[test]
fn test_emphasis_only_when_runs_agree() {
    let blocks = vec![
        ContentBlock::paragraph(vec![InlineRun::plain("all").bold(), InlineRun::plain("bold").bold()]),
        ContentBlock::paragraph(vec![InlineRun::plain("mixed ").bold(), InlineRun::plain("runs")]),
        ContentBlock::paragraph(vec![
            InlineRun::plain("both ").bold().italic(),
            InlineRun::plain("bold").bold(),
        ]),
    ];
    let options = ExportOptions::new("Emphasis", "").with_cover_page(true);
    let doc = load(&build_pdf(&options, &blocks).unwrap());
    let page = page_ids(&doc)[0];
    assert_eq!(fonts_used(&doc, page), vec!["F2", "F1", "F1"]);
    assert_eq!(page_text(&doc, page), vec!["allbold", "mixed runs", "both bold"]);
}

#[test]
fn test_list_prefixes() {
    let html = "<ul><li>dot</li></ul><ol><li>one</li><li>two</li></ol>";
    let doc = export(&ExportOptions::new("Lists", html).with_cover_page(true));
    let page = page_ids(&doc)[0];
    let raw: Vec<Vec<u8>> = operations(&doc, page)
        .into_iter()
        .filter(|op| op.operator == "Tj")
        .filter_map(|op| match op.operands.into_iter().next() {
            Some(Object::String(bytes, _)) => Some(bytes),
            _ => None,
        })
        .collect();
    // WinAnsi bullet
    assert_eq!(raw[0], b"\x95 dot");
    assert_eq!(raw[1], b"1. one");
    assert_eq!(raw[2], b"2. two");
}

#[test]
fn test_image_is_scaled_and_masked() {
    let mut rgba = RgbaImage::from_pixel(400, 300, Rgba([200, 10, 10, 255]));
    rgba.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
    let html = format!(r#"<p><img src="{}"></p>"#, png_data_uri(DynamicImage::ImageRgba8(rgba)));
    let doc = export(&ExportOptions::new("Picture", html).with_cover_page(true));
    let page = page_ids(&doc)[0];

    let cm = operations(&doc, page)
        .into_iter()
        .find(|op| op.operator == "cm")
        .expect("image placement");
    // 400x300 px at 0.75 pt/px
    assert_eq!(number(&cm.operands[0]), 300.0);
    assert_eq!(number(&cm.operands[3]), 225.0);

    let masked = doc.objects.values().any(|obj| match obj {
        Object::Stream(s) => s.dict.get(b"SMask").is_ok(),
        _ => false,
    });
    assert!(masked);
}

#[test]
fn test_unloadable_image_is_skipped() {
    let html = r#"<p><img src="missing/nowhere.png"></p><p>kept</p>"#;
    let doc = export(&ExportOptions::new("Missing", html).with_cover_page(true));
    let page = page_ids(&doc)[0];
    assert!(!draws_image(&doc, page));
    assert_eq!(page_text(&doc, page), vec!["kept"]);
}

#[test]
fn test_info_dictionary() {
    let doc = export(&ExportOptions::new("Meta", "<p>x</p>").with_author("Jane Doe"));
    let info_id = doc.trailer.get(b"Info").and_then(Object::as_reference).unwrap();
    let info = doc.get_dictionary(info_id).unwrap();
    assert_eq!(info.get(b"Title").and_then(Object::as_str).unwrap(), b"Meta");
    assert_eq!(info.get(b"Author").and_then(Object::as_str).unwrap(), b"Jane Doe");
}

#[test]
fn test_custom_author_label() {
    let exporter = PdfExporter::new().with_config(PdfConfig {
        author_label: "por".into(),
        ..Default::default()
    });
    let options = ExportOptions::new("Livro", "<p>x</p>").with_author("Ana Souza");
    let mut out = Cursor::new(Vec::new());
    exporter
        .export(&options, &parse_html_content(&options.content), &mut out)
        .unwrap();
    let doc = load(out.get_ref());
    let title_page = page_ids(&doc)[0];
    assert_eq!(page_text(&doc, title_page), vec!["Livro", "por Ana Souza"]);
}
