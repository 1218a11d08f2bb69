//! Benchmarks for the export pipeline.
//!
//! Run with: cargo bench

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

use folio::{
    ExportOptions, PageGeometry, build_docx, build_pdf, estimate_editor_pages, paginate_book,
    parse_html_content, sanitize_html,
};

/// A chapter of mixed editor markup, repeated to a realistic length.
fn sample_chapter() -> String {
    let section = r#"
<h2>The Crossing</h2>
<p>It was past midnight when the ferry left the harbour, and the <em>wind</em> had
turned <strong>cold and steady</strong> from the north. Nobody on deck spoke.</p>
<p style="text-align: justify">The lamps along the rail swung with the swell, throwing
long shadows over the coiled ropes and the crates lashed near the bow.</p>
<ul><li>one lantern</li><li>two coats</li><li>a letter, unopened</li></ul>
<ol><li>cast off</li><li>clear the breakwater</li></ol>
<p><br></p>
"#;
    section.repeat(40)
}

fn bench_parse(c: &mut Criterion) {
    let html = sample_chapter();
    c.bench_function("sanitize_html", |b| b.iter(|| sanitize_html(black_box(&html))));
    c.bench_function("parse_html_content", |b| {
        b.iter(|| parse_html_content(black_box(&html)))
    });
}

fn bench_paginate(c: &mut Criterion) {
    let chapters = vec![sample_chapter(); 4];
    c.bench_function("paginate_book", |b| {
        b.iter(|| paginate_book(black_box(&chapters), PageGeometry::default()))
    });

    let html = sample_chapter();
    c.bench_function("estimate_editor_pages", |b| {
        b.iter(|| estimate_editor_pages(black_box(&html), PageGeometry::default()))
    });
}

fn bench_export(c: &mut Criterion) {
    let options = ExportOptions::new("Benchmark", sample_chapter()).with_author("A. Writer");
    let blocks = parse_html_content(&options.content);

    c.bench_function("build_docx", |b| {
        b.iter(|| build_docx(black_box(&options), black_box(&blocks)).unwrap())
    });
    c.bench_function("build_pdf", |b| {
        b.iter(|| build_pdf(black_box(&options), black_box(&blocks)).unwrap())
    });
}

criterion_group!(benches, bench_parse, bench_paginate, bench_export);
criterion_main!(benches);
