//! # folio
//!
//! Rich-text ebook export: sanitized editor HTML in, PDF and DOCX out.
//!
//! ## Features
//!
//! - Reduce editor markup to a flat stream of typed content blocks
//! - Estimate pagination of chapters with a pluggable measurement surface
//! - Assemble a Word-compatible DOCX package
//! - Render a paginated PDF with a title page or full-bleed cover
//!
//! ## Quick Start
//!
//! ```no_run
//! use folio::{ExportOptions, build_pdf, parse_html_content, sanitize_html};
//!
//! let html = sanitize_html("<h1>Chapter 1</h1><p>It was a dark night.</p>");
//! let options = ExportOptions::new("My Book", html).with_author("Jane Doe");
//! let blocks = parse_html_content(&options.content);
//! let pdf = build_pdf(&options, &blocks)?;
//! std::fs::write("My Book.pdf", pdf)?;
//! # Ok::<(), folio::Error>(())
//! ```
//!
//! ## Pagination
//!
//! ```
//! use folio::{PageGeometry, paginate_book};
//!
//! let chapters = ["<p>One</p>", "<p>Two</p>"];
//! let layout = paginate_book(&chapters, PageGeometry::default());
//! assert_eq!(layout.pages()[1].key, "1-0");
//! ```

pub mod dom;
pub mod error;
pub mod export;
pub mod metrics;
pub mod model;
pub mod paginate;
pub mod parse;
pub mod sanitize;
pub mod validate;

pub use error::{Error, Result};
pub use export::{
    DocxConfig, DocxExporter, Exporter, Format, PdfConfig, PdfExporter, build_docx, build_pdf,
    export_docx_to_dir, export_pdf_to_dir, sanitize_filename,
};
pub use model::{Align, ContentBlock, CoverSnapshot, ExportOptions, HeadingLevel, InlineRun, Page};
pub use paginate::{
    BookLayout, EditorEstimate, PageGeometry, estimate_editor_pages, paginate_book,
    paginate_chapter,
};
pub use parse::parse_html_content;
pub use sanitize::sanitize_html;
pub use validate::{ValidationError, validate_chapter};
