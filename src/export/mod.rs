//! Export module for writing documents to DOCX and PDF.
//!
//! Provides the `Exporter` trait and the two format implementations.
//!
//! # Architecture
//!
//! The `Exporter` trait uses a builder pattern:
//! - `new()` creates an exporter with default configuration
//! - `with_config()` allows customization
//! - `with_loader()` swaps the image fetcher
//! - `export()` writes to any `Write + Seek` destination
//!
//! Both exporters consume the same parsed block stream through
//! [`BlockVisitor`] and share the front-matter decision ([`FrontMatter`]),
//! the ordered-list numbering ([`ListCounter`]) and image sizing
//! ([`fit_within`]). They share no mutable state and can run concurrently.
//!
//! # Example
//!
//! ```no_run
//! use folio::{ExportOptions, parse_html_content};
//! use folio::export::{DocxExporter, Exporter};
//! use std::fs::File;
//!
//! let options = ExportOptions::new("My Book", "<h1>One</h1><p>Text</p>");
//! let blocks = parse_html_content(&options.content);
//! let mut file = File::create("My Book.docx")?;
//! DocxExporter::new().export(&options, &blocks, &mut file)?;
//! # Ok::<(), folio::Error>(())
//! ```

use std::fmt;
use std::io::{BufWriter, Cursor, Seek, Write};
use std::path::{Path, PathBuf};

use image::DynamicImage;
use log::{debug, warn};

use crate::error::Result;
use crate::model::{Align, ContentBlock, ExportOptions, HeadingLevel, InlineRun};

mod docx;
mod pdf;
mod resources;

pub use docx::{DocxConfig, DocxExporter};
pub use pdf::{PdfConfig, PdfExporter};
pub use resources::{DefaultLoader, ResourceLoader, load_image};

pub(crate) use resources::truncate;

/// Trait for exporting documents to specific formats.
pub trait Exporter {
    /// Render `blocks` with the metadata in `options` to the provided writer.
    ///
    /// `blocks` is normally `parse_html_content(&options.content)`; the
    /// exporter never re-parses `options.content` itself.
    fn export<W: Write + Seek>(
        &self,
        options: &ExportOptions,
        blocks: &[ContentBlock],
        writer: &mut W,
    ) -> Result<()>;
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Docx,
    Pdf,
}

impl Format {
    pub fn extension(self) -> &'static str {
        match self {
            Format::Docx => "docx",
            Format::Pdf => "pdf",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// What precedes the body.
#[derive(Debug)]
pub enum FrontMatter {
    /// A full-page cover image.
    Cover(DynamicImage),
    /// A generated title page with the title and optional author line.
    TitlePage,
    /// The caller's cover already carries the title; start with the body.
    Nothing,
}

impl FrontMatter {
    /// Decide the front matter for an export.
    ///
    /// A cover that fails to decode is dropped with a warning and replaced
    /// by a title page, so a broken snapshot never loses the title.
    pub fn resolve(options: &ExportOptions) -> Self {
        match &options.cover {
            Some(cover) => match cover.decode() {
                Ok(image) => FrontMatter::Cover(image),
                Err(e) => {
                    warn!("cover snapshot unusable, adding a title page instead: {e}");
                    FrontMatter::TitlePage
                }
            },
            None if options.has_cover_page => FrontMatter::Nothing,
            None => FrontMatter::TitlePage,
        }
    }
}

/// Numbering for ordered list items.
///
/// Each ordered item takes the next number; an unordered item resets the
/// sequence so the next ordered list starts again at 1. Other blocks leave
/// the counter alone.
#[derive(Debug, Default)]
pub struct ListCounter {
    current: u32,
}

impl ListCounter {
    /// The number for `block`, if it is an ordered list item.
    pub fn advance(&mut self, block: &ContentBlock) -> Option<u32> {
        match block {
            ContentBlock::ListItem { ordered: true, .. } => {
                self.current += 1;
                Some(self.current)
            }
            ContentBlock::ListItem { ordered: false, .. } => {
                self.current = 0;
                None
            }
            _ => None,
        }
    }
}

/// Per-format rendering of each block kind.
pub trait BlockVisitor {
    fn heading(&mut self, level: HeadingLevel, runs: &[InlineRun], align: Align) -> Result<()>;

    fn paragraph(&mut self, runs: &[InlineRun], align: Align) -> Result<()>;

    /// `number` is set for ordered items.
    fn list_item(
        &mut self,
        number: Option<u32>,
        runs: &[InlineRun],
        level: u32,
        align: Align,
    ) -> Result<()>;

    fn image(&mut self, source: &str, width: u32, height: u32, align: Align) -> Result<()>;
}

/// Feed `blocks` to `visitor` in order.
pub fn walk_blocks<V: BlockVisitor + ?Sized>(blocks: &[ContentBlock], visitor: &mut V) -> Result<()> {
    let mut counter = ListCounter::default();
    for block in blocks {
        let number = counter.advance(block);
        match block {
            ContentBlock::Heading { level, runs, align } => visitor.heading(*level, runs, *align)?,
            ContentBlock::Paragraph { runs, align } => visitor.paragraph(runs, *align)?,
            ContentBlock::ListItem {
                runs, level, align, ..
            } => visitor.list_item(number, runs, *level, *align)?,
            ContentBlock::Image {
                source,
                width,
                height,
                align,
            } => visitor.image(source, *width, *height, *align)?,
        }
    }
    Ok(())
}

/// Scale `(width, height)` down to fit the box, keeping the aspect ratio.
///
/// Never upscales. Degenerate sizes come back unchanged.
pub fn fit_within(width: f32, height: f32, max_width: f32, max_height: f32) -> (f32, f32) {
    if width <= 0.0 || height <= 0.0 {
        return (width, height);
    }
    let scale = (max_width / width).min(max_height / height).min(1.0);
    (width * scale, height * scale)
}

/// Display size in px of an image block.
///
/// Declared dimensions win; a single declared dimension keeps the decoded
/// image's aspect ratio; otherwise the decoded size is used.
pub(crate) fn display_size(declared_w: u32, declared_h: u32, image: &DynamicImage) -> (f32, f32) {
    let (nat_w, nat_h) = (image.width() as f32, image.height() as f32);
    match (declared_w, declared_h) {
        (0, 0) => (nat_w, nat_h),
        (w, 0) if nat_w > 0.0 => (w as f32, nat_h * w as f32 / nat_w),
        (0, h) if nat_h > 0.0 => (nat_w * h as f32 / nat_h, h as f32),
        (w, h) => (w as f32, h as f32),
    }
}

/// Make a title safe to use as a file name.
///
/// Removes `<>:"/\|?*` and control characters without substitution and
/// trims; an empty result becomes `"ebook"`.
pub fn sanitize_filename(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| !c.is_control())
        .filter(|c| !matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*'))
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        "ebook".to_string()
    } else {
        cleaned.to_string()
    }
}

fn to_bytes<E: Exporter>(exporter: &E, options: &ExportOptions, blocks: &[ContentBlock]) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    exporter.export(options, blocks, &mut cursor)?;
    Ok(cursor.into_inner())
}

/// Build a DOCX package in memory with the default configuration.
pub fn build_docx(options: &ExportOptions, blocks: &[ContentBlock]) -> Result<Vec<u8>> {
    to_bytes(&DocxExporter::new(), options, blocks)
}

/// Build a PDF document in memory with the default configuration.
pub fn build_pdf(options: &ExportOptions, blocks: &[ContentBlock]) -> Result<Vec<u8>> {
    to_bytes(&PdfExporter::new(), options, blocks)
}

/// Write `{sanitized title}.{ext}` into `dir` and return its path.
///
/// The document is staged in a temporary file next to the target and only
/// renamed over it once the export succeeded; on error any existing file is
/// left untouched.
pub fn export_to_dir<E: Exporter>(
    exporter: &E,
    format: Format,
    dir: &Path,
    options: &ExportOptions,
    blocks: &[ContentBlock],
) -> Result<PathBuf> {
    let path = dir.join(format!("{}.{}", sanitize_filename(&options.title), format));
    debug!("exporting {format} to {}", path.display());

    let mut staged = tempfile::NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(staged.as_file_mut());
        exporter.export(options, blocks, &mut writer)?;
        writer.flush()?;
    }
    staged.persist(&path).map_err(|e| e.error)?;
    Ok(path)
}

pub fn export_docx_to_dir(dir: &Path, options: &ExportOptions, blocks: &[ContentBlock]) -> Result<PathBuf> {
    export_to_dir(&DocxExporter::new(), Format::Docx, dir, options, blocks)
}

pub fn export_pdf_to_dir(dir: &Path, options: &ExportOptions, blocks: &[ContentBlock]) -> Result<PathBuf> {
    export_to_dir(&PdfExporter::new(), Format::Pdf, dir, options, blocks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CoverSnapshot;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename(r#"My/Book:"Title"?"#), "MyBookTitle");
        assert_eq!(sanitize_filename("  <*>  "), "ebook");
        assert_eq!(sanitize_filename("Plain Title"), "Plain Title");
        assert_eq!(sanitize_filename("Nul\0Tab\tBell\u{7}"), "NulTabBell");
        assert_eq!(sanitize_filename("\n\r\0"), "ebook");
    }

    #[test]
    fn test_fit_within_keeps_aspect_and_never_upscales() {
        assert_eq!(fit_within(1200.0, 800.0, 600.0, 800.0), (600.0, 400.0));
        assert_eq!(fit_within(100.0, 1600.0, 600.0, 800.0), (50.0, 800.0));
        assert_eq!(fit_within(10.0, 20.0, 600.0, 800.0), (10.0, 20.0));
    }

    #[test]
    fn test_list_counter_resets_on_unordered_item() {
        let ordered = ContentBlock::list_item(true, vec![InlineRun::plain("o")]);
        let bullet = ContentBlock::list_item(false, vec![InlineRun::plain("b")]);
        let para = ContentBlock::paragraph(vec![InlineRun::plain("p")]);

        let mut counter = ListCounter::default();
        let numbers: Vec<Option<u32>> = [&ordered, &ordered, &para, &ordered, &bullet, &ordered]
            .into_iter()
            .map(|b| counter.advance(b))
            .collect();
        assert_eq!(numbers, vec![Some(1), Some(2), None, Some(3), None, Some(1)]);
    }

    #[test]
    fn test_front_matter_resolution() {
        let base = ExportOptions::new("T", "");
        assert!(matches!(FrontMatter::resolve(&base), FrontMatter::TitlePage));

        let suppressed = base.clone().with_cover_page(true);
        assert!(matches!(FrontMatter::resolve(&suppressed), FrontMatter::Nothing));

        let cover = DynamicImage::new_rgb8(4, 4);
        let with_cover = base.clone().with_cover(CoverSnapshot::from_image(cover));
        assert!(matches!(FrontMatter::resolve(&with_cover), FrontMatter::Cover(_)));

        let broken = base.with_cover(CoverSnapshot::from_bytes(b"not an image".to_vec()));
        assert!(matches!(FrontMatter::resolve(&broken), FrontMatter::TitlePage));
    }

    #[test]
    fn test_display_size_fills_missing_dimension() {
        let image = DynamicImage::new_rgb8(200, 100);
        assert_eq!(display_size(0, 0, &image), (200.0, 100.0));
        assert_eq!(display_size(50, 0, &image), (50.0, 25.0));
        assert_eq!(display_size(0, 50, &image), (100.0, 50.0));
        assert_eq!(display_size(30, 40, &image), (30.0, 40.0));
    }
}
