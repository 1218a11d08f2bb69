//! PDF exporter.
//!
//! Lays blocks onto fixed A4 pages with a top-down cursor. Text uses the
//! standard Helvetica faces, wrapped with the shared metrics tables; a line
//! never straddles a page boundary. Images are re-rasterized and embedded
//! as XObjects.

use std::io::{Seek, Write};

use flate2::Compression;
use flate2::write::ZlibEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbImage};
use log::{debug, warn};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};

use crate::error::Result;
use crate::metrics::{FontStyle, text_width, to_win_ansi, wrap_text};
use crate::model::{Align, ContentBlock, ExportOptions, HeadingLevel, InlineRun};

use super::resources::{DefaultLoader, ResourceLoader, load_image};
use super::{BlockVisitor, Exporter, FrontMatter, display_size, fit_within, truncate, walk_blocks};

/// Points per CSS pixel.
const PT_PER_PX: f32 = 0.75;
/// Baseline offset from the top of a line box, as a fraction of the font size.
const ASCENT: f32 = 0.8;
/// A block starting this close to the bottom margin goes to the next page.
const BLOCK_KEEP: f32 = 40.0;

/// Font size, spacing and line height of a block kind, in points.
#[derive(Debug, Clone, Copy)]
struct TextStyle {
    size: f32,
    bold: bool,
    before: f32,
    after: f32,
    line_height: f32,
}

fn heading_style(level: HeadingLevel) -> TextStyle {
    match level {
        HeadingLevel::H1 => TextStyle {
            size: 24.0,
            bold: true,
            before: 20.0,
            after: 12.0,
            line_height: 30.0,
        },
        HeadingLevel::H2 => TextStyle {
            size: 18.0,
            bold: true,
            before: 16.0,
            after: 10.0,
            line_height: 24.0,
        },
        HeadingLevel::H3 => TextStyle {
            size: 14.0,
            bold: true,
            before: 12.0,
            after: 8.0,
            line_height: 20.0,
        },
    }
}

/// Configuration for PDF export.
#[derive(Debug, Clone)]
pub struct PdfConfig {
    /// Word placed before the author's name on the title page.
    pub author_label: String,
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    /// Line advance for body text.
    pub line_height: f32,
    /// Extra left indent for list items.
    pub list_indent: f32,
    /// Tallest an inline image may be drawn; its width is capped by the
    /// content width.
    pub max_image_height: f32,
    /// JPEG quality of the embedded cover (1-100).
    pub cover_quality: u8,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            author_label: "by".to_string(),
            page_width: 595.28,
            page_height: 841.89,
            margin: 72.0,
            line_height: 18.0,
            list_indent: 20.0,
            max_image_height: 500.0,
            cover_quality: 95,
        }
    }
}

impl PdfConfig {
    fn content_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }

    fn max_y(&self) -> f32 {
        self.page_height - self.margin
    }

    fn body_style(&self) -> TextStyle {
        TextStyle {
            size: 12.0,
            bold: false,
            before: 0.0,
            after: 8.0,
            line_height: self.line_height,
        }
    }
}

/// PDF format exporter.
pub struct PdfExporter {
    config: PdfConfig,
    loader: Box<dyn ResourceLoader>,
}

impl PdfExporter {
    /// Create a new exporter with default configuration.
    pub fn new() -> Self {
        Self {
            config: PdfConfig::default(),
            loader: Box::new(DefaultLoader::new()),
        }
    }

    /// Configure the exporter with custom settings.
    pub fn with_config(mut self, config: PdfConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a different image loader.
    pub fn with_loader(mut self, loader: impl ResourceLoader + 'static) -> Self {
        self.loader = Box::new(loader);
        self
    }
}

impl Default for PdfExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Exporter for PdfExporter {
    fn export<W: Write + Seek>(
        &self,
        options: &ExportOptions,
        blocks: &[ContentBlock],
        writer: &mut W,
    ) -> Result<()> {
        let mut canvas = Canvas::new(&self.config, self.loader.as_ref());

        match FrontMatter::resolve(options) {
            FrontMatter::Cover(image) => {
                if canvas.cover(&image)? {
                    canvas.finish_page()?;
                } else {
                    canvas.title_page(&options.title, options.author.as_deref())?;
                }
            }
            FrontMatter::TitlePage => {
                canvas.title_page(&options.title, options.author.as_deref())?;
            }
            FrontMatter::Nothing => {}
        }

        walk_blocks(blocks, &mut canvas)?;
        let mut document = canvas.finish(options)?;
        document.save_to(writer)?;
        Ok(())
    }
}

/// Document under construction plus the page currently being drawn.
struct Canvas<'a> {
    config: &'a PdfConfig,
    loader: &'a dyn ResourceLoader,
    doc: Document,
    pages_id: ObjectId,
    fonts_id: ObjectId,
    page_ids: Vec<ObjectId>,
    ops: Vec<Operation>,
    xobjects: Dictionary,
    page_open: bool,
    image_count: usize,
    /// Top of the next line box, measured down from the page top.
    y: f32,
}

impl<'a> Canvas<'a> {
    fn new(config: &'a PdfConfig, loader: &'a dyn ResourceLoader) -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut fonts = Dictionary::new();
        for style in FontStyle::ALL {
            let font_id = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => style.base_font(),
                "Encoding" => "WinAnsiEncoding",
            });
            fonts.set(style.resource_name(), font_id);
        }
        let fonts_id = doc.add_object(fonts);

        Self {
            config,
            loader,
            doc,
            pages_id,
            fonts_id,
            page_ids: Vec::new(),
            ops: Vec::new(),
            xobjects: Dictionary::new(),
            page_open: false,
            image_count: 0,
            y: config.margin,
        }
    }

    fn ensure_page(&mut self) {
        if !self.page_open {
            self.page_open = true;
            self.y = self.config.margin;
        }
    }

    /// Close the current page, if any, and emit its objects.
    fn finish_page(&mut self) -> Result<()> {
        if !self.page_open {
            return Ok(());
        }
        let content = Content {
            operations: std::mem::take(&mut self.ops),
        };
        let compressed = deflate(&content.encode()?)?;
        let content_id = self
            .doc
            .add_object(Stream::new(dictionary! { "Filter" => "FlateDecode" }, compressed));

        let mut resources = dictionary! { "Font" => self.fonts_id };
        let xobjects = std::mem::take(&mut self.xobjects);
        if !xobjects.is_empty() {
            resources.set("XObject", xobjects);
        }

        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), self.config.page_width.into(), self.config.page_height.into()],
            "Contents" => content_id,
            "Resources" => resources,
        });
        self.page_ids.push(page_id);
        self.page_open = false;
        Ok(())
    }

    fn new_page(&mut self) -> Result<()> {
        self.finish_page()?;
        self.ensure_page();
        Ok(())
    }

    /// Assemble the page tree and metadata.
    fn finish(mut self, options: &ExportOptions) -> Result<Document> {
        // An export always has at least one body page.
        self.ensure_page();
        self.finish_page()?;

        let kids: Vec<Object> = self.page_ids.iter().map(|&id| id.into()).collect();
        let count = kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        let mut info = dictionary! {
            "Title" => text_string(&options.title),
            "Producer" => Object::string_literal("folio"),
        };
        if let Some(author) = &options.author {
            info.set("Author", text_string(author));
        }
        let info_id = self.doc.add_object(info);
        self.doc.trailer.set("Info", info_id);

        debug!("pdf: {} pages, {} images", self.page_ids.len(), self.image_count);
        Ok(self.doc)
    }

    fn add_xobject(&mut self, stream: Stream) -> String {
        self.image_count += 1;
        let name = format!("Im{}", self.image_count);
        let id = self.doc.add_object(stream);
        self.xobjects.set(name.as_str(), id);
        name
    }

    /// Paint an XObject into a box whose top-left corner is `(x, top)`.
    fn draw_xobject(&mut self, name: &str, x: f32, top: f32, width: f32, height: f32) {
        let bottom = self.config.page_height - top - height;
        self.ops.push(Operation::new("q", vec![]));
        self.ops.push(Operation::new(
            "cm",
            vec![width.into(), 0.into(), 0.into(), height.into(), x.into(), bottom.into()],
        ));
        self.ops
            .push(Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]));
        self.ops.push(Operation::new("Q", vec![]));
    }

    /// Draw one line whose box starts at the current cursor.
    fn draw_line(&mut self, text: &str, style: FontStyle, size: f32, x: f32, word_spacing: f32) {
        let baseline = self.config.page_height - (self.y + size * ASCENT);
        self.ops.push(Operation::new("BT", vec![]));
        self.ops.push(Operation::new(
            "Tf",
            vec![Object::Name(style.resource_name().as_bytes().to_vec()), size.into()],
        ));
        if word_spacing != 0.0 {
            self.ops.push(Operation::new("Tw", vec![word_spacing.into()]));
        }
        self.ops.push(Operation::new("Td", vec![x.into(), baseline.into()]));
        self.ops.push(Operation::new(
            "Tj",
            vec![Object::String(to_win_ansi(text), StringFormat::Literal)],
        ));
        if word_spacing != 0.0 {
            self.ops.push(Operation::new("Tw", vec![0.into()]));
        }
        self.ops.push(Operation::new("ET", vec![]));
    }

    /// Full-bleed JPEG cover on its own page. Returns false when the cover
    /// could not be encoded.
    fn cover(&mut self, image: &DynamicImage) -> Result<bool> {
        let rgb = flatten_on_white(image);
        let mut jpeg = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut jpeg, self.config.cover_quality);
        if let Err(e) = rgb.write_with_encoder(encoder) {
            warn!("cover could not be encoded: {e}");
            return Ok(false);
        }

        let stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => rgb.width() as i64,
                "Height" => rgb.height() as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            jpeg,
        );

        self.ensure_page();
        let name = self.add_xobject(stream);
        let (w, h) = (self.config.page_width, self.config.page_height);
        self.draw_xobject(&name, 0.0, 0.0, w, h);
        Ok(true)
    }

    fn title_page(&mut self, title: &str, author: Option<&str>) -> Result<()> {
        self.ensure_page();
        let center = self.config.page_width / 2.0;
        let content_width = self.config.content_width();

        self.y = self.config.margin + 150.0;
        for line in wrap_text(title, content_width, FontStyle::Bold, 28.0) {
            let width = text_width(&line, FontStyle::Bold, 28.0);
            self.draw_line(&line, FontStyle::Bold, 28.0, center - width / 2.0, 0.0);
            self.y += 35.0;
        }
        self.y += 50.0;

        if let Some(author) = author {
            let line = format!("{} {author}", self.config.author_label);
            for line in wrap_text(&line, content_width, FontStyle::Italic, 16.0) {
                let width = text_width(&line, FontStyle::Italic, 16.0);
                self.draw_line(&line, FontStyle::Italic, 16.0, center - width / 2.0, 0.0);
                self.y += 20.0;
            }
        }

        self.finish_page()
    }

    /// Start a block: open a page if needed and break when the cursor is
    /// already too close to the bottom margin.
    fn begin_block(&mut self) -> Result<()> {
        self.ensure_page();
        if self.y > self.config.max_y() - BLOCK_KEEP {
            self.new_page()?;
        }
        Ok(())
    }

    fn text_block(
        &mut self,
        style: TextStyle,
        prefix: Option<String>,
        runs: &[InlineRun],
        align: Align,
        indent: f32,
    ) -> Result<()> {
        self.begin_block()?;
        self.y += style.before;

        let mut text = prefix.unwrap_or_default();
        for run in runs {
            text.push_str(&run.text);
        }
        if text.trim().is_empty() {
            self.y += self.config.line_height;
            return Ok(());
        }

        let font = emphasis(runs, style.bold);
        let left = self.config.margin + indent;
        let width = self.config.content_width() - indent;
        let lines = wrap_text(&text, width, font, style.size);
        let last = lines.len().saturating_sub(1);

        for (i, line) in lines.iter().enumerate() {
            if self.y + style.line_height > self.config.max_y() {
                self.new_page()?;
            }
            let line_width = text_width(line, font, style.size);
            let (x, word_spacing) = match align {
                Align::Left => (left, 0.0),
                Align::Center => (left + (width - line_width) / 2.0, 0.0),
                Align::Right => (left + width - line_width, 0.0),
                Align::Justify => {
                    let gaps = line.matches(' ').count();
                    if i == last || gaps == 0 {
                        (left, 0.0)
                    } else {
                        (left, (width - line_width) / gaps as f32)
                    }
                }
            };
            self.draw_line(line, font, style.size, x, word_spacing);
            self.y += style.line_height;
        }

        self.y += style.after;
        Ok(())
    }
}

impl BlockVisitor for Canvas<'_> {
    fn heading(&mut self, level: HeadingLevel, runs: &[InlineRun], align: Align) -> Result<()> {
        self.text_block(heading_style(level), None, runs, align, 0.0)
    }

    fn paragraph(&mut self, runs: &[InlineRun], align: Align) -> Result<()> {
        let style = self.config.body_style();
        self.text_block(style, None, runs, align, 0.0)
    }

    fn list_item(
        &mut self,
        number: Option<u32>,
        runs: &[InlineRun],
        _level: u32,
        align: Align,
    ) -> Result<()> {
        let prefix = match number {
            Some(n) => format!("{n}. "),
            None => "\u{2022} ".to_string(),
        };
        let style = self.config.body_style();
        let indent = self.config.list_indent;
        self.text_block(style, Some(prefix), runs, align, indent)
    }

    /// Images are always centered; `align` only applies to text.
    fn image(&mut self, source: &str, width: u32, height: u32, _align: Align) -> Result<()> {
        let image = match load_image(self.loader, source) {
            Ok(image) => image,
            Err(e) => {
                warn!("skipping image {}: {e}", truncate(source));
                return Ok(());
            }
        };

        let (w, h) = display_size(width, height, &image);
        let (w, h) = fit_within(
            w * PT_PER_PX,
            h * PT_PER_PX,
            self.config.content_width(),
            self.config.max_image_height,
        );
        if w <= 0.0 || h <= 0.0 {
            warn!("skipping image {}: empty size", truncate(source));
            return Ok(());
        }

        self.begin_block()?;
        if self.y + h > self.config.max_y() && self.y > self.config.margin {
            self.new_page()?;
        }

        let stream = image_stream(&mut self.doc, &image)?;
        let name = self.add_xobject(stream);
        let x = self.config.margin + (self.config.content_width() - w) / 2.0;
        let top = self.y;
        self.draw_xobject(&name, x, top, w, h);
        self.y += h + self.config.body_style().after;
        Ok(())
    }
}

/// Pick the face for a block: the visible runs' style when they all share
/// the same bold/italic combination, plain otherwise. Headings are always
/// bold.
fn emphasis(runs: &[InlineRun], heading: bool) -> FontStyle {
    let mut styles = runs
        .iter()
        .filter(|r| !r.is_blank())
        .map(|r| (r.bold, r.italic));
    let (bold, italic) = match styles.next() {
        Some(first) if styles.all(|s| s == first) => first,
        _ => (false, false),
    };
    FontStyle::from_flags(heading || bold, italic)
}

/// Composite onto white and drop alpha.
fn flatten_on_white(image: &DynamicImage) -> RgbImage {
    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let a = u16::from(a);
        let blend = |c: u8| ((u16::from(c) * a + 255 * (255 - a) + 127) / 255) as u8;
        image::Rgb([blend(r), blend(g), blend(b)])
    })
}

fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

fn image_dict(width: u32, height: u32, color_space: &str) -> Dictionary {
    dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => width as i64,
        "Height" => height as i64,
        "ColorSpace" => color_space,
        "BitsPerComponent" => 8,
        "Filter" => "FlateDecode",
    }
}

/// Flate-compressed RGB image. Transparency goes into a separate soft mask
/// object.
fn image_stream(doc: &mut Document, image: &DynamicImage) -> Result<Stream> {
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    let mut alpha = Vec::with_capacity((width * height) as usize);
    for pixel in rgba.pixels() {
        let [r, g, b, a] = pixel.0;
        rgb.extend_from_slice(&[r, g, b]);
        alpha.push(a);
    }

    let mut dict = image_dict(width, height, "DeviceRGB");
    if alpha.iter().any(|&a| a != 255) {
        let mask = Stream::new(image_dict(width, height, "DeviceGray"), deflate(&alpha)?);
        dict.set("SMask", doc.add_object(mask));
    }
    Ok(Stream::new(dict, deflate(&rgb)?))
}

/// A PDF text string: literal for ASCII, UTF-16BE with BOM otherwise.
fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::string_literal(text);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}
