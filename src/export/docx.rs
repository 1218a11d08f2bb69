//! DOCX exporter.
//!
//! Writes a minimal WordprocessingML package: one body section with
//! one-inch margins, optionally preceded by a zero-margin cover section.
//! Inline styling is carried per run, so mixed emphasis survives exactly.

use std::io::{Cursor, Seek, Write};

use image::{DynamicImage, ImageFormat};
use log::{debug, warn};
use quick_xml::escape::escape;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::Result;
use crate::model::{Align, ContentBlock, ExportOptions, HeadingLevel, InlineRun};

use super::resources::{DefaultLoader, ResourceLoader, load_image};
use super::{BlockVisitor, Exporter, FrontMatter, display_size, fit_within, truncate, walk_blocks};

/// A4 in twentieths of a point.
const A4_TWIPS: (u32, u32) = (11906, 16838);
/// One inch in twentieths of a point.
const BODY_MARGIN: u32 = 1440;
const EMU_PER_PX: f32 = 9525.0;
const EMU_PER_TWIP: u32 = 635;

/// Run size (half-points) and paragraph spacing (twips) of a block kind.
#[derive(Debug, Clone, Copy)]
struct ParagraphStyle {
    size: u32,
    before: u32,
    after: u32,
}

const BODY: ParagraphStyle = ParagraphStyle {
    size: 24,
    before: 0,
    after: 200,
};

fn heading_style(level: HeadingLevel) -> ParagraphStyle {
    match level {
        HeadingLevel::H1 => ParagraphStyle {
            size: 48,
            before: 400,
            after: 200,
        },
        HeadingLevel::H2 => ParagraphStyle {
            size: 36,
            before: 300,
            after: 150,
        },
        HeadingLevel::H3 => ParagraphStyle {
            size: 28,
            before: 200,
            after: 100,
        },
    }
}

/// Configuration for DOCX export.
#[derive(Debug, Clone)]
pub struct DocxConfig {
    /// Word placed before the author's name on the title page.
    pub author_label: String,
    /// Bounding box for embedded images, in px.
    pub max_image_width: u32,
    pub max_image_height: u32,
    /// Compression level for deflate (0-9, default 6).
    pub compression_level: Option<u32>,
}

impl Default for DocxConfig {
    fn default() -> Self {
        Self {
            author_label: "by".to_string(),
            max_image_width: 600,
            max_image_height: 800,
            compression_level: None,
        }
    }
}

/// DOCX format exporter.
pub struct DocxExporter {
    config: DocxConfig,
    loader: Box<dyn ResourceLoader>,
}

impl DocxExporter {
    /// Create a new exporter with default configuration.
    pub fn new() -> Self {
        Self {
            config: DocxConfig::default(),
            loader: Box::new(DefaultLoader::new()),
        }
    }

    /// Configure the exporter with custom settings.
    pub fn with_config(mut self, config: DocxConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a different image loader.
    pub fn with_loader(mut self, loader: impl ResourceLoader + 'static) -> Self {
        self.loader = Box::new(loader);
        self
    }
}

impl Default for DocxExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Exporter for DocxExporter {
    fn export<W: Write + Seek>(
        &self,
        options: &ExportOptions,
        blocks: &[ContentBlock],
        writer: &mut W,
    ) -> Result<()> {
        let mut body = DocumentBody::new(&self.config, self.loader.as_ref());

        let has_cover = match FrontMatter::resolve(options) {
            FrontMatter::Cover(image) => {
                let embedded = body.cover(&image)?;
                if !embedded {
                    body.title_page(&options.title, options.author.as_deref());
                }
                embedded
            }
            FrontMatter::TitlePage => {
                body.title_page(&options.title, options.author.as_deref());
                false
            }
            FrontMatter::Nothing => false,
        };

        walk_blocks(blocks, &mut body)?;
        debug!(
            "docx: {} blocks, {} media parts",
            blocks.len(),
            body.media.len()
        );

        self.write_package(options, &body, has_cover, writer)
    }
}

impl DocxExporter {
    fn write_package<W: Write + Seek>(
        &self,
        options: &ExportOptions,
        body: &DocumentBody<'_>,
        has_cover: bool,
        writer: &mut W,
    ) -> Result<()> {
        let mut zip = ZipWriter::new(writer);

        let compression_level = self.config.compression_level.unwrap_or(6);
        let deflated = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(compression_level as i64));
        // PNG data is already compressed.
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

        zip.start_file("[Content_Types].xml", deflated)?;
        zip.write_all(CONTENT_TYPES_XML.as_bytes())?;

        zip.start_file("_rels/.rels", deflated)?;
        zip.write_all(PACKAGE_RELS_XML.as_bytes())?;

        zip.start_file("docProps/core.xml", deflated)?;
        zip.write_all(core_xml(&options.title, options.author.as_deref()).as_bytes())?;

        zip.start_file("word/document.xml", deflated)?;
        zip.write_all(document_xml(&body.xml, has_cover).as_bytes())?;

        zip.start_file("word/styles.xml", deflated)?;
        zip.write_all(STYLES_XML.as_bytes())?;

        zip.start_file("word/numbering.xml", deflated)?;
        zip.write_all(NUMBERING_XML.as_bytes())?;

        zip.start_file("word/_rels/document.xml.rels", deflated)?;
        zip.write_all(document_rels_xml(body.media.len()).as_bytes())?;

        for (i, png) in body.media.iter().enumerate() {
            zip.start_file(format!("word/media/image{}.png", i + 1), stored)?;
            zip.write_all(png)?;
        }

        zip.finish()?;
        Ok(())
    }
}

/// Accumulates `<w:body>` content and the media it references.
struct DocumentBody<'a> {
    config: &'a DocxConfig,
    loader: &'a dyn ResourceLoader,
    xml: String,
    media: Vec<Vec<u8>>,
}

impl<'a> DocumentBody<'a> {
    fn new(config: &'a DocxConfig, loader: &'a dyn ResourceLoader) -> Self {
        Self {
            config,
            loader,
            xml: String::new(),
            media: Vec::new(),
        }
    }

    /// Register a PNG part and return its relationship id.
    fn add_media(&mut self, image: &DynamicImage) -> Result<String> {
        let mut png = Vec::new();
        image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
        self.media.push(png);
        Ok(media_rel_id(self.media.len()))
    }

    /// Full-page cover in its own zero-margin section. Returns false when
    /// the cover could not be embedded.
    fn cover(&mut self, image: &DynamicImage) -> Result<bool> {
        let rel_id = match self.add_media(image) {
            Ok(id) => id,
            Err(e) => {
                warn!("cover could not be embedded: {e}");
                return Ok(false);
            }
        };
        let (cx, cy) = (A4_TWIPS.0 * EMU_PER_TWIP, A4_TWIPS.1 * EMU_PER_TWIP);
        let drawing = drawing_xml(&rel_id, self.media.len(), cx, cy);

        self.xml.push_str("<w:p><w:pPr><w:spacing w:before=\"0\" w:after=\"0\"/>");
        self.xml.push_str(&format!(
            "<w:sectPr><w:pgSz w:w=\"{}\" w:h=\"{}\"/>\
             <w:pgMar w:top=\"0\" w:right=\"0\" w:bottom=\"0\" w:left=\"0\" \
             w:header=\"0\" w:footer=\"0\" w:gutter=\"0\"/></w:sectPr>",
            A4_TWIPS.0, A4_TWIPS.1
        ));
        self.xml.push_str("</w:pPr>");
        self.xml.push_str(&drawing);
        self.xml.push_str("</w:p>");
        Ok(true)
    }

    fn title_page(&mut self, title: &str, author: Option<&str>) {
        self.xml.push_str(
            "<w:p><w:pPr><w:pStyle w:val=\"Title\"/><w:jc w:val=\"center\"/>\
             <w:spacing w:before=\"600\" w:after=\"200\"/></w:pPr>",
        );
        self.xml.push_str(&text_run(title, RunProps::default()));
        self.xml.push_str("</w:p>");

        if let Some(author) = author {
            let line = format!("{} {author}", self.config.author_label);
            self.xml.push_str(
                "<w:p><w:pPr><w:jc w:val=\"center\"/><w:spacing w:after=\"600\"/></w:pPr>",
            );
            self.xml.push_str(&text_run(
                &line,
                RunProps {
                    italic: true,
                    size: Some(28),
                    ..Default::default()
                },
            ));
            self.xml.push_str("</w:p>");
        }

        self.xml.push_str("<w:p><w:r><w:br w:type=\"page\"/></w:r></w:p>");
    }

    fn text_paragraph(
        &mut self,
        props: &str,
        style: ParagraphStyle,
        prefix: Option<String>,
        runs: &[InlineRun],
        align: Align,
    ) {
        self.xml.push_str("<w:p><w:pPr>");
        self.xml.push_str(props);
        self.xml.push_str(&format!(
            "<w:spacing w:before=\"{}\" w:after=\"{}\"/>",
            style.before, style.after
        ));
        self.xml.push_str(&jc_xml(align));
        self.xml.push_str("</w:pPr>");

        let size = Some(style.size);
        if let Some(prefix) = prefix {
            self.xml.push_str(&text_run(
                &prefix,
                RunProps {
                    size,
                    ..Default::default()
                },
            ));
        }
        for run in runs {
            self.xml.push_str(&text_run(
                &run.text,
                RunProps {
                    bold: run.bold,
                    italic: run.italic,
                    underline: run.underline,
                    size,
                },
            ));
        }
        self.xml.push_str("</w:p>");
    }
}

impl BlockVisitor for DocumentBody<'_> {
    fn heading(&mut self, level: HeadingLevel, runs: &[InlineRun], align: Align) -> Result<()> {
        let props = format!("<w:pStyle w:val=\"Heading{}\"/>", level.number());
        self.text_paragraph(&props, heading_style(level), None, runs, align);
        Ok(())
    }

    fn paragraph(&mut self, runs: &[InlineRun], align: Align) -> Result<()> {
        self.text_paragraph("", BODY, None, runs, align);
        Ok(())
    }

    fn list_item(
        &mut self,
        number: Option<u32>,
        runs: &[InlineRun],
        level: u32,
        align: Align,
    ) -> Result<()> {
        match number {
            Some(n) => self.text_paragraph("", BODY, Some(format!("{n}. ")), runs, align),
            None => {
                let props = format!(
                    "<w:numPr><w:ilvl w:val=\"{}\"/><w:numId w:val=\"{BULLET_NUM_ID}\"/></w:numPr>",
                    level.min(8)
                );
                self.text_paragraph(&props, BODY, None, runs, align);
            }
        }
        Ok(())
    }

    fn image(&mut self, source: &str, width: u32, height: u32, align: Align) -> Result<()> {
        let image = match load_image(self.loader, source) {
            Ok(image) => image,
            Err(e) => {
                warn!("skipping image {}: {e}", truncate(source));
                return Ok(());
            }
        };

        let (w, h) = display_size(width, height, &image);
        let (w, h) = fit_within(
            w,
            h,
            self.config.max_image_width as f32,
            self.config.max_image_height as f32,
        );
        if w < 1.0 || h < 1.0 {
            warn!("skipping image {}: empty size", truncate(source));
            return Ok(());
        }

        let rel_id = match self.add_media(&image) {
            Ok(id) => id,
            Err(e) => {
                warn!("skipping image {}: {e}", truncate(source));
                return Ok(());
            }
        };
        let cx = (w * EMU_PER_PX).round() as u32;
        let cy = (h * EMU_PER_PX).round() as u32;

        self.xml.push_str("<w:p><w:pPr>");
        self.xml.push_str(&format!(
            "<w:spacing w:before=\"0\" w:after=\"{}\"/>",
            BODY.after
        ));
        self.xml.push_str(&jc_xml(align));
        self.xml.push_str("</w:pPr>");
        self.xml
            .push_str(&drawing_xml(&rel_id, self.media.len(), cx, cy));
        self.xml.push_str("</w:p>");
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct RunProps {
    bold: bool,
    italic: bool,
    underline: bool,
    /// Half-points.
    size: Option<u32>,
}

fn text_run(text: &str, props: RunProps) -> String {
    if text.is_empty() {
        return String::new();
    }
    let mut out = String::from("<w:r>");
    if props.bold || props.italic || props.underline || props.size.is_some() {
        out.push_str("<w:rPr>");
        if props.bold {
            out.push_str("<w:b/>");
        }
        if props.italic {
            out.push_str("<w:i/>");
        }
        if props.underline {
            out.push_str("<w:u w:val=\"single\"/>");
        }
        if let Some(size) = props.size {
            out.push_str(&format!("<w:sz w:val=\"{size}\"/><w:szCs w:val=\"{size}\"/>"));
        }
        out.push_str("</w:rPr>");
    }
    out.push_str("<w:t xml:space=\"preserve\">");
    out.push_str(&xml_text(text));
    out.push_str("</w:t></w:r>");
    out
}

fn jc_xml(align: Align) -> String {
    let val = match align {
        Align::Left => "left",
        Align::Center => "center",
        Align::Right => "right",
        Align::Justify => "both",
    };
    format!("<w:jc w:val=\"{val}\"/>")
}

/// Escape text for XML, dropping characters XML 1.0 cannot carry.
fn xml_text(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .filter(|&c| !c.is_control() || matches!(c, '\t' | '\n' | '\r'))
        .collect();
    escape(cleaned.as_str()).into_owned()
}

fn media_rel_id(index: usize) -> String {
    // rId1 and rId2 are styles and numbering.
    format!("rId{}", index + 2)
}

fn drawing_xml(rel_id: &str, id: usize, cx: u32, cy: u32) -> String {
    format!(
        r#"<w:r><w:drawing><wp:inline distT="0" distB="0" distL="0" distR="0"><wp:extent cx="{cx}" cy="{cy}"/><wp:effectExtent l="0" t="0" r="0" b="0"/><wp:docPr id="{id}" name="Picture {id}"/><wp:cNvGraphicFramePr><a:graphicFrameLocks xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" noChangeAspect="1"/></wp:cNvGraphicFramePr><a:graphic xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture"><pic:pic xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture"><pic:nvPicPr><pic:cNvPr id="{id}" name="image{id}.png"/><pic:cNvPicPr/></pic:nvPicPr><pic:blipFill><a:blip r:embed="{rel_id}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill><pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr></pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r>"#
    )
}

fn document_xml(body: &str, after_cover: bool) -> String {
    let section_type = if after_cover {
        "<w:type w:val=\"nextPage\"/>"
    } else {
        ""
    };
    let (w, h) = A4_TWIPS;
    let m = BODY_MARGIN;
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture">
<w:body>{body}<w:sectPr>{section_type}<w:pgSz w:w="{w}" w:h="{h}"/><w:pgMar w:top="{m}" w:right="{m}" w:bottom="{m}" w:left="{m}" w:header="708" w:footer="708" w:gutter="0"/></w:sectPr></w:body>
</w:document>"#
    )
}

fn core_xml(title: &str, author: Option<&str>) -> String {
    let creator = author
        .map(|a| format!("<dc:creator>{}</dc:creator>", xml_text(a)))
        .unwrap_or_default();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:title>{}</dc:title>{creator}</cp:coreProperties>"#,
        xml_text(title)
    )
}

fn document_rels_xml(media_count: usize) -> String {
    let mut out = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering" Target="numbering.xml"/>
"#,
    );
    for i in 1..=media_count {
        out.push_str(&format!(
            "<Relationship Id=\"{}\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/image\" Target=\"media/image{i}.png\"/>\n",
            media_rel_id(i)
        ));
    }
    out.push_str("</Relationships>");
    out
}

const BULLET_NUM_ID: u32 = 1;

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Default Extension="png" ContentType="image/png"/>
<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
<Override PartName="/word/numbering.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml"/>
<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
</Types>"#;

const PACKAGE_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>
</Relationships>"#;

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="Calibri" w:hAnsi="Calibri" w:cs="Calibri"/><w:sz w:val="24"/><w:szCs w:val="24"/></w:rPr></w:rPrDefault></w:docDefaults>
<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style>
<w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:rPr><w:b/><w:sz w:val="56"/><w:szCs w:val="56"/></w:rPr></w:style>
<w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:keepNext/><w:outlineLvl w:val="0"/></w:pPr><w:rPr><w:b/><w:sz w:val="48"/><w:szCs w:val="48"/></w:rPr></w:style>
<w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:keepNext/><w:outlineLvl w:val="1"/></w:pPr><w:rPr><w:b/><w:sz w:val="36"/><w:szCs w:val="36"/></w:rPr></w:style>
<w:style w:type="paragraph" w:styleId="Heading3"><w:name w:val="heading 3"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:keepNext/><w:outlineLvl w:val="2"/></w:pPr><w:rPr><w:b/><w:sz w:val="28"/><w:szCs w:val="28"/></w:rPr></w:style>
</w:styles>"#;

const NUMBERING_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:abstractNum w:abstractNumId="0"><w:multiLevelType w:val="hybridMultilevel"/>
<w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="bullet"/><w:lvlText w:val="•"/><w:lvlJc w:val="left"/><w:pPr><w:ind w:left="720" w:hanging="360"/></w:pPr></w:lvl>
<w:lvl w:ilvl="1"><w:start w:val="1"/><w:numFmt w:val="bullet"/><w:lvlText w:val="◦"/><w:lvlJc w:val="left"/><w:pPr><w:ind w:left="1440" w:hanging="360"/></w:pPr></w:lvl>
<w:lvl w:ilvl="2"><w:start w:val="1"/><w:numFmt w:val="bullet"/><w:lvlText w:val="▪"/><w:lvlJc w:val="left"/><w:pPr><w:ind w:left="2160" w:hanging="360"/></w:pPr></w:lvl>
<w:lvl w:ilvl="3"><w:start w:val="1"/><w:numFmt w:val="bullet"/><w:lvlText w:val="•"/><w:lvlJc w:val="left"/><w:pPr><w:ind w:left="2880" w:hanging="360"/></w:pPr></w:lvl>
<w:lvl w:ilvl="4"><w:start w:val="1"/><w:numFmt w:val="bullet"/><w:lvlText w:val="◦"/><w:lvlJc w:val="left"/><w:pPr><w:ind w:left="3600" w:hanging="360"/></w:pPr></w:lvl>
<w:lvl w:ilvl="5"><w:start w:val="1"/><w:numFmt w:val="bullet"/><w:lvlText w:val="▪"/><w:lvlJc w:val="left"/><w:pPr><w:ind w:left="4320" w:hanging="360"/></w:pPr></w:lvl>
<w:lvl w:ilvl="6"><w:start w:val="1"/><w:numFmt w:val="bullet"/><w:lvlText w:val="•"/><w:lvlJc w:val="left"/><w:pPr><w:ind w:left="5040" w:hanging="360"/></w:pPr></w:lvl>
<w:lvl w:ilvl="7"><w:start w:val="1"/><w:numFmt w:val="bullet"/><w:lvlText w:val="◦"/><w:lvlJc w:val="left"/><w:pPr><w:ind w:left="5760" w:hanging="360"/></w:pPr></w:lvl>
<w:lvl w:ilvl="8"><w:start w:val="1"/><w:numFmt w:val="bullet"/><w:lvlText w:val="▪"/><w:lvlJc w:val="left"/><w:pPr><w:ind w:left="6480" w:hanging="360"/></w:pPr></w:lvl>
</w:abstractNum>
<w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num>
</w:numbering>"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_run_props() {
        let run = text_run(
            "a<b",
            RunProps {
                bold: true,
                underline: true,
                size: Some(24),
                ..Default::default()
            },
        );
        assert_eq!(
            run,
            "<w:r><w:rPr><w:b/><w:u w:val=\"single\"/><w:sz w:val=\"24\"/><w:szCs w:val=\"24\"/></w:rPr>\
             <w:t xml:space=\"preserve\">a&lt;b</w:t></w:r>"
        );
        assert_eq!(text_run("", RunProps::default()), "");
    }

    #[test]
    fn test_xml_text_drops_control_characters() {
        assert_eq!(xml_text("a\u{1}b\tc & d"), "ab\tc &amp; d");
    }

    #[test]
    fn test_heading_spacing_decreases_with_level() {
        let levels = [HeadingLevel::H1, HeadingLevel::H2, HeadingLevel::H3];
        for pair in levels.windows(2) {
            let (a, b) = (heading_style(pair[0]), heading_style(pair[1]));
            assert!(a.size > b.size && a.before > b.before && a.after > b.after);
            assert!(a.before > a.after);
        }
    }

    #[test]
    fn test_media_relationships_follow_fixed_parts() {
        let rels = document_rels_xml(2);
        assert!(rels.contains(r#"Id="rId3""#) && rels.contains("media/image1.png"));
        assert!(rels.contains(r#"Id="rId4""#) && rels.contains("media/image2.png"));
    }
}
