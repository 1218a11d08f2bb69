//! Measurement surfaces.
//!
//! A surface answers one question: how tall is this markup when laid out at
//! the printable width? [`MetricsSurface`] answers it with the Helvetica
//! tables from [`crate::metrics`] and a fixed style sheet.

use crate::metrics::{FontStyle, wrap_text};
use crate::model::{ContentBlock, HeadingLevel};
use crate::parse::parse_html_content;

/// Pixels per point at 96 DPI.
pub const PX_PER_PT: f32 = 96.0 / 72.0;

/// Something that can report the rendered height of markup, in px.
pub trait MeasurementSurface {
    fn measure(&mut self, html: &str) -> f32;
}

impl<T: MeasurementSurface + ?Sized> MeasurementSurface for &mut T {
    fn measure(&mut self, html: &str) -> f32 {
        (**self).measure(html)
    }
}

/// Typography of one block kind, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockStyle {
    pub font_size: f32,
    pub margin_bottom: f32,
    pub indent: f32,
    pub style: FontStyle,
}

/// Style sheet used for measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasureStyles {
    pub line_height: f32,
    pub h1: BlockStyle,
    pub h2: BlockStyle,
    pub h3: BlockStyle,
    pub paragraph: BlockStyle,
    pub list_item: BlockStyle,
    /// Height given to images without declared dimensions, in px.
    pub default_image_height: f32,
}

impl Default for MeasureStyles {
    fn default() -> Self {
        let block = |font_size, margin_bottom, style| BlockStyle {
            font_size,
            margin_bottom,
            indent: 0.0,
            style,
        };
        Self {
            line_height: 1.15,
            h1: block(24.0, 12.0, FontStyle::Bold),
            h2: block(18.0, 10.0, FontStyle::Bold),
            h3: block(14.0, 8.0, FontStyle::Bold),
            paragraph: block(12.0, 6.0, FontStyle::Regular),
            list_item: BlockStyle {
                indent: 24.0,
                ..block(12.0, 3.0, FontStyle::Regular)
            },
            default_image_height: 150.0,
        }
    }
}

impl MeasureStyles {
    fn for_block(&self, block: &ContentBlock) -> &BlockStyle {
        match block {
            ContentBlock::Heading { level, .. } => match level {
                HeadingLevel::H1 => &self.h1,
                HeadingLevel::H2 => &self.h2,
                HeadingLevel::H3 => &self.h3,
            },
            ContentBlock::ListItem { .. } => &self.list_item,
            ContentBlock::Paragraph { .. } | ContentBlock::Image { .. } => &self.paragraph,
        }
    }
}

/// Font-metrics measurement surface.
///
/// Markup goes through the structural parser; every block is wrapped with
/// the greedy line breaker and the resulting line boxes are stacked. The
/// trailing margin of the last block is not counted.
#[derive(Debug, Clone)]
pub struct MetricsSurface {
    width: f32,
    styles: MeasureStyles,
}

impl MetricsSurface {
    /// A surface `width` px wide using the default style sheet.
    pub fn new(width: f32) -> Self {
        Self {
            width,
            styles: MeasureStyles::default(),
        }
    }

    pub fn with_styles(mut self, styles: MeasureStyles) -> Self {
        self.styles = styles;
        self
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    /// Height of one block without its bottom margin, in px.
    pub fn block_height(&self, block: &ContentBlock) -> f32 {
        let style = self.styles.for_block(block);
        let size = style.font_size * PX_PER_PT;
        let line = size * self.styles.line_height;

        match block {
            ContentBlock::Image { width, height, .. } => {
                if *width == 0 || *height == 0 {
                    return self.styles.default_image_height;
                }
                let scale = (self.width / *width as f32).min(1.0);
                *height as f32 * scale
            }
            _ if block.is_line_break() => line,
            _ => {
                let available = (self.width - style.indent * PX_PER_PT).max(size);
                let lines = wrap_text(&block.plain_text(), available, style.style, size).len();
                lines.max(1) as f32 * line
            }
        }
    }

    fn margin(&self, block: &ContentBlock) -> f32 {
        match block {
            ContentBlock::Image { .. } => 0.0,
            _ => self.styles.for_block(block).margin_bottom * PX_PER_PT,
        }
    }
}

impl MeasurementSurface for MetricsSurface {
    fn measure(&mut self, html: &str) -> f32 {
        let blocks = parse_html_content(html);
        let mut height = 0.0;
        for (i, block) in blocks.iter().enumerate() {
            height += self.block_height(block);
            if i + 1 < blocks.len() {
                height += self.margin(block);
            }
        }
        height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_markup_has_no_height() {
        let mut surface = MetricsSurface::new(624.0);
        assert_eq!(surface.measure(""), 0.0);
        assert_eq!(surface.measure("<p></p>"), 0.0);
    }

    #[test]
    fn test_single_line_paragraph() {
        let mut surface = MetricsSurface::new(624.0);
        let h = surface.measure("<p>Hello</p>");
        assert!((h - 16.0 * 1.15).abs() < 1e-3);
    }

    #[test]
    fn test_margin_between_blocks() {
        let mut surface = MetricsSurface::new(624.0);
        let one = surface.measure("<p>a</p>");
        let two = surface.measure("<p>a</p><p>b</p>");
        assert!((two - (2.0 * one + 6.0 * PX_PER_PT)).abs() < 1e-3);
    }

    #[test]
    fn test_long_paragraph_wraps() {
        let mut surface = MetricsSurface::new(200.0);
        let text = "word ".repeat(100);
        let h = surface.measure(&format!("<p>{text}</p>"));
        assert!(h > 10.0 * 16.0 * 1.15);
    }

    #[test]
    fn test_images_scale_to_width() {
        let mut surface = MetricsSurface::new(300.0);
        assert_eq!(surface.measure(r#"<img src="a" width="600" height="400">"#), 200.0);
        assert_eq!(surface.measure(r#"<img src="a" width="100" height="80">"#), 80.0);
        assert_eq!(surface.measure(r#"<img src="a">"#), 150.0);
    }

    #[test]
    fn test_headings_are_taller_than_body() {
        let mut surface = MetricsSurface::new(624.0);
        assert!(surface.measure("<h1>Title</h1>") > surface.measure("<h3>Title</h3>"));
        assert!(surface.measure("<h3>Title</h3>") > surface.measure("<p>Title</p>"));
    }
}
