//! Core data model shared by the parser, the paginator and the exporters.
//!
//! - [`ContentBlock`] / [`InlineRun`]: the parser's typed output
//! - [`Page`]: one printable-area slice produced by the paginator
//! - [`ExportOptions`] / [`CoverSnapshot`]: immutable export input

mod options;

pub use options::{CoverSnapshot, ExportOptions};

/// Horizontal alignment of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

/// A contiguous span of text with uniform emphasis.
///
/// Emphasis is inherited from ancestor elements and never switched back off
/// by a descendant. Adjacent runs with equal styling are not merged.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InlineRun {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl InlineRun {
    /// An unstyled run.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn underline(mut self) -> Self {
        self.underline = true;
        self
    }

    /// True when the run holds nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Heading depth. Only the first three HTML levels are structural.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "h1" => Some(HeadingLevel::H1),
            "h2" => Some(HeadingLevel::H2),
            "h3" => Some(HeadingLevel::H3),
            _ => None,
        }
    }

    /// Numeric level, 1 through 3.
    pub fn number(self) -> u8 {
        match self {
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
        }
    }
}

/// One structural unit of a chapter.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    Heading {
        level: HeadingLevel,
        runs: Vec<InlineRun>,
        align: Align,
    },
    /// A paragraph. `runs` is empty only for an explicit `<br>` line break.
    Paragraph { runs: Vec<InlineRun>, align: Align },
    /// A list item. `level` stays 0: nesting depth is not tracked.
    ListItem {
        ordered: bool,
        runs: Vec<InlineRun>,
        level: u32,
        align: Align,
    },
    /// An image. Zero dimensions mean the markup did not declare them.
    Image {
        source: String,
        width: u32,
        height: u32,
        align: Align,
    },
}

impl ContentBlock {
    pub fn paragraph(runs: Vec<InlineRun>) -> Self {
        ContentBlock::Paragraph {
            runs,
            align: Align::Left,
        }
    }

    /// The explicit blank line emitted for `<br>`.
    pub fn line_break() -> Self {
        ContentBlock::paragraph(Vec::new())
    }

    pub fn heading(level: HeadingLevel, runs: Vec<InlineRun>) -> Self {
        ContentBlock::Heading {
            level,
            runs,
            align: Align::Left,
        }
    }

    pub fn list_item(ordered: bool, runs: Vec<InlineRun>) -> Self {
        ContentBlock::ListItem {
            ordered,
            runs,
            level: 0,
            align: Align::Left,
        }
    }

    /// Inline runs of the block; images have none.
    pub fn runs(&self) -> &[InlineRun] {
        match self {
            ContentBlock::Heading { runs, .. }
            | ContentBlock::Paragraph { runs, .. }
            | ContentBlock::ListItem { runs, .. } => runs,
            ContentBlock::Image { .. } => &[],
        }
    }

    pub fn align(&self) -> Align {
        match self {
            ContentBlock::Heading { align, .. }
            | ContentBlock::Paragraph { align, .. }
            | ContentBlock::ListItem { align, .. }
            | ContentBlock::Image { align, .. } => *align,
        }
    }

    /// Concatenated run text.
    pub fn plain_text(&self) -> String {
        self.runs().iter().map(|r| r.text.as_str()).collect()
    }

    pub fn is_line_break(&self) -> bool {
        matches!(self, ContentBlock::Paragraph { runs, .. } if runs.is_empty())
    }
}

/// One page of paginated chapter content.
///
/// `html` is an opaque markup slice that fits a single printable area when
/// rendered with the canonical font. `key` is `{chapter}-{page}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub key: String,
    pub html: String,
}

impl Page {
    pub fn new(chapter_index: usize, page_index: usize, html: impl Into<String>) -> Self {
        Self {
            key: format!("{chapter_index}-{page_index}"),
            html: html.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_break_has_no_runs() {
        let br = ContentBlock::line_break();
        assert!(br.is_line_break());
        assert!(br.runs().is_empty());
        assert_eq!(br.align(), Align::Left);
    }

    #[test]
    fn test_plain_text_joins_runs() {
        let block = ContentBlock::paragraph(vec![
            InlineRun::plain("a "),
            InlineRun::plain("b").bold(),
        ]);
        assert_eq!(block.plain_text(), "a b");
        assert!(!block.is_line_break());
    }

    #[test]
    fn test_page_key_format() {
        assert_eq!(Page::new(2, 5, "<p>x</p>").key, "2-5");
    }
}
