//! Structural HTML parser.
//!
//! Walks sanitized editor markup and emits a flat, ordered sequence of
//! [`ContentBlock`]s. The input is assumed to have passed the sanitizer
//! already; nothing is filtered here.
//!
//! # Mapping
//!
//! | markup                  | block                                           |
//! |-------------------------|-------------------------------------------------|
//! | `h1`..`h3`              | `Image` per descendant `img`, then `Heading`    |
//! | `p`, leaf `div`         | `Image` per descendant `img`, then `Paragraph`  |
//! | `ul > li`, `ol > li`    | `ListItem`, wrapper dropped, level always 0     |
//! | `img`                   | `Image`                                         |
//! | `figure`                | unwrapped; `figcaption` dropped                 |
//! | `br` between blocks     | empty `Paragraph`                               |
//! | `br` inside text        | a single space                                  |
//! | anything else           | children visited; stray text becomes paragraphs |
//!
//! Emphasis comes from `strong`/`b`, `em`/`i` and `u` only. Inline
//! `font-weight` styles are ignored; `style` is read for alignment alone.

mod style;

pub use style::{element_align, text_align};

use crate::dom::{Dom, NodeId};
use crate::model::{Align, ContentBlock, HeadingLevel, InlineRun};

/// Elements that make a `div` a container rather than a paragraph.
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "figure", "blockquote", "pre",
    "table", "hr",
];

/// Parse sanitized HTML into content blocks, in document order.
///
/// Parsing is pure: the same input always yields the same blocks.
///
/// ```
/// use folio::{parse_html_content, ContentBlock};
///
/// let blocks = parse_html_content("<h1>T</h1><p>A</p>");
/// assert_eq!(blocks.len(), 2);
/// assert!(matches!(blocks[0], ContentBlock::Heading { .. }));
/// ```
pub fn parse_html_content(html: &str) -> Vec<ContentBlock> {
    if html.trim().is_empty() {
        return Vec::new();
    }
    let dom = Dom::parse(html);
    parse_dom(&dom, dom.body())
}

/// Parse the children of `root` in an already-built tree.
pub fn parse_dom(dom: &Dom, root: NodeId) -> Vec<ContentBlock> {
    let mut walker = BlockWalker {
        dom,
        blocks: Vec::new(),
    };
    walker.container(root);
    walker.blocks
}

/// Emphasis inherited from ancestors.
#[derive(Debug, Clone, Copy, Default)]
struct Emphasis {
    bold: bool,
    italic: bool,
    underline: bool,
}

impl Emphasis {
    fn enter(self, tag: &str) -> Self {
        let mut next = self;
        match tag {
            "strong" | "b" => next.bold = true,
            "em" | "i" => next.italic = true,
            "u" => next.underline = true,
            _ => {}
        }
        next
    }

    fn run(self, text: &str) -> InlineRun {
        InlineRun {
            text: text.to_string(),
            bold: self.bold,
            italic: self.italic,
            underline: self.underline,
        }
    }
}

struct BlockWalker<'a> {
    dom: &'a Dom,
    blocks: Vec<ContentBlock>,
}

impl BlockWalker<'_> {
    /// Visit the children of a structural container.
    fn container(&mut self, id: NodeId) {
        for child in self.dom.children(id) {
            if self.dom.is_element(child) {
                self.element(child);
            } else if let Some(text) = self.dom.text(child) {
                let text = text.trim();
                if !text.is_empty() {
                    self.blocks.push(ContentBlock::paragraph(vec![InlineRun::plain(text)]));
                }
            }
        }
    }

    fn element(&mut self, id: NodeId) {
        let Some(tag) = self.dom.tag_name(id) else {
            return;
        };

        if let Some(level) = HeadingLevel::from_tag(tag) {
            let align = element_align(self.dom, id);
            self.images_within(id, align);

            let runs = self.inline_runs(id);
            if has_text(&runs) {
                self.blocks.push(ContentBlock::Heading { level, runs, align });
            }
            return;
        }

        match tag {
            "div" if self.has_block_children(id) => self.container(id),
            "p" | "div" => self.paragraph(id),
            "ul" => self.list(id, false),
            "ol" => self.list(id, true),
            "img" => self.image(id, Align::Left),
            "br" => self.blocks.push(ContentBlock::line_break()),
            "figcaption" => {}
            _ => self.container(id),
        }
    }

    fn paragraph(&mut self, id: NodeId) {
        let align = element_align(self.dom, id);
        self.images_within(id, align);

        let runs = self.inline_runs(id);
        if has_text(&runs) {
            self.blocks.push(ContentBlock::Paragraph { runs, align });
        }
    }

    fn list(&mut self, id: NodeId, ordered: bool) {
        let items: Vec<NodeId> = self
            .dom
            .children(id)
            .filter(|&c| self.dom.tag_name(c) == Some("li"))
            .collect();

        for li in items {
            let align = element_align(self.dom, li);
            self.images_within(li, align);

            let runs = self.inline_runs(li);
            if has_text(&runs) {
                self.blocks.push(ContentBlock::ListItem {
                    ordered,
                    runs,
                    level: 0,
                    align,
                });
            }
        }
    }

    /// Emit an image block for every `img` below `id`.
    fn images_within(&mut self, id: NodeId, fallback: Align) {
        let images: Vec<NodeId> = self
            .dom
            .descendants(id)
            .into_iter()
            .filter(|&d| self.dom.tag_name(d) == Some("img"))
            .collect();
        for img in images {
            self.image(img, fallback);
        }
    }

    fn image(&mut self, id: NodeId, fallback: Align) {
        let Some(source) = self.dom.attr(id, "src").map(str::trim).filter(|s| !s.is_empty())
        else {
            return;
        };

        let align = match element_align(self.dom, id) {
            Align::Left => fallback,
            declared => declared,
        };
        self.blocks.push(ContentBlock::Image {
            source: source.to_string(),
            width: self.dimension(id, "width"),
            height: self.dimension(id, "height"),
            align,
        });
    }

    /// Pixel size declared on the element, or 0 when absent.
    fn dimension(&self, id: NodeId, attr: &str) -> u32 {
        self.dom
            .attr(id, attr)
            .map(|v| v.trim().trim_end_matches("px").trim())
            .and_then(|v| v.parse::<f32>().ok())
            .filter(|v| v.is_finite() && *v > 0.0)
            .map_or(0, |v| v.round() as u32)
    }

    fn has_block_children(&self, id: NodeId) -> bool {
        self.dom
            .children(id)
            .filter_map(|c| self.dom.tag_name(c))
            .any(|tag| BLOCK_TAGS.contains(&tag))
    }

    /// Collect styled text runs below `id`.
    fn inline_runs(&self, id: NodeId) -> Vec<InlineRun> {
        let mut runs = Vec::new();
        for child in self.dom.children(id) {
            self.collect_runs(child, Emphasis::default(), &mut runs);
        }
        runs
    }

    fn collect_runs(&self, id: NodeId, emphasis: Emphasis, runs: &mut Vec<InlineRun>) {
        if let Some(text) = self.dom.text(id) {
            // Keep spacing runs such as " " between two emphasized words, drop
            // pure formatting whitespace like "\n  ".
            if !text.trim().is_empty() || text.contains(' ') {
                runs.push(emphasis.run(text));
            }
            return;
        }

        let Some(tag) = self.dom.tag_name(id) else {
            return;
        };
        if tag == "br" {
            runs.push(emphasis.run(" "));
            return;
        }
        let emphasis = emphasis.enter(tag);
        for child in self.dom.children(id) {
            self.collect_runs(child, emphasis, runs);
        }
    }
}

fn has_text(runs: &[InlineRun]) -> bool {
    runs.iter().any(|r| !r.is_blank())
}
