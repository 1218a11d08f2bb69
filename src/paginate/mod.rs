//! Pagination estimators.
//!
//! Two independent estimators share one measurement seam:
//!
//! - [`paginate_book`] splits each chapter into [`Page`]s that fit the
//!   printable area, greedily and node by node.
//! - [`estimate_editor_pages`] reports how many pages a single document
//!   spans while it is being edited.
//!
//! Measurement runs inside a [`MeasurementContext`], created per pass and
//! released when it goes out of scope.

mod editor;
mod surface;

pub use editor::{EditorEstimate, estimate_editor_pages};
pub use surface::{BlockStyle, MeasureStyles, MeasurementSurface, MetricsSurface, PX_PER_PT};

use log::{debug, warn};

use crate::dom::{Dom, outer_html};
use crate::error::{Error, Result};
use crate::model::Page;
use crate::sanitize::sanitize_html;

/// Page size and margins in px at 96 DPI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    /// Space taken by the title block on the editor's first page.
    pub header_height: f32,
}

impl Default for PageGeometry {
    /// US Letter with one-inch margins.
    fn default() -> Self {
        Self {
            width: 816.0,
            height: 1056.0,
            margin: 96.0,
            header_height: 80.0,
        }
    }
}

impl PageGeometry {
    pub fn new(width: f32, height: f32, margin: f32) -> Self {
        Self {
            width,
            height,
            margin,
            ..Default::default()
        }
    }

    pub fn with_header_height(mut self, header_height: f32) -> Self {
        self.header_height = header_height;
        self
    }

    pub fn printable_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    pub fn printable_height(&self) -> f32 {
        self.height - 2.0 * self.margin
    }

    fn check(&self) -> Result<()> {
        let dims = [self.width, self.height, self.margin, self.header_height];
        if dims.iter().any(|d| !d.is_finite()) || self.margin < 0.0 || self.header_height < 0.0 {
            return Err(Error::Measurement(format!("invalid page geometry {self:?}")));
        }
        if self.printable_width() <= 0.0 || self.printable_height() <= 0.0 {
            return Err(Error::Measurement(format!(
                "no printable area in {}x{} page with {} margins",
                self.width, self.height, self.margin
            )));
        }
        Ok(())
    }
}

/// Scoped owner of a measurement surface for one pagination pass.
///
/// The surface lives exactly as long as the context; dropping it (on
/// success, early return or unwinding) releases the surface.
pub struct MeasurementContext<S: MeasurementSurface = MetricsSurface> {
    surface: S,
    geometry: PageGeometry,
    measurements: usize,
}

impl MeasurementContext<MetricsSurface> {
    /// Context backed by a [`MetricsSurface`] as wide as the printable area.
    pub fn with_metrics(geometry: PageGeometry) -> Result<Self> {
        Self::new(MetricsSurface::new(geometry.printable_width()), geometry)
    }
}

impl<S: MeasurementSurface> MeasurementContext<S> {
    pub fn new(surface: S, geometry: PageGeometry) -> Result<Self> {
        geometry.check()?;
        debug!(
            "measurement surface ready: {}x{} px printable",
            geometry.printable_width(),
            geometry.printable_height()
        );
        Ok(Self {
            surface,
            geometry,
            measurements: 0,
        })
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn measure(&mut self, html: &str) -> f32 {
        self.measurements += 1;
        self.surface.measure(html)
    }
}

impl<S: MeasurementSurface> MeasurementSurface for MeasurementContext<S> {
    fn measure(&mut self, html: &str) -> f32 {
        MeasurementContext::measure(self, html)
    }
}

impl<S: MeasurementSurface> Drop for MeasurementContext<S> {
    fn drop(&mut self) {
        debug!(
            "measurement surface released after {} measurements",
            self.measurements
        );
    }
}

/// Result of laying out a whole book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookLayout {
    Paginated(Vec<Page>),
    /// Measurement was unavailable: one page per chapter holding the raw
    /// (sanitized) chapter markup.
    Unpaginated(Vec<Page>),
}

impl BookLayout {
    pub fn pages(&self) -> &[Page] {
        match self {
            BookLayout::Paginated(pages) | BookLayout::Unpaginated(pages) => pages,
        }
    }

    pub fn into_pages(self) -> Vec<Page> {
        match self {
            BookLayout::Paginated(pages) | BookLayout::Unpaginated(pages) => pages,
        }
    }

    pub fn is_paginated(&self) -> bool {
        matches!(self, BookLayout::Paginated(_))
    }
}

/// Split one chapter into pages no taller than `max_height`.
///
/// Top-level nodes are added one at a time; when a node pushes the buffer
/// past `max_height` and the buffer already holds something visible, the
/// buffer becomes a page and the node starts the next one. A node that is
/// taller than a page on its own is placed whole and overflows.
///
/// Whitespace-only text nodes travel with their neighbours, so joining the
/// pages' markup reproduces the chapter's node sequence. A chapter with no
/// visible content yields no pages.
pub fn paginate_chapter<S: MeasurementSurface + ?Sized>(
    html: &str,
    chapter_index: usize,
    surface: &mut S,
    max_height: f32,
) -> Vec<Page> {
    let dom = Dom::parse(html);
    let body = dom.body();

    let mut pages = Vec::new();
    let mut buffer = String::new();
    let mut buffer_visible = false;

    for node in dom.children(body) {
        let markup = outer_html(&dom, node);
        let visible = !dom.text(node).is_some_and(|t| t.trim().is_empty());

        if visible && buffer_visible {
            let candidate = format!("{buffer}{markup}");
            if surface.measure(&candidate) > max_height {
                pages.push(Page::new(chapter_index, pages.len(), std::mem::take(&mut buffer)));
                buffer_visible = false;
            }
        }

        buffer.push_str(&markup);
        buffer_visible |= visible;
    }

    if buffer_visible {
        pages.push(Page::new(chapter_index, pages.len(), buffer));
    } else if let Some(last) = pages.last_mut() {
        last.html.push_str(&buffer);
    }

    debug!("chapter {chapter_index}: {} pages", pages.len());
    pages
}

/// Paginate every chapter with the default metrics surface.
pub fn paginate_book<C: AsRef<str>>(chapters: &[C], geometry: PageGeometry) -> BookLayout {
    paginate_book_with(chapters, MetricsSurface::new(geometry.printable_width()), geometry)
}

/// Paginate every chapter with a caller-supplied surface.
///
/// Chapters are sanitized first. If the measurement context cannot be
/// created the book falls back to [`BookLayout::Unpaginated`].
pub fn paginate_book_with<C, S>(chapters: &[C], surface: S, geometry: PageGeometry) -> BookLayout
where
    C: AsRef<str>,
    S: MeasurementSurface,
{
    let sanitized: Vec<String> = chapters.iter().map(|c| sanitize_html(c.as_ref())).collect();

    let mut context = match MeasurementContext::new(surface, geometry) {
        Ok(context) => context,
        Err(e) => {
            warn!("pagination unavailable, showing chapters unpaginated: {e}");
            return BookLayout::Unpaginated(unpaginated(sanitized));
        }
    };

    let max_height = geometry.printable_height();
    let mut pages = Vec::new();
    for (index, html) in sanitized.iter().enumerate() {
        pages.extend(paginate_chapter(html, index, &mut context, max_height));
    }
    BookLayout::Paginated(pages)
}

fn unpaginated(chapters: Vec<String>) -> Vec<Page> {
    chapters
        .into_iter()
        .enumerate()
        .map(|(index, html)| Page::new(index, 0, html))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every visible top-level node is 100px tall.
    struct FixedHeight;

    impl MeasurementSurface for FixedHeight {
        fn measure(&mut self, html: &str) -> f32 {
            let dom = Dom::parse(html);
            let body = dom.body();
            let visible = dom
                .children(body)
                .filter(|&n| !dom.text(n).is_some_and(|t| t.trim().is_empty()))
                .count();
            visible as f32 * 100.0
        }
    }

    #[test]
    fn test_default_geometry_printable_area() {
        let g = PageGeometry::default();
        assert_eq!(g.printable_width(), 624.0);
        assert_eq!(g.printable_height(), 864.0);
    }

    #[test]
    fn test_greedy_split() {
        let html = "<p>1</p><p>2</p><p>3</p><p>4</p><p>5</p>";
        let pages = paginate_chapter(html, 3, &mut FixedHeight, 250.0);
        let keys: Vec<&str> = pages.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["3-0", "3-1", "3-2"]);
        assert_eq!(pages[0].html, "<p>1</p><p>2</p>");
        assert_eq!(pages[2].html, "<p>5</p>");
    }

    #[test]
    fn test_oversized_node_gets_its_own_page() {
        let pages = paginate_chapter("<p>a</p><p>b</p>", 0, &mut FixedHeight, 50.0);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].html, "<p>a</p>");
    }

    #[test]
    fn test_whitespace_is_kept_but_never_a_page() {
        let html = "<p>a</p>\n<p>b</p>\n";
        let pages = paginate_chapter(html, 0, &mut FixedHeight, 150.0);
        assert_eq!(pages.len(), 2);
        let joined: String = pages.iter().map(|p| p.html.as_str()).collect();
        assert_eq!(joined, html);
        assert!(paginate_chapter("  \n ", 0, &mut FixedHeight, 150.0).is_empty());
    }

    #[test]
    fn test_context_rejects_degenerate_geometry() {
        let bad = PageGeometry::new(100.0, 100.0, 60.0);
        assert!(matches!(
            MeasurementContext::with_metrics(bad),
            Err(Error::Measurement(_))
        ));
    }

    #[test]
    fn test_book_falls_back_to_unpaginated() {
        let chapters = ["<p>one</p><script>x()</script>", "<p>two</p>"];
        let layout = paginate_book(&chapters, PageGeometry::new(0.0, 0.0, 0.0));
        assert!(!layout.is_paginated());
        assert_eq!(
            layout.pages(),
            &[Page::new(0, 0, "<p>one</p>"), Page::new(1, 0, "<p>two</p>")]
        );
    }

    #[test]
    fn test_book_keys_restart_per_chapter() {
        let chapters = ["<p>a</p><p>b</p><p>c</p>", "<p>d</p>"];
        let layout = paginate_book_with(&chapters, FixedHeight, PageGeometry::new(400.0, 400.0, 75.0));
        let keys: Vec<&str> = layout.pages().iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["0-0", "0-1", "1-0"]);
    }
}
