//! Live page-count estimate for the single-document editor.

use crate::error::{Error, Result};

use super::{MeasurementContext, PageGeometry};

/// How a document being edited falls onto pages.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorEstimate {
    /// Measured content height, in px.
    pub content_height: f32,
    pub page_count: usize,
    /// Vertical offsets of the page-break markers, one per page after the first.
    pub break_offsets: Vec<f32>,
}

/// Estimate how many pages `html` needs in the editor.
///
/// The whole document is measured at once; the first page loses
/// `header_height` to the title block and every page is assumed to hold
/// the same reduced height. There is always at least one page.
pub fn estimate_editor_pages(html: &str, geometry: PageGeometry) -> Result<EditorEstimate> {
    let mut context = MeasurementContext::with_metrics(geometry)?;

    let available = geometry.printable_height() - geometry.header_height;
    if available <= 0.0 {
        return Err(Error::Measurement(format!(
            "header of {}px leaves no room for content",
            geometry.header_height
        )));
    }

    let html = if html.trim().is_empty() { "<p></p>" } else { html };
    let content_height = context.measure(html);
    let page_count = ((content_height / available).ceil() as usize).max(1);

    let page = geometry.printable_height();
    let break_offsets = (1..page_count).map(|i| i as f32 * page).collect();

    Ok(EditorEstimate {
        content_height,
        page_count,
        break_offsets,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_one_page() {
        let estimate = estimate_editor_pages("", PageGeometry::default()).unwrap();
        assert_eq!(estimate.page_count, 1);
        assert!(estimate.break_offsets.is_empty());
    }

    #[test]
    fn test_long_document_spans_pages() {
        let html = "<p>Lorem ipsum dolor sit amet.</p>".repeat(120);
        let estimate = estimate_editor_pages(&html, PageGeometry::default()).unwrap();
        // 120 lines of 18.4px plus 119 gaps of 8px, over 784px pages
        assert_eq!(estimate.page_count, 5);
        assert_eq!(estimate.break_offsets, vec![864.0, 1728.0, 2592.0, 3456.0]);
    }

    #[test]
    fn test_header_taller_than_page_is_rejected() {
        let geometry = PageGeometry::default().with_header_height(900.0);
        assert!(estimate_editor_pages("<p>x</p>", geometry).is_err());
    }
}
