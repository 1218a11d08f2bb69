use std::fmt;

use image::DynamicImage;

use crate::error::Result;

/// A rasterized cover produced upstream by a snapshot collaborator.
///
/// Held either as encoded bytes (PNG, JPEG, ...) or as a decoded bitmap.
/// Decoding happens lazily so a broken snapshot only degrades the export.
#[derive(Clone)]
pub enum CoverSnapshot {
    Encoded(Vec<u8>),
    Bitmap(DynamicImage),
}

impl CoverSnapshot {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        CoverSnapshot::Encoded(bytes.into())
    }

    pub fn from_image(image: DynamicImage) -> Self {
        CoverSnapshot::Bitmap(image)
    }

    /// Decode into a bitmap.
    pub fn decode(&self) -> Result<DynamicImage> {
        match self {
            CoverSnapshot::Encoded(bytes) => Ok(image::load_from_memory(bytes)?),
            CoverSnapshot::Bitmap(image) => Ok(image.clone()),
        }
    }
}

impl fmt::Debug for CoverSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoverSnapshot::Encoded(bytes) => write!(f, "CoverSnapshot::Encoded({} bytes)", bytes.len()),
            CoverSnapshot::Bitmap(img) => {
                write!(f, "CoverSnapshot::Bitmap({}x{})", img.width(), img.height())
            }
        }
    }
}

/// Input to both exporters. Never mutated during an export.
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    pub title: String,
    pub author: Option<String>,
    /// Sanitized body HTML.
    pub content: String,
    pub cover: Option<CoverSnapshot>,
    /// The cover already shows title and author, so no title page is needed.
    pub has_cover_page: bool,
}

impl ExportOptions {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        let author = author.into();
        self.author = if author.trim().is_empty() {
            None
        } else {
            Some(author)
        };
        self
    }

    pub fn with_cover(mut self, cover: CoverSnapshot) -> Self {
        self.cover = Some(cover);
        self
    }

    pub fn with_cover_page(mut self, has_cover_page: bool) -> Self {
        self.has_cover_page = has_cover_page;
        self
    }
}
