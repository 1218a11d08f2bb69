//! Error types for folio operations.

use thiserror::Error;

/// Errors that can occur while parsing, paginating or exporting a document.
///
/// Only packaging failures abort an export. Per-block problems such as an
/// image that cannot be fetched are logged and skipped by the assemblers, so
/// [`Error::Resource`] and [`Error::Image`] normally surface only from the
/// lower-level loading helpers.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("cannot load resource {uri}: {reason}")]
    Resource { uri: String, reason: String },

    #[error("measurement surface unavailable: {0}")]
    Measurement(String),

    #[error("invalid input: {0}")]
    Validation(#[from] crate::validate::ValidationError),
}

impl Error {
    pub(crate) fn resource(uri: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Resource {
            uri: uri.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
