//! Image fetching for the assemblers.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use base64::Engine;
use image::DynamicImage;
#[cfg(feature = "remote")]
use log::debug;
use percent_encoding::percent_decode_str;

use crate::error::{Error, Result};

/// Fetches the raw bytes behind an image `src`.
///
/// Implementations decide which schemes they support; a failure only causes
/// the image to be skipped. Loaders are shared by exporters running on
/// different threads.
pub trait ResourceLoader: Send + Sync {
    fn load(&self, source: &str) -> Result<Vec<u8>>;
}

/// Default timeout for `http(s)` image fetches.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Loader for inline, local and remote sources.
///
/// Understands `data:` URIs (base64 or percent-encoded), `file://` URLs,
/// `http(s)` URLs (with the `remote` feature) and plain paths, which are
/// resolved against the base directory when relative. Other schemes are
/// refused.
#[derive(Debug, Clone)]
pub struct DefaultLoader {
    base_dir: Option<PathBuf>,
    timeout: Duration,
}

impl Default for DefaultLoader {
    fn default() -> Self {
        Self {
            base_dir: None,
            timeout: FETCH_TIMEOUT,
        }
    }
}

impl DefaultLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    /// Give up on a remote image after `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl ResourceLoader for DefaultLoader {
    fn load(&self, source: &str) -> Result<Vec<u8>> {
        let source = source.trim();
        if let Some(rest) = strip_scheme(source, "data:") {
            return decode_data_uri(source, rest);
        }
        if let Some(rest) = strip_scheme(source, "file://") {
            let path = percent_decode_str(rest)
                .decode_utf8()
                .map_err(|_| Error::resource(source, "path is not valid UTF-8"))?;
            return Ok(fs::read(&*path)?);
        }
        if strip_scheme(source, "http://").is_some() || strip_scheme(source, "https://").is_some() {
            return fetch_remote(source, self.timeout);
        }
        if let Some((scheme, _)) = source.split_once("://") {
            return Err(Error::resource(
                source,
                format!("{scheme} sources are not supported"),
            ));
        }

        let path = self.resolve(Path::new(source));
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            // Editors often emit percent-encoded relative paths.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let decoded = percent_decode_str(source).decode_utf8_lossy();
                if decoded == source {
                    return Err(e.into());
                }
                Ok(fs::read(self.resolve(Path::new(&*decoded)))?)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(feature = "remote")]
fn fetch_remote(url: &str, timeout: Duration) -> Result<Vec<u8>> {
    let fail = |e: reqwest::Error| Error::resource(url, e.to_string());

    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(fail)?;
    let response = client.get(url).send().map_err(fail)?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::resource(url, format!("server answered {status}")));
    }
    let bytes = response.bytes().map_err(fail)?;
    debug!("fetched {} bytes from {url}", bytes.len());
    Ok(bytes.to_vec())
}

#[cfg(not(feature = "remote"))]
fn fetch_remote(url: &str, _timeout: Duration) -> Result<Vec<u8>> {
    Err(Error::resource(url, "built without the `remote` feature"))
}

fn strip_scheme<'a>(source: &'a str, scheme: &str) -> Option<&'a str> {
    let head = source.get(..scheme.len())?;
    head.eq_ignore_ascii_case(scheme)
        .then(|| &source[scheme.len()..])
}

/// Decode the part of a `data:` URI after the scheme.
fn decode_data_uri(uri: &str, rest: &str) -> Result<Vec<u8>> {
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| Error::resource(truncate(uri), "data URI has no payload"))?;

    if meta.to_ascii_lowercase().ends_with(";base64") {
        let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        let text = percent_decode_str(&compact).decode_utf8_lossy();
        base64::engine::general_purpose::STANDARD
            .decode(text.as_bytes())
            .map_err(|e| Error::resource(truncate(uri), e.to_string()))
    } else {
        Ok(percent_decode_str(payload).collect())
    }
}

/// Keep log lines short when the source is a large inline image.
pub(crate) fn truncate(source: &str) -> String {
    const MAX: usize = 64;
    match source.char_indices().nth(MAX) {
        Some((i, _)) => format!("{}...", &source[..i]),
        None => source.to_string(),
    }
}

/// Load and decode an image, normalizing whatever format it was in.
pub fn load_image(loader: &dyn ResourceLoader, source: &str) -> Result<DynamicImage> {
    let bytes = loader.load(source)?;
    Ok(image::load_from_memory(&bytes)?)
}
