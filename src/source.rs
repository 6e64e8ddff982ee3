//! Input sources: a local file, an http(s) URL, or an in-memory buffer.
//!
//! Remote sources are fetched with a blocking `reqwest` client; the calling
//! thread waits for the whole body.

use crate::types::{ImageType, split_name_extension};
use sha2::{Digest, Sha256};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Fetch failed: {0}")]
    Fetch(String),
}

/// Where the pipeline reads its image from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    File(PathBuf),
    Url(String),
    Bytes(Vec<u8>),
}

/// Whether the location looks like an http or https URL.
pub fn is_url(location: &str) -> bool {
    let lower = location.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

impl InputSource {
    /// Classify a location string: URLs are accepted as-is, anything else
    /// must be an existing file.
    pub fn from_location(location: &str) -> Option<Self> {
        if is_url(location) {
            Some(Self::Url(location.to_string()))
        } else if Path::new(location).is_file() {
            Some(Self::File(PathBuf::from(location)))
        } else {
            None
        }
    }

    /// Base name and image type of the source.
    ///
    /// Files and URLs are typed by extension (query and fragment ignored).
    /// Buffers are named by the SHA-256 of their content and typed generic.
    pub fn name_and_type(&self) -> (String, ImageType) {
        let path = match self {
            Self::File(path) => path.to_string_lossy().into_owned(),
            Self::Url(url) => url_path(url).to_string(),
            Self::Bytes(data) => {
                return (format!("{:x}", Sha256::digest(data)), ImageType::Image);
            }
        };
        let (name, ext) = split_name_extension(&path);
        (name, ImageType::from_extension(&ext).unwrap_or(ImageType::Image))
    }

    /// Read the whole source.
    pub fn read(&self) -> Result<Cow<'_, [u8]>, SourceError> {
        match self {
            Self::File(path) => Ok(Cow::Owned(std::fs::read(path)?)),
            Self::Url(url) => Ok(Cow::Owned(fetch(url)?)),
            Self::Bytes(data) => Ok(Cow::Borrowed(data)),
        }
    }

    /// Copy the raw source to `dest` without decoding it.
    pub fn copy_to(&self, dest: &Path) -> Result<(), SourceError> {
        match self {
            Self::File(path) => {
                std::fs::copy(path, dest)?;
            }
            other => std::fs::write(dest, other.read()?)?,
        }
        Ok(())
    }
}

/// The path part of a URL, without query string or fragment.
fn url_path(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    &url[..end]
}

fn fetch(url: &str) -> Result<Vec<u8>, SourceError> {
    log::debug!("fetching {url}");
    let response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(|e| SourceError::Fetch(format!("{url}: {e}")))?;
    let body = response
        .bytes()
        .map_err(|e| SourceError::Fetch(format!("{url}: {e}")))?;
    Ok(body.to_vec())
}
