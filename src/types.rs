//! Shared types used by the processor, the config layer and the backend.
//!
//! - [`ImageType`] — the three encodable formats plus a generic "sniff it" type.
//! - [`Quality`] — lossy encoding quality (0–100, default 100). Clamped on construction.
//! - [`split_name_extension`] / [`is_processable_image_file`] — filename helpers
//!   used to derive input and output types from paths.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Returned when a type name is not one of the supported output formats.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported image type: {0:?} (expected gif, png or jpg)")]
pub struct UnsupportedFormat(pub String);

/// Image format as far as the pipeline is concerned.
///
/// `Image` is the generic type: the format is unknown and the decoder has to
/// sniff it from the content. It is never used for encoding; output falls
/// back to [`ImageType::Jpg`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ImageType {
    Gif,
    Png,
    Jpg,
    #[default]
    Image,
}

impl ImageType {
    /// Map a lowercase file extension to a type. Unknown extensions map to `None`.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "gif" => Some(Self::Gif),
            "png" => Some(Self::Png),
            "jpg" | "jpeg" | "jpe" => Some(Self::Jpg),
            _ => None,
        }
    }

    /// Derive the type from a path's extension, generic if unknown.
    pub fn from_path(path: &str) -> Self {
        let (_, ext) = split_name_extension(path);
        Self::from_extension(&ext).unwrap_or(Self::Image)
    }

    /// Canonical file extension, `None` for the generic type.
    pub fn extension(self) -> Option<&'static str> {
        match self {
            Self::Gif => Some("gif"),
            Self::Png => Some("png"),
            Self::Jpg => Some("jpg"),
            Self::Image => None,
        }
    }

    /// MIME type, `None` for the generic type.
    pub fn mime(self) -> Option<&'static str> {
        match self {
            Self::Gif => Some("image/gif"),
            Self::Png => Some("image/png"),
            Self::Jpg => Some("image/jpeg"),
            Self::Image => None,
        }
    }

    pub fn is_generic(self) -> bool {
        self == Self::Image
    }

    /// The type actually used for encoding: generic falls back to JPEG.
    pub fn or_jpg(self) -> Self {
        if self.is_generic() { Self::Jpg } else { self }
    }
}

impl FromStr for ImageType {
    type Err = UnsupportedFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "image" => Ok(Self::Image),
            other => Self::from_extension(other).ok_or_else(|| UnsupportedFormat(s.to_string())),
        }
    }
}

impl TryFrom<String> for ImageType {
    type Error = UnsupportedFormat;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ImageType> for String {
    fn from(value: ImageType) -> Self {
        value.to_string()
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension().unwrap_or("image"))
    }
}

/// Quality setting for lossy image encoding (0-100).
///
/// Only JPEG honours it; GIF and PNG are lossless. 100 is also the value
/// that enables the pass-through fast path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quality(pub u32);

impl Quality {
    pub const MAX: Quality = Quality(100);

    pub fn new(value: u32) -> Self {
        Self(value.min(100))
    }

    pub fn value(self) -> u32 {
        self.0
    }

    pub fn is_max(self) -> bool {
        self.0 >= 100
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self::MAX
    }
}

/// Split the final path component into `(name, extension)`.
///
/// The extension is everything after the last dot, lowercased. A file
/// without a dot is all extension and no name, so `"README"` gives
/// `("", "readme")`; callers only use the extension for type lookup.
pub fn split_name_extension(path: &str) -> (String, String) {
    let base = Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    match base.rsplit_once('.') {
        Some((name, ext)) => (name.to_string(), ext.to_lowercase()),
        None => (String::new(), base.to_lowercase()),
    }
}

/// Whether the path has an extension the pipeline can decode directly.
pub fn is_processable_image_file(path: &str) -> bool {
    let (_, ext) = split_name_extension(path);
    ImageType::from_extension(&ext).is_some()
}
