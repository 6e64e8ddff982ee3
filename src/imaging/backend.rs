//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the capability interface the pipeline drives:
//! codec (decode/encode), geometry (resample, extract, rotate, mirror),
//! compositing, text, and filters. The raster it hands out is an associated
//! type owned by the caller; operations that replace the canvas take it by
//! value and return the new one, so the previous raster is dropped exactly
//! once and there is only ever one live canvas.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend) — pure Rust on top of the
//! `image` crate.

use super::geometry::{Dimensions, Rect, TextBox};
use super::params::{Color, Kernel, MirrorAxis, Rotation};
use crate::types::{ImageType, Quality};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode failed: {0}")]
    DecodeFailed(String),
    #[error("Encode failed: {0}")]
    EncodeFailed(String),
    #[error("Font error: {0}")]
    Font(String),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Trait for image processing backends.
///
/// Every method is synchronous. Methods taking `Self::Raster` by value
/// consume the input canvas; methods taking `&mut Self::Raster` modify it
/// in place.
pub trait ImageBackend {
    /// A decoded, owned bitmap.
    type Raster;

    /// Decode bytes. `ImageType::Image` means "sniff the format from the content".
    fn decode(&self, bytes: &[u8], declared: ImageType) -> Result<Self::Raster, BackendError>;

    /// Encode a raster, consuming it. `ImageType::Image` encodes as JPEG.
    fn encode(
        &self,
        raster: Self::Raster,
        format: ImageType,
        quality: Quality,
    ) -> Result<Vec<u8>, BackendError>;

    fn dimensions(&self, raster: &Self::Raster) -> Dimensions;

    /// A new raster of the given size filled with `color`, optionally fully transparent.
    fn blank(
        &self,
        size: Dimensions,
        color: Color,
        transparent: bool,
    ) -> Result<Self::Raster, BackendError>;

    /// Scale the `src` region of the raster to a new raster of `dest` size.
    fn resample(
        &self,
        raster: Self::Raster,
        src: Rect,
        dest: Dimensions,
    ) -> Result<Self::Raster, BackendError>;

    /// Copy `region` out into a new raster of the region's size.
    fn extract(&self, raster: Self::Raster, region: Rect) -> Result<Self::Raster, BackendError>;

    /// Draw `src` onto `dest` with its top-left corner at `(x, y)`.
    ///
    /// With `alpha_blend` the source is blended over the destination using
    /// its alpha channel; without it source pixels replace destination pixels.
    fn composite(
        &self,
        dest: &mut Self::Raster,
        src: &Self::Raster,
        x: i64,
        y: i64,
        alpha_blend: bool,
    );

    /// Bounding box of `text` relative to its baseline origin.
    fn measure_text(&self, font: &Path, size: f32, text: &str) -> Result<TextBox, BackendError>;

    /// Draw `text` with the left end of its baseline at `(x, y)`.
    #[allow(clippy::too_many_arguments)]
    fn draw_text(
        &self,
        raster: &mut Self::Raster,
        font: &Path,
        size: f32,
        x: i32,
        y: i32,
        color: Color,
        text: &str,
    ) -> Result<(), BackendError>;

    fn convolve(&self, raster: &mut Self::Raster, kernel: &Kernel);

    /// Rotate counter-clockwise.
    fn rotate(&self, raster: Self::Raster, rotation: Rotation) -> Self::Raster;

    /// Flip along an axis using [`mirror_source`](super::geometry::mirror_source)
    /// addressing.
    fn mirror(&self, raster: Self::Raster, axis: MirrorAxis) -> Self::Raster;

    fn greyscale(&self, raster: &mut Self::Raster);

    /// Merge a solid colour over the whole raster at `percent` opacity.
    fn overlay_color(&self, raster: &mut Self::Raster, color: Color, percent: u8);
}
