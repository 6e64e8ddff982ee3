//! Pure Rust image processing backend.
//!
//! Rasters are `image::RgbaImage` (8-bit RGBA, straight alpha).
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (GIF, PNG, JPEG) | `image::load_from_memory[_with_format]` |
//! | Encode | `JpegEncoder` (quality), `PngEncoder`, `GifEncoder` |
//! | Resample | `image::imageops::crop_imm` + `resize` with `Lanczos3` |
//! | Composite | `image::imageops::overlay` (alpha) / `replace` (copy) |
//! | Text | `ab_glyph` font loading + `imageproc::drawing::draw_text_mut` |
//! | Rotate | `image::imageops::rotate90/180/270` |
//! | Convolution, mirror, greyscale, colour merge | hand-written pixel loops |

use super::backend::{BackendError, ImageBackend};
use super::geometry::{Dimensions, Rect, TextBox, mirror_source};
use super::params::{Color, Kernel, MirrorAxis, Rotation};
use crate::types::{ImageType, Quality};
use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat, Rgba, RgbaImage};
use std::path::Path;

/// Pixel written where mirroring reads past the edge.
const OUT_OF_RANGE: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn image_format(kind: ImageType) -> Option<ImageFormat> {
    match kind {
        ImageType::Gif => Some(ImageFormat::Gif),
        ImageType::Png => Some(ImageFormat::Png),
        ImageType::Jpg => Some(ImageFormat::Jpeg),
        ImageType::Image => None,
    }
}

fn ensure_not_empty(size: Dimensions) -> Result<(), BackendError> {
    if size.is_empty() {
        return Err(BackendError::ProcessingFailed(format!(
            "cannot allocate a {}x{} raster",
            size.width, size.height
        )));
    }
    Ok(())
}

fn load_font(path: &Path) -> Result<FontVec, BackendError> {
    let data = std::fs::read(path)?;
    FontVec::try_from_vec(data)
        .map_err(|e| BackendError::Font(format!("Failed to load {}: {}", path.display(), e)))
}

fn to_rgba(color: Color) -> Rgba<u8> {
    Rgba([color.r, color.g, color.b, 255])
}

impl ImageBackend for RustBackend {
    type Raster = RgbaImage;

    fn decode(&self, bytes: &[u8], declared: ImageType) -> Result<RgbaImage, BackendError> {
        let decoded = match image_format(declared) {
            Some(format) => image::load_from_memory_with_format(bytes, format),
            None => image::load_from_memory(bytes),
        };
        decoded
            .map(|img| img.to_rgba8())
            .map_err(|e| BackendError::DecodeFailed(format!("{declared}: {e}")))
    }

    fn encode(
        &self,
        raster: RgbaImage,
        format: ImageType,
        quality: Quality,
    ) -> Result<Vec<u8>, BackendError> {
        let (width, height) = raster.dimensions();
        let mut out = Vec::new();
        let result = match format.or_jpg() {
            ImageType::Png => PngEncoder::new(&mut out).write_image(
                raster.as_raw(),
                width,
                height,
                ExtendedColorType::Rgba8,
            ),
            ImageType::Gif => {
                let mut encoder = GifEncoder::new(&mut out);
                encoder.encode(raster.as_raw(), width, height, ExtendedColorType::Rgba8)
            }
            _ => {
                // JPEG has no alpha channel
                let rgb = DynamicImage::ImageRgba8(raster).to_rgb8();
                let quality = quality.value().clamp(1, 100) as u8;
                JpegEncoder::new_with_quality(&mut out, quality).write_image(
                    rgb.as_raw(),
                    width,
                    height,
                    ExtendedColorType::Rgb8,
                )
            }
        };
        result.map_err(|e| BackendError::EncodeFailed(format!("{}: {}", format.or_jpg(), e)))?;
        Ok(out)
    }

    fn dimensions(&self, raster: &RgbaImage) -> Dimensions {
        Dimensions::new(raster.width(), raster.height())
    }

    fn blank(
        &self,
        size: Dimensions,
        color: Color,
        transparent: bool,
    ) -> Result<RgbaImage, BackendError> {
        ensure_not_empty(size)?;
        let mut pixel = to_rgba(color);
        if transparent {
            pixel[3] = 0;
        }
        Ok(RgbaImage::from_pixel(size.width, size.height, pixel))
    }

    fn resample(
        &self,
        raster: RgbaImage,
        src: Rect,
        dest: Dimensions,
    ) -> Result<RgbaImage, BackendError> {
        ensure_not_empty(dest)?;
        ensure_not_empty(src.dimensions())?;
        let region = imageops::crop_imm(&raster, src.x, src.y, src.width, src.height).to_image();
        Ok(imageops::resize(
            &region,
            dest.width,
            dest.height,
            FilterType::Lanczos3,
        ))
    }

    fn extract(&self, raster: RgbaImage, region: Rect) -> Result<RgbaImage, BackendError> {
        ensure_not_empty(region.dimensions())?;
        Ok(imageops::crop_imm(&raster, region.x, region.y, region.width, region.height).to_image())
    }

    fn composite(&self, dest: &mut RgbaImage, src: &RgbaImage, x: i64, y: i64, alpha_blend: bool) {
        if alpha_blend {
            imageops::overlay(dest, src, x, y);
        } else {
            imageops::replace(dest, src, x, y);
        }
    }

    fn measure_text(&self, font: &Path, size: f32, text: &str) -> Result<TextBox, BackendError> {
        let font = load_font(font)?;
        let scale = PxScale::from(size);
        let (width, _) = imageproc::drawing::text_size(scale, &font, text);
        let scaled = font.as_scaled(scale);
        Ok(TextBox {
            lower_left: (0, (-scaled.descent()).ceil() as i32),
            upper_right: (width as i32, -(scaled.ascent().ceil() as i32)),
        })
    }

    fn draw_text(
        &self,
        raster: &mut RgbaImage,
        font: &Path,
        size: f32,
        x: i32,
        y: i32,
        color: Color,
        text: &str,
    ) -> Result<(), BackendError> {
        let font = load_font(font)?;
        let scale = PxScale::from(size);
        // imageproc positions the layout by its top edge, one ascent above the baseline
        let top = y - font.as_scaled(scale).ascent().round() as i32;
        imageproc::drawing::draw_text_mut(raster, to_rgba(color), x, top, scale, &font, text);
        Ok(())
    }

    fn convolve(&self, raster: &mut RgbaImage, kernel: &Kernel) {
        let (width, height) = raster.dimensions();
        if width == 0 || height == 0 {
            return;
        }
        let divisor = if kernel.divisor == 0.0 {
            1.0
        } else {
            kernel.divisor
        };
        let source = raster.clone();
        let max_x = width as i64 - 1;
        let max_y = height as i64 - 1;

        for y in 0..height {
            for x in 0..width {
                let mut acc = [0.0f32; 3];
                for (j, row) in kernel.matrix.iter().enumerate() {
                    let sy = (y as i64 + j as i64 - 1).clamp(0, max_y) as u32;
                    for (i, weight) in row.iter().enumerate() {
                        let sx = (x as i64 + i as i64 - 1).clamp(0, max_x) as u32;
                        let px = source.get_pixel(sx, sy);
                        for (c, sum) in acc.iter_mut().enumerate() {
                            *sum += px[c] as f32 * weight;
                        }
                    }
                }
                let out = raster.get_pixel_mut(x, y);
                for (c, sum) in acc.iter().enumerate() {
                    out[c] = (sum / divisor + kernel.offset).clamp(0.0, 255.0) as u8;
                }
            }
        }
    }

    fn rotate(&self, raster: RgbaImage, rotation: Rotation) -> RgbaImage {
        // imageops rotates clockwise
        match rotation {
            Rotation::Deg90 => imageops::rotate270(&raster),
            Rotation::Deg180 => imageops::rotate180(&raster),
            Rotation::Deg270 => imageops::rotate90(&raster),
        }
    }

    fn mirror(&self, raster: RgbaImage, axis: MirrorAxis) -> RgbaImage {
        let (width, height) = raster.dimensions();
        RgbaImage::from_fn(width, height, |x, y| {
            let src = match axis {
                MirrorAxis::Horizontal => mirror_source(x, width).map(|sx| (sx, y)),
                MirrorAxis::Vertical => mirror_source(y, height).map(|sy| (x, sy)),
            };
            src.map_or(OUT_OF_RANGE, |(sx, sy)| *raster.get_pixel(sx, sy))
        })
    }

    fn greyscale(&self, raster: &mut RgbaImage) {
        for px in raster.pixels_mut() {
            let [r, g, b, _] = px.0;
            let grey = (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32) as u8;
            px[0] = grey;
            px[1] = grey;
            px[2] = grey;
        }
    }

    fn overlay_color(&self, raster: &mut RgbaImage, color: Color, percent: u8) {
        let pct = percent.min(100) as u32;
        let layer = [color.r as u32, color.g as u32, color.b as u32];
        for px in raster.pixels_mut() {
            for (c, over) in layer.iter().enumerate() {
                px[c] = ((over * pct + px[c] as u32 * (100 - pct)) / 100) as u8;
            }
        }
    }
}
