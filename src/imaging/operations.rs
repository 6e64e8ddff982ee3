//! High-level image operations.
//!
//! These functions combine the pure geometry with backend execution. Each
//! takes the current canvas by value and returns the canvas to continue
//! with, so a queue of operations is a fold over [`apply`].

use super::backend::{BackendError, ImageBackend};
use super::geometry::{Dimensions, align_text, calculate_coordinates, clamp_region};
use super::params::{
    Color, ExtractParams, InsertImageParams, InsertTextParams, Kernel, MirrorAxis, Operation,
    ResizeParams, Rotation,
};
use crate::types::ImageType;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// What happened to an insert-image request.
///
/// Inserting an overlay is best effort: the two skip cases are not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// The file is absent, has an unknown extension, or does not decode.
    SourceMissing(String),
    /// The canvas is smaller than the inserted image or the requested minimum.
    TooSmall {
        canvas: Dimensions,
        required: Dimensions,
    },
}

/// Apply one operation to the canvas and return the canvas to continue with.
pub fn apply<B: ImageBackend>(backend: &B, raster: B::Raster, op: &Operation) -> Result<B::Raster> {
    log::debug!("applying {}", op.name());
    match op {
        Operation::Resize(params) => resize(backend, raster, params),
        Operation::InsertImage(params) => {
            let mut raster = raster;
            match insert_image(backend, &mut raster, params) {
                InsertOutcome::Inserted => {}
                InsertOutcome::SourceMissing(reason) => {
                    log::warn!("insert_image skipped: {reason}");
                }
                InsertOutcome::TooSmall { canvas, required } => log::warn!(
                    "insert_image skipped: canvas {}x{} is smaller than {}x{}",
                    canvas.width,
                    canvas.height,
                    required.width,
                    required.height
                ),
            }
            Ok(raster)
        }
        Operation::InsertText(params) => {
            let mut raster = raster;
            insert_text(backend, &mut raster, params)?;
            Ok(raster)
        }
        Operation::Extract(params) => extract(backend, raster, params),
        Operation::Mirror { axis } => Ok(mirror(backend, raster, *axis)),
        Operation::Rotate { degrees } => Ok(rotate(backend, raster, *degrees)),
        Operation::Greyscale => {
            let mut raster = raster;
            backend.greyscale(&mut raster);
            Ok(raster)
        }
        Operation::Colorize { color, percent } => {
            let mut raster = raster;
            colorize(backend, &mut raster, *color, *percent);
            Ok(raster)
        }
        Operation::Sharpen => {
            let mut raster = raster;
            backend.convolve(&mut raster, &Kernel::sharpen());
            Ok(raster)
        }
        Operation::Blur => {
            let mut raster = raster;
            backend.convolve(&mut raster, &Kernel::blur());
            Ok(raster)
        }
    }
}

/// Run a whole queue against a canvas, in order.
pub fn apply_all<B: ImageBackend>(
    backend: &B,
    raster: B::Raster,
    ops: &[Operation],
) -> Result<B::Raster> {
    ops.iter()
        .try_fold(raster, |raster, op| apply(backend, raster, op))
}

/// Resize / crop the canvas according to the calculated coordinates.
pub fn resize<B: ImageBackend>(
    backend: &B,
    raster: B::Raster,
    params: &ResizeParams,
) -> Result<B::Raster> {
    let source = backend.dimensions(&raster);
    let coords = calculate_coordinates(source, params);
    log::debug!(
        "resize {}x{}: src {:?} -> dest {}x{}",
        source.width,
        source.height,
        coords.src,
        coords.dest.width,
        coords.dest.height
    );
    backend.resample(raster, coords.src, coords.dest.dimensions())
}

/// Composite another image file onto the canvas at an anchored position.
pub fn insert_image<B: ImageBackend>(
    backend: &B,
    raster: &mut B::Raster,
    params: &InsertImageParams,
) -> InsertOutcome {
    let path = &params.path;
    let Some(kind) = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(ImageType::from_extension)
    else {
        return InsertOutcome::SourceMissing(format!("{} is not a gif/png/jpg file", path.display()));
    };

    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => return InsertOutcome::SourceMissing(format!("{}: {}", path.display(), e)),
    };
    let overlay = match backend.decode(&bytes, kind) {
        Ok(overlay) => overlay,
        Err(e) => return InsertOutcome::SourceMissing(format!("{}: {}", path.display(), e)),
    };

    let insert = backend.dimensions(&overlay);
    let required = Dimensions::new(
        insert.width.max(params.min_width),
        insert.height.max(params.min_height),
    );
    let canvas = backend.dimensions(raster);
    if canvas.width < required.width || canvas.height < required.height {
        return InsertOutcome::TooSmall { canvas, required };
    }

    let x = params.pos_x.offset(canvas.width, insert.width);
    let y = params.pos_y.offset(canvas.height, insert.height);
    backend.composite(raster, &overlay, x, y, params.alpha);
    InsertOutcome::Inserted
}

/// Draw a line of text, aligned on the insertion point.
pub fn insert_text<B: ImageBackend>(
    backend: &B,
    raster: &mut B::Raster,
    params: &InsertTextParams,
) -> Result<()> {
    if params.angle != 0 {
        log::warn!(
            "insert_text: rotated text is not supported, ignoring angle {}",
            params.angle
        );
    }
    let bbox = backend.measure_text(&params.font, params.size, &params.text)?;
    let (x, y) = align_text(params.x, params.y, bbox, params.align, params.valign);
    backend.draw_text(
        raster,
        &params.font,
        params.size,
        x,
        y,
        params.color,
        &params.text,
    )
}

/// Cut a clamped region out of the canvas. Returns the canvas untouched if
/// the region covers all of it.
pub fn extract<B: ImageBackend>(
    backend: &B,
    raster: B::Raster,
    params: &ExtractParams,
) -> Result<B::Raster> {
    let canvas = backend.dimensions(&raster);
    match clamp_region(canvas, params.x, params.y, params.width, params.height) {
        Some(region) => backend.extract(raster, region),
        None => Ok(raster),
    }
}

pub fn mirror<B: ImageBackend>(backend: &B, raster: B::Raster, axis: MirrorAxis) -> B::Raster {
    backend.mirror(raster, axis)
}

/// Rotate by a right angle; any other angle leaves the canvas unchanged.
pub fn rotate<B: ImageBackend>(backend: &B, raster: B::Raster, degrees: i32) -> B::Raster {
    match Rotation::from_degrees(degrees) {
        Some(rotation) => backend.rotate(raster, rotation),
        None => {
            log::warn!("rotate skipped: unsupported angle {degrees}");
            raster
        }
    }
}

/// Desaturate, then tint with a solid colour at `percent` opacity.
pub fn colorize<B: ImageBackend>(backend: &B, raster: &mut B::Raster, color: Color, percent: u8) {
    backend.greyscale(raster);
    backend.overlay_color(raster, color, percent);
}
