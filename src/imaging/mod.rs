//! Image processing in pure Rust, with no system imaging libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode / encode** | `image` (GIF, PNG, JPEG) |
//! | **Resize / crop** | [`calculate_coordinates`] + Lanczos3 resample |
//! | **Insert image** | `image::imageops::overlay` / `replace` |
//! | **Insert text** | `imageproc` + `ab_glyph` |
//! | **Filters** | 3x3 convolution, greyscale, colour merge |
//!
//! The module is split into:
//! - **Geometry**: Pure functions for rectangle math (unit testable)
//! - **Parameters**: The [`Operation`] union and its payloads
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: Per-operation handlers combining geometry + backend

pub mod backend;
pub mod geometry;
pub mod operations;
pub mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
pub use geometry::{
    Coordinates, Dimensions, HAnchor, Rect, ScalePolicy, ScaleSpec, SizeBound, TextBox, VAnchor,
    calculate_coordinates,
};
pub use operations::{InsertOutcome, apply, apply_all};
pub use params::{
    Color, ExtractParams, InsertImageParams, InsertTextParams, Kernel, MirrorAxis, Operation,
    ResizeParams, Rotation,
};
pub use rust_backend::RustBackend;
