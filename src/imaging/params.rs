//! Parameter types for image operations.
//!
//! These types describe *what* to do, not *how* to do it. [`Operation`] is
//! the closed set of transformations a pipeline can queue; the
//! [`operations`](super::operations) module turns each variant into backend
//! calls. Everything here deserialises from recipe TOML.
//!
//! ## Types
//!
//! - [`Operation`] — tagged union over all queueable transformations.
//! - [`ResizeParams`] — requested box, crop anchors, scale policy and size bound.
//! - [`InsertImageParams`] / [`InsertTextParams`] / [`ExtractParams`] — the larger payloads.
//! - [`Color`], [`MirrorAxis`], [`Rotation`], [`Kernel`] — small value types.

use super::geometry::{HAnchor, ScalePolicy, ScaleSpec, SizeBound, VAnchor};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// An RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl From<[u8; 3]> for Color {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

impl From<Color> for [u8; 3] {
    fn from(c: Color) -> Self {
        [c.r, c.g, c.b]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MirrorAxis {
    /// Flip left to right.
    Horizontal,
    /// Flip top to bottom.
    Vertical,
}

/// Supported rotation angles, counter-clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Anything other than 90, 180 or 270 is unsupported.
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        match degrees {
            90 => Some(Self::Deg90),
            180 => Some(Self::Deg180),
            270 => Some(Self::Deg270),
            _ => None,
        }
    }

    pub fn degrees(self) -> i32 {
        match self {
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }
}

/// A 3x3 convolution kernel.
///
/// Each output channel is `sum(kernel * neighbourhood) / divisor + offset`,
/// clamped to `0..=255`. Alpha is left untouched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kernel {
    pub matrix: [[f32; 3]; 3],
    pub divisor: f32,
    pub offset: f32,
}

impl Kernel {
    /// Kernel normalised by the sum of its weights.
    pub fn normalized(matrix: [[f32; 3]; 3]) -> Self {
        let divisor = matrix.iter().flatten().sum();
        Self {
            matrix,
            divisor,
            offset: 0.0,
        }
    }

    pub fn sharpen() -> Self {
        Self::normalized([[-1.0, -1.0, -1.0], [-1.0, 16.0, -1.0], [-1.0, -1.0, -1.0]])
    }

    pub fn blur() -> Self {
        Self::normalized([[1.0, 2.0, 1.0], [2.0, 4.0, 2.0], [1.0, 2.0, 1.0]])
    }
}

/// Parameters for a resize / crop.
///
/// A zero `width` or `height` means "derive from the other edge".
///
/// Queued resizes stretch unless told otherwise: `scale` defaults to
/// [`ScalePolicy::Resize`], so crop anchors alone only take effect with a
/// crop or proportional policy. A `None` scale lets the calculator pick Crop
/// when anchors are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeParams {
    pub width: u32,
    pub height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop_x: Option<HAnchor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop_y: Option<VAnchor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<ScaleSpec>,
    pub size_bound: SizeBound,
}

impl Default for ResizeParams {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            crop_x: None,
            crop_y: None,
            scale: Some(ScaleSpec::new(ScalePolicy::Resize)),
            size_bound: SizeBound::default(),
        }
    }
}

impl ResizeParams {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn crop(mut self, x: HAnchor, y: VAnchor) -> Self {
        self.crop_x = Some(x);
        self.crop_y = Some(y);
        self
    }

    pub fn scale(mut self, scale: impl Into<ScaleSpec>) -> Self {
        self.scale = Some(scale.into());
        self
    }

    pub fn size_bound(mut self, bound: SizeBound) -> Self {
        self.size_bound = bound;
        self
    }
}

/// Composite a second image onto the canvas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InsertImageParams {
    pub path: PathBuf,
    /// Blend using the inserted image's alpha instead of copying its pixels verbatim.
    #[serde(default)]
    pub alpha: bool,
    #[serde(default = "default_insert_x")]
    pub pos_x: HAnchor,
    #[serde(default = "default_insert_y")]
    pub pos_y: VAnchor,
    /// Minimum canvas width for the insert to happen. The inserted image's own
    /// width is always required as well.
    #[serde(default)]
    pub min_width: u32,
    /// Minimum canvas height, on top of the inserted image's own height.
    #[serde(default)]
    pub min_height: u32,
}

fn default_insert_x() -> HAnchor {
    HAnchor::Right
}

fn default_insert_y() -> VAnchor {
    VAnchor::Bottom
}

impl InsertImageParams {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            alpha: false,
            pos_x: default_insert_x(),
            pos_y: default_insert_y(),
            min_width: 0,
            min_height: 0,
        }
    }
}

/// Render a line of TrueType text onto the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InsertTextParams {
    pub text: String,
    /// Path to a TTF/OTF font file.
    pub font: PathBuf,
    /// Font size in pixels.
    pub size: f32,
    /// Left end of the baseline, before alignment.
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub color: Color,
    /// Accepted for compatibility; rotated text is not rendered and any
    /// non-zero angle is treated as 0.
    #[serde(default)]
    pub angle: i32,
    #[serde(default = "default_text_align")]
    pub align: HAnchor,
    #[serde(default = "default_text_valign")]
    pub valign: VAnchor,
}

fn default_text_align() -> HAnchor {
    HAnchor::Left
}

fn default_text_valign() -> VAnchor {
    VAnchor::Bottom
}

impl InsertTextParams {
    pub fn new(text: impl Into<String>, font: impl Into<PathBuf>, size: f32, x: i32, y: i32) -> Self {
        Self {
            text: text.into(),
            font: font.into(),
            size,
            x,
            y,
            color: Color::BLACK,
            angle: 0,
            align: default_text_align(),
            valign: default_text_valign(),
        }
    }
}

/// Cut a region out of the canvas. Zero width/height = the rest of the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractParams {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

/// One queued transformation.
///
/// In recipe TOML the variant is selected by `kind`:
///
/// ```toml
/// [[operations]]
/// kind = "mirror"
/// axis = "horizontal"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Operation {
    Resize(ResizeParams),
    InsertImage(InsertImageParams),
    InsertText(InsertTextParams),
    Extract(ExtractParams),
    Mirror { axis: MirrorAxis },
    /// Only 90, 180 and 270 rotate; any other angle is skipped.
    Rotate { degrees: i32 },
    Greyscale,
    /// Greyscale, then a solid colour merged at `percent` opacity.
    Colorize { color: Color, percent: u8 },
    Sharpen,
    Blur,
}

impl Operation {
    /// Short name used in log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Resize(_) => "resize",
            Self::InsertImage(_) => "insert_image",
            Self::InsertText(_) => "insert_text",
            Self::Extract(_) => "extract",
            Self::Mirror { .. } => "mirror",
            Self::Rotate { .. } => "rotate",
            Self::Greyscale => "greyscale",
            Self::Colorize { .. } => "colorize",
            Self::Sharpen => "sharpen",
            Self::Blur => "blur",
        }
    }
}

impl From<ResizeParams> for Operation {
    fn from(p: ResizeParams) -> Self {
        Self::Resize(p)
    }
}

impl From<InsertImageParams> for Operation {
    fn from(p: InsertImageParams) -> Self {
        Self::InsertImage(p)
    }
}

impl From<InsertTextParams> for Operation {
    fn from(p: InsertTextParams) -> Self {
        Self::InsertText(p)
    }
}

impl From<ExtractParams> for Operation {
    fn from(p: ExtractParams) -> Self {
        Self::Extract(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_divisors_are_weight_sums() {
        assert_eq!(Kernel::sharpen().divisor, 8.0);
        assert_eq!(Kernel::blur().divisor, 16.0);
        assert_eq!(Kernel::blur().offset, 0.0);
    }

    #[test]
    fn rotation_accepts_right_angles_only() {
        assert_eq!(Rotation::from_degrees(90), Some(Rotation::Deg90));
        assert_eq!(Rotation::from_degrees(270).map(Rotation::degrees), Some(270));
        assert_eq!(Rotation::from_degrees(45), None);
        assert_eq!(Rotation::from_degrees(-90), None);
    }

    #[test]
    fn resize_builder() {
        let p = ResizeParams::new(10, 20)
            .crop(HAnchor::Left, VAnchor::Top)
            .scale(ScalePolicy::Proportional);
        assert_eq!(p.crop_x, Some(HAnchor::Left));
        assert_eq!(p.scale.map(|s| s.policy), Some(ScalePolicy::Proportional));
        assert_eq!(p.size_bound, SizeBound::ClampSmaller);
    }

    #[test]
    fn queued_resize_stretches_by_default() {
        let p = ResizeParams::new(300, 300).crop(HAnchor::Left, VAnchor::Top);
        assert_eq!(p.scale, Some(ScaleSpec::new(ScalePolicy::Resize)));

        let parsed: ResizeParams = toml::from_str("width = 300\ncrop_x = \"left\"").unwrap();
        assert_eq!(parsed.scale.map(|s| s.policy), Some(ScalePolicy::Resize));

        let c = crate::imaging::calculate_coordinates(
            crate::imaging::Dimensions::new(800, 600),
            &p,
        );
        assert_eq!(c.src, crate::imaging::Rect::sized(800, 600));
        assert_eq!(c.dest, crate::imaging::Rect::sized(300, 300));
    }

    #[test]
    fn insert_image_defaults_bottom_right() {
        let p = InsertImageParams::new("logo.png");
        assert_eq!((p.pos_x, p.pos_y), (HAnchor::Right, VAnchor::Bottom));
        assert!(!p.alpha);
    }

    #[test]
    fn operations_deserialize_by_kind() {
        #[derive(Deserialize)]
        struct Wrapper {
            operations: Vec<Operation>,
        }

        let parsed: Wrapper = toml::from_str(
            r#"
[[operations]]
kind = "resize"
width = 400
scale = "crop_left_top"

[[operations]]
kind = "insert_image"
path = "logo.png"
alpha = true

[[operations]]
kind = "colorize"
color = [255, 0, 0]
percent = 40

[[operations]]
kind = "rotate"
degrees = 90

[[operations]]
kind = "blur"
"#,
        )
        .unwrap();

        assert_eq!(parsed.operations.len(), 5);
        match &parsed.operations[0] {
            Operation::Resize(p) => {
                assert_eq!((p.width, p.height), (400, 0));
                assert_eq!(p.scale.unwrap().anchor, Some((HAnchor::Left, VAnchor::Top)));
            }
            other => panic!("expected resize, got {other:?}"),
        }
        assert!(matches!(
            &parsed.operations[1],
            Operation::InsertImage(p) if p.alpha && p.pos_x == HAnchor::Right
        ));
        assert_eq!(
            parsed.operations[2],
            Operation::Colorize {
                color: Color::rgb(255, 0, 0),
                percent: 40
            }
        );
        assert_eq!(parsed.operations[3], Operation::Rotate { degrees: 90 });
        assert_eq!(parsed.operations[4], Operation::Blur);
    }

    #[test]
    fn unknown_scale_token_rejected() {
        let result: Result<ResizeParams, _> = toml::from_str(r#"scale = "zoom""#);
        assert!(result.is_err());
    }
}
