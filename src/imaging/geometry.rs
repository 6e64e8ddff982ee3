//! Pure geometry for image operations.
//!
//! All functions here are pure and testable without any I/O or images.
//! Aspect ratios are compared by cross-multiplication in `u64`, and every
//! derived pixel size or offset is floored, so results are exact and
//! deterministic.

use super::params::ResizeParams;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Width and height of a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// An integer region of a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    /// Region at the origin with the given size.
    pub fn sized(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    /// The whole raster.
    pub fn full(dims: Dimensions) -> Self {
        Self::sized(dims.width, dims.height)
    }

    pub fn dimensions(self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }
}

/// Source and destination regions for a single resample.
///
/// The destination origin is always `(0, 0)`; only its size varies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinates {
    pub src: Rect,
    pub dest: Rect,
}

impl Coordinates {
    /// Equivalent ImageMagick invocation, handy for checking results by hand.
    pub fn to_magick_args(&self, source: &str, output: &str) -> String {
        format!(
            "convert {source} -crop '{}x{}+{}+{}!' -resize '{}x{}!' {output}",
            self.src.width,
            self.src.height,
            self.src.x,
            self.src.y,
            self.dest.width,
            self.dest.height
        )
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind}: {value:?}")]
pub struct ParseTokenError {
    kind: &'static str,
    value: String,
}

impl ParseTokenError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Horizontal anchor for crops, overlays and text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HAnchor {
    Left,
    Center,
    Right,
}

/// Vertical anchor for crops, overlays and text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VAnchor {
    Top,
    Middle,
    Bottom,
}

impl HAnchor {
    /// Offset of an `inner`-wide box placed inside an `outer`-wide box.
    /// Negative when the inner box is wider.
    pub fn offset(self, outer: u32, inner: u32) -> i64 {
        anchor_offset(self.index(), outer, inner)
    }

    fn index(self) -> u8 {
        match self {
            Self::Left => 0,
            Self::Center => 1,
            Self::Right => 2,
        }
    }
}

impl VAnchor {
    /// Offset of an `inner`-tall box placed inside an `outer`-tall box.
    pub fn offset(self, outer: u32, inner: u32) -> i64 {
        anchor_offset(self.index(), outer, inner)
    }

    fn index(self) -> u8 {
        match self {
            Self::Top => 0,
            Self::Middle => 1,
            Self::Bottom => 2,
        }
    }
}

fn anchor_offset(index: u8, outer: u32, inner: u32) -> i64 {
    let slack = outer as i64 - inner as i64;
    match index {
        0 => 0,
        1 => slack.div_euclid(2),
        _ => slack,
    }
}

impl FromStr for HAnchor {
    type Err = ParseTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Self::Left),
            "center" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            other => Err(ParseTokenError::new("horizontal anchor", other)),
        }
    }
}

impl FromStr for VAnchor {
    type Err = ParseTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top" => Ok(Self::Top),
            "middle" => Ok(Self::Middle),
            "bottom" => Ok(Self::Bottom),
            other => Err(ParseTokenError::new("vertical anchor", other)),
        }
    }
}

impl fmt::Display for HAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        })
    }
}

impl fmt::Display for VAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Top => "top",
            Self::Middle => "middle",
            Self::Bottom => "bottom",
        })
    }
}

/// How the requested box relates to the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalePolicy {
    /// Fit inside the requested box, keeping the source aspect ratio.
    Ratio,
    /// Crop the source to the requested aspect ratio, then stretch to the requested box.
    Crop,
    /// Crop the source to the requested aspect ratio without scaling.
    Proportional,
    /// Stretch the whole source to the requested box.
    Resize,
}

impl ScalePolicy {
    fn token(self) -> &'static str {
        match self {
            Self::Ratio => "ratio",
            Self::Crop => "crop",
            Self::Proportional => "prop",
            Self::Resize => "resize",
        }
    }
}

/// A scale policy, optionally carrying its own crop anchors.
///
/// Parsed from tokens like `"ratio"`, `"crop"` or the combined form
/// `"crop_left_top"` / `"prop_center_bottom"`. Anchors carried here win over
/// separately supplied ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ScaleSpec {
    pub policy: ScalePolicy,
    pub anchor: Option<(HAnchor, VAnchor)>,
}

impl ScaleSpec {
    pub fn new(policy: ScalePolicy) -> Self {
        Self {
            policy,
            anchor: None,
        }
    }

    pub fn anchored(policy: ScalePolicy, x: HAnchor, y: VAnchor) -> Self {
        Self {
            policy,
            anchor: Some((x, y)),
        }
    }
}

impl From<ScalePolicy> for ScaleSpec {
    fn from(policy: ScalePolicy) -> Self {
        Self::new(policy)
    }
}

impl FromStr for ScaleSpec {
    type Err = ParseTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseTokenError::new("scale", s);
        let mut parts = s.split('_');
        let policy = match parts.next() {
            Some("ratio") => ScalePolicy::Ratio,
            Some("crop") => ScalePolicy::Crop,
            Some("prop") => ScalePolicy::Proportional,
            Some("resize") => ScalePolicy::Resize,
            _ => return Err(invalid()),
        };

        match (parts.next(), parts.next(), parts.next()) {
            (None, _, _) => Ok(Self::new(policy)),
            (Some(x), Some(y), None)
                if matches!(policy, ScalePolicy::Crop | ScalePolicy::Proportional) =>
            {
                let x = x.parse().map_err(|_| invalid())?;
                let y = y.parse().map_err(|_| invalid())?;
                Ok(Self::anchored(policy, x, y))
            }
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for ScaleSpec {
    type Error = ParseTokenError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ScaleSpec> for String {
    fn from(value: ScaleSpec) -> Self {
        value.to_string()
    }
}

impl fmt::Display for ScaleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.anchor {
            Some((x, y)) => write!(f, "{}_{}_{}", self.policy.token(), x, y),
            None => f.write_str(self.policy.token()),
        }
    }
}

/// Whether requested dimensions are clamped against the source before scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SizeBound {
    /// Never upscale: requested sizes above the source are lowered to it.
    #[default]
    #[serde(rename = "smaller")]
    ClampSmaller,
    /// Never downscale: requested sizes below the source are raised to it.
    #[serde(rename = "bigger")]
    ClampBigger,
    /// Use the requested sizes as given.
    #[serde(rename = "smaller_bigger")]
    Unclamped,
}

impl SizeBound {
    fn apply(self, source: Dimensions, width: u32, height: u32) -> (u32, u32) {
        match self {
            Self::ClampSmaller => (width.min(source.width), height.min(source.height)),
            Self::ClampBigger => (width.max(source.width), height.max(source.height)),
            Self::Unclamped => (width, height),
        }
    }
}

impl FromStr for SizeBound {
    type Err = ParseTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "smaller" => Ok(Self::ClampSmaller),
            "bigger" => Ok(Self::ClampBigger),
            "smaller_bigger" => Ok(Self::Unclamped),
            other => Err(ParseTokenError::new("size bound", other)),
        }
    }
}

/// Compare `a.0 / a.1` against `b.0 / b.1` without floating point.
fn cmp_aspect(a: (u32, u32), b: (u32, u32)) -> Ordering {
    (a.0 as u64 * b.1 as u64).cmp(&(b.0 as u64 * a.1 as u64))
}

/// `floor(value * num / den)`, saturating on overflow.
fn scale(value: u32, num: u32, den: u32) -> u32 {
    if den == 0 {
        return 0;
    }
    u32::try_from(value as u64 * num as u64 / den as u64).unwrap_or(u32::MAX)
}

/// Calculate the source and destination rectangles for one resize.
///
/// Order of evaluation:
/// 1. Anchors embedded in a combined scale token replace `crop_x`/`crop_y`.
/// 2. The size bound clamps the requested box against the source.
/// 3. A zero width or height is derived from the other one keeping the
///    source aspect ratio (both zero means "source size"), and the policy is
///    forced to [`ScalePolicy::Ratio`].
/// 4. Any crop anchor without an explicit policy selects [`ScalePolicy::Crop`].
/// 5. The policy decides the rectangles; no policy means [`ScalePolicy::Resize`].
///
/// # Examples
/// ```
/// # use imgpipe::imaging::{calculate_coordinates, Dimensions, ResizeParams, ScalePolicy};
/// let coords = calculate_coordinates(
///     Dimensions::new(800, 600),
///     &ResizeParams::new(300, 300).scale(ScalePolicy::Crop),
/// );
/// assert_eq!((coords.src.x, coords.src.width, coords.src.height), (100, 600, 600));
/// assert_eq!((coords.dest.width, coords.dest.height), (300, 300));
/// ```
pub fn calculate_coordinates(source: Dimensions, request: &ResizeParams) -> Coordinates {
    let Dimensions {
        width: width_in,
        height: height_in,
    } = source;

    let mut crop_x = request.crop_x;
    let mut crop_y = request.crop_y;
    let mut policy = request.scale.map(|s| s.policy);
    if let Some((x, y)) = request.scale.and_then(|s| s.anchor) {
        crop_x = Some(x);
        crop_y = Some(y);
    }

    let (mut width_out, mut height_out) =
        request
            .size_bound
            .apply(source, request.width, request.height);

    if source.is_empty() {
        return Coordinates {
            src: Rect::full(source),
            dest: Rect::sized(width_out, height_out),
        };
    }

    // Target aspect ratio as a (w, h) pair
    let aspect_out = if width_out == 0 || height_out == 0 {
        if width_out != 0 {
            height_out = scale(width_out, height_in, width_in);
        } else if height_out != 0 {
            width_out = scale(height_out, width_in, height_in);
        } else {
            width_out = width_in;
            height_out = height_in;
        }
        policy = Some(ScalePolicy::Ratio);
        (width_in, height_in)
    } else {
        (width_out, height_out)
    };

    if (crop_x.is_some() || crop_y.is_some()) && policy.is_none() {
        policy = Some(ScalePolicy::Crop);
    }

    let aspect_in = (width_in, height_in);

    match policy.unwrap_or(ScalePolicy::Resize) {
        ScalePolicy::Ratio => {
            let (width_dest, height_dest) = match cmp_aspect(aspect_in, aspect_out) {
                // Source is narrower: height is the binding edge
                Ordering::Less => (scale(height_out, width_in, height_in), height_out),
                // Source is wider: width is the binding edge
                Ordering::Greater => (width_out, scale(width_out, height_in, width_in)),
                Ordering::Equal => (width_out, height_out),
            };
            Coordinates {
                src: Rect::full(source),
                dest: Rect::sized(width_dest, height_dest),
            }
        }
        policy @ (ScalePolicy::Crop | ScalePolicy::Proportional) => {
            let (width_src, height_src) = match cmp_aspect(aspect_in, aspect_out) {
                Ordering::Less => (width_in, scale(width_in, aspect_out.1, aspect_out.0)),
                Ordering::Greater => (scale(height_in, aspect_out.0, aspect_out.1), height_in),
                Ordering::Equal => (width_in, height_in),
            };

            let x = match crop_x.unwrap_or(HAnchor::Center) {
                HAnchor::Left => 0,
                HAnchor::Center => (width_in - width_src) / 2,
                HAnchor::Right => width_in - width_src,
            };
            let y = match crop_y.unwrap_or(VAnchor::Middle) {
                VAnchor::Top => 0,
                VAnchor::Middle => (height_in - height_src) / 2,
                VAnchor::Bottom => height_in - height_src,
            };

            let dest = if policy == ScalePolicy::Proportional {
                Rect::sized(width_src, height_src)
            } else {
                Rect::sized(width_out, height_out)
            };

            Coordinates {
                src: Rect {
                    x,
                    y,
                    width: width_src,
                    height: height_src,
                },
                dest,
            }
        }
        ScalePolicy::Resize => Coordinates {
            src: Rect::full(source),
            dest: Rect::sized(width_out, height_out),
        },
    }
}

/// Clamp an extract request into the canvas.
///
/// An origin outside the canvas resets to 0; a non-positive or overflowing
/// size becomes "everything from the origin". Returns `None` when the result
/// is the whole canvas, i.e. extracting would be a no-op.
pub fn clamp_region(canvas: Dimensions, x: i64, y: i64, width: i64, height: i64) -> Option<Rect> {
    let canvas_w = canvas.width as i64;
    let canvas_h = canvas.height as i64;

    let x = if x < 0 || x >= canvas_w { 0 } else { x };
    let y = if y < 0 || y >= canvas_h { 0 } else { y };

    let width = if width <= 0 || width > canvas_w - x {
        canvas_w - x
    } else {
        width
    };
    let height = if height <= 0 || height > canvas_h - y {
        canvas_h - y
    } else {
        height
    };

    if x == 0 && y == 0 && width == canvas_w && height == canvas_h {
        return None;
    }

    Some(Rect {
        x: x as u32,
        y: y as u32,
        width: width as u32,
        height: height as u32,
    })
}

/// Source index read for destination index `pos` when mirroring along an
/// axis of length `len`.
///
/// The mapping is `len - pos`, so destination index 0 reads one past the
/// last source pixel and gets `None`; backends fill it with opaque black.
/// Source index 0 is never read.
pub fn mirror_source(pos: u32, len: u32) -> Option<u32> {
    let src = len.checked_sub(pos)?;
    (src < len).then_some(src)
}

/// Bounding box of rendered text, relative to the baseline origin, y down.
///
/// Matches the corner layout of a TrueType bbox query: `lower_left` is the
/// bottom-left corner (y positive below the baseline), `upper_right` the
/// top-right corner (y negative above it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextBox {
    pub lower_left: (i32, i32),
    pub upper_right: (i32, i32),
}

/// Shift a text insertion point so the text box is aligned on it.
///
/// The insertion point is the left end of the baseline. `Left` and
/// `Bottom` leave it unchanged.
pub fn align_text(x: i32, y: i32, bbox: TextBox, align: HAnchor, valign: VAnchor) -> (i32, i32) {
    let span_x = bbox.lower_left.0 + bbox.upper_right.0;
    let span_y = bbox.lower_left.1 - bbox.upper_right.1;

    let x = match align {
        HAnchor::Left => x,
        HAnchor::Center => x - (span_x as f64 / 2.0).round() as i32,
        HAnchor::Right => x - span_x,
    };
    let y = match valign {
        VAnchor::Bottom => y,
        VAnchor::Middle => y + span_y.div_euclid(2),
        VAnchor::Top => y + span_y,
    };
    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords(source: (u32, u32), request: ResizeParams) -> Coordinates {
        calculate_coordinates(Dimensions::new(source.0, source.1), &request)
    }

    // =========================================================================
    // Token parsing
    // =========================================================================

    #[test]
    fn parse_plain_scale_tokens() {
        assert_eq!(
            "ratio".parse::<ScaleSpec>(),
            Ok(ScaleSpec::new(ScalePolicy::Ratio))
        );
        assert_eq!(
            "prop".parse::<ScaleSpec>(),
            Ok(ScaleSpec::new(ScalePolicy::Proportional))
        );
    }

    #[test]
    fn parse_combined_scale_token() {
        assert_eq!(
            "crop_left_top".parse::<ScaleSpec>(),
            Ok(ScaleSpec::anchored(
                ScalePolicy::Crop,
                HAnchor::Left,
                VAnchor::Top
            ))
        );
        assert_eq!(
            "prop_right_bottom".parse::<ScaleSpec>().unwrap().to_string(),
            "prop_right_bottom"
        );
    }

    #[test]
    fn parse_rejects_anchors_on_non_crop_policies() {
        assert!("ratio_left_top".parse::<ScaleSpec>().is_err());
        assert!("crop_top_left".parse::<ScaleSpec>().is_err());
        assert!("crop_left".parse::<ScaleSpec>().is_err());
        assert!("zoom".parse::<ScaleSpec>().is_err());
    }

    #[test]
    fn parse_size_bound() {
        assert_eq!("smaller".parse(), Ok(SizeBound::ClampSmaller));
        assert_eq!("bigger".parse(), Ok(SizeBound::ClampBigger));
        assert_eq!("smaller_bigger".parse(), Ok(SizeBound::Unclamped));
        assert!("huge".parse::<SizeBound>().is_err());
    }

    // =========================================================================
    // calculate_coordinates
    // =========================================================================

    #[test]
    fn ratio_exact_aspect_match() {
        // 800x600 → 400x300, same 4:3 aspect
        let c = coords((800, 600), ResizeParams::new(400, 300).scale(ScalePolicy::Ratio));
        assert_eq!(c.src, Rect::sized(800, 600));
        assert_eq!(c.dest, Rect::sized(400, 300));
    }

    #[test]
    fn ratio_fits_inside_square_box() {
        // 800x600 into 300x300: width binds, height = floor(300 * 600 / 800) = 225
        let c = coords((800, 600), ResizeParams::new(300, 300).scale(ScalePolicy::Ratio));
        assert_eq!(c.dest, Rect::sized(300, 225));
    }

    #[test]
    fn ratio_portrait_source_height_binds() {
        // 600x800 into 300x300: width = floor(300 * 600 / 800) = 225
        let c = coords((600, 800), ResizeParams::new(300, 300).scale(ScalePolicy::Ratio));
        assert_eq!(c.dest, Rect::sized(225, 300));
    }

    #[test]
    fn crop_center_middle_landscape_to_square() {
        // aspect_in 4:3 > 1:1, so width shrinks to 600 and is centered: x = 100
        let c = coords((800, 600), ResizeParams::new(300, 300).scale(ScalePolicy::Crop));
        assert_eq!(
            c.src,
            Rect {
                x: 100,
                y: 0,
                width: 600,
                height: 600
            }
        );
        assert_eq!(c.dest, Rect::sized(300, 300));
    }

    #[test]
    fn crop_tall_target_shrinks_height() {
        // 800x600 → 400x100 (4:1): height_src = floor(800 / 4) = 200, centered y = 200
        let c = coords((800, 600), ResizeParams::new(400, 100).scale(ScalePolicy::Crop));
        assert_eq!(
            c.src,
            Rect {
                x: 0,
                y: 200,
                width: 800,
                height: 200
            }
        );
        assert_eq!(c.dest, Rect::sized(400, 100));
    }

    #[test]
    fn crop_anchors_right_bottom() {
        let c = coords(
            (800, 600),
            ResizeParams::new(300, 300)
                .crop(HAnchor::Right, VAnchor::Bottom)
                .scale(ScalePolicy::Crop),
        );
        assert_eq!(c.src.x, 200);
        assert_eq!(c.src.x + c.src.width, 800);
        assert_eq!(c.src.y + c.src.height, 600);
    }

    #[test]
    fn combined_token_overrides_separate_anchors() {
        let c = coords(
            (800, 600),
            ResizeParams::new(300, 300)
                .crop(HAnchor::Right, VAnchor::Bottom)
                .scale(ScaleSpec::anchored(
                    ScalePolicy::Crop,
                    HAnchor::Left,
                    VAnchor::Top,
                )),
        );
        assert_eq!((c.src.x, c.src.y), (0, 0));
    }

    #[test]
    fn anchor_without_policy_defaults_to_crop() {
        let c = coords(
            (800, 600),
            ResizeParams {
                scale: None,
                ..ResizeParams::new(300, 300).crop(HAnchor::Left, VAnchor::Top)
            },
        );
        assert_eq!(c.src, Rect::sized(600, 600));
        assert_eq!(c.dest, Rect::sized(300, 300));
    }

    #[test]
    fn no_policy_and_no_anchor_resizes() {
        let c = coords(
            (800, 600),
            ResizeParams {
                scale: None,
                ..ResizeParams::new(300, 300)
            },
        );
        assert_eq!(c.src, Rect::sized(800, 600));
        assert_eq!(c.dest, Rect::sized(300, 300));
    }

    #[test]
    fn proportional_keeps_cropped_size() {
        let c = coords(
            (800, 600),
            ResizeParams::new(300, 300).scale(ScalePolicy::Proportional),
        );
        assert_eq!(c.dest, Rect::sized(600, 600));
        assert_eq!(c.src.dimensions(), c.dest.dimensions());
    }

    #[test]
    fn resize_stretches_whole_source() {
        let c = coords((800, 600), ResizeParams::new(300, 300));
        assert_eq!(c.src, Rect::sized(800, 600));
        assert_eq!(c.dest, Rect::sized(300, 300));
    }

    #[test]
    fn missing_height_derived_from_width() {
        // Crop is ignored: one missing edge forces ratio scaling
        let c = coords((800, 600), ResizeParams::new(400, 0).scale(ScalePolicy::Crop));
        assert_eq!(c.src, Rect::sized(800, 600));
        assert_eq!(c.dest, Rect::sized(400, 300));
    }

    #[test]
    fn missing_width_derived_from_height() {
        // floor(100 * 800 / 600) = 133
        let c = coords((800, 600), ResizeParams::new(0, 100));
        assert_eq!(c.dest, Rect::sized(133, 100));
    }

    #[test]
    fn both_missing_keeps_source_size() {
        let c = coords((800, 600), ResizeParams::new(0, 0));
        assert_eq!(c.dest, Rect::sized(800, 600));
    }

    #[test]
    fn clamp_smaller_never_upscales() {
        let c = coords((800, 600), ResizeParams::new(1600, 1200));
        assert_eq!(c.dest, Rect::sized(800, 600));
    }

    #[test]
    fn clamp_bigger_never_downscales() {
        let c = coords(
            (800, 600),
            ResizeParams::new(400, 300).size_bound(SizeBound::ClampBigger),
        );
        assert_eq!(c.dest, Rect::sized(800, 600));
    }

    #[test]
    fn unclamped_allows_upscale() {
        let c = coords(
            (800, 600),
            ResizeParams::new(1600, 1200)
                .scale(ScalePolicy::Ratio)
                .size_bound(SizeBound::Unclamped),
        );
        assert_eq!(c.dest, Rect::sized(1600, 1200));
    }

    #[test]
    fn empty_source_passes_request_through() {
        let c = coords((0, 0), ResizeParams::new(10, 10).size_bound(SizeBound::Unclamped));
        assert_eq!(c.src, Rect::sized(0, 0));
        assert_eq!(c.dest, Rect::sized(10, 10));
    }

    #[test]
    fn magick_args_format() {
        let c = coords((800, 600), ResizeParams::new(300, 300).scale(ScalePolicy::Crop));
        assert_eq!(
            c.to_magick_args("in.jpg", "out.jpg"),
            "convert in.jpg -crop '600x600+100+0!' -resize '300x300!' out.jpg"
        );
    }

    // =========================================================================
    // clamp_region / anchors / mirror / text
    // =========================================================================

    #[test]
    fn clamp_region_whole_canvas_is_noop() {
        assert_eq!(clamp_region(Dimensions::new(10, 8), 0, 0, 10, 8), None);
        assert_eq!(clamp_region(Dimensions::new(10, 8), 0, 0, 0, 0), None);
        assert_eq!(clamp_region(Dimensions::new(10, 8), -5, 20, 99, -1), None);
    }

    #[test]
    fn clamp_region_remaining_space() {
        assert_eq!(
            clamp_region(Dimensions::new(10, 8), 4, 2, 0, 100),
            Some(Rect {
                x: 4,
                y: 2,
                width: 6,
                height: 6
            })
        );
    }

    #[test]
    fn clamp_region_inside() {
        assert_eq!(
            clamp_region(Dimensions::new(10, 8), 1, 1, 3, 2),
            Some(Rect {
                x: 1,
                y: 1,
                width: 3,
                height: 2
            })
        );
    }

    #[test]
    fn anchor_offsets() {
        assert_eq!(HAnchor::Left.offset(100, 30), 0);
        assert_eq!(HAnchor::Center.offset(100, 30), 35);
        assert_eq!(HAnchor::Right.offset(100, 30), 70);
        assert_eq!(VAnchor::Middle.offset(10, 3), 3);
        // Larger inner box: floor toward negative infinity
        assert_eq!(VAnchor::Middle.offset(10, 13), -2);
    }

    #[test]
    fn mirror_source_reads_past_edge_for_first_index() {
        assert_eq!(mirror_source(0, 10), None);
        assert_eq!(mirror_source(1, 10), Some(9));
        assert_eq!(mirror_source(9, 10), Some(1));
    }

    #[test]
    fn align_text_offsets() {
        let bbox = TextBox {
            lower_left: (0, 4),
            upper_right: (50, -16),
        };
        assert_eq!(
            align_text(100, 100, bbox, HAnchor::Left, VAnchor::Bottom),
            (100, 100)
        );
        assert_eq!(
            align_text(100, 100, bbox, HAnchor::Right, VAnchor::Top),
            (50, 120)
        );
        assert_eq!(
            align_text(100, 100, bbox, HAnchor::Center, VAnchor::Middle),
            (75, 110)
        );
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn dims() -> impl Strategy<Value = (u32, u32)> {
        (1u32..=4000, 1u32..=4000)
    }

    fn h_anchor() -> impl Strategy<Value = HAnchor> {
        prop_oneof![
            Just(HAnchor::Left),
            Just(HAnchor::Center),
            Just(HAnchor::Right)
        ]
    }

    fn v_anchor() -> impl Strategy<Value = VAnchor> {
        prop_oneof![
            Just(VAnchor::Top),
            Just(VAnchor::Middle),
            Just(VAnchor::Bottom)
        ]
    }

    proptest! {
        /// Ratio output keeps the source aspect (within a pixel) and stays in the box.
        #[test]
        fn prop_ratio_preserves_aspect_inside_box((w, h) in dims(), (ow, oh) in dims()) {
            let c = calculate_coordinates(
                Dimensions::new(w, h),
                &ResizeParams::new(ow, oh)
                    .scale(ScalePolicy::Ratio)
                    .size_bound(SizeBound::Unclamped),
            );
            prop_assert!(c.dest.width <= ow);
            prop_assert!(c.dest.height <= oh);
            // |dw/dh - w/h| < 1px expressed in integers on each edge
            let ideal_h = c.dest.width as f64 * h as f64 / w as f64;
            let ideal_w = c.dest.height as f64 * w as f64 / h as f64;
            prop_assert!(
                (c.dest.height as f64 - ideal_h).abs() <= 1.0
                    || (c.dest.width as f64 - ideal_w).abs() <= 1.0
            );
        }

        /// Crop always fills the requested box exactly.
        #[test]
        fn prop_crop_fills_requested_box(
            (w, h) in dims(),
            (ow, oh) in dims(),
            x in h_anchor(),
            y in v_anchor(),
        ) {
            let c = calculate_coordinates(
                Dimensions::new(w, h),
                &ResizeParams::new(ow, oh)
                    .crop(x, y)
                    .scale(ScalePolicy::Crop)
                    .size_bound(SizeBound::Unclamped),
            );
            prop_assert_eq!(c.dest.width, ow);
            prop_assert_eq!(c.dest.height, oh);
            prop_assert!(c.src.x + c.src.width <= w);
            prop_assert!(c.src.y + c.src.height <= h);
        }

        /// Proportional never stretches.
        #[test]
        fn prop_proportional_dest_equals_src(
            (w, h) in dims(),
            (ow, oh) in dims(),
        ) {
            let c = calculate_coordinates(
                Dimensions::new(w, h),
                &ResizeParams::new(ow, oh).scale(ScalePolicy::Proportional),
            );
            prop_assert_eq!(c.dest.dimensions(), c.src.dimensions());
        }

        /// Edge anchors pin the crop window to the matching edge.
        #[test]
        fn prop_edge_anchors_pin_window((w, h) in dims(), (ow, oh) in dims()) {
            let source = Dimensions::new(w, h);
            let lt = calculate_coordinates(
                source,
                &ResizeParams::new(ow, oh).scale(ScaleSpec::anchored(
                    ScalePolicy::Crop, HAnchor::Left, VAnchor::Top,
                )),
            );
            prop_assert_eq!((lt.src.x, lt.src.y), (0, 0));

            let rb = calculate_coordinates(
                source,
                &ResizeParams::new(ow, oh).scale(ScaleSpec::anchored(
                    ScalePolicy::Crop, HAnchor::Right, VAnchor::Bottom,
                )),
            );
            prop_assert_eq!(rb.src.x + rb.src.width, w);
            prop_assert_eq!(rb.src.y + rb.src.height, h);
        }
    }
}
