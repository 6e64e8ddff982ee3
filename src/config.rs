//! Recipe configuration.
//!
//! A recipe is a TOML file describing what to do with an image: the output
//! settings and an ordered list of operations. It is merged over the stock
//! defaults, so a recipe only needs the keys it wants to change.
//!
//! ## Recipe Format
//!
//! ```toml
//! [output]
//! type = "jpg"              # gif | png | jpg; omit to derive from the files
//! quality = 85              # JPEG quality (0-100)
//!
//! [[operations]]
//! kind = "resize"
//! width = 400
//! height = 300
//! scale = "crop_center_middle"
//!
//! [[operations]]
//! kind = "insert_image"
//! path = "watermark.png"
//! alpha = true
//!
//! [[operations]]
//! kind = "sharpen"
//! ```
//!
//! Operations run in file order. Unknown keys are rejected to catch typos
//! early.

use crate::imaging::{ImageBackend, Operation};
use crate::processor::ImageProcessor;
use crate::types::{ImageType, Quality};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Recipe validation error: {0}")]
    Validation(String),
}

/// A full pipeline description loaded from a recipe file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Recipe {
    pub output: OutputSettings,
    pub operations: Vec<Operation>,
}

/// Output encoding settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSettings {
    /// Explicit output type. An output file extension still wins.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ImageType>,
    pub quality: Quality,
}

impl Recipe {
    /// Validate values serde cannot check on its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output.quality.value() > 100 {
            return Err(ConfigError::Validation(
                "output.quality must be 0-100".into(),
            ));
        }
        if self.output.kind.is_some_and(ImageType::is_generic) {
            return Err(ConfigError::Validation(
                "output.type must be gif, png or jpg".into(),
            ));
        }
        for (i, op) in self.operations.iter().enumerate() {
            match op {
                Operation::Colorize { percent, .. } if *percent > 100 => {
                    return Err(ConfigError::Validation(format!(
                        "operations[{i}]: colorize percent must be 0-100"
                    )));
                }
                Operation::InsertText(params) if !(params.size.is_finite() && params.size > 0.0) => {
                    return Err(ConfigError::Validation(format!(
                        "operations[{i}]: insert_text size must be positive"
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Configure a processor with this recipe's output settings and queue.
    ///
    /// The recipe is validated first; an invalid one leaves the processor
    /// untouched.
    pub fn apply_to<B: ImageBackend>(
        &self,
        processor: &mut ImageProcessor<B>,
    ) -> Result<(), ConfigError> {
        self.validate()?;
        if let Some(kind) = self.output.kind {
            processor
                .set_output_type(&kind.to_string())
                .map_err(|e| ConfigError::Validation(format!("output.type: {e}")))?;
        }
        processor.set_output_quality(self.output.quality.value());
        processor.extend(self.operations.iter().cloned());
        Ok(())
    }
}

/// Stock defaults as a TOML value, the base every recipe is merged onto.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(Recipe::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely, so an
///   `operations` array is never concatenated.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a recipe file as a raw TOML value.
pub fn load_raw_recipe(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_recipe(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<Recipe, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let recipe: Recipe = merged.try_into()?;
    recipe.validate()?;
    Ok(recipe)
}

/// Load a recipe file over the stock defaults.
pub fn load_recipe(path: &Path) -> Result<Recipe, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_recipe(path)?;
    resolve_recipe(base, Some(overlay))
}

/// Returns a commented stock recipe listing every operation.
///
/// Used by the `gen-recipe` CLI command.
pub fn stock_recipe_toml() -> &'static str {
    r##"# imgpipe recipe
# ==============
# Output settings plus an ordered list of operations. Every key is optional;
# an empty recipe copies the input through unchanged.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# gif, png or jpg. When omitted, the output file extension decides, then the
# input type; data of unknown type is written as jpg.
# type = "jpg"

# JPEG quality, 0-100. At 100 with no operations and an unchanged type the
# input bytes are copied through without decoding.
quality = 100

# ---------------------------------------------------------------------------
# Operations (run in order)
# ---------------------------------------------------------------------------
# Resize. A zero width or height is derived from the other edge.
#   scale: ratio | crop | prop | resize, or crop_<x>_<y> / prop_<x>_<y>
#          with x = left|center|right and y = top|middle|bottom
#   size_bound: smaller (never upscale) | bigger (never downscale) | smaller_bigger
#
# [[operations]]
# kind = "resize"
# width = 800
# height = 600
# scale = "ratio"
# size_bound = "smaller"

# Watermark. Skipped when the file is missing or the canvas is too small.
#
# [[operations]]
# kind = "insert_image"
# path = "watermark.png"
# alpha = true
# pos_x = "right"       # left | center | right
# pos_y = "bottom"      # top | middle | bottom
# min_width = 0
# min_height = 0

# Text. angle is accepted but text is always drawn horizontally.
#
# [[operations]]
# kind = "insert_text"
# text = "(c) 2026"
# font = "fonts/DejaVuSans.ttf"
# size = 14.0
# x = 10
# y = 10
# color = [255, 255, 255]
# align = "left"
# valign = "bottom"

# Cut out a region. Zero width/height means "to the edge".
#
# [[operations]]
# kind = "extract"
# x = 0
# y = 0
# width = 0
# height = 0

# [[operations]]
# kind = "mirror"
# axis = "horizontal"   # horizontal | vertical

# Counter-clockwise; 90, 180 or 270.
# [[operations]]
# kind = "rotate"
# degrees = 90

# [[operations]]
# kind = "greyscale"

# [[operations]]
# kind = "colorize"
# color = [112, 66, 20]
# percent = 30

# [[operations]]
# kind = "sharpen"

# [[operations]]
# kind = "blur"
"##
}
