//! Board configuration.
//!
//! Every field has a default, so a config file only needs to name what it
//! overrides:
//!
//! ```json
//! { "pasteOffset": 20.0, "undo": { "maxSteps": 50 } }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shapes::{SerializableColor, ShapeStyle, Text};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Undo history settings for the shared store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UndoConfig {
    pub max_steps: usize,
    /// Local commits closer together than this are merged into one step.
    pub merge_interval_ms: i64,
}

impl Default for UndoConfig {
    fn default() -> Self {
        Self {
            max_steps: 100,
            merge_interval_ms: 300,
        }
    }
}

/// Settings for a whiteboard session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BoardConfig {
    /// Fill for newly drawn shapes (`None` = unfilled).
    pub fill: Option<SerializableColor>,
    pub stroke: SerializableColor,
    pub stroke_width: f64,
    pub font_size: f64,
    pub font_family: String,
    /// Offset applied to pasted copies, in canvas units.
    pub paste_offset: f64,
    /// Pointer slop for hit testing.
    pub hit_tolerance: f64,
    /// Douglas-Peucker tolerance applied to finished freehand paths.
    pub freehand_tolerance: f64,
    /// Inserted images are scaled down to fit this box.
    pub max_image_size: f64,
    pub undo: UndoConfig,
}

impl Default for BoardConfig {
    fn default() -> Self {
        let style = ShapeStyle::default();
        Self {
            fill: style.fill,
            stroke: style.stroke,
            stroke_width: style.stroke_width,
            font_size: Text::DEFAULT_FONT_SIZE,
            font_family: Text::DEFAULT_FONT_FAMILY.to_string(),
            paste_offset: 10.0,
            hit_tolerance: 4.0,
            freehand_tolerance: 0.5,
            max_image_size: 200.0,
            undo: UndoConfig::default(),
        }
    }
}

impl BoardConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::debug!("Loaded board config from {}", path.display());
        Ok(config)
    }

    /// Style applied to newly drawn shapes.
    pub fn shape_style(&self) -> ShapeStyle {
        ShapeStyle {
            fill: self.fill,
            stroke: self.stroke,
            stroke_width: self.stroke_width,
            opacity: 1.0,
        }
    }
}
