//! Attribute panel for the active object.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shapes::{FontWeight, SerializableColor, Shape, ShapeKind};

/// Attribute editing errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AttributeError {
    #[error("Unknown attribute: {0}")]
    UnknownProperty(String),
    #[error("Invalid value for {property}: {value:?}")]
    InvalidValue { property: &'static str, value: String },
    #[error("{property} does not apply to {kind:?}")]
    NotApplicable { property: &'static str, kind: ShapeKind },
}

/// Display values of the panel fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementAttributes {
    pub width: String,
    pub height: String,
    pub font_size: String,
    pub font_family: String,
    pub font_weight: String,
    pub fill: String,
    pub stroke: String,
}

impl Default for ElementAttributes {
    fn default() -> Self {
        Self {
            width: String::new(),
            height: String::new(),
            font_size: String::new(),
            font_family: String::new(),
            font_weight: String::new(),
            fill: "#aabbcc".to_string(),
            stroke: "#aabbcc".to_string(),
        }
    }
}

impl ElementAttributes {
    /// Read the panel values off a shape. Sizes are whole canvas units.
    pub fn from_shape(shape: &Shape) -> Self {
        let style = shape.style();
        let text = shape.as_text();
        Self {
            width: format!("{:.0}", shape.scaled_width()),
            height: format!("{:.0}", shape.scaled_height()),
            font_size: text.map(|t| format!("{}", t.font_size)).unwrap_or_default(),
            font_family: text.map(|t| t.font_family.clone()).unwrap_or_default(),
            font_weight: text
                .map(|t| t.font_weight.css_value().to_string())
                .unwrap_or_default(),
            fill: style.fill.map(|c| c.to_hex()).unwrap_or_default(),
            stroke: style.stroke.to_hex(),
        }
    }

    /// Record a raw field edit, as typed into the panel.
    pub fn set(&mut self, property: &str, value: &str) -> Result<(), AttributeError> {
        let field = match property {
            "width" => &mut self.width,
            "height" => &mut self.height,
            "fontSize" => &mut self.font_size,
            "fontFamily" => &mut self.font_family,
            "fontWeight" => &mut self.font_weight,
            "fill" => &mut self.fill,
            "stroke" => &mut self.stroke,
            other => return Err(AttributeError::UnknownProperty(other.to_string())),
        };
        *field = value.to_string();
        Ok(())
    }
}

/// A parsed attribute edit.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeEdit {
    Width(f64),
    Height(f64),
    /// `None` removes the fill.
    Fill(Option<SerializableColor>),
    Stroke(SerializableColor),
    FontSize(f64),
    FontFamily(String),
    FontWeight(FontWeight),
}

fn parse_size(property: &'static str, value: &str) -> Result<f64, AttributeError> {
    match value.trim().parse::<f64>() {
        Ok(size) if size.is_finite() && size > 0.0 => Ok(size),
        _ => Err(AttributeError::InvalidValue {
            property,
            value: value.to_string(),
        }),
    }
}

fn parse_color(property: &'static str, value: &str) -> Result<SerializableColor, AttributeError> {
    SerializableColor::from_hex(value.trim()).ok_or_else(|| AttributeError::InvalidValue {
        property,
        value: value.to_string(),
    })
}

impl AttributeEdit {
    /// Parse a panel edit: `property` is the record attribute name.
    pub fn parse(property: &str, value: &str) -> Result<Self, AttributeError> {
        let edit = match property {
            "width" => AttributeEdit::Width(parse_size("width", value)?),
            "height" => AttributeEdit::Height(parse_size("height", value)?),
            "fill" => match value.trim() {
                "" | "none" | "transparent" => AttributeEdit::Fill(None),
                hex => AttributeEdit::Fill(Some(parse_color("fill", hex)?)),
            },
            "stroke" => AttributeEdit::Stroke(parse_color("stroke", value)?),
            "fontSize" => AttributeEdit::FontSize(parse_size("fontSize", value)?),
            "fontFamily" => {
                let family = value.trim();
                if family.is_empty() {
                    return Err(AttributeError::InvalidValue {
                        property: "fontFamily",
                        value: value.to_string(),
                    });
                }
                AttributeEdit::FontFamily(family.to_string())
            }
            "fontWeight" => AttributeEdit::FontWeight(FontWeight::parse(value).ok_or_else(|| {
                AttributeError::InvalidValue {
                    property: "fontWeight",
                    value: value.to_string(),
                }
            })?),
            other => return Err(AttributeError::UnknownProperty(other.to_string())),
        };
        Ok(edit)
    }

    fn property(&self) -> &'static str {
        match self {
            AttributeEdit::Width(_) => "width",
            AttributeEdit::Height(_) => "height",
            AttributeEdit::Fill(_) => "fill",
            AttributeEdit::Stroke(_) => "stroke",
            AttributeEdit::FontSize(_) => "fontSize",
            AttributeEdit::FontFamily(_) => "fontFamily",
            AttributeEdit::FontWeight(_) => "fontWeight",
        }
    }

    /// Apply to a shape. Returns whether anything changed.
    pub fn apply(&self, shape: &mut Shape) -> Result<bool, AttributeError> {
        let before = shape.clone();
        match self {
            AttributeEdit::Width(width) => shape.scale_to_width(*width),
            AttributeEdit::Height(height) => shape.scale_to_height(*height),
            AttributeEdit::Fill(fill) => shape.style_mut().fill = *fill,
            AttributeEdit::Stroke(stroke) => shape.style_mut().stroke = *stroke,
            AttributeEdit::FontSize(_) | AttributeEdit::FontFamily(_) | AttributeEdit::FontWeight(_) => {
                let kind = shape.kind();
                let text = shape.as_text_mut().ok_or(AttributeError::NotApplicable {
                    property: self.property(),
                    kind,
                })?;
                match self {
                    AttributeEdit::FontSize(size) => text.font_size = *size,
                    AttributeEdit::FontFamily(family) => text.font_family = family.clone(),
                    AttributeEdit::FontWeight(weight) => text.font_weight = *weight,
                    _ => {}
                }
            }
        }
        Ok(*shape != before)
    }
}
