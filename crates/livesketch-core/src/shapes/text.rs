//! Text shape.

use super::{ObjectId, Placement, ShapeStyle, ShapeTrait};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Font weight options, serialized as CSS numeric weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FontWeight {
    /// Regular weight (default).
    #[default]
    #[serde(rename = "400")]
    Normal,
    #[serde(rename = "600")]
    Semibold,
    #[serde(rename = "800")]
    Bold,
}

impl FontWeight {
    /// Parse a CSS weight (`"400"`, `"bold"`, ...).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "400" | "normal" => Some(FontWeight::Normal),
            "600" | "semibold" => Some(FontWeight::Semibold),
            "800" | "bold" => Some(FontWeight::Bold),
            _ => None,
        }
    }

    pub fn css_value(&self) -> &'static str {
        match self {
            FontWeight::Normal => "400",
            FontWeight::Semibold => "600",
            FontWeight::Bold => "800",
        }
    }

    fn char_width_factor(&self) -> f64 {
        match self {
            FontWeight::Normal => 0.52,
            FontWeight::Semibold => 0.55,
            FontWeight::Bold => 0.58,
        }
    }
}

/// An editable text block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Text {
    #[serde(rename = "objectId")]
    pub(crate) id: ObjectId,
    #[serde(flatten)]
    pub placement: Placement,
    /// The text content.
    pub text: String,
    /// Font size in pixels.
    pub font_size: f64,
    pub font_family: String,
    #[serde(default)]
    pub font_weight: FontWeight,
    #[serde(flatten)]
    pub style: ShapeStyle,
}

impl Text {
    pub const DEFAULT_FONT_SIZE: f64 = 36.0;
    pub const DEFAULT_FONT_FAMILY: &'static str = "Helvetica";
    /// Placeholder content for freshly placed text.
    pub const PLACEHOLDER: &'static str = "Tap to Type";

    /// Create a new text shape.
    pub fn new(position: Point, content: impl Into<String>) -> Self {
        Self {
            id: ObjectId::generate(),
            placement: Placement::at(position),
            text: content.into(),
            font_size: Self::DEFAULT_FONT_SIZE,
            font_family: Self::DEFAULT_FONT_FAMILY.to_string(),
            font_weight: FontWeight::default(),
            style: ShapeStyle::default(),
        }
    }

    /// Create a new text shape with font size.
    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = size;
        self
    }

    /// Set the font family.
    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }

    /// Set the font weight.
    pub fn with_font_weight(mut self, weight: FontWeight) -> Self {
        self.font_weight = weight;
        self
    }

    /// Approximate unscaled width from the widest line.
    fn approximate_width(&self) -> f64 {
        let max_line_len = self
            .text
            .lines()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);
        (max_line_len as f64 * self.font_size * self.font_weight.char_width_factor()).max(20.0)
    }

    /// Approximate unscaled height; line height is 1.16 * font size.
    fn approximate_height(&self) -> f64 {
        let line_count = self.text.lines().count().max(1);
        let line_count = if self.text.ends_with('\n') {
            line_count + 1
        } else {
            line_count
        };
        line_count as f64 * self.font_size * 1.16
    }
}

impl ShapeTrait for Text {
    fn id(&self) -> &ObjectId {
        &self.id
    }

    fn bounds(&self) -> Rect {
        self.placement
            .bounds(self.approximate_width(), self.approximate_height())
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.bounds().inflate(tolerance, tolerance).contains(point)
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.placement.translate(dx, dy);
    }
}
