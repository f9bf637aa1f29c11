//! Shape definitions for the whiteboard.

mod circle;
mod freehand;
mod image;
mod line;
mod rectangle;
mod text;
mod triangle;

pub use circle::Circle;
pub use freehand::Freehand;
pub use image::{Image, ImageFormat};
pub use line::Line;
pub use rectangle::Rectangle;
pub use text::{FontWeight, Text};
pub use triangle::Triangle;

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable identity shared by a live canvas object and its shared-store entry.
///
/// Assigned once at creation and never reassigned; the only join key between
/// the local scene graph and the shared document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    /// Generate a fresh, collision-resistant identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ObjectId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ObjectId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Serializable color representation (RGBA8), encoded as `#rrggbb` or `#rrggbbaa`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a CSS-style hex color (`#rgb`, `#rrggbb` or `#rrggbbaa`).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().strip_prefix('#')?;
        if !digits.is_ascii() {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match digits.len() {
            3 => {
                let expand = |i: usize| channel(&digits[i..i + 1]).map(|v| v * 17);
                Some(Self::new(expand(0)?, expand(1)?, expand(2)?, 255))
            }
            6 => Some(Self::new(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
                255,
            )),
            8 => Some(Self::new(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
                channel(&digits[6..8])?,
            )),
            _ => None,
        }
    }

    /// Format as lowercase hex; the alpha byte is omitted when opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl TryFrom<String> for SerializableColor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value).ok_or_else(|| format!("invalid color: {value}"))
    }
}

impl From<SerializableColor> for String {
    fn from(color: SerializableColor) -> Self {
        color.to_hex()
    }
}

/// Style properties for shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeStyle {
    /// Fill color (None = no fill).
    #[serde(default)]
    pub fill: Option<SerializableColor>,
    /// Stroke color.
    pub stroke: SerializableColor,
    /// Stroke width.
    pub stroke_width: f64,
    /// Overall opacity (0.0 = fully transparent, 1.0 = fully opaque).
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

fn default_opacity() -> f64 {
    1.0
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            fill: Some(SerializableColor::new(0xaa, 0xbb, 0xcc, 255)),
            stroke: SerializableColor::new(0xaa, 0xbb, 0xcc, 255),
            stroke_width: 1.0,
            opacity: 1.0,
        }
    }
}

fn unit_scale() -> f64 {
    1.0
}

/// Position, rotation and scale of a box-shaped object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    /// Left edge in canvas coordinates.
    pub left: f64,
    /// Top edge in canvas coordinates.
    pub top: f64,
    /// Clockwise rotation in degrees.
    #[serde(default)]
    pub angle: f64,
    #[serde(default = "unit_scale")]
    pub scale_x: f64,
    #[serde(default = "unit_scale")]
    pub scale_y: f64,
}

impl Placement {
    pub fn at(point: Point) -> Self {
        Self {
            left: point.x,
            top: point.y,
            angle: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    /// Bounding box of an unrotated `width` x `height` box under this placement.
    pub fn bounds(&self, width: f64, height: f64) -> Rect {
        Rect::new(
            self.left,
            self.top,
            self.left + width * self.scale_x,
            self.top + height * self.scale_y,
        )
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.left += dx;
        self.top += dy;
    }

    /// Stretch to the box spanned by two drag corners.
    fn span(&mut self, origin: Point, pointer: Point) -> (f64, f64) {
        self.left = origin.x.min(pointer.x);
        self.top = origin.y.min(pointer.y);
        ((pointer.x - origin.x).abs(), (pointer.y - origin.y).abs())
    }
}

/// Tag naming a shape type in a serialized record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Triangle,
    Line,
    Freehand,
    Text,
    Image,
}

impl ShapeKind {
    pub fn tag(&self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Circle => "circle",
            ShapeKind::Triangle => "triangle",
            ShapeKind::Line => "line",
            ShapeKind::Freehand => "freehand-path",
            ShapeKind::Text => "text",
            ShapeKind::Image => "image",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "rectangle" => Some(ShapeKind::Rectangle),
            "circle" => Some(ShapeKind::Circle),
            "triangle" => Some(ShapeKind::Triangle),
            "line" => Some(ShapeKind::Line),
            "freehand-path" => Some(ShapeKind::Freehand),
            "text" => Some(ShapeKind::Text),
            "image" => Some(ShapeKind::Image),
            _ => None,
        }
    }
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = kurbo::Vec2::new(b.x - a.x, b.y - a.y);
    let pv = kurbo::Vec2::new(point.x - a.x, point.y - a.y);
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = Point::new(a.x + t * seg.x, a.y + t * seg.y);
    ((point.x - proj.x).powi(2) + (point.y - proj.y).powi(2)).sqrt()
}

/// Bounding box of a point sequence, `Rect::ZERO` when empty.
pub(crate) fn points_bounds(points: &[Point]) -> Rect {
    let Some(first) = points.first() else {
        return Rect::ZERO;
    };
    points
        .iter()
        .skip(1)
        .fold(Rect::from_points(*first, *first), |acc, p| acc.union_pt(*p))
}

/// Scale a point sequence horizontally about its left edge.
pub(crate) fn scale_points_x(points: &mut [Point], factor: f64) {
    let x0 = points_bounds(points).x0;
    for p in points.iter_mut() {
        p.x = x0 + (p.x - x0) * factor;
    }
}

/// Scale a point sequence vertically about its top edge.
pub(crate) fn scale_points_y(points: &mut [Point], factor: f64) {
    let y0 = points_bounds(points).y0;
    for p in points.iter_mut() {
        p.y = y0 + (p.y - y0) * factor;
    }
}

/// Common trait for all shapes.
pub trait ShapeTrait {
    /// Get the unique identifier.
    fn id(&self) -> &ObjectId;

    /// Get the bounding box in canvas coordinates.
    fn bounds(&self) -> Rect;

    /// Check if a point (in canvas coordinates) hits this shape.
    fn hit_test(&self, point: Point, tolerance: f64) -> bool;

    /// Get the style.
    fn style(&self) -> &ShapeStyle;

    /// Get mutable style.
    fn style_mut(&mut self) -> &mut ShapeStyle;

    /// Move by an offset.
    fn translate(&mut self, dx: f64, dy: f64);
}

/// Enum wrapper for all shape types.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rectangle(Rectangle),
    Circle(Circle),
    Triangle(Triangle),
    Line(Line),
    Freehand(Freehand),
    Text(Text),
    Image(Image),
}

impl Shape {
    fn as_trait(&self) -> &dyn ShapeTrait {
        match self {
            Shape::Rectangle(s) => s,
            Shape::Circle(s) => s,
            Shape::Triangle(s) => s,
            Shape::Line(s) => s,
            Shape::Freehand(s) => s,
            Shape::Text(s) => s,
            Shape::Image(s) => s,
        }
    }

    fn as_trait_mut(&mut self) -> &mut dyn ShapeTrait {
        match self {
            Shape::Rectangle(s) => s,
            Shape::Circle(s) => s,
            Shape::Triangle(s) => s,
            Shape::Line(s) => s,
            Shape::Freehand(s) => s,
            Shape::Text(s) => s,
            Shape::Image(s) => s,
        }
    }

    pub fn id(&self) -> &ObjectId {
        self.as_trait().id()
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Rectangle(_) => ShapeKind::Rectangle,
            Shape::Circle(_) => ShapeKind::Circle,
            Shape::Triangle(_) => ShapeKind::Triangle,
            Shape::Line(_) => ShapeKind::Line,
            Shape::Freehand(_) => ShapeKind::Freehand,
            Shape::Text(_) => ShapeKind::Text,
            Shape::Image(_) => ShapeKind::Image,
        }
    }

    pub fn bounds(&self) -> Rect {
        self.as_trait().bounds()
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.as_trait().hit_test(point, tolerance)
    }

    pub fn style(&self) -> &ShapeStyle {
        self.as_trait().style()
    }

    pub fn style_mut(&mut self) -> &mut ShapeStyle {
        self.as_trait_mut().style_mut()
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.as_trait_mut().translate(dx, dy);
    }

    /// Stretch a provisional shape between the drag origin and the pointer.
    ///
    /// Text and images keep their size; freehand paths append the pointer.
    pub fn resize_from_drag(&mut self, origin: Point, pointer: Point) {
        match self {
            Shape::Rectangle(s) => {
                let (w, h) = s.placement.span(origin, pointer);
                s.width = w;
                s.height = h;
            }
            Shape::Triangle(s) => {
                let (w, h) = s.placement.span(origin, pointer);
                s.width = w;
                s.height = h;
            }
            Shape::Circle(s) => {
                let (w, h) = s.placement.span(origin, pointer);
                s.radius = w.min(h) / 2.0;
            }
            Shape::Line(s) => s.set_end(pointer),
            Shape::Freehand(s) => s.add_point(pointer),
            Shape::Text(_) | Shape::Image(_) => {}
        }
    }

    /// Rendered width including scale.
    pub fn scaled_width(&self) -> f64 {
        self.bounds().width()
    }

    /// Rendered height including scale.
    pub fn scaled_height(&self) -> f64 {
        self.bounds().height()
    }

    /// Rescale so that the rendered width becomes `width`.
    /// Degenerate (zero-width) shapes are left untouched.
    pub fn scale_to_width(&mut self, width: f64) {
        let current = self.scaled_width();
        if current <= f64::EPSILON {
            return;
        }
        let factor = width / current;
        match self {
            Shape::Rectangle(s) => s.placement.scale_x *= factor,
            Shape::Circle(s) => s.placement.scale_x *= factor,
            Shape::Triangle(s) => s.placement.scale_x *= factor,
            Shape::Text(s) => s.placement.scale_x *= factor,
            Shape::Image(s) => s.placement.scale_x *= factor,
            Shape::Line(s) => s.scale_x(factor),
            Shape::Freehand(s) => scale_points_x(&mut s.points, factor),
        }
    }

    /// Rescale so that the rendered height becomes `height`.
    pub fn scale_to_height(&mut self, height: f64) {
        let current = self.scaled_height();
        if current <= f64::EPSILON {
            return;
        }
        let factor = height / current;
        match self {
            Shape::Rectangle(s) => s.placement.scale_y *= factor,
            Shape::Circle(s) => s.placement.scale_y *= factor,
            Shape::Triangle(s) => s.placement.scale_y *= factor,
            Shape::Text(s) => s.placement.scale_y *= factor,
            Shape::Image(s) => s.placement.scale_y *= factor,
            Shape::Line(s) => s.scale_y(factor),
            Shape::Freehand(s) => scale_points_y(&mut s.points, factor),
        }
    }

    /// Clone this shape under a fresh identifier (used for paste).
    pub fn with_new_id(&self) -> Shape {
        let mut copy = self.clone();
        let id = ObjectId::generate();
        match &mut copy {
            Shape::Rectangle(s) => s.id = id,
            Shape::Circle(s) => s.id = id,
            Shape::Triangle(s) => s.id = id,
            Shape::Line(s) => s.id = id,
            Shape::Freehand(s) => s.id = id,
            Shape::Text(s) => s.id = id,
            Shape::Image(s) => s.id = id,
        }
        copy
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Shape::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut Text> {
        match self {
            Shape::Text(t) => Some(t),
            _ => None,
        }
    }
}
