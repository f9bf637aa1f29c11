//! Straight line shape.

use super::{ObjectId, ShapeStyle, ShapeTrait, point_to_segment_dist};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// A straight line segment between two endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    #[serde(rename = "objectId")]
    pub(crate) id: ObjectId,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    #[serde(flatten)]
    pub style: ShapeStyle,
}

impl Line {
    /// Create a new line.
    pub fn new(start: Point, end: Point) -> Self {
        let style = ShapeStyle {
            fill: None,
            ..ShapeStyle::default()
        };
        Self {
            id: ObjectId::generate(),
            x1: start.x,
            y1: start.y,
            x2: end.x,
            y2: end.y,
            style,
        }
    }

    pub fn start(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    pub fn end(&self) -> Point {
        Point::new(self.x2, self.y2)
    }

    pub fn set_end(&mut self, end: Point) {
        self.x2 = end.x;
        self.y2 = end.y;
    }

    /// Get the length of the line.
    pub fn length(&self) -> f64 {
        let dx = self.x2 - self.x1;
        let dy = self.y2 - self.y1;
        (dx * dx + dy * dy).sqrt()
    }

    pub(crate) fn scale_x(&mut self, factor: f64) {
        let x0 = self.x1.min(self.x2);
        self.x1 = x0 + (self.x1 - x0) * factor;
        self.x2 = x0 + (self.x2 - x0) * factor;
    }

    pub(crate) fn scale_y(&mut self, factor: f64) {
        let y0 = self.y1.min(self.y2);
        self.y1 = y0 + (self.y1 - y0) * factor;
        self.y2 = y0 + (self.y2 - y0) * factor;
    }
}

impl ShapeTrait for Line {
    fn id(&self) -> &ObjectId {
        &self.id
    }

    fn bounds(&self) -> Rect {
        Rect::from_points(self.start(), self.end())
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        point_to_segment_dist(point, self.start(), self.end()) <= tolerance + self.style.stroke_width / 2.0
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.x1 += dx;
        self.y1 += dy;
        self.x2 += dx;
        self.y2 += dy;
    }
}
