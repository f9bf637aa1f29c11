//! Circle shape.

use super::{ObjectId, Placement, ShapeStyle, ShapeTrait};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// A circle positioned by the top-left corner of its bounding box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Circle {
    #[serde(rename = "objectId")]
    pub(crate) id: ObjectId,
    #[serde(flatten)]
    pub placement: Placement,
    /// Unscaled radius.
    pub radius: f64,
    #[serde(flatten)]
    pub style: ShapeStyle,
}

impl Circle {
    /// Create a circle whose bounding box starts at `position`.
    pub fn new(position: Point, radius: f64) -> Self {
        Self {
            id: ObjectId::generate(),
            placement: Placement::at(position),
            radius,
            style: ShapeStyle::default(),
        }
    }

    pub fn center(&self) -> Point {
        self.bounds().center()
    }
}

impl ShapeTrait for Circle {
    fn id(&self) -> &ObjectId {
        &self.id
    }

    fn bounds(&self) -> Rect {
        let diameter = self.radius * 2.0;
        self.placement.bounds(diameter, diameter)
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let bounds = self.bounds();
        let rx = bounds.width() / 2.0 + tolerance;
        let ry = bounds.height() / 2.0 + tolerance;
        if rx <= 0.0 || ry <= 0.0 {
            return false;
        }
        let c = bounds.center();
        let nx = (point.x - c.x) / rx;
        let ny = (point.y - c.y) / ry;
        nx * nx + ny * ny <= 1.0
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
