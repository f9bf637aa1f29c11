//! Triangle shape.

use super::{ObjectId, Placement, ShapeStyle, ShapeTrait, point_to_segment_dist};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// An isosceles triangle with its apex at the top-center of its box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Triangle {
    #[serde(rename = "objectId")]
    pub(crate) id: ObjectId,
    #[serde(flatten)]
    pub placement: Placement,
    pub width: f64,
    pub height: f64,
    #[serde(flatten)]
    pub style: ShapeStyle,
}

impl Triangle {
    pub fn new(position: Point, width: f64, height: f64) -> Self {
        Self {
            id: ObjectId::generate(),
            placement: Placement::at(position),
            width,
            height,
            style: ShapeStyle::default(),
        }
    }

    /// Apex, bottom-right and bottom-left corners in canvas coordinates.
    pub fn vertices(&self) -> [Point; 3] {
        let b = self.bounds();
        [
            Point::new(b.center().x, b.y0),
            Point::new(b.x1, b.y1),
            Point::new(b.x0, b.y1),
        ]
    }
}

impl ShapeTrait for Triangle {
    fn id(&self) -> &ObjectId {
        &self.id
    }

    fn bounds(&self) -> Rect {
        self.placement.bounds(self.width, self.height)
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let [a, b, c] = self.vertices();
        let cross = |o: Point, p: Point, q: Point| (p.x - o.x) * (q.y - o.y) - (p.y - o.y) * (q.x - o.x);
        let d1 = cross(a, b, point);
        let d2 = cross(b, c, point);
        let d3 = cross(c, a, point);
        let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
        let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
        if !(has_neg && has_pos) {
            return true;
        }
        let edge = point_to_segment_dist(point, a, b)
            .min(point_to_segment_dist(point, b, c))
            .min(point_to_segment_dist(point, c, a));
        edge <= tolerance + self.style.stroke_width / 2.0
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertices() {
        let tri = Triangle::new(Point::new(0.0, 0.0), 100.0, 50.0);
        let [apex, right, left] = tri.vertices();
        assert_eq!(apex, Point::new(50.0, 0.0));
        assert_eq!(right, Point::new(100.0, 50.0));
        assert_eq!(left, Point::new(0.0, 50.0));
    }

    #[test]
    fn test_hit_test() {
        let tri = Triangle::new(Point::new(0.0, 0.0), 100.0, 100.0);
        assert!(tri.hit_test(Point::new(50.0, 80.0), 0.0));
        // Top-left corner of the box lies outside the triangle
        assert!(!tri.hit_test(Point::new(2.0, 2.0), 0.0));
        assert!(tri.hit_test(Point::new(2.0, 2.0), 50.0));
    }
}
