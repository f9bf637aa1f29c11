//! Freehand path.

use super::{ObjectId, ShapeStyle, ShapeTrait, point_to_segment_dist, points_bounds};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// A pen stroke, kept as the ordered points the pointer passed through.
/// Paths are never filled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Freehand {
    #[serde(rename = "objectId")]
    pub(crate) id: ObjectId,
    pub points: Vec<Point>,
    #[serde(flatten)]
    pub style: ShapeStyle,
}

impl Freehand {
    pub fn from_points(points: Vec<Point>) -> Self {
        Self {
            id: ObjectId::generate(),
            points,
            style: ShapeStyle {
                fill: None,
                ..ShapeStyle::default()
            },
        }
    }

    /// Extend the stroke to `point`. Repeats of the last point are dropped.
    pub fn add_point(&mut self, point: Point) {
        if self.points.last() != Some(&point) {
            self.points.push(point);
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Drop points that deviate less than `tolerance` from the simplified
    /// stroke (Douglas-Peucker). Endpoints always survive.
    pub fn simplify(&mut self, tolerance: f64) {
        let count = self.points.len();
        if count < 3 {
            return;
        }

        let mut keep = vec![false; count];
        keep[0] = true;
        keep[count - 1] = true;
        let mut spans = vec![(0, count - 1)];

        while let Some((start, end)) = spans.pop() {
            let (a, b) = (self.points[start], self.points[end]);
            let farthest = (start + 1..end)
                .map(|i| (i, point_to_segment_dist(self.points[i], a, b)))
                .max_by(|x, y| x.1.total_cmp(&y.1));

            if let Some((index, dist)) = farthest {
                if dist > tolerance {
                    keep[index] = true;
                    spans.push((start, index));
                    spans.push((index, end));
                }
            }
        }

        let mut kept = keep.into_iter();
        self.points.retain(|_| kept.next().unwrap_or(false));
    }
}

impl ShapeTrait for Freehand {
    fn id(&self) -> &ObjectId {
        &self.id
    }

    fn bounds(&self) -> Rect {
        points_bounds(&self.points)
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let reach = tolerance + self.style.stroke_width / 2.0;
        match self.points.as_slice() {
            [] => false,
            [dot] => dot.distance(point) <= reach,
            points => points
                .windows(2)
                .any(|pair| point_to_segment_dist(point, pair[0], pair[1]) <= reach),
        }
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        let offset = kurbo::Vec2::new(dx, dy);
        for point in &mut self.points {
            *point += offset;
        }
    }
}
