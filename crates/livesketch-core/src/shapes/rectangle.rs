//! Rectangle shape.

use super::{ObjectId, Placement, ShapeStyle, ShapeTrait};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// A rectangle. `width`/`height` are the unscaled size; the rendered box
/// also applies the placement scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rectangle {
    #[serde(rename = "objectId")]
    pub(crate) id: ObjectId,
    #[serde(flatten)]
    pub placement: Placement,
    pub width: f64,
    pub height: f64,
    #[serde(flatten)]
    pub style: ShapeStyle,
}

impl Rectangle {
    pub fn new(position: Point, width: f64, height: f64) -> Self {
        Self {
            id: ObjectId::generate(),
            placement: Placement::at(position),
            width,
            height,
            style: ShapeStyle::default(),
        }
    }

    /// Rendered box in canvas coordinates.
    pub fn as_rect(&self) -> Rect {
        self.placement.bounds(self.width, self.height)
    }
}

impl ShapeTrait for Rectangle {
    fn id(&self) -> &ObjectId {
        &self.id
    }

    fn bounds(&self) -> Rect {
        self.as_rect()
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let pad = tolerance + self.style.stroke_width / 2.0;
        let rect = self.as_rect();
        let near = rect.inflate(pad, pad).contains(point);
        match self.style.fill {
            Some(_) => near,
            // Unfilled boxes are only grabbed by their outline
            None => near && !rect.inflate(-pad, -pad).contains(point),
        }
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
