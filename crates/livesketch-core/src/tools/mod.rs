//! Tool selection and interaction state.

use kurbo::Point;
use serde::{Deserialize, Serialize};

use crate::config::BoardConfig;
use crate::shapes::{Circle, Freehand, Line, ObjectId, Rectangle, Shape, Text, Triangle};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ToolKind {
    #[default]
    Select,
    Rectangle,
    Circle,
    Triangle,
    Line,
    Freehand,
    Text,
    /// Images are inserted from an upload, not drawn.
    Image,
}

impl ToolKind {
    /// Whether pressing the pointer with this tool starts a new shape.
    pub fn creates_shape(&self) -> bool {
        !matches!(self, ToolKind::Select | ToolKind::Image)
    }

    /// Whether the tool stays selected after a shape is finished.
    pub fn is_sticky(&self) -> bool {
        matches!(self, ToolKind::Freehand)
    }

    /// The provisional shape placed at `point` when a draw starts.
    pub fn create_shape(&self, point: Point, config: &BoardConfig) -> Option<Shape> {
        let style = config.shape_style();
        let mut shape = match self {
            ToolKind::Rectangle => Shape::Rectangle(Rectangle::new(point, 0.0, 0.0)),
            ToolKind::Circle => Shape::Circle(Circle::new(point, 0.0)),
            ToolKind::Triangle => Shape::Triangle(Triangle::new(point, 0.0, 0.0)),
            ToolKind::Line => Shape::Line(Line::new(point, point)),
            ToolKind::Freehand => Shape::Freehand(Freehand::from_points(vec![point])),
            ToolKind::Text => Shape::Text(
                Text::new(point, Text::PLACEHOLDER)
                    .with_font_size(config.font_size)
                    .with_font_family(config.font_family.clone()),
            ),
            ToolKind::Select | ToolKind::Image => return None,
        };

        *shape.style_mut() = style;
        // Strokes are never filled
        if matches!(self, ToolKind::Line | ToolKind::Freehand) {
            shape.style_mut().fill = None;
        }
        Some(shape)
    }
}

/// What the local user is doing with the pointer.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Interaction {
    #[default]
    Idle,
    /// Stretching a provisional shape that is not in the store yet.
    Drawing { id: ObjectId, origin: Point },
    /// Editing an existing object. `last` is the previous drag point while
    /// the pointer is held down.
    Editing { id: ObjectId, last: Option<Point> },
}

impl Interaction {
    pub fn is_idle(&self) -> bool {
        matches!(self, Interaction::Idle)
    }

    /// The object this interaction holds, if any.
    pub fn target(&self) -> Option<&ObjectId> {
        match self {
            Interaction::Idle => None,
            Interaction::Drawing { id, .. } | Interaction::Editing { id, .. } => Some(id),
        }
    }
}
