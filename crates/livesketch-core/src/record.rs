//! Serialized shape snapshots exchanged through the shared store.
//!
//! A [`ShapeRecord`] is the flat attribute bag stored under an object's id:
//!
//! ```text
//! { "objectId": "r1", "type": "rectangle", "left": 10.0, "top": 10.0,
//!   "width": 90.0, "height": 90.0, "fill": "#aabbcc", ... }
//! ```
//!
//! Records of a type this client does not know are kept as-is; converting
//! them to a [`Shape`] fails with [`RecordError::UnknownType`] so callers can
//! skip them without touching the stored entry.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::shapes::{Circle, Freehand, Image, Line, ObjectId, Rectangle, Shape, ShapeKind, Text, Triangle};

const KEY_OBJECT_ID: &str = "objectId";

/// Errors converting between records and shapes.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Unknown shape type: {0}")]
    UnknownType(String),
    #[error("Malformed {kind} record: {source}")]
    Malformed {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("Record payload is not valid JSON: {0}")]
    InvalidPayload(#[source] serde_json::Error),
    #[error("Shape did not serialize to an object")]
    NotAnObject,
}

/// Serialized attribute snapshot of one drawable object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeRecord {
    #[serde(rename = "objectId")]
    pub object_id: ObjectId,
    #[serde(rename = "type")]
    pub shape_type: String,
    /// Type-dependent geometric and style attributes.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl ShapeRecord {
    /// Serialize a live shape.
    pub fn from_shape(shape: &Shape) -> Result<Self, RecordError> {
        let value = match shape {
            Shape::Rectangle(s) => serde_json::to_value(s),
            Shape::Circle(s) => serde_json::to_value(s),
            Shape::Triangle(s) => serde_json::to_value(s),
            Shape::Line(s) => serde_json::to_value(s),
            Shape::Freehand(s) => serde_json::to_value(s),
            Shape::Text(s) => serde_json::to_value(s),
            Shape::Image(s) => serde_json::to_value(s),
        }
        .map_err(|source| RecordError::Malformed {
            kind: shape.kind().tag(),
            source,
        })?;

        let Value::Object(mut attributes) = value else {
            return Err(RecordError::NotAnObject);
        };
        attributes.remove(KEY_OBJECT_ID);

        Ok(Self {
            object_id: shape.id().clone(),
            shape_type: shape.kind().tag().to_string(),
            attributes,
        })
    }

    /// The shape kind, if this client knows the record's type.
    pub fn kind(&self) -> Option<ShapeKind> {
        ShapeKind::from_tag(&self.shape_type)
    }

    /// Rebuild the live shape described by this record.
    pub fn to_shape(&self) -> Result<Shape, RecordError> {
        let kind = self
            .kind()
            .ok_or_else(|| RecordError::UnknownType(self.shape_type.clone()))?;

        let shape = match kind {
            ShapeKind::Rectangle => Shape::Rectangle(self.decode::<Rectangle>(kind)?),
            ShapeKind::Circle => Shape::Circle(self.decode::<Circle>(kind)?),
            ShapeKind::Triangle => Shape::Triangle(self.decode::<Triangle>(kind)?),
            ShapeKind::Line => Shape::Line(self.decode::<Line>(kind)?),
            ShapeKind::Freehand => Shape::Freehand(self.decode::<Freehand>(kind)?),
            ShapeKind::Text => Shape::Text(self.decode::<Text>(kind)?),
            ShapeKind::Image => Shape::Image(self.decode::<Image>(kind)?),
        };
        Ok(shape)
    }

    fn decode<T: DeserializeOwned>(&self, kind: ShapeKind) -> Result<T, RecordError> {
        let mut attributes = self.attributes.clone();
        attributes.insert(
            KEY_OBJECT_ID.to_string(),
            Value::String(self.object_id.as_str().to_string()),
        );
        serde_json::from_value(Value::Object(attributes)).map_err(|source| RecordError::Malformed {
            kind: kind.tag(),
            source,
        })
    }

    /// Encode as the JSON payload kept in the shared store.
    pub fn to_json(&self) -> Result<String, RecordError> {
        serde_json::to_string(self).map_err(RecordError::InvalidPayload)
    }

    /// Decode a stored JSON payload.
    pub fn from_json(json: &str) -> Result<Self, RecordError> {
        serde_json::from_str(json).map_err(RecordError::InvalidPayload)
    }
}

impl TryFrom<&Shape> for ShapeRecord {
    type Error = RecordError;

    fn try_from(shape: &Shape) -> Result<Self, Self::Error> {
        Self::from_shape(shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{FontWeight, SerializableColor};
    use kurbo::Point;
    use serde_json::json;

    fn roundtrip(shape: Shape) {
        let record = ShapeRecord::from_shape(&shape).expect("serialize");
        assert_eq!(&record.object_id, shape.id());
        assert_eq!(record.shape_type, shape.kind().tag());

        // Through the store payload and back
        let json = record.to_json().expect("encode");
        let decoded = ShapeRecord::from_json(&json).expect("decode");
        assert_eq!(decoded, record);

        let recovered = decoded.to_shape().expect("deserialize");
        assert_eq!(recovered, shape);
    }

    #[test]
    fn test_roundtrip_every_kind() {
        let mut rect = Rectangle::new(Point::new(10.0, 10.0), 90.0, 90.0);
        rect.placement.angle = 12.5;
        rect.placement.scale_x = 1.5;
        rect.style.fill = None;
        rect.style.stroke = SerializableColor::new(255, 0, 0, 128);
        roundtrip(Shape::Rectangle(rect));

        roundtrip(Shape::Circle(Circle::new(Point::new(-4.0, 3.25), 17.0)));
        roundtrip(Shape::Triangle(Triangle::new(Point::new(1.0, 2.0), 30.0, 40.0)));
        roundtrip(Shape::Line(Line::new(Point::new(0.1, 0.2), Point::new(300.7, -12.0))));

        let freehand = Freehand::from_points(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0 / 3.0, 2.0 / 3.0),
            Point::new(10.0, 5.5),
        ]);
        roundtrip(Shape::Freehand(freehand));

        let text = Text::new(Point::new(5.0, 6.0), "Hello\nworld")
            .with_font_size(18.0)
            .with_font_family("Times New Roman")
            .with_font_weight(FontWeight::Semibold);
        roundtrip(Shape::Text(text));

        let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        let image = Image::from_bytes(Point::new(20.0, 20.0), &png, 64, 32)
            .unwrap()
            .fit_within(200.0, 200.0);
        roundtrip(Shape::Image(image));
    }

    #[test]
    fn test_fractional_geometry_is_exact() {
        // Widths like 13914.708994708993 come out of scale_to_width and
        // must survive the payload bit for bit, or self-echo looks like an edit.
        for i in 1..200 {
            let step = i as f64;
            let mut rect = Rectangle::new(Point::new(step / 7.0 * 1234.567, -step / 3.0), step * 0.1, 100.0 / step);
            rect.placement.angle = step * 0.37;
            let mut shape = Shape::Rectangle(rect);
            shape.scale_to_width(13914.708994708993 / step);
            shape.scale_to_height(step.sqrt() * 17.3);
            shape.translate(0.1 * step, 0.2 / step);

            let json = ShapeRecord::from_shape(&shape).unwrap().to_json().unwrap();
            let recovered = ShapeRecord::from_json(&json).unwrap().to_shape().unwrap();
            assert_eq!(recovered, shape, "payload {json}");
        }

        let mut line = Shape::Line(Line::new(Point::new(0.1, 0.7), Point::new(1.0 / 3.0, 2.0 / 7.0)));
        line.scale_to_width(13914.708994708993);
        roundtrip(line);
    }

    #[test]
    fn test_record_layout_is_flat() {
        let rect = Rectangle::new(Point::new(10.0, 10.0), 90.0, 90.0);
        let record = ShapeRecord::from_shape(&Shape::Rectangle(rect)).unwrap();
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["type"], json!("rectangle"));
        assert_eq!(value["left"], json!(10.0));
        assert_eq!(value["top"], json!(10.0));
        assert_eq!(value["width"], json!(90.0));
        assert_eq!(value["height"], json!(90.0));
        assert_eq!(value["fill"], json!("#aabbcc"));
        assert!(value["objectId"].is_string());
    }

    #[test]
    fn test_integer_attributes_are_accepted() {
        let record: ShapeRecord = serde_json::from_value(json!({
            "objectId": "r1",
            "type": "rectangle",
            "left": 10, "top": 10, "width": 90, "height": 90,
            "stroke": "#000000", "strokeWidth": 2
        }))
        .unwrap();

        let shape = record.to_shape().unwrap();
        assert_eq!(shape.id().as_str(), "r1");
        assert!((shape.bounds().width() - 90.0).abs() < f64::EPSILON);
        // Missing optional attributes fall back to defaults
        assert!(shape.style().fill.is_none());
        assert!((shape.style().opacity - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unknown_type() {
        let record: ShapeRecord = serde_json::from_value(json!({
            "objectId": "x1",
            "type": "hexagon",
            "sides": 6
        }))
        .unwrap();

        assert!(record.kind().is_none());
        assert!(matches!(record.to_shape(), Err(RecordError::UnknownType(t)) if t == "hexagon"));
    }

    #[test]
    fn test_malformed_attributes() {
        let record: ShapeRecord = serde_json::from_value(json!({
            "objectId": "c1",
            "type": "circle",
            "left": "not a number"
        }))
        .unwrap();

        assert!(matches!(record.to_shape(), Err(RecordError::Malformed { kind: "circle", .. })));
    }

    #[test]
    fn test_invalid_payload() {
        assert!(matches!(ShapeRecord::from_json("{not json"), Err(RecordError::InvalidPayload(_))));
        assert!(matches!(ShapeRecord::from_json("{\"type\":\"circle\"}"), Err(RecordError::InvalidPayload(_))));
    }
}
