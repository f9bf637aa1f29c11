//! Image shape referencing a raster source.

use super::{ObjectId, Placement, ShapeStyle, ShapeTrait};
use base64::{Engine, engine::general_purpose::STANDARD};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Raster formats accepted for uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
}

impl ImageFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
        }
    }

    /// Sniff the format from the file signature.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        match data {
            [0x89, b'P', b'N', b'G', ..] => Some(ImageFormat::Png),
            [0xFF, 0xD8, 0xFF, ..] => Some(ImageFormat::Jpeg),
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some(ImageFormat::WebP),
            _ => None,
        }
    }
}

/// An image shape.
///
/// The pixels are never stored in the shape: `src` is a resolvable locator,
/// either a URL or a `data:` URI produced from an upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    #[serde(rename = "objectId")]
    pub(crate) id: ObjectId,
    #[serde(flatten)]
    pub placement: Placement,
    /// Natural image width in pixels.
    pub width: f64,
    /// Natural image height in pixels.
    pub height: f64,
    /// Source locator.
    pub src: String,
    #[serde(flatten)]
    pub style: ShapeStyle,
}

impl Image {
    /// Create an image shape referencing a URL.
    pub fn from_url(position: Point, src: impl Into<String>, width: f64, height: f64) -> Self {
        let style = ShapeStyle {
            fill: None,
            stroke_width: 0.0,
            ..ShapeStyle::default()
        };
        Self {
            id: ObjectId::generate(),
            placement: Placement::at(position),
            width,
            height,
            src: src.into(),
            style,
        }
    }

    /// Create an image shape from uploaded bytes, encoded as a data URI.
    ///
    /// Returns `None` when the bytes are not a recognized PNG, JPEG or WebP.
    pub fn from_bytes(position: Point, data: &[u8], width: u32, height: u32) -> Option<Self> {
        let format = ImageFormat::from_magic_bytes(data)?;
        let src = format!("data:{};base64,{}", format.mime_type(), STANDARD.encode(data));
        Some(Self::from_url(position, src, width as f64, height as f64))
    }

    /// Scale to fit within max dimensions while preserving aspect ratio.
    pub fn fit_within(mut self, max_width: f64, max_height: f64) -> Self {
        if self.width <= 0.0 || self.height <= 0.0 {
            return self;
        }
        let scale = (max_width / self.width).min(max_height / self.height);
        self.placement.scale_x = scale;
        self.placement.scale_y = scale;
        self
    }

    /// Get the bounding rectangle.
    pub fn as_rect(&self) -> Rect {
        self.placement.bounds(self.width, self.height)
    }
}

impl ShapeTrait for Image {
    fn id(&self) -> &ObjectId {
        &self.id
    }

    fn bounds(&self) -> Rect {
        self.as_rect()
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.as_rect().inflate(tolerance, tolerance).contains(point)
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
