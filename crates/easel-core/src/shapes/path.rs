//! Free-form bezier path shape.

use super::{ShapeKind, ShapeStyle, ShapeTrait, default_scale};
use kurbo::{Affine, BezPath, Point, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};

/// Serializes a `BezPath` as SVG path data.
mod svg_data {
    use kurbo::BezPath;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(path: &BezPath, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&path.to_svg())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BezPath, D::Error> {
        let data = String::deserialize(deserializer)?;
        BezPath::from_svg(&data).map_err(serde::de::Error::custom)
    }
}

/// An arbitrary path of lines and curves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    #[serde(with = "svg_data")]
    pub path: BezPath,
    #[serde(default = "default_scale")]
    pub scale_x: f64,
    #[serde(default = "default_scale")]
    pub scale_y: f64,
    #[serde(default)]
    pub rotation: f64,
    pub style: ShapeStyle,
}

impl Path {
    pub fn new(path: BezPath) -> Self {
        Self {
            path,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
            style: ShapeStyle::default(),
        }
    }

    /// Parse SVG path data (`M 0 0 L 10 10 ...`).
    pub fn from_svg(data: &str) -> Result<Self, kurbo::SvgParseError> {
        BezPath::from_svg(data).map(Self::new)
    }
}

impl ShapeTrait for Path {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Path
    }

    fn origin(&self) -> Point {
        self.path.bounding_box().origin()
    }

    fn to_path(&self) -> BezPath {
        self.path.clone()
    }

    fn is_closed(&self) -> bool {
        self.path.elements().last() == Some(&kurbo::PathEl::ClosePath)
    }

    fn translate(&mut self, delta: Vec2) {
        self.path.apply_affine(Affine::translate(delta));
    }

    shape_accessors!();
}
