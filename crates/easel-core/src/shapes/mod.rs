//! Drawable objects placed on the canvas.

/// Accessors shared by every shape struct (scale, rotation, style fields).
macro_rules! shape_accessors {
    () => {
        fn style(&self) -> &ShapeStyle {
            &self.style
        }

        fn style_mut(&mut self) -> &mut ShapeStyle {
            &mut self.style
        }

        fn scale(&self) -> (f64, f64) {
            (self.scale_x, self.scale_y)
        }

        fn set_scale(&mut self, scale_x: f64, scale_y: f64) {
            self.scale_x = scale_x;
            self.scale_y = scale_y;
        }

        fn rotation(&self) -> f64 {
            self.rotation
        }
    };
}

mod circle;
mod ellipse;
mod line;
mod params;
mod path;
mod polygon;
mod rectangle;
mod text;
mod triangle;

pub use circle::Circle;
pub use ellipse::Ellipse;
pub use line::Line;
pub use params::ShapeParams;
pub use path::Path;
pub use polygon::{Polygon, Polyline};
pub use rectangle::Rectangle;
pub use text::{FontWeight, Text, TextStyle, TextStyleChange};
pub use triangle::Triangle;

use kurbo::{Affine, BezPath, PathEl, Point, Rect, Shape as KurboShape, Vec2};
use peniko::Color;
use peniko::color::{Srgb, parse_color};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Flattening tolerance used for hit testing.
const HIT_TOLERANCE: f64 = 0.1;

/// Errors raised while interpreting user-supplied style values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StyleError {
    #[error("Invalid color: {0}")]
    InvalidColor(String),
    #[error("Unknown shape kind: {0}")]
    UnknownKind(String),
    #[error("Unknown text property: {0}")]
    UnknownProperty(String),
    #[error("Invalid value {value:?} for {property}")]
    InvalidValue { property: String, value: String },
}

/// Serializable color representation (RGBA8).
///
/// Serialized as a CSS hex string; any CSS color syntax is accepted when
/// deserializing or parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
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

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Parse a CSS color string (`green`, `#fff`, `rgb(0, 128, 0)`, ...).
    pub fn parse(value: &str) -> Result<Self, StyleError> {
        let color = parse_color(value.trim())
            .map_err(|_| StyleError::InvalidColor(value.to_string()))?
            .to_alpha_color::<Srgb>();
        Ok(color.into())
    }

    /// Hex form, with the alpha byte only when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl fmt::Display for SerializableColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for SerializableColor {
    type Err = StyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for SerializableColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for SerializableColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Style properties for shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    /// Fill color (None = no fill).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<SerializableColor>,
    /// Stroke color (None = no outline).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<SerializableColor>,
    /// Stroke width.
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
    /// Overall opacity (0.0 = fully transparent, 1.0 = fully opaque).
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

fn default_stroke_width() -> f64 {
    1.0
}

fn default_opacity() -> f64 {
    1.0
}

pub(crate) fn default_scale() -> f64 {
    1.0
}

fn with_opacity(color: SerializableColor, opacity: f64) -> Color {
    let alpha = (f64::from(color.a) * opacity.clamp(0.0, 1.0)) as u8;
    Color::from_rgba8(color.r, color.g, color.b, alpha)
}

impl ShapeStyle {
    /// A style with only a fill.
    pub fn filled(color: SerializableColor) -> Self {
        Self {
            fill_color: Some(color),
            ..Self::default()
        }
    }

    /// A style with only an outline.
    pub fn stroked(color: SerializableColor, width: f64) -> Self {
        Self {
            stroke_color: Some(color),
            stroke_width: width,
            ..Self::default()
        }
    }

    /// Get the fill color with opacity applied.
    pub fn fill_with_opacity(&self) -> Option<Color> {
        self.fill_color.map(|c| with_opacity(c, self.opacity))
    }

    /// Get the stroke color with opacity applied.
    pub fn stroke_with_opacity(&self) -> Option<Color> {
        self.stroke_color.map(|c| with_opacity(c, self.opacity))
    }
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            fill_color: None,
            stroke_color: None,
            stroke_width: default_stroke_width(),
            opacity: default_opacity(),
        }
    }
}

/// The kinds of drawable object a document can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Ellipse,
    Triangle,
    Line,
    Polyline,
    Polygon,
    Path,
    Text,
}

impl ShapeKind {
    /// Get all shape kinds.
    pub fn all() -> &'static [ShapeKind] {
        &[
            ShapeKind::Rectangle,
            ShapeKind::Circle,
            ShapeKind::Ellipse,
            ShapeKind::Triangle,
            ShapeKind::Line,
            ShapeKind::Polyline,
            ShapeKind::Polygon,
            ShapeKind::Path,
            ShapeKind::Text,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Circle => "circle",
            ShapeKind::Ellipse => "ellipse",
            ShapeKind::Triangle => "triangle",
            ShapeKind::Line => "line",
            ShapeKind::Polyline => "polyline",
            ShapeKind::Polygon => "polygon",
            ShapeKind::Path => "path",
            ShapeKind::Text => "text",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShapeKind {
    type Err = StyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        let kind = match lowered.as_str() {
            "rect" => ShapeKind::Rectangle,
            other => ShapeKind::all()
                .iter()
                .copied()
                .find(|kind| kind.name() == other)
                .ok_or_else(|| StyleError::UnknownKind(s.to_string()))?,
        };
        Ok(kind)
    }
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = Vec2::new(b.x - a.x, b.y - a.y);
    let pv = Vec2::new(point.x - a.x, point.y - a.y);
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = Point::new(a.x + t * seg.x, a.y + t * seg.y);
    ((point.x - proj.x).powi(2) + (point.y - proj.y).powi(2)).sqrt()
}

/// Minimum distance from a point to a polyline (sequence of connected segments).
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    if let [single] = points {
        return (*single - point).hypot();
    }
    points
        .windows(2)
        .map(|w| point_to_segment_dist(point, w[0], w[1]))
        .fold(f64::INFINITY, f64::min)
}

/// Common trait for all shapes.
pub trait ShapeTrait {
    /// The kind tag of this shape.
    fn kind(&self) -> ShapeKind;

    /// Anchor point that scale and rotation are applied around.
    fn origin(&self) -> Point;

    /// Geometry in world coordinates, before scale and rotation.
    fn to_path(&self) -> BezPath;

    /// Whether the outline encloses an area that can be filled.
    fn is_closed(&self) -> bool {
        true
    }

    /// Move the shape by a delta.
    fn translate(&mut self, delta: Vec2);

    /// Get the style.
    fn style(&self) -> &ShapeStyle;

    /// Get mutable style.
    fn style_mut(&mut self) -> &mut ShapeStyle;

    /// Horizontal and vertical scale factors.
    fn scale(&self) -> (f64, f64);

    /// Set the scale factors.
    fn set_scale(&mut self, scale_x: f64, scale_y: f64);

    /// Rotation angle in radians (around the origin).
    fn rotation(&self) -> f64;
}

/// Enum wrapper for all shape types (for serialization).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    Rectangle(Rectangle),
    Circle(Circle),
    Ellipse(Ellipse),
    Triangle(Triangle),
    Line(Line),
    Polyline(Polyline),
    Polygon(Polygon),
    Path(Path),
    Text(Text),
}

impl Shape {
    fn as_dyn(&self) -> &dyn ShapeTrait {
        match self {
            Shape::Rectangle(s) => s,
            Shape::Circle(s) => s,
            Shape::Ellipse(s) => s,
            Shape::Triangle(s) => s,
            Shape::Line(s) => s,
            Shape::Polyline(s) => s,
            Shape::Polygon(s) => s,
            Shape::Path(s) => s,
            Shape::Text(s) => s,
        }
    }

    fn as_dyn_mut(&mut self) -> &mut dyn ShapeTrait {
        match self {
            Shape::Rectangle(s) => s,
            Shape::Circle(s) => s,
            Shape::Ellipse(s) => s,
            Shape::Triangle(s) => s,
            Shape::Line(s) => s,
            Shape::Polyline(s) => s,
            Shape::Polygon(s) => s,
            Shape::Path(s) => s,
            Shape::Text(s) => s,
        }
    }

    pub fn kind(&self) -> ShapeKind {
        self.as_dyn().kind()
    }

    pub fn style(&self) -> &ShapeStyle {
        self.as_dyn().style()
    }

    pub fn style_mut(&mut self) -> &mut ShapeStyle {
        self.as_dyn_mut().style_mut()
    }

    pub fn origin(&self) -> Point {
        self.as_dyn().origin()
    }

    pub fn is_closed(&self) -> bool {
        self.as_dyn().is_closed()
    }

    pub fn scale(&self) -> (f64, f64) {
        self.as_dyn().scale()
    }

    pub fn set_scale(&mut self, scale_x: f64, scale_y: f64) {
        self.as_dyn_mut().set_scale(scale_x, scale_y);
    }

    pub fn rotation(&self) -> f64 {
        self.as_dyn().rotation()
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.as_dyn_mut().translate(delta);
    }

    /// Reset a degenerate scale: if either factor is exactly zero, both become 1.
    /// Returns true if the shape was changed.
    pub fn normalize_scale(&mut self) -> bool {
        let (scale_x, scale_y) = self.scale();
        if scale_x == 0.0 || scale_y == 0.0 {
            self.set_scale(1.0, 1.0);
            true
        } else {
            false
        }
    }

    /// Scale and rotation around the origin.
    pub fn object_transform(&self) -> Affine {
        let origin = self.origin().to_vec2();
        let (scale_x, scale_y) = self.scale();
        Affine::translate(origin)
            * Affine::rotate(self.rotation())
            * Affine::scale_non_uniform(scale_x, scale_y)
            * Affine::translate(-origin)
    }

    /// Geometry before scale and rotation.
    pub fn local_path(&self) -> BezPath {
        self.as_dyn().to_path()
    }

    /// Geometry with scale and rotation applied.
    pub fn world_path(&self) -> BezPath {
        self.object_transform() * self.local_path()
    }

    /// Bounding box in world coordinates.
    pub fn bounds(&self) -> Rect {
        self.world_path().bounding_box()
    }

    /// Check if a point (in world coordinates) hits this shape.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let path = self.world_path();
        let filled = self.is_text() || self.style().fill_color.is_some();
        if self.is_closed() && filled && path.contains(point) {
            return true;
        }
        let reach = tolerance + self.style().stroke_width / 2.0;
        flattened_runs(&path)
            .iter()
            .any(|run| point_to_polyline_dist(point, run) <= reach)
    }

    /// Check if this shape is text.
    pub fn is_text(&self) -> bool {
        matches!(self, Shape::Text(_))
    }

    /// Get the text if this shape is text.
    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Shape::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Get the mutable text if this shape is text.
    pub fn as_text_mut(&mut self) -> Option<&mut Text> {
        match self {
            Shape::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// Flatten a path into polylines, one per subpath. Closed subpaths repeat their first point.
fn flattened_runs(path: &BezPath) -> Vec<Vec<Point>> {
    let mut runs: Vec<Vec<Point>> = Vec::new();
    kurbo::flatten(path, HIT_TOLERANCE, |el| match el {
        PathEl::MoveTo(p) => runs.push(vec![p]),
        PathEl::LineTo(p) => {
            if let Some(run) = runs.last_mut() {
                run.push(p);
            }
        }
        PathEl::ClosePath => {
            if let Some(run) = runs.last_mut() {
                if let Some(&first) = run.first() {
                    run.push(first);
                }
            }
        }
        _ => {}
    });
    runs
}
