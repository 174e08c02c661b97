//! Creation parameters and per-kind defaults.

use super::{
    Circle, Ellipse, Line, Path, Polygon, Polyline, Rectangle, SerializableColor, Shape, ShapeKind,
    ShapeStyle, Text, Triangle,
};
use kurbo::{BezPath, Point, Vec2};

/// Optional attributes for a new shape. Anything left as `None` takes the
/// default for the requested kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeParams {
    pub left: Option<f64>,
    pub top: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub radius: Option<f64>,
    pub radius_x: Option<f64>,
    pub radius_y: Option<f64>,
    /// Absolute vertices for lines, polylines and polygons.
    pub points: Option<Vec<Point>>,
    pub path: Option<BezPath>,
    pub fill: Option<SerializableColor>,
    pub stroke: Option<SerializableColor>,
    pub stroke_width: Option<f64>,
    pub content: Option<String>,
}

impl ShapeParams {
    /// Explicit position, if both coordinates were given.
    pub fn position(&self) -> Option<Point> {
        match (self.left, self.top) {
            (Some(left), Some(top)) => Some(Point::new(left, top)),
            _ => None,
        }
    }

    fn style(
        &self,
        fill: Option<SerializableColor>,
        stroke: Option<(SerializableColor, f64)>,
    ) -> ShapeStyle {
        let mut style = ShapeStyle {
            fill_color: self.fill.or(fill),
            stroke_color: self.stroke.or(stroke.map(|(color, _)| color)),
            ..ShapeStyle::default()
        };
        if let Some((_, width)) = stroke {
            style.stroke_width = width;
        }
        if let Some(width) = self.stroke_width {
            style.stroke_width = width;
        }
        style
    }
}

fn named(r: u8, g: u8, b: u8) -> SerializableColor {
    SerializableColor::new(r, g, b, 255)
}

/// CSS `green`.
pub const RECTANGLE_FILL: SerializableColor = SerializableColor { r: 0, g: 128, b: 0, a: 255 };
/// CSS `blue`.
pub const CIRCLE_FILL: SerializableColor = SerializableColor { r: 0, g: 0, b: 255, a: 255 };
/// CSS `purple`.
pub const TEXT_FILL: SerializableColor = SerializableColor { r: 128, g: 0, b: 128, a: 255 };

impl Shape {
    /// Build a shape of `kind` at `position`, filling unspecified attributes
    /// with that kind's defaults. Explicit `points` or `path` geometry is used
    /// as given and ignores `position`.
    pub fn from_params(kind: ShapeKind, params: &ShapeParams, position: Point) -> Shape {
        let at = position.to_vec2();
        match kind {
            ShapeKind::Rectangle => {
                let mut rect = Rectangle::new(
                    position,
                    params.width.unwrap_or(100.0),
                    params.height.unwrap_or(80.0),
                );
                rect.style = params.style(Some(RECTANGLE_FILL), None);
                Shape::Rectangle(rect)
            }
            ShapeKind::Circle => {
                let mut circle = Circle::new(position, params.radius.unwrap_or(40.0));
                circle.style = params.style(Some(CIRCLE_FILL), None);
                Shape::Circle(circle)
            }
            ShapeKind::Ellipse => {
                let mut ellipse = Ellipse::new(
                    position,
                    params.radius_x.or(params.radius).unwrap_or(60.0),
                    params.radius_y.or(params.radius).unwrap_or(35.0),
                );
                ellipse.style = params.style(Some(named(255, 165, 0)), None);
                Shape::Ellipse(ellipse)
            }
            ShapeKind::Triangle => {
                let mut triangle = Triangle::new(
                    position,
                    params.width.unwrap_or(100.0),
                    params.height.unwrap_or(90.0),
                );
                triangle.style = params.style(Some(named(255, 0, 0)), None);
                Shape::Triangle(triangle)
            }
            ShapeKind::Line => {
                let (start, end) = match params.points.as_deref() {
                    Some([start, end, ..]) => (*start, *end),
                    _ => (position, position + Vec2::new(params.width.unwrap_or(150.0), 0.0)),
                };
                let mut line = Line::new(start, end);
                line.style = params.style(None, Some((SerializableColor::black(), 2.0)));
                Shape::Line(line)
            }
            ShapeKind::Polyline => {
                let points = params.points.clone().unwrap_or_else(|| {
                    [(0.0, 40.0), (30.0, 0.0), (60.0, 40.0), (90.0, 0.0), (120.0, 40.0)]
                        .iter()
                        .map(|&(x, y)| Point::new(x, y) + at)
                        .collect()
                });
                let mut polyline = Polyline::new(points);
                polyline.style = params.style(None, Some((SerializableColor::black(), 2.0)));
                Shape::Polyline(polyline)
            }
            ShapeKind::Polygon => {
                let points = params.points.clone().unwrap_or_else(|| {
                    [(50.0, 0.0), (100.0, 38.0), (81.0, 95.0), (19.0, 95.0), (0.0, 38.0)]
                        .iter()
                        .map(|&(x, y)| Point::new(x, y) + at)
                        .collect()
                });
                let mut polygon = Polygon::new(points);
                polygon.style = params.style(Some(named(0, 128, 128)), None);
                Shape::Polygon(polygon)
            }
            ShapeKind::Path => {
                let path = params.path.clone().unwrap_or_else(|| {
                    let mut wave = BezPath::new();
                    wave.move_to(position);
                    wave.quad_to(
                        position + Vec2::new(30.0, -40.0),
                        position + Vec2::new(60.0, 0.0),
                    );
                    wave.quad_to(
                        position + Vec2::new(90.0, 40.0),
                        position + Vec2::new(120.0, 0.0),
                    );
                    wave
                });
                let mut shape = Path::new(path);
                shape.style = params.style(None, Some((SerializableColor::black(), 2.0)));
                Shape::Path(shape)
            }
            ShapeKind::Text => {
                let content = params.content.clone().unwrap_or_else(|| "Text".to_string());
                let mut text = Text::new(position, content);
                text.style = params.style(Some(TEXT_FILL), None);
                Shape::Text(text)
            }
        }
    }
}
