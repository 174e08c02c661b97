//! Line shape.

use super::{ShapeKind, ShapeStyle, ShapeTrait, default_scale};
use kurbo::{BezPath, Line as KurboLine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// A straight line segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Start point.
    pub start: Point,
    /// End point.
    pub end: Point,
    #[serde(default = "default_scale")]
    pub scale_x: f64,
    #[serde(default = "default_scale")]
    pub scale_y: f64,
    #[serde(default)]
    pub rotation: f64,
    /// Style properties.
    pub style: ShapeStyle,
}

impl Line {
    /// Create a new line.
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            start,
            end,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
            style: ShapeStyle::default(),
        }
    }

    /// Get the length of the line.
    pub fn length(&self) -> f64 {
        self.as_kurbo().length()
    }

    /// Get the midpoint of the line.
    pub fn midpoint(&self) -> Point {
        self.start.midpoint(self.end)
    }

    /// Get as a kurbo Line.
    pub fn as_kurbo(&self) -> KurboLine {
        KurboLine::new(self.start, self.end)
    }
}

impl ShapeTrait for Line {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Line
    }

    fn origin(&self) -> Point {
        Point::new(self.start.x.min(self.end.x), self.start.y.min(self.end.y))
    }

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        path.move_to(self.start);
        path.line_to(self.end);
        path
    }

    fn is_closed(&self) -> bool {
        false
    }

    fn translate(&mut self, delta: Vec2) {
        self.start += delta;
        self.end += delta;
    }

    shape_accessors!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Shape;

    #[test]
    fn test_line_creation() {
        let line = Line::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        assert!((line.length() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_midpoint() {
        let line = Line::new(Point::new(0.0, 0.0), Point::new(100.0, 100.0));
        let mid = line.midpoint();
        assert!((mid.x - 50.0).abs() < f64::EPSILON);
        assert!((mid.y - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_test_on_line() {
        let shape = Shape::Line(Line::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0)));
        assert!(shape.hit_test(Point::new(50.0, 0.0), 1.0));
        assert!(shape.hit_test(Point::new(50.0, 2.0), 5.0));
        assert!(!shape.hit_test(Point::new(50.0, 20.0), 5.0));
    }

    #[test]
    fn test_origin_is_top_left() {
        let line = Line::new(Point::new(50.0, 10.0), Point::new(10.0, 80.0));
        assert_eq!(line.origin(), Point::new(10.0, 10.0));
    }
}
