//! Point-list shapes: open polylines and closed polygons.

use super::{ShapeKind, ShapeStyle, ShapeTrait, default_scale};
use kurbo::{BezPath, Point, Vec2};
use serde::{Deserialize, Serialize};

fn points_origin(points: &[Point]) -> Point {
    if points.is_empty() {
        return Point::ZERO;
    }
    points.iter().fold(
        Point::new(f64::INFINITY, f64::INFINITY),
        |acc, p| Point::new(acc.x.min(p.x), acc.y.min(p.y)),
    )
}

fn points_path(points: &[Point], closed: bool) -> BezPath {
    let mut path = BezPath::new();
    let Some((first, rest)) = points.split_first() else {
        return path;
    };
    path.move_to(*first);
    for p in rest {
        path.line_to(*p);
    }
    if closed {
        path.close_path();
    }
    path
}

/// An open chain of connected segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    pub points: Vec<Point>,
    #[serde(default = "default_scale")]
    pub scale_x: f64,
    #[serde(default = "default_scale")]
    pub scale_y: f64,
    #[serde(default)]
    pub rotation: f64,
    pub style: ShapeStyle,
}

impl Polyline {
    pub fn new(points: Vec<Point>) -> Self {
        Self {
            points,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
            style: ShapeStyle::default(),
        }
    }
}

impl ShapeTrait for Polyline {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Polyline
    }

    fn origin(&self) -> Point {
        points_origin(&self.points)
    }

    fn to_path(&self) -> BezPath {
        points_path(&self.points, false)
    }

    fn is_closed(&self) -> bool {
        false
    }

    fn translate(&mut self, delta: Vec2) {
        for p in &mut self.points {
            *p += delta;
        }
    }

    shape_accessors!();
}

/// A closed polygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub points: Vec<Point>,
    #[serde(default = "default_scale")]
    pub scale_x: f64,
    #[serde(default = "default_scale")]
    pub scale_y: f64,
    #[serde(default)]
    pub rotation: f64,
    pub style: ShapeStyle,
}

impl Polygon {
    pub fn new(points: Vec<Point>) -> Self {
        Self {
            points,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
            style: ShapeStyle::default(),
        }
    }
}

impl ShapeTrait for Polygon {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Polygon
    }

    fn origin(&self) -> Point {
        points_origin(&self.points)
    }

    fn to_path(&self) -> BezPath {
        points_path(&self.points, true)
    }

    fn translate(&mut self, delta: Vec2) {
        for p in &mut self.points {
            *p += delta;
        }
    }

    shape_accessors!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{SerializableColor, Shape};

    fn square() -> Vec<Point> {
        vec![
            Point::new(10.0, 10.0),
            Point::new(30.0, 10.0),
            Point::new(30.0, 30.0),
            Point::new(10.0, 30.0),
        ]
    }

    #[test]
    fn test_origin() {
        assert_eq!(Polygon::new(square()).origin(), Point::new(10.0, 10.0));
        assert_eq!(Polyline::new(Vec::new()).origin(), Point::ZERO);
    }

    #[test]
    fn test_polygon_fill_hit() {
        let mut polygon = Polygon::new(square());
        polygon.style.fill_color = Some(SerializableColor::black());
        let shape = Shape::Polygon(polygon);
        assert!(shape.hit_test(Point::new(20.0, 20.0), 0.0));
    }

    #[test]
    fn test_polyline_interior_is_not_hit() {
        let shape = Shape::Polyline(Polyline::new(square()));
        assert!(!shape.hit_test(Point::new(20.0, 20.0), 0.0));
        assert!(shape.hit_test(Point::new(20.0, 10.0), 1.0));
    }
}
