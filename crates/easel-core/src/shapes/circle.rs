//! Circle shape.

use super::{ShapeKind, ShapeStyle, ShapeTrait, default_scale};
use kurbo::{BezPath, Circle as KurboCircle, Point, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};

/// A circle, positioned by the top-left corner of its bounding box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    /// Top-left corner of the bounding box.
    pub position: Point,
    pub radius: f64,
    #[serde(default = "default_scale")]
    pub scale_x: f64,
    #[serde(default = "default_scale")]
    pub scale_y: f64,
    #[serde(default)]
    pub rotation: f64,
    pub style: ShapeStyle,
}

impl Circle {
    /// Create a new circle.
    pub fn new(position: Point, radius: f64) -> Self {
        Self {
            position,
            radius,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
            style: ShapeStyle::default(),
        }
    }

    /// Create a circle around a center point.
    pub fn centered(center: Point, radius: f64) -> Self {
        Self::new(Point::new(center.x - radius, center.y - radius), radius)
    }

    /// Center of the unscaled circle.
    pub fn center(&self) -> Point {
        Point::new(self.position.x + self.radius, self.position.y + self.radius)
    }
}

impl ShapeTrait for Circle {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Circle
    }

    fn origin(&self) -> Point {
        self.position
    }

    fn to_path(&self) -> BezPath {
        KurboCircle::new(self.center(), self.radius).to_path(0.1)
    }

    fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    shape_accessors!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Shape;

    #[test]
    fn test_centered() {
        let circle = Circle::centered(Point::new(50.0, 50.0), 10.0);
        assert!((circle.position.x - 40.0).abs() < f64::EPSILON);
        assert!((circle.center().y - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bounds() {
        let shape = Shape::Circle(Circle::new(Point::new(100.0, 100.0), 50.0));
        let bounds = shape.bounds();
        assert!((bounds.x0 - 100.0).abs() < 1e-6);
        assert!((bounds.y0 - 100.0).abs() < 1e-6);
        assert!((bounds.x1 - 200.0).abs() < 1e-6);
        assert!((bounds.y1 - 200.0).abs() < 1e-6);
    }

    #[test]
    fn test_hit_test_filled() {
        let mut circle = Circle::new(Point::new(0.0, 0.0), 10.0);
        circle.style.fill_color = Some(crate::shapes::SerializableColor::black());
        let shape = Shape::Circle(circle);
        assert!(shape.hit_test(Point::new(10.0, 10.0), 0.0));
        assert!(!shape.hit_test(Point::new(30.0, 10.0), 0.0));
    }
}
