//! Triangle shape.

use super::{ShapeKind, ShapeStyle, ShapeTrait, default_scale};
use kurbo::{BezPath, Point, Vec2};
use serde::{Deserialize, Serialize};

/// An isosceles triangle with its apex at the top centre of its box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    /// Top-left corner of the bounding box.
    pub position: Point,
    pub width: f64,
    pub height: f64,
    #[serde(default = "default_scale")]
    pub scale_x: f64,
    #[serde(default = "default_scale")]
    pub scale_y: f64,
    #[serde(default)]
    pub rotation: f64,
    pub style: ShapeStyle,
}

impl Triangle {
    pub fn new(position: Point, width: f64, height: f64) -> Self {
        Self {
            position,
            width,
            height,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
            style: ShapeStyle::default(),
        }
    }

    /// Apex, bottom-right and bottom-left corners.
    pub fn vertices(&self) -> [Point; 3] {
        let Point { x, y } = self.position;
        [
            Point::new(x + self.width / 2.0, y),
            Point::new(x + self.width, y + self.height),
            Point::new(x, y + self.height),
        ]
    }
}

impl ShapeTrait for Triangle {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Triangle
    }

    fn origin(&self) -> Point {
        self.position
    }

    fn to_path(&self) -> BezPath {
        let [apex, right, left] = self.vertices();
        let mut path = BezPath::new();
        path.move_to(apex);
        path.line_to(right);
        path.line_to(left);
        path.close_path();
        path
    }

    fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    shape_accessors!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertices() {
        let tri = Triangle::new(Point::new(0.0, 0.0), 100.0, 80.0);
        let [apex, right, left] = tri.vertices();
        assert_eq!(apex, Point::new(50.0, 0.0));
        assert_eq!(right, Point::new(100.0, 80.0));
        assert_eq!(left, Point::new(0.0, 80.0));
    }
}
