//! The document model and its serialized form.

use crate::shapes::{SerializableColor, Shape};
use kurbo::{Point, Rect};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default canvas width in pixels.
pub const DEFAULT_WIDTH: u32 = 600;
/// Default canvas height in pixels.
pub const DEFAULT_HEIGHT: u32 = 400;
/// Largest canvas side accepted from a serialized document.
pub const MAX_DIMENSION: u32 = 16384;

/// Errors converting between a document and its serialized form.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Failed to serialize document: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("Failed to decode document: {0}")]
    Deserialize(#[source] serde_json::Error),
    #[error("Canvas size {width}x{height} is out of range (1..={max})", max = MAX_DIMENSION)]
    InvalidSize { width: u32, height: u32 },
}

/// A design: canvas attributes plus drawable objects in stacking order
/// (first is bottom-most). Objects are identified by index only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasDocument {
    #[serde(default = "default_background")]
    pub background: SerializableColor,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default)]
    pub objects: Vec<Shape>,
}

fn default_background() -> SerializableColor {
    SerializableColor::white()
}

fn default_width() -> u32 {
    DEFAULT_WIDTH
}

fn default_height() -> u32 {
    DEFAULT_HEIGHT
}

impl Default for CanvasDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl CanvasDocument {
    /// Create an empty 600x400 document with a white background.
    pub fn new() -> Self {
        Self::with_size(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }

    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            background: default_background(),
            width,
            height,
            objects: Vec::new(),
        }
    }

    /// The canvas area in world coordinates.
    pub fn page(&self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }

    /// Append an object on top of the stack, returning its index.
    pub fn push(&mut self, shape: Shape) -> usize {
        self.objects.push(shape);
        self.objects.len() - 1
    }

    pub fn remove(&mut self, index: usize) -> Option<Shape> {
        (index < self.objects.len()).then(|| self.objects.remove(index))
    }

    pub fn get(&self, index: usize) -> Option<&Shape> {
        self.objects.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Shape> {
        self.objects.get_mut(index)
    }

    /// Remove every object. Canvas attributes are kept.
    pub fn clear(&mut self) {
        self.objects.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Topmost object under `point` (world coordinates).
    pub fn object_at(&self, point: Point, tolerance: f64) -> Option<usize> {
        self.objects
            .iter()
            .rposition(|shape| shape.hit_test(point, tolerance))
    }

    /// Union of all object bounds.
    pub fn bounds(&self) -> Option<Rect> {
        self.objects
            .iter()
            .map(Shape::bounds)
            .reduce(|acc, bounds| acc.union(bounds))
    }

    /// Random placement for a new object: x in [0, 2/3 width), y in [0, 3/4 height).
    pub fn random_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Point {
        let max_x = f64::from(self.width) * 2.0 / 3.0;
        let max_y = f64::from(self.height) * 3.0 / 4.0;
        let x = if max_x > 0.0 { rng.random_range(0.0..max_x) } else { 0.0 };
        let y = if max_y > 0.0 { rng.random_range(0.0..max_y) } else { 0.0 };
        Point::new(x, y)
    }

    /// Reset degenerate scale factors. Returns how many objects were changed.
    pub fn normalize(&mut self) -> usize {
        let fixed = self
            .objects
            .iter_mut()
            .map(Shape::normalize_scale)
            .filter(|changed| *changed)
            .count();
        if fixed > 0 {
            log::debug!("Reset zero scale on {} object(s)", fixed);
        }
        fixed
    }

    /// Convert into the self-describing serialized form.
    pub fn to_serialized(&self) -> Result<SerializedDocument, DocumentError> {
        serde_json::to_value(self)
            .map(SerializedDocument)
            .map_err(DocumentError::Serialize)
    }

    /// Whether both sides are within `1..=MAX_DIMENSION`.
    pub fn has_valid_size(&self) -> bool {
        let side = 1..=MAX_DIMENSION;
        side.contains(&self.width) && side.contains(&self.height)
    }

    /// Rebuild a document from its serialized form, normalizing scale.
    pub fn from_serialized(data: &SerializedDocument) -> Result<Self, DocumentError> {
        let mut document: Self =
            serde_json::from_value(data.0.clone()).map_err(DocumentError::Deserialize)?;
        if !document.has_valid_size() {
            return Err(DocumentError::InvalidSize {
                width: document.width,
                height: document.height,
            });
        }
        document.normalize();
        Ok(document)
    }

    /// Serialize the document to JSON text.
    pub fn to_json(&self) -> Result<String, DocumentError> {
        self.to_serialized()?.to_json()
    }

    /// Deserialize a document from JSON text.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        Self::from_serialized(&SerializedDocument::from_json(json)?)
    }
}

/// A document in its self-describing JSON form. Storage backends treat it
/// as opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SerializedDocument(serde_json::Value);

impl SerializedDocument {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn into_value(self) -> serde_json::Value {
        self.0
    }

    pub fn to_json(&self) -> Result<String, DocumentError> {
        serde_json::to_string(&self.0).map_err(DocumentError::Serialize)
    }

    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        serde_json::from_str(json)
            .map(Self)
            .map_err(DocumentError::Deserialize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Circle, Path, Polygon, Polyline, Rectangle, ShapeKind, ShapeParams, Text};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn every_kind() -> CanvasDocument {
        let mut doc = CanvasDocument::new();
        for (i, kind) in ShapeKind::all().iter().enumerate() {
            let at = Point::new(10.0 * i as f64, 5.0 * i as f64);
            doc.push(Shape::from_params(*kind, &ShapeParams::default(), at));
        }
        doc
    }

    #[test]
    fn test_new_document() {
        let doc = CanvasDocument::new();
        assert!(doc.is_empty());
        assert_eq!((doc.width, doc.height), (600, 400));
        assert_eq!(doc.background, SerializableColor::white());
    }

    #[test]
    fn test_round_trip_every_kind() {
        let doc = every_kind();
        let restored = CanvasDocument::from_serialized(&doc.to_serialized().unwrap()).unwrap();
        assert_eq!(restored, doc);
        let kinds: Vec<_> = restored.objects.iter().map(Shape::kind).collect();
        assert_eq!(kinds, ShapeKind::all());
    }

    #[test]
    fn test_json_round_trip_keeps_styles() {
        let mut doc = CanvasDocument::new();
        let mut rect = Rectangle::new(Point::new(1.0, 2.0), 30.0, 40.0);
        rect.rotation = 0.5;
        rect.style.opacity = 0.25;
        doc.push(Shape::Rectangle(rect));
        doc.push(Shape::Polyline(Polyline::new(vec![Point::ZERO, Point::new(4.0, 4.0)])));
        doc.push(Shape::Polygon(Polygon::new(vec![
            Point::ZERO,
            Point::new(4.0, 0.0),
            Point::new(2.0, 3.0),
        ])));
        doc.push(Shape::Path(Path::from_svg("M0 0 L10 10 Q20 0 30 10").unwrap()));
        let json = doc.to_json().unwrap();
        assert_eq!(CanvasDocument::from_json(&json).unwrap(), doc);
    }

    #[test]
    fn test_objects_are_tagged_by_kind() {
        let mut doc = CanvasDocument::new();
        doc.push(Shape::Text(Text::new(Point::ZERO, "hi")));
        let value = doc.to_serialized().unwrap().into_value();
        assert_eq!(value["objects"][0]["type"], "text");
        assert_eq!(value["background"], "#ffffff");
    }

    #[test]
    fn test_missing_attributes_take_defaults() {
        let doc = CanvasDocument::from_json(r#"{"objects":[]}"#).unwrap();
        assert_eq!(doc, CanvasDocument::new());
    }

    #[test]
    fn test_zero_scale_is_normalized_on_load() {
        let mut doc = CanvasDocument::new();
        let mut circle = Circle::new(Point::ZERO, 10.0);
        circle.scale_x = 0.0;
        circle.scale_y = 3.0;
        doc.push(Shape::Circle(circle));
        let mut scaled = Circle::new(Point::ZERO, 10.0);
        scaled.scale_x = 2.0;
        doc.push(Shape::Circle(scaled));

        let restored = CanvasDocument::from_json(&doc.to_json().unwrap()).unwrap();
        assert_eq!(restored.objects[0].scale(), (1.0, 1.0));
        assert_eq!(restored.objects[1].scale(), (2.0, 1.0));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(matches!(
            CanvasDocument::from_json("not json"),
            Err(DocumentError::Deserialize(_))
        ));
        assert!(matches!(
            CanvasDocument::from_json(r#"{"objects":[{"type":"hexagon"}]}"#),
            Err(DocumentError::Deserialize(_))
        ));
    }

    #[test]
    fn test_out_of_range_size_is_rejected() {
        for json in [
            r#"{"width":4294967295,"height":4294967295,"objects":[]}"#,
            r#"{"width":0,"height":400}"#,
            r#"{"width":600,"height":16385}"#,
        ] {
            assert!(matches!(
                CanvasDocument::from_json(json),
                Err(DocumentError::InvalidSize { .. })
            ));
        }
        let largest = CanvasDocument::from_json(r#"{"width":16384,"height":1}"#).unwrap();
        assert!(largest.has_valid_size());
    }

    #[test]
    fn test_fractional_coordinates_reload_exactly() {
        let mut doc = CanvasDocument::new();
        let mut circle = Circle::new(Point::new(0.1 + 0.2, 1.0 / 3.0), 2f64.sqrt() * 1e-7);
        circle.rotation = 359.99999999999994;
        doc.push(Shape::Circle(circle.clone()));

        let loaded = CanvasDocument::from_json(&doc.to_json().unwrap()).unwrap();
        let Shape::Circle(reloaded) = &loaded.objects[0] else {
            panic!("expected a circle");
        };
        assert_eq!(reloaded.position.x.to_bits(), circle.position.x.to_bits());
        assert_eq!(reloaded.position.y.to_bits(), circle.position.y.to_bits());
        assert_eq!(reloaded.radius.to_bits(), circle.radius.to_bits());
        assert_eq!(reloaded.rotation.to_bits(), circle.rotation.to_bits());
    }

    #[test]
    fn test_random_position_in_bounds() {
        let doc = CanvasDocument::new();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let p = doc.random_position(&mut rng);
            assert!((0.0..400.0).contains(&p.x));
            assert!((0.0..300.0).contains(&p.y));
        }
    }

    #[test]
    fn test_object_at_prefers_topmost() {
        let mut doc = CanvasDocument::new();
        doc.push(Shape::from_params(ShapeKind::Rectangle, &ShapeParams::default(), Point::ZERO));
        doc.push(Shape::from_params(ShapeKind::Circle, &ShapeParams::default(), Point::ZERO));
        assert_eq!(doc.object_at(Point::new(40.0, 40.0), 1.0), Some(1));
        assert_eq!(doc.object_at(Point::new(95.0, 75.0), 1.0), Some(0));
        assert_eq!(doc.object_at(Point::new(500.0, 390.0), 1.0), None);
    }
}
