//! Editing session state: the document, the view and the active object.

use crate::camera::Camera;
use crate::document::CanvasDocument;
use crate::shapes::{Shape, ShapeKind, ShapeParams, Text, TextStyle, TextStyleChange};
use kurbo::Point;
use rand::Rng;

/// Hit-test slack in screen pixels.
const SELECT_TOLERANCE: f64 = 4.0;

/// Runtime canvas state (the document is the only persisted part).
#[derive(Debug, Clone, Default)]
pub struct Canvas {
    /// The document being edited.
    pub document: CanvasDocument,
    /// Camera for view transform.
    pub camera: Camera,
    selection: Option<usize>,
}

impl Canvas {
    /// Create a new canvas with an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a canvas with an existing document.
    pub fn with_document(document: CanvasDocument) -> Self {
        let mut canvas = Self::new();
        canvas.replace_document(document);
        canvas
    }

    /// Append a shape of `kind`. Without an explicit `left`/`top` the shape
    /// is dropped at a random spot in the upper-left part of the canvas.
    pub fn add_shape<R: Rng + ?Sized>(
        &mut self,
        kind: ShapeKind,
        params: &ShapeParams,
        rng: &mut R,
    ) -> usize {
        let position = params
            .position()
            .unwrap_or_else(|| self.document.random_position(rng));
        let index = self.document.push(Shape::from_params(kind, params, position));
        log::debug!("Added {} #{} at ({:.1}, {:.1})", kind, index, position.x, position.y);
        index
    }

    /// Append a text object. Unset style fields take the text defaults
    /// (24px, purple).
    pub fn add_text<R: Rng + ?Sized>(
        &mut self,
        content: &str,
        style: &TextStyle,
        position: Option<Point>,
        rng: &mut R,
    ) -> usize {
        let position = position.unwrap_or_else(|| self.document.random_position(rng));
        let params = ShapeParams {
            content: Some(content.to_string()),
            ..ShapeParams::default()
        };
        let shape = match Shape::from_params(ShapeKind::Text, &params, position) {
            Shape::Text(text) => Shape::Text(text.with_style(style)),
            other => other,
        };
        self.document.push(shape)
    }

    /// Index of the active object.
    pub fn selection(&self) -> Option<usize> {
        self.selection
    }

    /// The active object.
    pub fn selected(&self) -> Option<&Shape> {
        self.selection.and_then(|index| self.document.get(index))
    }

    /// Make `index` the active object. Returns false (and leaves the
    /// selection alone) if there is no such object.
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.document.len() {
            self.selection = Some(index);
            true
        } else {
            false
        }
    }

    /// Select the topmost object under a screen point, or nothing.
    pub fn select_at(&mut self, screen_point: Point) -> Option<usize> {
        let world = self.camera.screen_to_world(screen_point);
        self.selection = self
            .document
            .object_at(world, SELECT_TOLERANCE / self.camera.zoom);
        self.selection
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Apply a text property to the active object. Returns false without
    /// touching anything when the active object is missing or not text.
    pub fn restyle_selection(&mut self, change: TextStyleChange) -> bool {
        let Some(text) = self.selected_text_mut() else {
            return false;
        };
        text.apply(change);
        true
    }

    fn selected_text_mut(&mut self) -> Option<&mut Text> {
        let index = self.selection?;
        self.document.get_mut(index)?.as_text_mut()
    }

    /// Remove the active object.
    pub fn remove_selected(&mut self) -> Option<Shape> {
        let index = self.selection.take()?;
        self.document.remove(index)
    }

    /// Remove every object. Calling it on an empty canvas is a no-op.
    pub fn clear(&mut self) {
        self.document.clear();
        self.selection = None;
    }

    /// Swap in a freshly loaded document: scale is normalized, the view is
    /// reset and the selection dropped.
    pub fn replace_document(&mut self, mut document: CanvasDocument) {
        document.normalize();
        self.document = document;
        self.camera.reset();
        self.selection = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{FontWeight, SerializableColor};
    use kurbo::Vec2;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_add_shape_uses_random_position_in_bounds() {
        let mut canvas = Canvas::new();
        let mut rng = rng();
        for _ in 0..50 {
            canvas.add_shape(ShapeKind::Rectangle, &ShapeParams::default(), &mut rng);
        }
        assert_eq!(canvas.document.len(), 50);
        for shape in &canvas.document.objects {
            let origin = shape.origin();
            assert!(origin.x >= 0.0 && origin.x < 400.0);
            assert!(origin.y >= 0.0 && origin.y < 300.0);
        }
    }

    #[test]
    fn test_add_shape_explicit_position() {
        let mut canvas = Canvas::new();
        let params = ShapeParams {
            left: Some(12.0),
            top: Some(34.0),
            ..ShapeParams::default()
        };
        let index = canvas.add_shape(ShapeKind::Circle, &params, &mut rng());
        assert_eq!(canvas.document.objects[index].origin(), Point::new(12.0, 34.0));
    }

    #[test]
    fn test_add_text_defaults() {
        let mut canvas = Canvas::new();
        let index = canvas.add_text("Hello", &TextStyle::default(), None, &mut rng());
        let text = canvas.document.objects[index].as_text().unwrap();
        assert_eq!(text.content, "Hello");
        assert!((text.font_size - 24.0).abs() < f64::EPSILON);
        assert_eq!(text.style.fill_color, Some(SerializableColor::parse("purple").unwrap()));
    }

    #[test]
    fn test_restyle_text_selection() {
        let mut canvas = Canvas::new();
        let index = canvas.add_text("Hello", &TextStyle::default(), Some(Point::ZERO), &mut rng());
        assert!(canvas.select(index));
        assert!(canvas.restyle_selection(TextStyleChange::FontWeight(FontWeight::Bold)));
        assert!(canvas.restyle_selection(TextStyleChange::FontSize(40.0)));
        let text = canvas.selected().and_then(Shape::as_text).unwrap();
        assert_eq!(text.font_weight, FontWeight::Bold);
        assert!((text.font_size - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_restyle_non_text_is_noop() {
        let mut canvas = Canvas::new();
        let index = canvas.add_shape(ShapeKind::Rectangle, &ShapeParams::default(), &mut rng());
        let before = canvas.document.clone();

        assert!(!canvas.restyle_selection(TextStyleChange::FontSize(40.0)));
        canvas.select(index);
        assert!(!canvas.restyle_selection(TextStyleChange::FontSize(40.0)));
        assert_eq!(canvas.document, before);
    }

    #[test]
    fn test_select_out_of_range() {
        let mut canvas = Canvas::new();
        assert!(!canvas.select(0));
        assert_eq!(canvas.selection(), None);
    }

    #[test]
    fn test_select_at_goes_through_camera() {
        let mut canvas = Canvas::new();
        let params = ShapeParams {
            left: Some(100.0),
            top: Some(100.0),
            ..ShapeParams::default()
        };
        canvas.add_shape(ShapeKind::Rectangle, &params, &mut rng());
        canvas.camera.pan(Vec2::new(50.0, 0.0));
        assert_eq!(canvas.select_at(Point::new(120.0, 120.0)), None);
        assert_eq!(canvas.select_at(Point::new(160.0, 120.0)), Some(0));
    }

    #[test]
    fn test_remove_selected() {
        let mut canvas = Canvas::new();
        let mut rng = rng();
        canvas.add_shape(ShapeKind::Rectangle, &ShapeParams::default(), &mut rng);
        canvas.add_shape(ShapeKind::Circle, &ShapeParams::default(), &mut rng);
        canvas.select(0);
        let removed = canvas.remove_selected().unwrap();
        assert_eq!(removed.kind(), ShapeKind::Rectangle);
        assert_eq!(canvas.document.len(), 1);
        assert_eq!(canvas.selection(), None);
        assert!(canvas.remove_selected().is_none());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut canvas = Canvas::new();
        canvas.add_shape(ShapeKind::Triangle, &ShapeParams::default(), &mut rng());
        canvas.clear();
        assert!(canvas.document.is_empty());
        canvas.clear();
        assert!(canvas.document.is_empty());
        assert_eq!(canvas.document.width, 600);
    }

    #[test]
    fn test_replace_document_resets_view_and_selection() {
        let mut canvas = Canvas::new();
        canvas.add_shape(ShapeKind::Circle, &ShapeParams::default(), &mut rng());
        canvas.select(0);
        canvas.camera.zoom_at(Point::new(10.0, 10.0), 2.0);

        let mut loaded = CanvasDocument::new();
        let mut shape =
            Shape::from_params(ShapeKind::Ellipse, &ShapeParams::default(), Point::ZERO);
        shape.set_scale(2.0, 0.0);
        loaded.push(shape);
        canvas.replace_document(loaded);

        assert!(canvas.camera.is_identity());
        assert_eq!(canvas.selection(), None);
        assert_eq!(canvas.document.objects[0].scale(), (1.0, 1.0));
    }
}
