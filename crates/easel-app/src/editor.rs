//! The editing session: a canvas, the renderer drawing it, and the
//! commands a user can issue.

use easel_core::canvas::Canvas;
use easel_core::document::CanvasDocument;
use easel_core::persistence::{Persistence, Saved};
use easel_core::shapes::{
    Shape, ShapeKind, ShapeParams, StyleError, TextStyle, TextStyleChange,
};
use easel_core::storage::{KeyValueStore, LocalStorage, Storage, StorageError};
use easel_render::{ImageFormat, RenderContext, RenderError, Renderer};
use kurbo::{Point, Vec2};
use rand::SeedableRng;
use rand::rngs::StdRng;
use thiserror::Error;

/// Export name used when the design has none.
pub const FALLBACK_EXPORT_NAME: &str = "canvas";

/// Editor errors. None of them end the session.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Style(#[from] StyleError),
}

impl EditorError {
    /// Short message suitable for showing to the user.
    pub fn notice(&self) -> String {
        match self {
            EditorError::Storage(StorageError::InvalidName) => {
                "Please enter a design name".to_string()
            }
            EditorError::Storage(StorageError::ReservedName(name)) => {
                format!("{:?} cannot be used as a design name", name)
            }
            EditorError::Storage(StorageError::NotFound(name)) => {
                format!("Failed to load canvas: no design named {:?}", name)
            }
            EditorError::Storage(StorageError::Corrupt { name, .. }) => {
                format!("Failed to load canvas: {:?} is damaged", name)
            }
            EditorError::Storage(StorageError::Transport(_)) => {
                "Could not reach the canvas server".to_string()
            }
            EditorError::Storage(StorageError::Server { status, message }) => {
                format!("Server refused the request ({}): {}", status, message)
            }
            EditorError::Storage(e) => format!("Storage failed: {}", e),
            EditorError::Render(e) => format!("Export failed: {}", e),
            EditorError::Style(e) => e.to_string(),
        }
    }
}

/// Result type for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;

/// An encoded image ready to be written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterExport {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub format: ImageFormat,
}

/// `<name>.<ext>`, or `canvas.<ext>` for a blank name.
pub fn export_filename(name: Option<&str>, format: ImageFormat) -> String {
    let stem = name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(FALLBACK_EXPORT_NAME);
    format!("{}.{}", stem, format.extension())
}

/// One editing session. The renderer is acquired on creation and disposed
/// when the editor is dropped.
pub struct Editor<R: Renderer> {
    canvas: Canvas,
    renderer: R,
    rng: StdRng,
}

impl<R: Renderer> Editor<R> {
    /// Create an editor with an empty 600x400 canvas.
    pub fn new(renderer: R) -> Self {
        Self::with_rng(renderer, StdRng::from_os_rng())
    }

    /// Create an editor with a caller-supplied placement RNG.
    pub fn with_rng(renderer: R, rng: StdRng) -> Self {
        let mut editor = Self {
            canvas: Canvas::new(),
            renderer,
            rng,
        };
        editor.refresh();
        editor
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn document(&self) -> &CanvasDocument {
        &self.canvas.document
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Redraw. Failures are logged; the document is already up to date.
    fn refresh(&mut self) {
        if let Err(e) = self.renderer.render(&RenderContext::new(&self.canvas)) {
            log::warn!("Render failed: {}", e);
        }
    }

    pub fn add_shape(&mut self, kind: ShapeKind, params: &ShapeParams) -> usize {
        let index = self.canvas.add_shape(kind, params, &mut self.rng);
        self.refresh();
        index
    }

    pub fn add_text(&mut self, content: &str, style: &TextStyle, position: Option<Point>) -> usize {
        let index = self.canvas.add_text(content, style, position, &mut self.rng);
        self.refresh();
        index
    }

    pub fn select(&mut self, index: usize) -> bool {
        let selected = self.canvas.select(index);
        self.refresh();
        selected
    }

    pub fn select_at(&mut self, screen_point: Point) -> Option<usize> {
        let hit = self.canvas.select_at(screen_point);
        self.refresh();
        hit
    }

    pub fn clear_selection(&mut self) {
        self.canvas.clear_selection();
        self.refresh();
    }

    /// Change a text property of the active object. Returns false and does
    /// nothing when the active object is not text.
    pub fn restyle_selection(&mut self, change: TextStyleChange) -> bool {
        let changed = self.canvas.restyle_selection(change);
        if changed {
            self.refresh();
        }
        changed
    }

    /// [`Editor::restyle_selection`] from a `(property, value)` pair.
    pub fn restyle_selection_str(&mut self, property: &str, value: &str) -> EditorResult<bool> {
        let change = TextStyleChange::parse(property, value)?;
        Ok(self.restyle_selection(change))
    }

    pub fn remove_selected(&mut self) -> Option<Shape> {
        let removed = self.canvas.remove_selected();
        if removed.is_some() {
            self.refresh();
        }
        removed
    }

    /// Empty the canvas. Safe to repeat.
    pub fn clear(&mut self) {
        self.canvas.clear();
        self.refresh();
        log::info!("Canvas cleared");
    }

    pub fn pan(&mut self, delta: Vec2) {
        self.canvas.camera.pan(delta);
        self.refresh();
    }

    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) {
        self.canvas.camera.zoom_at(screen_point, factor);
        self.refresh();
    }

    pub fn reset_view(&mut self) {
        self.canvas.camera.reset();
        self.refresh();
    }

    /// Encode the canvas as seen through the current view.
    pub fn export_raster(
        &mut self,
        format: ImageFormat,
        name: Option<&str>,
    ) -> EditorResult<RasterExport> {
        let bytes = self.renderer.export(&self.canvas, format)?;
        Ok(RasterExport {
            bytes,
            filename: export_filename(name, format),
            format,
        })
    }

    /// Save the current document. The result carries the name it was stored
    /// under and the notice to show.
    pub async fn save<S: Storage>(
        &self,
        persistence: &Persistence<S>,
        name: Option<&str>,
    ) -> EditorResult<Saved> {
        Ok(persistence.save(name, &self.canvas.document).await?)
    }

    /// Replace the document with a stored one. On failure nothing changes.
    pub async fn load<S: Storage>(
        &mut self,
        persistence: &Persistence<S>,
        name: Option<&str>,
    ) -> EditorResult<()> {
        let document = persistence.fetch(name).await?;
        self.apply_loaded(document);
        Ok(())
    }

    /// Install a document obtained with [`Persistence::fetch`].
    pub fn apply_loaded(&mut self, document: CanvasDocument) {
        self.canvas.replace_document(document);
        self.refresh();
    }

    pub fn save_local<K: KeyValueStore>(
        &self,
        persistence: &Persistence<LocalStorage<K>>,
        name: Option<&str>,
    ) -> EditorResult<String> {
        Ok(persistence.save_sync(name, &self.canvas.document)?)
    }

    pub fn load_local<K: KeyValueStore>(
        &mut self,
        persistence: &Persistence<LocalStorage<K>>,
        name: Option<&str>,
    ) -> EditorResult<()> {
        persistence.load_sync_into(name, &mut self.canvas)?;
        self.refresh();
        Ok(())
    }

    /// Release the renderer. Later exports fail with a disposed error.
    pub fn dispose(&mut self) {
        self.renderer.dispose();
    }
}

impl<R: Renderer> Drop for Editor<R> {
    fn drop(&mut self) {
        if !self.renderer.is_disposed() {
            self.renderer.dispose();
        }
    }
}
