//! Renderer trait abstraction.

use easel_core::canvas::Canvas;
use peniko::Color;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Renderer has been disposed")]
    Disposed,
    #[error("Cannot render a {width}x{height} image")]
    InvalidSize { width: u32, height: u32 },
    #[error("Encoding failed: {0}")]
    Encode(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Raster formats an export can be written as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFormat {
    #[default]
    Png,
    /// Always written at maximum quality.
    Jpeg,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ImageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(ImageFormat::Png),
            "jpg" | "jpeg" => Ok(ImageFormat::Jpeg),
            other => Err(format!("Unsupported image format: {}", other)),
        }
    }
}

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// The canvas to render.
    pub canvas: &'a Canvas,
    /// Outline the active object.
    pub show_selection: bool,
    /// Selection highlight color.
    pub selection_color: Color,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(canvas: &'a Canvas) -> Self {
        Self {
            canvas,
            show_selection: true,
            selection_color: Color::from_rgba8(59, 130, 246, 255), // Blue
        }
    }

    /// Frame for export: objects only.
    pub fn for_export(canvas: &'a Canvas) -> Self {
        Self {
            show_selection: false,
            ..Self::new(canvas)
        }
    }

    /// Set the selection color.
    pub fn with_selection_color(mut self, color: Color) -> Self {
        self.selection_color = color;
        self
    }
}

/// Trait for rendering backends.
///
/// A renderer is acquired once per editing session and released with
/// [`Renderer::dispose`]; every call after that fails with
/// [`RenderError::Disposed`].
pub trait Renderer: Send + Sync {
    /// Redraw the canvas after a change.
    fn render(&mut self, ctx: &RenderContext) -> RenderResult<()>;

    /// Rasterize the document through the current view at the document's
    /// pixel size and encode it. Never touches the canvas.
    fn export(&mut self, canvas: &Canvas, format: ImageFormat) -> RenderResult<Vec<u8>>;

    /// Release the renderer's resources. Calling it twice is harmless.
    fn dispose(&mut self);

    fn is_disposed(&self) -> bool;
}
