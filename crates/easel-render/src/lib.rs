//! Easel Render Library
//!
//! Renderer abstraction and a CPU raster implementation used for live
//! frames and PNG/JPEG export.

pub mod encode;
mod raster;
mod renderer;

pub use encode::JPEG_QUALITY;
pub use raster::{Pixmap, RasterRenderer, rasterize};
pub use renderer::{ImageFormat, RenderContext, RenderError, RenderResult, Renderer};
