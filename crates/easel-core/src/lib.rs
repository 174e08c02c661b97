//! Easel Core Library
//!
//! Platform-agnostic document model and persistence for the Easel canvas
//! editor: drawable objects, the canvas document and its serialized form,
//! the view transform, and storage backends (local key-value and remote HTTP).

pub mod camera;
pub mod canvas;
pub mod config;
pub mod document;
pub mod persistence;
pub mod shapes;
pub mod storage;

pub use camera::Camera;
pub use canvas::Canvas;
pub use config::PersistenceConfig;
pub use document::{CanvasDocument, DocumentError, SerializedDocument};
pub use persistence::{Persistence, Saved};
pub use shapes::{Shape, ShapeKind, ShapeParams, TextStyle, TextStyleChange};
pub use storage::{Storage, StorageError, StorageResult};
