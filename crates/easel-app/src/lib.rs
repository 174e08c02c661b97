//! Easel Application
//!
//! The editing session tying the document model, a renderer and the
//! storage backends together, plus the command-line front end.

pub mod cli;
mod editor;

pub use editor::{
    Editor, EditorError, EditorResult, FALLBACK_EXPORT_NAME, RasterExport, export_filename,
};
