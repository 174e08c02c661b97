//! Storage abstraction for persistence.
//!
//! Two backends implement [`Storage`]: [`LocalStorage`], a synchronous
//! key-value store (in memory, a directory of files, or the browser's
//! `localStorage`), and [`RemoteStorage`], which talks to an HTTP service.

mod local;
mod memory;
mod remote;

#[cfg(not(target_arch = "wasm32"))]
mod file;

#[cfg(target_arch = "wasm32")]
mod browser;

pub use local::{KeyValueStore, LocalStorage};
pub use memory::MemoryStore;
pub use remote::RemoteStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStore;

#[cfg(target_arch = "wasm32")]
pub use browser::BrowserStore;

use crate::document::CanvasDocument;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Design name must not be blank")]
    InvalidName,
    #[error("{0:?} cannot be used as a design name")]
    ReservedName(String),
    #[error("Design not found: {0}")]
    NotFound(String),
    #[error("Design {name:?} could not be decoded: {reason}")]
    Corrupt { name: String, reason: String },
    #[error("Could not reach the server: {0}")]
    Transport(String),
    #[error("Server rejected the request ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

impl StorageError {
    /// Whether the failure means "there is no such design".
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Reject blank design names and the dot segments `.` and `..`, which a
/// URL path cannot carry. The name itself is used as-is.
pub fn validate_name(name: &str) -> StorageResult<&str> {
    if name.trim().is_empty() {
        Err(StorageError::InvalidName)
    } else if name == "." || name == ".." {
        Err(StorageError::ReservedName(name.to_string()))
    } else {
        Ok(name)
    }
}

/// Trait for design storage backends.
///
/// Saving under an existing name overwrites it. A failed load never yields
/// a partial document.
///
/// Note: On native platforms, implementations must be Send + Sync.
/// On WASM, these bounds are relaxed since it's single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub trait Storage: Send + Sync {
    /// Save a design under `name`. Resolves to the backend's
    /// acknowledgement message, if it sent one.
    fn save(
        &self,
        name: &str,
        document: &CanvasDocument,
    ) -> BoxFuture<'_, StorageResult<Option<String>>>;

    /// Load the design saved under `name`.
    fn load(&self, name: &str) -> BoxFuture<'_, StorageResult<CanvasDocument>>;

    /// Delete a design. Deleting a missing design is not an error.
    fn delete(&self, name: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// List all design names.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    /// Check if a design exists.
    fn exists(&self, name: &str) -> BoxFuture<'_, StorageResult<bool>>;
}

/// Trait for design storage backends (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait Storage {
    /// Save a design under `name`. Resolves to the backend's
    /// acknowledgement message, if it sent one.
    fn save(
        &self,
        name: &str,
        document: &CanvasDocument,
    ) -> BoxFuture<'_, StorageResult<Option<String>>>;

    /// Load the design saved under `name`.
    fn load(&self, name: &str) -> BoxFuture<'_, StorageResult<CanvasDocument>>;

    /// Delete a design. Deleting a missing design is not an error.
    fn delete(&self, name: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// List all design names.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    /// Check if a design exists.
    fn exists(&self, name: &str) -> BoxFuture<'_, StorageResult<bool>>;
}

/// Minimal executor for futures that are ready on first poll.
#[cfg(test)]
pub(crate) fn block_on<F: Future>(f: F) -> F::Output {
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    fn dummy_raw_waker() -> RawWaker {
        fn no_op(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            dummy_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    let mut f = std::pin::pin!(f);

    loop {
        if let Poll::Ready(result) = f.as_mut().poll(&mut cx) {
            return result;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("poster").unwrap(), "poster");
        assert_eq!(validate_name(" padded ").unwrap(), " padded ");
        assert!(matches!(validate_name(""), Err(StorageError::InvalidName)));
        assert!(matches!(validate_name(" \t"), Err(StorageError::InvalidName)));
        assert!(matches!(validate_name("."), Err(StorageError::ReservedName(_))));
        assert!(matches!(validate_name(".."), Err(StorageError::ReservedName(_))));
        assert_eq!(validate_name("...").unwrap(), "...");
        assert_eq!(validate_name("../poster").unwrap(), "../poster");
    }
}
