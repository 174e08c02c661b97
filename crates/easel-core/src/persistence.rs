//! Name resolution and load/save plumbing between a [`Canvas`] and a
//! [`Storage`] backend.

use crate::canvas::Canvas;
use crate::config::PersistenceConfig;
use crate::document::CanvasDocument;
use crate::storage::{
    BoxFuture, KeyValueStore, LocalStorage, Storage, StorageResult, validate_name,
};

/// Shown after a save when the backend sent no message of its own.
pub const SAVED_NOTICE: &str = "Canvas saved!";

/// A completed save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Saved {
    /// Name the design was stored under.
    pub name: String,
    /// Acknowledgement from the backend, if any.
    pub message: Option<String>,
}

impl Saved {
    /// The backend's message, or [`SAVED_NOTICE`].
    pub fn notice(&self) -> &str {
        self.message.as_deref().unwrap_or(SAVED_NOTICE)
    }
}

/// A storage backend plus the configuration used to address it.
pub struct Persistence<S> {
    storage: S,
    config: PersistenceConfig,
}

impl<S: Storage> Persistence<S> {
    pub fn new(storage: S, config: PersistenceConfig) -> Self {
        Self { storage, config }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn config(&self) -> &PersistenceConfig {
        &self.config
    }

    /// `None` means the configured default name; a blank name is rejected.
    pub fn resolve_name<'a>(&'a self, name: Option<&'a str>) -> StorageResult<&'a str> {
        validate_name(name.unwrap_or(&self.config.default_name))
    }

    /// Save the document under `name` or the default name.
    pub async fn save(
        &self,
        name: Option<&str>,
        document: &CanvasDocument,
    ) -> StorageResult<Saved> {
        let name = self.resolve_name(name)?.to_string();
        let message = self.storage.save(&name, document).await?;
        Ok(Saved { name, message })
    }

    /// Start loading a design. The returned future holds no borrow of any
    /// canvas, so editing can go on while it is pending; hand the result to
    /// [`Persistence::apply`].
    pub fn fetch(&self, name: Option<&str>) -> BoxFuture<'_, StorageResult<CanvasDocument>> {
        match self.resolve_name(name) {
            Ok(name) => self.storage.load(name),
            Err(e) => Box::pin(std::future::ready(Err(e))),
        }
    }

    /// Install a fetched document into the canvas.
    pub fn apply(canvas: &mut Canvas, document: CanvasDocument) {
        log::info!("Loaded design with {} object(s)", document.len());
        canvas.replace_document(document);
    }

    /// Fetch and apply in one step. On failure the canvas is untouched.
    pub async fn load_into(&self, name: Option<&str>, canvas: &mut Canvas) -> StorageResult<()> {
        let document = self.fetch(name).await?;
        Self::apply(canvas, document);
        Ok(())
    }

    pub async fn list(&self) -> StorageResult<Vec<String>> {
        self.storage.list().await
    }

    pub async fn delete(&self, name: Option<&str>) -> StorageResult<()> {
        let name = self.resolve_name(name)?;
        self.storage.delete(name).await
    }

    pub async fn exists(&self, name: Option<&str>) -> StorageResult<bool> {
        let name = self.resolve_name(name)?;
        self.storage.exists(name).await
    }
}

impl<K: KeyValueStore> Persistence<LocalStorage<K>> {
    /// Synchronous save for the local backend.
    pub fn save_sync(
        &self,
        name: Option<&str>,
        document: &CanvasDocument,
    ) -> StorageResult<String> {
        let name = self.resolve_name(name)?;
        self.storage.save_sync(name, document)?;
        Ok(name.to_string())
    }

    /// Synchronous load for the local backend. On failure the canvas is untouched.
    pub fn load_sync_into(&self, name: Option<&str>, canvas: &mut Canvas) -> StorageResult<()> {
        let name = self.resolve_name(name)?;
        let document = self.storage.load_sync(name)?;
        Self::apply(canvas, document);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{ShapeKind, ShapeParams};
    use crate::storage::{MemoryStore, StorageError, block_on};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn local() -> Persistence<LocalStorage<MemoryStore>> {
        Persistence::new(LocalStorage::new(MemoryStore::new()), PersistenceConfig::default())
    }

    fn canvas_with(kind: ShapeKind) -> Canvas {
        let mut canvas = Canvas::new();
        canvas.add_shape(kind, &ShapeParams::default(), &mut StdRng::seed_from_u64(1));
        canvas
    }

    #[test]
    fn test_default_name() {
        let persistence = local();
        assert_eq!(persistence.resolve_name(None).unwrap(), "myCanvas");
        assert_eq!(persistence.resolve_name(Some("poster")).unwrap(), "poster");
        assert!(matches!(
            persistence.resolve_name(Some("")),
            Err(StorageError::InvalidName)
        ));
    }

    #[test]
    fn test_blank_default_name_is_rejected() {
        let config = PersistenceConfig::default().with_default_name(" ");
        let persistence = Persistence::new(LocalStorage::new(MemoryStore::new()), config);
        assert!(matches!(
            persistence.save_sync(None, &CanvasDocument::new()),
            Err(StorageError::InvalidName)
        ));
    }

    #[test]
    fn test_save_and_load_replace_document() {
        let persistence = local();
        let source = canvas_with(ShapeKind::Circle);
        assert_eq!(persistence.save_sync(None, &source.document).unwrap(), "myCanvas");

        let mut target = canvas_with(ShapeKind::Rectangle);
        target.select(0);
        persistence.load_sync_into(None, &mut target).unwrap();
        assert_eq!(target.document, source.document);
        assert_eq!(target.selection(), None);
    }

    #[test]
    fn test_failed_load_leaves_canvas_alone() {
        let persistence = local();
        let mut canvas = canvas_with(ShapeKind::Triangle);
        let before = canvas.document.clone();

        let err = persistence.load_sync_into(Some("missing"), &mut canvas).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(canvas.document, before);

        persistence.storage().store().set("broken", "[]").unwrap();
        assert!(matches!(
            persistence.load_sync_into(Some("broken"), &mut canvas),
            Err(StorageError::Corrupt { .. })
        ));
        assert_eq!(canvas.document, before);
    }

    #[test]
    fn test_fetch_then_apply() {
        let persistence = local();
        let source = canvas_with(ShapeKind::Ellipse);
        block_on(persistence.save(Some("later"), &source.document)).unwrap();

        let pending = persistence.fetch(Some("later"));
        let mut canvas = Canvas::new();
        let mut rng = StdRng::seed_from_u64(2);
        canvas.add_text("typed meanwhile", &Default::default(), None, &mut rng);
        let fetched = block_on(pending).unwrap();
        Persistence::<LocalStorage<MemoryStore>>::apply(&mut canvas, fetched);
        assert_eq!(canvas.document, source.document);
    }

    #[test]
    fn test_local_save_uses_default_notice() {
        let persistence = local();
        let saved = block_on(persistence.save(Some("quiet"), &CanvasDocument::new())).unwrap();
        assert_eq!(saved.name, "quiet");
        assert_eq!(saved.message, None);
        assert_eq!(saved.notice(), "Canvas saved!");

        let acknowledged = Saved {
            name: "loud".to_string(),
            message: Some("Stored on server".to_string()),
        };
        assert_eq!(acknowledged.notice(), "Stored on server");
    }

    #[test]
    fn test_async_list_delete_exists() {
        let persistence = local();
        block_on(persistence.save(Some("a"), &CanvasDocument::new())).unwrap();
        assert!(block_on(persistence.exists(Some("a"))).unwrap());
        assert_eq!(block_on(persistence.list()).unwrap(), vec!["a".to_string()]);
        block_on(persistence.delete(Some("a"))).unwrap();
        assert!(!block_on(persistence.exists(Some("a"))).unwrap());
    }
}
