//! Store handle lifecycle.

use crate::models::Entity;
use crate::storage::sqlite::SqliteStore;
use crate::storage::traits::StoreBackend;
use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Exclusive, lifecycle-scoped ownership of one open store instance.
///
/// A handle moves through `Open -> Committed -> Released`, with the
/// abort edge `Open -> Released` (writes discarded) reachable from any
/// failure between open and commit. Release runs at most once per
/// handle; a `Drop` backstop releases a handle the orchestrator never
/// released and logs a warning.
///
/// At most one live handle may exist per store root at a time; the
/// backend's exclusive lock enforces this, and the orchestration layer
/// never attempts overlapping opens.
pub struct StoreHandle {
    backend: Option<Box<dyn StoreBackend>>,
    root: PathBuf,
    committed: bool,
}

impl StoreHandle {
    /// Opens the store rooted at `root`, creating on-disk structures if
    /// absent.
    ///
    /// This is an irrevocable side effect: the root directory and store
    /// file exist afterwards even if the run later aborts.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be opened.
    pub fn open(root: &Path) -> Result<Self> {
        let backend = SqliteStore::open(root)?;
        tracing::debug!(root = %root.display(), "store opened");
        Ok(Self {
            backend: Some(Box::new(backend)),
            root: root.to_path_buf(),
            committed: false,
        })
    }

    /// Returns the store root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes one entity through the handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend write fails or the handle was
    /// already released.
    pub fn write(&mut self, entity: &Entity) -> Result<()> {
        self.backend_mut()?.write(entity)
    }

    /// Commits, making all imported state durable and visible.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend commit fails or the handle was
    /// already released.
    pub fn commit(&mut self) -> Result<()> {
        self.backend_mut()?.commit()?;
        self.committed = true;
        tracing::debug!(root = %self.root.display(), "store committed");
        Ok(())
    }

    /// Releases the handle.
    ///
    /// Runs at most once; later calls are no-ops. Release errors are
    /// logged at `warn` and dropped so they can never mask an earlier,
    /// more informative error from the stream or commit steps.
    pub fn release(&mut self) {
        let Some(backend) = self.backend.take() else {
            return;
        };
        match backend.close() {
            Ok(()) => {
                tracing::debug!(
                    root = %self.root.display(),
                    committed = self.committed,
                    "store released"
                );
            },
            Err(e) => {
                tracing::warn!(root = %self.root.display(), error = %e, "store release failed");
            },
        }
    }

    /// Returns whether the handle has been released.
    #[must_use]
    pub const fn is_released(&self) -> bool {
        self.backend.is_none()
    }

    fn backend_mut(&mut self) -> Result<&mut (dyn StoreBackend + 'static)> {
        match self.backend.as_deref_mut() {
            Some(backend) => Ok(backend),
            None => Err(Error::operation("store_access", "handle already released")),
        }
    }
}

impl Drop for StoreHandle {
    fn drop(&mut self) {
        if self.backend.is_some() {
            tracing::warn!(root = %self.root.display(), "store handle dropped without release");
            self.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntityId, EntityKind};
    use crate::storage::sqlite::SqliteStore;
    use serde_json::json;
    use tempfile::TempDir;

    fn entity(stamp_ms: i64) -> Entity {
        Entity::new(EntityId::random(), EntityKind::Concept, stamp_ms, json!({}))
    }

    #[test]
    fn test_commit_then_release_persists() {
        let dir = TempDir::new().unwrap();

        let mut handle = StoreHandle::open(dir.path()).unwrap();
        handle.write(&entity(1)).unwrap();
        handle.commit().unwrap();
        handle.release();
        assert!(handle.is_released());

        let store = SqliteStore::attach(dir.path()).unwrap();
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_release_without_commit_discards() {
        let dir = TempDir::new().unwrap();

        let mut handle = StoreHandle::open(dir.path()).unwrap();
        handle.write(&entity(1)).unwrap();
        handle.release();

        let store = SqliteStore::attach(dir.path()).unwrap();
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_release_is_idempotent() {
        let dir = TempDir::new().unwrap();

        let mut handle = StoreHandle::open(dir.path()).unwrap();
        handle.release();
        handle.release();
        assert!(handle.is_released());
    }

    #[test]
    fn test_write_after_release_fails() {
        let dir = TempDir::new().unwrap();

        let mut handle = StoreHandle::open(dir.path()).unwrap();
        handle.release();
        assert!(handle.write(&entity(1)).is_err());
        assert!(handle.commit().is_err());
    }

    #[test]
    fn test_drop_backstop_releases_lock() {
        let dir = TempDir::new().unwrap();

        {
            let mut handle = StoreHandle::open(dir.path()).unwrap();
            handle.write(&entity(1)).unwrap();
            // Dropped without release; the backstop must still free the
            // exclusive lock.
        }

        let mut handle = StoreHandle::open(dir.path()).unwrap();
        handle.commit().unwrap();
        handle.release();
    }
}
