//! Entity export service.

use crate::io::artifact::ArtifactWriter;
use crate::models::CountSummary;
use crate::storage::SqliteStore;
use crate::Result;
use std::path::{Path, PathBuf};
use tokio::task::JoinHandle;

/// Read-side service over one entity store.
///
/// Export entry points start an asynchronous task and hand back its
/// handle; the pass itself is a blocking scan-and-write, so it runs on
/// the blocking pool. The store root is an explicit value fixed at
/// construction.
pub struct EntityService {
    store_root: PathBuf,
}

impl EntityService {
    /// Creates a service over the store rooted at `store_root`.
    pub fn new(store_root: impl Into<PathBuf>) -> Self {
        Self {
            store_root: store_root.into(),
        }
    }

    /// Returns the store root directory.
    #[must_use]
    pub fn store_root(&self) -> &Path {
        &self.store_root
    }

    /// Starts a task exporting every entity in the store to `output`.
    pub fn full_export(&self, output: &Path) -> JoinHandle<Result<CountSummary>> {
        self.spawn_export(output.to_path_buf(), None)
    }

    /// Starts a task exporting entities whose version stamp falls in
    /// `[from_ms, to_ms)` to `output`.
    pub fn temporal_export(
        &self,
        output: &Path,
        from_ms: i64,
        to_ms: i64,
    ) -> JoinHandle<Result<CountSummary>> {
        self.spawn_export(output.to_path_buf(), Some((from_ms, to_ms)))
    }

    fn spawn_export(
        &self,
        output: PathBuf,
        bounds: Option<(i64, i64)>,
    ) -> JoinHandle<Result<CountSummary>> {
        let root = self.store_root.clone();
        tokio::task::spawn_blocking(move || export_pass(&root, &output, bounds))
    }
}

/// One blocking scan-and-write pass over the store.
fn export_pass(root: &Path, output: &Path, bounds: Option<(i64, i64)>) -> Result<CountSummary> {
    let store = SqliteStore::attach(root)?;
    let mut writer = ArtifactWriter::create(output)?;
    let mut summary = CountSummary::new();

    store.scan(bounds, &mut |entity| {
        writer.write(&entity)?;
        summary.record(entity.kind);
        Ok(())
    })?;

    let written = writer.finish()?;
    tracing::debug!(records = written, artifact = %output.display(), "export pass finished");
    Ok(summary)
}
