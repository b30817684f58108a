//! Streaming import pass.

use crate::io::artifact::ArtifactReader;
use crate::models::{CountSummary, WatchSet};
use crate::storage::StoreHandle;
use crate::Result;
use std::path::Path;

/// One streaming decode-and-write pass over an import artifact.
///
/// Records are written in the order they are decoded. The watch set is
/// consulted purely to decide whether to emit a diagnostic line per
/// matching identifier; membership never alters what is written or the
/// outcome of the run.
pub struct ImportStream<'a> {
    artifact: &'a Path,
    handle: &'a mut StoreHandle,
    watch: &'a WatchSet,
}

impl<'a> ImportStream<'a> {
    /// Creates a stream over `artifact` writing through `handle`.
    pub fn new(artifact: &'a Path, handle: &'a mut StoreHandle, watch: &'a WatchSet) -> Self {
        Self {
            artifact,
            handle,
            watch,
        }
    }

    /// Consumes the whole artifact, writing every record into the store.
    ///
    /// # Errors
    ///
    /// Returns an error on the first decode or write failure. Records
    /// already written remain pending in the handle; the caller decides
    /// whether they are committed or discarded.
    pub fn run_to_completion(self) -> Result<CountSummary> {
        let mut reader = ArtifactReader::open(self.artifact)?;
        let mut summary = CountSummary::new();

        while let Some(entity) = reader.next()? {
            if self.watch.contains(&entity.id) {
                tracing::info!(
                    id = %entity.id,
                    kind = %entity.kind,
                    stamp = %entity.stamp_utc(),
                    "watched entity in import stream"
                );
            }
            self.handle.write(&entity)?;
            summary.record(entity.kind);
        }

        tracing::debug!(artifact = %self.artifact.display(), %summary, "import stream drained");
        Ok(summary)
    }
}
