//! Import orchestration.

use crate::io::stream::ImportStream;
use crate::models::{CountSummary, WatchSet};
use crate::storage::StoreHandle;
use crate::{ConfigError, MigrationError, Result};
use std::path::Path;

/// Orchestrates one import run.
///
/// The run is a single blocking pass: validate the artifact, open the
/// store, stream records in, commit, release. Release is reached
/// exactly once on every path out of the guarded body — success, decode
/// failure, write failure, or commit failure.
pub struct ImportOrchestrator;

impl ImportOrchestrator {
    /// Creates an orchestrator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Runs one import of `artifact` into a store opened at
    /// `store_root`.
    ///
    /// The watch set only controls diagnostic logging during the
    /// stream; it never changes what is written or the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidInput`] if the artifact is not an
    /// existing regular file (before any store side effect),
    /// [`MigrationError::StorageOpenFailed`] if the store cannot be
    /// opened, and [`MigrationError::ImportFailed`] for any stream or
    /// commit failure — raised only after release has been attempted.
    pub fn run(
        &self,
        artifact: &Path,
        store_root: &Path,
        watch: &WatchSet,
    ) -> Result<CountSummary> {
        if !artifact.is_file() {
            return Err(ConfigError::InvalidInput(format!(
                "import file does not exist: {}",
                artifact.display()
            ))
            .into());
        }

        tracing::info!(
            artifact = %artifact.display(),
            store_root = %store_root.display(),
            watched = watch.len(),
            "starting import"
        );

        let mut handle = StoreHandle::open(store_root).map_err(|e| {
            MigrationError::StorageOpenFailed {
                root: store_root.display().to_string(),
                cause: e.to_string(),
            }
        })?;

        let outcome = stream_and_commit(artifact, &mut handle, watch);

        // Unconditional: every path out of the guarded body goes
        // through release before the error is rethrown.
        handle.release();

        match outcome {
            Ok(summary) => {
                tracing::info!(%summary, "import complete");
                Ok(summary)
            },
            Err(e) => Err(MigrationError::ImportFailed {
                path: artifact.display().to_string(),
                cause: e.to_string(),
            }
            .into()),
        }
    }
}

impl Default for ImportOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

/// The guarded body between open and release.
fn stream_and_commit(
    artifact: &Path,
    handle: &mut StoreHandle,
    watch: &WatchSet,
) -> Result<CountSummary> {
    let summary = ImportStream::new(artifact, handle, watch).run_to_completion()?;
    handle.commit()?;
    Ok(summary)
}
