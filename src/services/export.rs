//! Export orchestration.

use crate::models::{CountSummary, TemporalWindow};
use crate::services::entity::EntityService;
use crate::{ConfigError, MigrationError, Result};
use std::path::Path;

/// Orchestrates one export run.
///
/// Chooses full versus windowed export, starts the export task, and
/// suspends the calling task until it resolves. Nothing is retried; any
/// failure surfaced by the task is wrapped and propagated.
pub struct ExportOrchestrator {
    service: EntityService,
}

impl ExportOrchestrator {
    /// Creates an orchestrator over the given entity service.
    #[must_use]
    pub const fn new(service: EntityService) -> Self {
        Self { service }
    }

    /// Runs one export.
    ///
    /// With a window, entities whose version stamp falls in
    /// `[from, to)` are exported; without one, everything is. On
    /// success the artifact exists at `output` and the returned summary
    /// reflects what was written.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidInput`] for an empty output path,
    /// and [`MigrationError::ExportFailed`] for any failure in the
    /// export task itself.
    pub async fn run(
        &self,
        output: &Path,
        window: Option<TemporalWindow>,
    ) -> Result<CountSummary> {
        if output.as_os_str().is_empty() {
            return Err(ConfigError::InvalidInput("output path must not be empty".to_string()).into());
        }
        self.ensure_parent_dir(output)?;

        let task = match window {
            Some(window) => {
                tracing::info!(
                    %window,
                    output = %output.display(),
                    "starting temporal export"
                );
                self.service
                    .temporal_export(output, window.from_ms(), window.to_ms())
            },
            None => {
                tracing::info!(output = %output.display(), "starting full export");
                self.service.full_export(output)
            },
        };

        // Suspend here until the export task resolves; the task is
        // submitted exactly once.
        let joined = task.await;
        let summary = match joined {
            Ok(Ok(summary)) => summary,
            Ok(Err(e)) => return Err(self.export_failed(output, e)),
            Err(e) => return Err(self.export_failed(output, format!("export task aborted: {e}"))),
        };

        tracing::info!(%summary, output = %output.display(), "export complete");
        Ok(summary)
    }

    /// Creates the output path's parent directory if missing.
    fn ensure_parent_dir(&self, output: &Path) -> Result<()> {
        let Some(parent) = output.parent() else {
            return Ok(());
        };
        if parent.as_os_str().is_empty() {
            return Ok(());
        }
        std::fs::create_dir_all(parent).map_err(|e| self.export_failed(output, e))
    }

    fn export_failed(&self, output: &Path, cause: impl std::fmt::Display) -> crate::Error {
        MigrationError::ExportFailed {
            path: output.display().to_string(),
            cause: cause.to_string(),
        }
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Entity, EntityId, EntityKind};
    use crate::storage::StoreHandle;
    use crate::Error;
    use serde_json::json;
    use tempfile::TempDir;

    fn seed_store(root: &Path, count: usize) {
        let mut handle = StoreHandle::open(root).unwrap();
        for n in 0..count {
            handle
                .write(&Entity::new(
                    EntityId::random(),
                    EntityKind::Concept,
                    n as i64,
                    json!({}),
                ))
                .unwrap();
        }
        handle.commit().unwrap();
        handle.release();
    }

    #[test]
    fn test_empty_output_path_rejected_before_store_access() {
        let orchestrator = ExportOrchestrator::new(EntityService::new("/nonexistent"));
        let err = tokio_test::block_on(async {
            orchestrator.run(Path::new(""), None).await.unwrap_err()
        });
        assert!(matches!(err, Error::Config(ConfigError::InvalidInput(_))));
    }

    #[test]
    fn test_full_export_creates_artifact_and_counts() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("kb");
        seed_store(&root, 10);

        let output = dir.path().join("exports").join("a.tink");
        let orchestrator = ExportOrchestrator::new(EntityService::new(&root));
        let summary = tokio_test::block_on(async {
            orchestrator.run(&output, None).await.unwrap()
        });

        assert_eq!(summary.total(), 10);
        assert!(output.is_file());
    }

    #[test]
    fn test_windowed_export_restricts_to_window() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("kb");
        seed_store(&root, 10);

        let window = TemporalWindow::validate(Some(2), Some(5)).unwrap();
        let output = dir.path().join("b.tink");
        let orchestrator = ExportOrchestrator::new(EntityService::new(&root));
        let summary = tokio_test::block_on(async {
            orchestrator.run(&output, window).await.unwrap()
        });

        assert_eq!(summary.total(), 3);
    }

    #[test]
    fn test_missing_store_wrapped_as_export_failed() {
        let dir = TempDir::new().unwrap();
        let orchestrator =
            ExportOrchestrator::new(EntityService::new(dir.path().join("nowhere")));
        let output = dir.path().join("c.tink");
        let err = tokio_test::block_on(async {
            orchestrator.run(&output, None).await.unwrap_err()
        });
        assert!(matches!(
            err,
            Error::Migration(MigrationError::ExportFailed { .. })
        ));
    }
}
