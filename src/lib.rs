//! # Kbport
//!
//! Bulk export and import for versioned entity knowledge bases.
//!
//! Kbport migrates an entity store to and from a portable serialized
//! artifact. An export serializes some or all entities in a store,
//! optionally restricted to a half-open time window, into a single
//! newline-delimited artifact. An import streams an artifact into a
//! freshly opened store, with open/commit/release lifecycle guarantees
//! and optional per-identifier diagnostic tracing.
//!
//! ## Example
//!
//! ```rust,ignore
//! use kbport::{EntityService, ExportOrchestrator, TemporalWindow};
//!
//! let service = EntityService::new("/var/lib/kb");
//! let window = TemporalWindow::validate(Some(1000), Some(2000))?;
//! let summary = ExportOrchestrator::new(service)
//!     .run(Path::new("/tmp/out.tink"), window)
//!     .await?;
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod config;
pub mod io;
pub mod models;
pub mod observability;
pub mod services;
pub mod storage;

// Re-exports for convenience
pub use config::KbportConfig;
pub use models::{CountSummary, Entity, EntityId, EntityKind, TemporalWindow, WatchSet};
pub use services::{EntityService, ExportOrchestrator, ImportOrchestrator};
pub use storage::{SqliteStore, StoreBackend, StoreHandle};

/// Caller-input errors, detected before any external resource is touched.
///
/// Configuration errors are always fatal to the invocation and never
/// retried; by the time one is raised, no store has been opened and no
/// artifact has been written.
#[derive(Debug, ThisError)]
pub enum ConfigError {
    /// Exactly one window bound was supplied.
    ///
    /// A window is either fully absent (full export) or fully present
    /// (windowed export); a half-specified window is a configuration
    /// error, not a degraded mode.
    #[error("incomplete export window: --from-epoch and --to-epoch must be given together")]
    IncompleteWindow,

    /// Both window bounds were supplied but `from >= to`.
    ///
    /// The window is half-open `[from, to)`, so an inverted window can
    /// never include anything. Rejected at validation time rather than
    /// passed through to the export pass.
    #[error("inverted export window: from {from} is not earlier than to {to}")]
    InvertedWindow {
        /// Window start (inclusive), epoch milliseconds.
        from: i64,
        /// Window end (exclusive), epoch milliseconds.
        to: i64,
    },

    /// Other bad caller input.
    ///
    /// Raised when:
    /// - The export output path is empty
    /// - The import artifact path does not name an existing regular file
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// A migration run failed after validation passed.
///
/// Each variant wraps the underlying collaborator failure with the phase
/// and the path involved, so one terminal message is enough to diagnose.
/// Migration errors are always fatal to the run and never silently
/// retried.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `ExportFailed` | Store read, artifact write, or export task failure |
/// | `StorageOpenFailed` | The store could not be opened at the given root |
/// | `ImportFailed` | Decode, write, or commit failure during an import run |
#[derive(Debug, ThisError)]
pub enum MigrationError {
    /// The export pass failed.
    #[error("export to '{path}' failed: {cause}")]
    ExportFailed {
        /// The output artifact path.
        path: String,
        /// The underlying cause.
        cause: String,
    },

    /// The store could not be opened for import.
    ///
    /// Nothing runs after this: the stream, commit, and release steps
    /// are all skipped because there is no handle to release.
    #[error("opening store at '{root}' failed: {cause}")]
    StorageOpenFailed {
        /// The store root directory.
        root: String,
        /// The underlying cause.
        cause: String,
    },

    /// The import pass failed after the store was opened.
    ///
    /// The store handle has already been released (without commit) by
    /// the time this error reaches the caller.
    #[error("import from '{path}' failed: {cause}")]
    ImportFailed {
        /// The input artifact path.
        path: String,
        /// The underlying cause.
        cause: String,
    },
}

/// Error type for kbport operations.
///
/// Uses `thiserror` for automatic `Display` and `Error` trait
/// implementations. The taxonomy has three layers: [`ConfigError`] for
/// bad caller input, [`MigrationError`] for failed runs, and
/// `OperationFailed` for infrastructure faults underneath both (store
/// internals, artifact I/O, config parsing, logging setup).
#[derive(Debug, ThisError)]
pub enum Error {
    /// Bad or incomplete caller input.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A migration run failed.
    #[error(transparent)]
    Migration(#[from] MigrationError),

    /// An operation failed.
    ///
    /// Raised when:
    /// - `SQLite` store operations fail
    /// - Filesystem I/O errors occur
    /// - An artifact record cannot be decoded
    /// - Configuration files cannot be read or parsed
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

/// Result type alias for kbport operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Builds an `OperationFailed` from an operation name and any
    /// displayable cause.
    pub(crate) fn operation(operation: &str, cause: impl std::fmt::Display) -> Self {
        Self::OperationFailed {
            operation: operation.to_string(),
            cause: cause.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Config(ConfigError::IncompleteWindow);
        assert_eq!(
            err.to_string(),
            "incomplete export window: --from-epoch and --to-epoch must be given together"
        );

        let err = Error::Config(ConfigError::InvertedWindow { from: 1000, to: 500 });
        assert_eq!(
            err.to_string(),
            "inverted export window: from 1000 is not earlier than to 500"
        );

        let err = Error::Migration(MigrationError::ImportFailed {
            path: "a.tink".to_string(),
            cause: "decode failed".to_string(),
        });
        assert_eq!(err.to_string(), "import from 'a.tink' failed: decode failed");

        let err = Error::operation("open_store", "disk full");
        assert_eq!(err.to_string(), "operation 'open_store' failed: disk full");
    }
}
