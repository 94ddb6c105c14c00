//! Shared error types for the services crate.

use thiserror::Error;

use storage::sqlite::SqliteInitError;

/// Errors a `CompletionReporter` may return when handing off an event.
///
/// These are logged and dropped; they never affect phase state.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReportError {
    #[error("no async runtime available to deliver the report")]
    NoRuntime,
    #[error("reporter state lock poisoned")]
    Poisoned,
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
