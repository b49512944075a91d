//! Pipeline error type.

use driveline_core::error::CoreError;
use driveline_gemini::OracleError;
use driveline_storage::StorageError;
use thiserror::Error;

/// Errors surfaced by pipeline components.
///
/// A component that can park a failure on the record it owns (`aiError`,
/// `parquetError`, `vinError`, a job's `error` column) does so and returns
/// `Ok`. What bubbles up as `PipelineError` is the remainder, mostly
/// infrastructure failures where not even the error column could be
/// written; the caller logs those and leaves the work eligible for
/// redelivery.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Database query or transaction failure.
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),

    /// Payload decode or columnar encode failure.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Oracle invocation failure.
    #[error(transparent)]
    Oracle(#[from] OracleError),

    /// Blob store read, write or signing failure.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Plain HTTP failure outside the oracle client.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A claimed job's type does not belong to this runner. The claim
    /// queries route by type, so hitting this means the queue is
    /// misconfigured.
    #[error("job type `{0}` is not handled by this runner")]
    WrongRunner(&'static str),
}
