use thiserror::Error;

/// Errors from pure domain logic.
///
/// Pipeline components catch these and persist them onto the record they
/// own (`parquetError`, job `error`, ...); they never cross component
/// boundaries.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("gzip decompression failed: {0}")]
    Gunzip(#[from] std::io::Error),

    #[error("payload JSON invalid: {0}")]
    PayloadJson(#[from] serde_json::Error),

    #[error("parquet encoding failed: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("arrow batch construction failed: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("columnar file malformed: {0}")]
    Columnar(String),

    #[error("unknown AI job type: {0}")]
    UnknownJobType(String),

    #[error("invalid parameters for {job_type} job: {message}")]
    InvalidJobParams { job_type: String, message: String },
}
