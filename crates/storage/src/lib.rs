//! Blob storage for timeseries payloads, Parquet files, and exports.
//!
//! Everything larger than a row lives in a blob store addressed by
//! string keys: the raw gzip'd timeseries a drive uploads, the Parquet
//! rendition the converter writes, and finished export artifacts.
//!
//! - [`BlobStore`] is the seam the pipeline depends on.
//! - [`S3BlobStore`] is the production implementation.
//! - [`LocalBlobStore`] serves development and tests from a directory.
//! - [`paths`] builds the deterministic keys shared with clients.

pub mod local;
pub mod paths;
pub mod s3;
pub mod store;

pub use local::LocalBlobStore;
pub use s3::S3BlobStore;
pub use store::{BlobStore, StorageError, EXPORT_URL_TTL};
