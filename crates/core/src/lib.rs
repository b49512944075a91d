//! Domain logic for the driveline telemetry pipeline.
//!
//! Pure computation only: geohash encoding, running-aggregate math, the
//! timeseries payload codec and its columnar (Parquet) encoding, document
//! wire types, typed AI job requests, prompt builders, and export
//! rendering. No I/O and no database access; those live in the `db`,
//! `storage`, and `pipeline` crates.

pub mod aggregates;
pub mod columnar;
pub mod docs;
pub mod error;
pub mod export;
pub mod geohash;
pub mod jobs;
pub mod prompts;
pub mod timeseries;
pub mod types;

pub use error::CoreError;
