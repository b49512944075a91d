//! Driveline pipeline components.
//!
//! Everything that consumes the change feed and the job queue:
//!
//! - [`TransitionDispatcher`] fans claimed drive/vehicle transitions out
//!   to the reactive components and acks them once handled.
//! - [`DriveAnalyzer`], [`RouteMatcher`] and [`ColumnarConverter`] react
//!   to completed uploads; [`VinDecoder`] to vehicle creation.
//! - [`JobRunner`], [`DashboardRunner`] and [`ExportRunner`] claim
//!   `ai_jobs` rows and drive them to a terminal state.
//! - [`SweepScheduler`] runs the daily maintenance and weekly baseline
//!   sweeps across the whole fleet.

pub mod analyzer;
pub mod converter;
pub mod dashboard;
pub mod dispatcher;
pub mod error;
pub mod export;
pub mod jobs;
pub mod route_matcher;
pub mod scheduler;
pub mod vin;

pub use analyzer::DriveAnalyzer;
pub use converter::ColumnarConverter;
pub use dashboard::DashboardRunner;
pub use dispatcher::TransitionDispatcher;
pub use error::PipelineError;
pub use export::ExportRunner;
pub use jobs::JobRunner;
pub use route_matcher::RouteMatcher;
pub use scheduler::SweepScheduler;
pub use vin::VinDecoder;
