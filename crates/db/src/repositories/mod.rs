//! Repository layer. All SQL lives here.
//!
//! Repositories are stateless namespaces over a shared `PgPool`. Each one
//! keeps a `COLUMNS` constant matching its row struct so `query_as` maps
//! one-to-one.

pub mod ai_job_repo;
pub mod dashboard_repo;
pub mod datapoint_repo;
pub mod drive_repo;
pub mod maintenance_repo;
pub mod route_repo;
pub mod transition_repo;
pub mod vehicle_repo;

pub use ai_job_repo::AiJobRepo;
pub use dashboard_repo::DashboardRepo;
pub use datapoint_repo::DatapointRepo;
pub use drive_repo::DriveRepo;
pub use maintenance_repo::MaintenanceRepo;
pub use route_repo::RouteRepo;
pub use transition_repo::TransitionRepo;
pub use vehicle_repo::VehicleRepo;
