//! Database entity models and DTOs.
//!
//! Row structs derive `FromRow` and mirror their table column-for-column.
//! Write DTOs live next to the row they create or update. Conversions to
//! the camelCase wire documents live on the rows themselves.

pub mod ai_job;
pub mod dashboard;
pub mod datapoint;
pub mod drive;
pub mod maintenance;
pub mod route;
pub mod transition;
pub mod vehicle;
