//! Driveline change-feed infrastructure.
//!
//! Building blocks between the transition outbox and the pipeline
//! consumers:
//!
//! - [`TransitionEvent`]: typed envelope over a claimed outbox row.
//! - [`guards`]: pure predicates deciding which components a change fires.
//! - [`TransitionFeed`]: batched claim/ack lease over the outbox.

pub mod envelope;
pub mod feed;
pub mod guards;

pub use envelope::{DriveChange, TransitionEvent, VehicleChange};
pub use feed::TransitionFeed;
