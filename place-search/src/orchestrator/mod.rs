//! Place orchestrator: concurrent provider fan-out, dedup, distance ranking.
//!
//! Each stage consumes one sequence and produces a new one:
//! [`aggregate`](aggregate::aggregate) → [`reconcile`](reconcile::reconcile_with_priority)
//! → [`rank`](rank::rank).

pub mod aggregate;
pub mod reconcile;
pub mod rank;

pub use aggregate::aggregate;
pub use rank::rank;
pub use reconcile::{reconcile, reconcile_with_priority};
