//! Tracking of the remote document linked to a ticket.

mod tracker;

pub use tracker::{DocumentTracker, TrackedDocument};
