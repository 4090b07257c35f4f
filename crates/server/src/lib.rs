//! HTTP host for the helpdesk signing plugin.

pub mod api;
pub mod metrics;
pub mod state;
