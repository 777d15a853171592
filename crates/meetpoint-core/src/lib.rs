//! Travel-time aggregation and statistics engine.
//!
//! Turns raw per-slot routing legs into [`models::TripSummary`] records and
//! reduces them to per-slot [`models::MeetingStatistics`]. Everything here is
//! synchronous and pure; loading routes from disk lives in `meetpoint-data`.

pub mod error;
pub mod formatting;
pub mod median;
pub mod models;
pub mod settings;
pub mod statistics;
pub mod time_utils;
pub mod trips;

pub use error::{PlannerError, Result};
