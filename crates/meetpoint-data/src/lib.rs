//! Data ingestion layer for meetpoint.
//!
//! Responsible for discovering, reading, and parsing routing-client output
//! and running the top-level analysis pipeline over it.

pub mod analysis;
pub mod reader;

pub use meetpoint_core as core;
