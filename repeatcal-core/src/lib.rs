//! Core types for repeatcal.
//!
//! This crate provides everything both the CLI and the server share:
//! - `event` types for seeds, repeat rules and persisted occurrences
//! - `recurrence` expansion of a seed into its concrete occurrences
//! - `reconcile` planning for whole-series edits
//! - `store` with the `EventStore` trait and its memory/HTTP implementations
//! - `operations` tying the above together for a caller

pub mod calendar_math;
pub mod config;
pub mod error;
pub mod event;
pub mod operations;
pub mod protocol;
pub mod recurrence;
pub mod reconcile;
pub mod store;

// Re-export the event model at crate root for convenience
pub use error::{CalError, CalResult};
pub use event::*;
