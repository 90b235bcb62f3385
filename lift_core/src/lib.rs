#![forbid(unsafe_code)]

//! Core domain model and business logic for liftlog.
//!
//! This crate provides:
//! - Domain types (exercises, set candidates, sets, sessions)
//! - The built-in exercise catalog
//! - The voice transcript parser
//! - Persistence (state, WAL, CSV)
//! - Progress statistics

pub mod types;
pub mod error;
pub mod catalog;
pub mod parser;
pub mod config;
pub mod logging;
pub mod state;
pub mod wal;
pub mod csv_rollup;
pub mod history;
pub mod progress;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, get_default_catalog};
pub use parser::{parse_set_data, parse_transcript, ParseFailure};
pub use config::Config;
pub use wal::{JsonlSink, SessionSink};
pub use history::load_sessions;
pub use progress::{exercise_progress, ExerciseProgress};
