#![forbid(unsafe_code)]

//! Core domain model and algorithms for the Glyco daily health viewer.
//!
//! This crate provides:
//! - Domain types (events, glucose samples, markers, zoom state, body stats)
//! - The glucose pipeline (normalize, aggregate, correlate, window)
//! - Trend and summary statistics over a day
//! - Catalog classification of free-text body-metric entries
//! - Weekly body-stat grids
//! - File-backed collaborators (day events, body stats, bearer token, CSV export)

pub mod types;
pub mod error;
pub mod time;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod aggregate;
pub mod correlate;
pub mod window;
pub mod trend;
pub mod stats;
pub mod classify;
pub mod weekly;
pub mod session;
pub mod source;
pub mod token;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, get_default_catalog};
pub use config::Config;
pub use aggregate::{aggregate, samples_from_events};
pub use correlate::correlate;
pub use trend::estimate_trend;
pub use stats::{summarize, DayStats};
pub use classify::{classify, Classification, EntryBuffer};
pub use weekly::build_weekly_grids;
pub use session::{DayView, DayViewState, FetchTicket};
pub use source::{DaySource, JsonlRecordSink, JsonlSource, RecordSink};
pub use token::TokenStore;
