#![forbid(unsafe_code)]

//! Core domain model and analysis engine for the Sympto system.
//!
//! This crate provides:
//! - Domain types (daily entries, cycles, analysis results)
//! - The symptothermal engine (mucus classification, peak day,
//!   thermal shift, double-check rule)
//! - Persistence (locked JSON cycle store) and CSV chart export
//! - Configuration and logging setup

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod mucus;
pub mod peak;
pub mod thermal;
pub mod infertility;
pub mod engine;
pub mod memo;
pub mod store;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use mucus::classify;
pub use peak::find_peak_day;
pub use thermal::find_thermal_shift;
pub use engine::{analyze_cycle, analyze_entries, sorted_entries};
pub use memo::AnalysisMemo;
pub use store::{CycleStore, EntryPatch};
pub use export::write_chart_csv;
