#![forbid(unsafe_code)]

//! Core domain model and business logic for the pFotbal training planner.
//!
//! This crate provides:
//! - Domain types (players, exercise types, plans, units)
//! - Typed exercise parameters and the default exercise catalog
//! - Persistence (locked JSON data file, background single-writer saves)
//! - Planning engine (ids, parameter validation, completion tracking)
//! - Plan summaries and CSV export

pub mod types;
pub mod error;
pub mod params;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod lookup;
pub mod store;
pub mod writer;
pub mod summary;
pub mod export;
pub mod engine;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use params::{parse_parameter_spec, ParamKind, ParamMap, ParamValue};
pub use catalog::{default_exercise_types, initial_system_data};
pub use config::Config;
pub use store::{next_id, DataFile};
pub use writer::{BackgroundWriter, SnapshotSink};
pub use summary::{plan_summary, PlanSummary};
pub use export::export_plans_csv;
pub use engine::Planner;
