//! Wildfire perimeter summaries: load perimeters with forest-composition and
//! disturbance statistics, resolve each fire's dominant forest type, and
//! prepare report tables and chart inputs.
//!
//! Pipeline: [`loader`] → [`normalize`] → [`resolve`] → {[`report`], [`charts`]}.
//! [`pipeline::analyze`] runs the first four stages.

pub mod charts;
pub mod config;
pub mod error;
pub mod export;
pub mod loader;
pub mod normalize;
pub mod palette;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod resolve;

pub use config::ReportConfig;
pub use error::{FieldParseError, FireError, Result};
pub use pipeline::{analyze, analyze_path, Analysis, DatasetSummary};
pub use record::{FireRecord, ForestType, PercentField};
