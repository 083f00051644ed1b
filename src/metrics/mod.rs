//! Fairness, utilization and latency metrics for bottleneck experiments.
//!
//! The engine is a set of pure functions over per-flow measurements; the
//! remaining modules build windowed reports, summaries and report output on
//! top of it.

pub mod types;
pub mod error;
pub mod engine;
pub mod fairness;
pub mod time_series;
pub mod summary;
pub mod units;
pub mod report;

pub use types::*;
pub use error::{MetricsError, SampleKind};
pub use engine::{
    compute_group_reports, compute_report, compute_report_from_samples, jain_fairness_index,
    latest_per_flow, partition_valid, Measurement,
};
pub use fairness::{classify_fairness, FairnessThresholds, FairnessVerdict};
pub use time_series::windowed_reports;
pub use summary::{RunSummary, DEFAULT_UTILIZATION_WARNING_PCT};
pub use report::{generate_json_report, generate_text_report, ExperimentReport, ReportMetadata};
