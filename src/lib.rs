//! # Bottlenet - Metrics for bottleneck-link TCP fairness experiments
//!
//! This library turns per-flow measurements from a bottleneck experiment
//! (several TCP flows sharing one constrained link) into fairness,
//! utilization and latency metrics.
//!
//! ## Overview
//!
//! Running the experiment (building the emulated topology, starting the
//! traffic generator, pinging the receivers) happens elsewhere. Bottlenet
//! takes the extracted per-flow samples and computes:
//!
//! - **Throughput**: total, average, minimum and maximum per-flow throughput
//! - **Link utilization**: total throughput as a percentage of the bottleneck capacity
//! - **Fairness**: Jain's fairness index with a FAIR / MODERATE / UNFAIR verdict
//! - **Latency**: mean, minimum and maximum round-trip time
//! - **Time series**: one independent report per sampling window plus a run summary
//!
//! ## Architecture
//!
//! - `metrics`: the pure metrics engine, fairness verdicts, windowing and report output
//! - `source`: the flow data source seam and the sample document loader
//! - `config`: experiment configuration structures and validation
//! - `config_loader`: configuration file loading and CLI overrides
//!
//! ## Example Usage
//!
//! ```rust
//! use bottlenet::metrics::{classify_fairness, compute_report, FairnessVerdict};
//!
//! // Four flows on a 1 Mbit/s link, throughput in bits per second
//! let report = compute_report(&[250_000.0, 250_000.0, 250_000.0, 250_000.0], 1_000_000.0, &[])?;
//!
//! assert_eq!(report.link_utilization_pct(), 100.0);
//! assert_eq!(report.fairness_index(), 1.0);
//! assert_eq!(classify_fairness(report.fairness_index()), FairnessVerdict::Fair);
//! # Ok::<(), bottlenet::metrics::MetricsError>(())
//! ```
//!
//! ## Units
//!
//! Throughput and capacity are always bits per second, latency always
//! milliseconds, utilization a percentage and fairness a fraction in [0, 1].
//!
//! ## Error Handling
//!
//! The metrics engine returns typed [`metrics::MetricsError`] values for
//! invalid samples and capacities; it never turns bad input into zeros.
//! File loading and report output use `color_eyre` for error reporting with
//! context.

pub mod metrics;
pub mod source;
pub mod config;
pub mod config_loader;
