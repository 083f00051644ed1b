//! Core data types for bottleneck fairness metrics.
//!
//! Throughput is always bits per second, latency always milliseconds.

use serde::{Deserialize, Serialize};

/// Index-based flow identifier, unique within a run
pub type FlowId = usize;

/// Offset in seconds from the start of a measurement run
pub type RunTime = f64;

/// Measurement interval of a time-series sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleInterval {
    pub start: RunTime,
    pub end: RunTime,
}

impl SampleInterval {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Finite, non-negative and not running backwards
    pub fn is_valid(&self) -> bool {
        self.start.is_finite() && self.end.is_finite() && self.start >= 0.0 && self.start <= self.end
    }
}

/// One throughput measurement for one flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowSample {
    pub flow_id: FlowId,
    pub throughput_bps: f64,
    /// Only present for time-series samples
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<SampleInterval>,
}

impl FlowSample {
    pub fn new(flow_id: FlowId, throughput_bps: f64) -> Self {
        Self {
            flow_id,
            throughput_bps,
            interval: None,
        }
    }

    pub fn with_interval(flow_id: FlowId, throughput_bps: f64, start: RunTime, end: RunTime) -> Self {
        Self {
            flow_id,
            throughput_bps,
            interval: Some(SampleInterval { start, end }),
        }
    }
}

/// One round-trip-time observation for one flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencySample {
    pub flow_id: FlowId,
    pub rtt_avg_ms: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rtt_min_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rtt_max_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rtt_mdev_ms: Option<f64>,
}

impl LatencySample {
    pub fn new(flow_id: FlowId, rtt_avg_ms: f64) -> Self {
        Self {
            flow_id,
            rtt_avg_ms,
            rtt_min_ms: None,
            rtt_max_ms: None,
            rtt_mdev_ms: None,
        }
    }
}

/// Derived metrics for one measurement run or one sampling window.
///
/// A `Report` is only produced by the engine and has no mutating API.
/// Latency fields are `None` when no latency data was supplied, which is
/// distinct from a measured latency of zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub(crate) throughputs: Vec<f64>,
    pub(crate) total_throughput: f64,
    pub(crate) average_throughput: f64,
    pub(crate) min_throughput: f64,
    pub(crate) max_throughput: f64,
    pub(crate) link_utilization_pct: f64,
    pub(crate) fairness_index: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) rtt_avg_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) rtt_min_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) rtt_max_ms: Option<f64>,
}

impl Report {
    /// Per-flow throughputs in submission order
    pub fn throughputs(&self) -> &[f64] {
        &self.throughputs
    }

    pub fn flow_count(&self) -> usize {
        self.throughputs.len()
    }

    pub fn total_throughput(&self) -> f64 {
        self.total_throughput
    }

    pub fn average_throughput(&self) -> f64 {
        self.average_throughput
    }

    pub fn min_throughput(&self) -> f64 {
        self.min_throughput
    }

    pub fn max_throughput(&self) -> f64 {
        self.max_throughput
    }

    /// Total throughput as a percentage of the bottleneck capacity (may exceed 100)
    pub fn link_utilization_pct(&self) -> f64 {
        self.link_utilization_pct
    }

    /// Jain's fairness index in [0, 1]
    pub fn fairness_index(&self) -> f64 {
        self.fairness_index
    }

    pub fn rtt_avg_ms(&self) -> Option<f64> {
        self.rtt_avg_ms
    }

    pub fn rtt_min_ms(&self) -> Option<f64> {
        self.rtt_min_ms
    }

    pub fn rtt_max_ms(&self) -> Option<f64> {
        self.rtt_max_ms
    }

    /// Ratio of the largest to the smallest flow, `None` if the smallest flow is zero
    pub fn max_min_ratio(&self) -> Option<f64> {
        if self.min_throughput > 0.0 {
            Some(self.max_throughput / self.min_throughput)
        } else {
            None
        }
    }

    pub fn has_latency(&self) -> bool {
        self.rtt_avg_ms.is_some()
    }
}

/// Report for one sampling window of a time-series run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowReport {
    /// Zero-based window index
    pub index: usize,
    pub start: RunTime,
    pub end: RunTime,
    /// Flow ids that contributed, in the same order as `report.throughputs()`
    pub flow_ids: Vec<FlowId>,
    pub report: Report,
}
