//! Errors raised by the metrics engine.

use std::fmt;

/// Which kind of measurement a rejected value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleKind {
    Throughput,
    Latency,
    /// Interval timestamp of a time-series sample
    Interval,
}

impl fmt::Display for SampleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleKind::Throughput => write!(f, "throughput"),
            SampleKind::Latency => write!(f, "latency"),
            SampleKind::Interval => write!(f, "interval"),
        }
    }
}

/// Metrics computation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MetricsError {
    /// A sample value is negative, NaN or infinite
    #[error("Invalid {kind} sample at index {index}: {value} (must be finite and non-negative)")]
    InvalidSample {
        kind: SampleKind,
        index: usize,
        value: f64,
    },
    /// Bottleneck capacity is not a finite positive number
    #[error("Invalid bottleneck capacity: {0} (must be finite and greater than zero)")]
    InvalidCapacity(f64),
    /// Sampling window has zero length
    #[error("Invalid sampling window: must be longer than zero")]
    InvalidWindow,
    /// A derived field does not fit in an f64
    #[error("Derived {field} is not representable (inputs too large for the capacity)")]
    Overflow { field: &'static str },
}

impl MetricsError {
    pub fn is_invalid_sample(&self) -> bool {
        matches!(self, MetricsError::InvalidSample { .. })
    }

    pub fn is_invalid_capacity(&self) -> bool {
        matches!(self, MetricsError::InvalidCapacity(_))
    }
}
