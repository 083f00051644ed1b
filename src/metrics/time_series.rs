//! Windowed reporting for time-series runs.
//!
//! A run that reports interval samples is cut into fixed-length windows and
//! each window gets its own independent [`Report`], built from the latest
//! sample of every flow that reported inside it.

use std::collections::BTreeMap;
use std::time::Duration;

use rayon::prelude::*;

use super::engine::{compute_report_from_samples, latest_per_flow, validate_interval};
use super::error::{MetricsError, SampleKind};
use super::types::*;

/// Index of the window `(k*w, (k+1)*w]` containing `end`; an end of 0 falls in window 0.
///
/// `None` when the index does not fit in a `usize`.
fn window_index(end: RunTime, window_sec: f64) -> Option<usize> {
    let k = (end / window_sec).ceil();
    if k.is_finite() && k < usize::MAX as f64 {
        Some((k as usize).saturating_sub(1))
    } else {
        None
    }
}

/// Compute one report per sampling window.
///
/// # Arguments
/// * `samples` - Interval samples of all flows, in any order
/// * `window` - Window length; windows start at run time 0
/// * `bottleneck_capacity` - Capacity of the bottleneck link in bps
///
/// # Returns
/// Reports for every window that received at least one sample, ordered by
/// window start. Samples without an interval belong to no window.
pub fn windowed_reports(
    samples: &[FlowSample],
    window: Duration,
    bottleneck_capacity: f64,
) -> Result<Vec<WindowReport>, MetricsError> {
    let window_sec = window.as_secs_f64();
    if window_sec <= 0.0 {
        return Err(MetricsError::InvalidWindow);
    }

    let mut buckets: BTreeMap<usize, Vec<FlowSample>> = BTreeMap::new();
    let mut unplaced = 0usize;

    for (index, sample) in samples.iter().enumerate() {
        let Some(interval) = sample.interval else {
            unplaced += 1;
            continue;
        };
        validate_interval(&interval, index)?;
        let window = window_index(interval.end, window_sec).ok_or(MetricsError::InvalidSample {
            kind: SampleKind::Interval,
            index,
            value: interval.end,
        })?;
        buckets.entry(window).or_default().push(sample.clone());
    }

    if unplaced > 0 {
        log::debug!("{} samples without an interval are not part of any window", unplaced);
    }

    let buckets: Vec<(usize, Vec<FlowSample>)> = buckets.into_iter().collect();
    log::debug!(
        "Computing {} window reports ({:.3}s windows)",
        buckets.len(),
        window_sec
    );

    buckets
        .into_par_iter()
        .map(|(index, window_samples)| -> Result<WindowReport, MetricsError> {
            let latest = latest_per_flow(&window_samples)?;
            let report = compute_report_from_samples(&latest, bottleneck_capacity, &[])?;
            Ok(WindowReport {
                index,
                start: index as f64 * window_sec,
                end: (index + 1) as f64 * window_sec,
                flow_ids: latest.iter().map(|s| s.flow_id).collect(),
                report,
            })
        })
        .collect()
}
