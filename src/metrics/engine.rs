//! Metrics engine for bottleneck-link experiments.
//!
//! Converts per-flow throughput and latency measurements into a [`Report`].
//! Every function here is pure: no I/O, no shared state, deterministic output.

use std::collections::{BTreeMap, HashSet};

use super::error::{MetricsError, SampleKind};
use super::types::*;

/// Compute the report for one set of per-flow throughputs.
///
/// # Arguments
/// * `throughputs` - Per-flow throughput in bps, in submission order (may be empty)
/// * `bottleneck_capacity` - Capacity of the bottleneck link in bps
/// * `latencies` - Per-flow average RTT in ms, independent of `throughputs`
///
/// # Returns
/// * `Ok(Report)` with all derived fields populated
/// * `Err(MetricsError::InvalidCapacity)` if the capacity is not a finite positive number
/// * `Err(MetricsError::InvalidSample)` if any value is negative, NaN or infinite
/// * `Err(MetricsError::Overflow)` if the total or the utilization exceeds the f64 range
///
/// # Examples
/// ```
/// use bottlenet::metrics::compute_report;
///
/// let report = compute_report(&[10.0, 0.0, 0.0, 0.0], 10.0, &[]).unwrap();
/// assert_eq!(report.link_utilization_pct(), 100.0);
/// assert_eq!(report.fairness_index(), 0.25);
/// assert!(report.rtt_avg_ms().is_none());
/// ```
pub fn compute_report(
    throughputs: &[f64],
    bottleneck_capacity: f64,
    latencies: &[f64],
) -> Result<Report, MetricsError> {
    validate_capacity(bottleneck_capacity)?;
    validate_values(throughputs, SampleKind::Throughput)?;
    validate_values(latencies, SampleKind::Latency)?;

    let sorted = sorted_copy(throughputs);
    let spread = Spread::of_sorted(&sorted);
    let fairness_index = jain_of_sorted(&sorted);
    let link_utilization_pct = spread.total / bottleneck_capacity * 100.0;
    check_finite("total_throughput", spread.total)?;
    check_finite("link_utilization_pct", link_utilization_pct)?;

    let (rtt_avg_ms, rtt_min_ms, rtt_max_ms) = if latencies.is_empty() {
        (None, None, None)
    } else {
        let rtt = Spread::of_sorted(&sorted_copy(latencies));
        check_finite("rtt_avg_ms", rtt.mean)?;
        (Some(rtt.mean), Some(rtt.min), Some(rtt.max))
    };

    Ok(Report {
        throughputs: throughputs.to_vec(),
        total_throughput: spread.total,
        average_throughput: spread.mean,
        min_throughput: spread.min,
        max_throughput: spread.max,
        link_utilization_pct,
        fairness_index,
        rtt_avg_ms,
        rtt_min_ms,
        rtt_max_ms,
    })
}

/// Compute a report from typed samples, in slice order.
///
/// Uses `throughput_bps` of each flow sample and `rtt_avg_ms` of each latency
/// sample. Intervals and optional latency companions are validated but not
/// aggregated.
pub fn compute_report_from_samples(
    flows: &[FlowSample],
    bottleneck_capacity: f64,
    latencies: &[LatencySample],
) -> Result<Report, MetricsError> {
    for (index, sample) in flows.iter().enumerate() {
        if let Some(interval) = &sample.interval {
            validate_interval(interval, index)?;
        }
    }
    for (index, sample) in latencies.iter().enumerate() {
        for value in sample.companions() {
            check_value(value, index, SampleKind::Latency)?;
        }
    }

    let throughputs: Vec<f64> = flows.iter().map(|s| s.throughput_bps).collect();
    let rtts: Vec<f64> = latencies.iter().map(|s| s.rtt_avg_ms).collect();

    compute_report(&throughputs, bottleneck_capacity, &rtts)
}

/// Jain's fairness index of a set of throughputs.
///
/// Returns 0 for an empty set or when every value is zero.
pub fn jain_fairness_index(throughputs: &[f64]) -> Result<f64, MetricsError> {
    validate_values(throughputs, SampleKind::Throughput)?;
    Ok(jain_of_sorted(&sorted_copy(throughputs)))
}

/// Final sample of every flow, ordered by flow id.
///
/// Between two samples of the same flow the one with the later interval end
/// wins; if either has no interval the later one in the slice wins. Fails on
/// the first malformed interval.
pub fn latest_per_flow(samples: &[FlowSample]) -> Result<Vec<FlowSample>, MetricsError> {
    let mut latest: BTreeMap<FlowId, &FlowSample> = BTreeMap::new();

    for (index, sample) in samples.iter().enumerate() {
        if let Some(interval) = &sample.interval {
            validate_interval(interval, index)?;
        }
        match latest.get(&sample.flow_id) {
            Some(current) => {
                let replace = match (&current.interval, &sample.interval) {
                    (Some(cur), Some(new)) => new.end >= cur.end,
                    _ => true,
                };
                if replace {
                    latest.insert(sample.flow_id, sample);
                }
            }
            None => {
                latest.insert(sample.flow_id, sample);
            }
        }
    }

    Ok(latest.into_values().cloned().collect())
}

/// Compute one report per named group of flows.
///
/// Each group is measured against the full bottleneck capacity, so group
/// utilizations add up to the overall utilization. Flow ids with no sample
/// contribute nothing.
pub fn compute_group_reports(
    flows: &[FlowSample],
    latencies: &[LatencySample],
    groups: &BTreeMap<String, Vec<FlowId>>,
    bottleneck_capacity: f64,
) -> Result<BTreeMap<String, Report>, MetricsError> {
    let mut reports = BTreeMap::new();

    for (name, members) in groups {
        let members: HashSet<FlowId> = members.iter().copied().collect();
        let group_flows: Vec<FlowSample> = flows
            .iter()
            .filter(|s| members.contains(&s.flow_id))
            .cloned()
            .collect();
        let group_latencies: Vec<LatencySample> = latencies
            .iter()
            .filter(|s| members.contains(&s.flow_id))
            .cloned()
            .collect();

        let report = compute_report_from_samples(&group_flows, bottleneck_capacity, &group_latencies)?;
        log::debug!(
            "Group '{}': {} flows, fairness {:.4}",
            name,
            report.flow_count(),
            report.fairness_index()
        );
        reports.insert(name.clone(), report);
    }

    Ok(reports)
}

/// A measurement that can be checked before it reaches the engine
pub trait Measurement {
    fn flow_id(&self) -> FlowId;

    /// All numeric values carried by the measurement
    fn values(&self) -> Vec<f64>;

    fn is_valid(&self) -> bool {
        self.values().iter().all(|v| v.is_finite() && *v >= 0.0)
    }
}

impl Measurement for FlowSample {
    fn flow_id(&self) -> FlowId {
        self.flow_id
    }

    fn values(&self) -> Vec<f64> {
        let mut values = vec![self.throughput_bps];
        if let Some(interval) = &self.interval {
            values.extend([interval.start, interval.end]);
        }
        values
    }

    fn is_valid(&self) -> bool {
        let throughput_ok = self.throughput_bps.is_finite() && self.throughput_bps >= 0.0;
        throughput_ok && self.interval.map_or(true, |i| i.is_valid())
    }
}

impl Measurement for LatencySample {
    fn flow_id(&self) -> FlowId {
        self.flow_id
    }

    fn values(&self) -> Vec<f64> {
        let mut values = vec![self.rtt_avg_ms];
        values.extend(self.companions());
        values
    }
}

impl LatencySample {
    fn companions(&self) -> impl Iterator<Item = f64> {
        [self.rtt_min_ms, self.rtt_max_ms, self.rtt_mdev_ms]
            .into_iter()
            .flatten()
    }
}

/// Split measurements into valid and rejected ones.
///
/// This is the caller-side filter for malformed upstream data; the engine
/// itself rejects invalid values with an error instead of dropping them.
pub fn partition_valid<T: Measurement>(samples: Vec<T>) -> (Vec<T>, Vec<T>) {
    let (valid, rejected): (Vec<T>, Vec<T>) = samples.into_iter().partition(|s| s.is_valid());

    for sample in &rejected {
        log::warn!(
            "Dropping invalid measurement for flow {}: {:?}",
            sample.flow_id(),
            sample.values()
        );
    }

    (valid, rejected)
}

fn validate_capacity(capacity: f64) -> Result<(), MetricsError> {
    if capacity.is_finite() && capacity > 0.0 {
        Ok(())
    } else {
        Err(MetricsError::InvalidCapacity(capacity))
    }
}

fn validate_values(values: &[f64], kind: SampleKind) -> Result<(), MetricsError> {
    for (index, &value) in values.iter().enumerate() {
        check_value(value, index, kind)?;
    }
    Ok(())
}

fn check_value(value: f64, index: usize, kind: SampleKind) -> Result<(), MetricsError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(MetricsError::InvalidSample { kind, index, value })
    }
}

/// Rejects intervals that are not finite, start before 0 or end before they start
pub(crate) fn validate_interval(interval: &SampleInterval, index: usize) -> Result<(), MetricsError> {
    if interval.is_valid() {
        return Ok(());
    }
    let value = if interval.start.is_finite() && interval.start >= 0.0 {
        interval.end
    } else {
        interval.start
    };
    Err(MetricsError::InvalidSample {
        kind: SampleKind::Interval,
        index,
        value,
    })
}

fn check_finite(field: &'static str, value: f64) -> Result<(), MetricsError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(MetricsError::Overflow { field })
    }
}

/// Ascending copy with negative zero folded into zero.
///
/// Aggregating over a canonical order makes every derived field independent
/// of submission order down to the last bit.
fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().map(|v| v.abs()).collect();
    sorted.sort_by(f64::total_cmp);
    sorted
}

struct Spread {
    total: f64,
    mean: f64,
    min: f64,
    max: f64,
}

impl Spread {
    fn of_sorted(sorted: &[f64]) -> Self {
        match (sorted.first(), sorted.last()) {
            (Some(&min), Some(&max)) => {
                let total: f64 = sorted.iter().sum();
                Spread {
                    total,
                    mean: total / sorted.len() as f64,
                    min,
                    max,
                }
            }
            _ => Spread {
                total: 0.0,
                mean: 0.0,
                min: 0.0,
                max: 0.0,
            },
        }
    }
}

/// (Σx)² / (n·Σx²), evaluated on values scaled by the maximum.
///
/// The index is scale invariant, and scaling keeps the squares of very large
/// rates finite. Clamped to absorb rounding just above 1.
fn jain_of_sorted(sorted: &[f64]) -> f64 {
    let max = match sorted.last() {
        Some(&max) if max > 0.0 => max,
        _ => return 0.0,
    };

    let sum: f64 = sorted.iter().map(|x| x / max).sum();
    let sum_sq: f64 = sorted.iter().map(|x| (x / max) * (x / max)).sum();

    ((sum * sum) / (sorted.len() as f64 * sum_sq)).clamp(0.0, 1.0)
}
