//! Run-level summary over the window reports of a time-series run.

use serde::Serialize;

use super::fairness::{FairnessThresholds, FairnessVerdict};
use super::types::WindowReport;

/// Default utilization level below which a run is flagged
pub const DEFAULT_UTILIZATION_WARNING_PCT: f64 = 80.0;

/// Averages of the per-window metrics of one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub window_count: usize,
    pub mean_fairness_index: f64,
    pub mean_link_utilization_pct: f64,
    pub mean_max_throughput: f64,
    pub mean_min_throughput: f64,
    /// Mean max flow over mean min flow, absent when the mean min flow is zero
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_min_ratio: Option<f64>,
    pub verdict: FairnessVerdict,
    /// Mean utilization is below `utilization_warning_pct`
    pub low_utilization: bool,
    pub utilization_warning_pct: f64,
}

impl RunSummary {
    /// Summarize window reports, `None` when there are no windows
    pub fn from_windows(
        windows: &[WindowReport],
        thresholds: &FairnessThresholds,
        utilization_warning_pct: f64,
    ) -> Option<Self> {
        if windows.is_empty() {
            return None;
        }

        let count = windows.len() as f64;
        let mean = |f: fn(&WindowReport) -> f64| windows.iter().map(f).sum::<f64>() / count;

        let mean_fairness_index = mean(|w| w.report.fairness_index());
        let mean_link_utilization_pct = mean(|w| w.report.link_utilization_pct());
        let mean_max_throughput = mean(|w| w.report.max_throughput());
        let mean_min_throughput = mean(|w| w.report.min_throughput());

        let max_min_ratio = if mean_min_throughput > 0.0 {
            Some(mean_max_throughput / mean_min_throughput)
        } else {
            None
        };

        Some(Self {
            window_count: windows.len(),
            mean_fairness_index,
            mean_link_utilization_pct,
            mean_max_throughput,
            mean_min_throughput,
            max_min_ratio,
            verdict: thresholds.classify(mean_fairness_index),
            low_utilization: mean_link_utilization_pct < utilization_warning_pct,
            utilization_warning_pct,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::engine::compute_report;

    fn window(index: usize, throughputs: &[f64], capacity: f64) -> WindowReport {
        WindowReport {
            index,
            start: index as f64,
            end: (index + 1) as f64,
            flow_ids: (0..throughputs.len()).collect(),
            report: compute_report(throughputs, capacity, &[]).unwrap(),
        }
    }

    #[test]
    fn test_no_windows() {
        assert!(RunSummary::from_windows(&[], &FairnessThresholds::default(), 80.0).is_none());
    }

    #[test]
    fn test_summary_averages() {
        let windows = vec![
            window(0, &[4.0, 4.0], 10.0),  // FI 1.0, util 80%
            window(1, &[10.0, 0.0], 10.0), // FI 0.5, util 100%
        ];

        let summary =
            RunSummary::from_windows(&windows, &FairnessThresholds::default(), DEFAULT_UTILIZATION_WARNING_PCT)
                .unwrap();
        assert_eq!(summary.window_count, 2);
        assert_eq!(summary.mean_fairness_index, 0.75);
        assert_eq!(summary.mean_link_utilization_pct, 90.0);
        assert_eq!(summary.mean_max_throughput, 7.0);
        assert_eq!(summary.mean_min_throughput, 2.0);
        assert_eq!(summary.max_min_ratio, Some(3.5));
        assert_eq!(summary.verdict, FairnessVerdict::Moderate);
        assert!(!summary.low_utilization);
    }

    #[test]
    fn test_low_utilization_flag() {
        let windows = vec![window(0, &[1.0, 1.0], 10.0)];
        let summary = RunSummary::from_windows(&windows, &FairnessThresholds::default(), 80.0).unwrap();
        assert!(summary.low_utilization);
        assert_eq!(summary.verdict, FairnessVerdict::Fair);
    }

    #[test]
    fn test_ratio_absent_when_min_flow_starves() {
        let windows = vec![window(0, &[5.0, 0.0], 5.0)];
        let summary = RunSummary::from_windows(&windows, &FairnessThresholds::default(), 80.0).unwrap();
        assert!(summary.max_min_ratio.is_none());
    }
}
