//! Flow data sources.
//!
//! Collecting measurements (running the traffic generator, polling its
//! output, pinging receivers) happens outside this crate. A data source only
//! hands already-extracted samples to the metrics engine.

use std::fs::File;
use std::path::{Path, PathBuf};

use color_eyre::eyre::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::metrics::{FlowSample, LatencySample};

/// Supplier of per-flow measurements for one run
pub trait FlowDataSource {
    /// Human-readable origin of the samples, used in report metadata
    fn describe(&self) -> String;

    /// Throughput samples, either one final sample per flow or a time series
    fn throughput_samples(&self) -> Result<Vec<FlowSample>>;

    /// Round-trip-time samples, possibly empty
    fn latency_samples(&self) -> Result<Vec<LatencySample>>;
}

/// Samples held in memory, as written by an external collector
///
/// ```yaml
/// flows:
///   - { flow_id: 0, throughput_bps: 480000.0 }
///   - { flow_id: 1, throughput_bps: 455000.0, interval: { start: 0.0, end: 2.0 } }
/// latencies:
///   - { flow_id: 0, rtt_avg_ms: 212.4, rtt_min_ms: 200.9, rtt_max_ms: 260.1 }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SampleSet {
    #[serde(default)]
    pub flows: Vec<FlowSample>,
    #[serde(default)]
    pub latencies: Vec<LatencySample>,
    #[serde(skip)]
    pub origin: Option<PathBuf>,
}

impl FlowDataSource for SampleSet {
    fn describe(&self) -> String {
        match &self.origin {
            Some(path) => path.display().to_string(),
            None => "in-memory samples".to_string(),
        }
    }

    fn throughput_samples(&self) -> Result<Vec<FlowSample>> {
        Ok(self.flows.clone())
    }

    fn latency_samples(&self) -> Result<Vec<LatencySample>> {
        Ok(self.latencies.clone())
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Load a sample document; `.yaml`/`.yml` files are read as YAML, anything else as JSON
pub fn load_sample_set(path: &Path) -> Result<SampleSet> {
    log::info!("Loading samples from: {:?}", path);

    let file = File::open(path)
        .with_context(|| format!("Failed to open sample file {}", path.display()))?;

    let mut samples: SampleSet = if is_yaml(path) {
        serde_yaml::from_reader(file)
            .with_context(|| format!("Failed to parse YAML samples from {}", path.display()))?
    } else {
        serde_json::from_reader(file)
            .with_context(|| format!("Failed to parse JSON samples from {}", path.display()))?
    };
    samples.origin = Some(path.to_path_buf());

    log::info!(
        "Loaded {} throughput samples and {} latency samples",
        samples.flows.len(),
        samples.latencies.len()
    );
    Ok(samples)
}
