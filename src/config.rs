use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::metrics::units::parse_rate_to_bps;
use crate::metrics::{FairnessThresholds, FlowId, DEFAULT_UTILIZATION_WARNING_PCT};

/// Experiment configuration loaded from YAML
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    pub experiment: ExperimentInfo,
    pub bottleneck: BottleneckConfig,
    #[serde(default)]
    pub fairness: FairnessThresholds,
    #[serde(default = "default_utilization_warning_pct")]
    pub utilization_warning_pct: f64,
    #[serde(default)]
    pub sampling: SamplingConfig,
    /// Named groups of flow ids reported separately (e.g. short vs long RTT)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub flow_groups: BTreeMap<String, Vec<FlowId>>,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.experiment.name.trim().is_empty() {
            return Err(ValidationError::InvalidExperiment(
                "name cannot be empty".to_string(),
            ));
        }

        self.capacity_bps()?;

        self.fairness
            .validate()
            .map_err(ValidationError::InvalidFairness)?;

        if !self.utilization_warning_pct.is_finite() || self.utilization_warning_pct < 0.0 {
            return Err(ValidationError::InvalidFairness(format!(
                "utilization_warning_pct must be a non-negative number, got {}",
                self.utilization_warning_pct
            )));
        }

        if self.sampling.window.is_zero() {
            return Err(ValidationError::InvalidSampling(
                "window must be longer than zero".to_string(),
            ));
        }

        for (name, members) in &self.flow_groups {
            if name.trim().is_empty() {
                return Err(ValidationError::InvalidGroups(
                    "group names cannot be empty".to_string(),
                ));
            }
            if members.is_empty() {
                return Err(ValidationError::InvalidGroups(format!(
                    "group '{}' has no flows",
                    name
                )));
            }
            let mut seen = std::collections::HashSet::new();
            if let Some(dup) = members.iter().find(|id| !seen.insert(**id)) {
                return Err(ValidationError::InvalidGroups(format!(
                    "flow {} listed twice in group '{}'",
                    dup, name
                )));
            }
        }

        Ok(())
    }

    /// Bottleneck capacity in bits per second
    pub fn capacity_bps(&self) -> Result<f64, ValidationError> {
        let bps = parse_rate_to_bps(&self.bottleneck.capacity)
            .map_err(ValidationError::InvalidBottleneck)?;
        if !(bps.is_finite() && bps > 0.0) {
            return Err(ValidationError::InvalidBottleneck(format!(
                "capacity must be greater than zero, got '{}'",
                self.bottleneck.capacity
            )));
        }
        Ok(bps)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ExperimentInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Bottleneck link description
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BottleneckConfig {
    /// Link rate, e.g. "1Mbps" or "10 mbit"
    pub capacity: String,
    /// Emulated one-way delay of the link, informational only
    #[serde(default, with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub delay: Option<Duration>,
}

/// Time-series sampling settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SamplingConfig {
    #[serde(with = "humantime_serde", default = "default_window")]
    pub window: Duration,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid experiment configuration: {0}")]
    InvalidExperiment(String),
    #[error("Invalid bottleneck configuration: {0}")]
    InvalidBottleneck(String),
    #[error("Invalid fairness configuration: {0}")]
    InvalidFairness(String),
    #[error("Invalid sampling configuration: {0}")]
    InvalidSampling(String),
    #[error("Invalid flow groups: {0}")]
    InvalidGroups(String),
}

fn default_utilization_warning_pct() -> f64 {
    DEFAULT_UTILIZATION_WARNING_PCT
}

fn default_window() -> Duration {
    Duration::from_secs(3)
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("metrics_output")
}

/// Default implementations
impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            window: default_window(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_CONFIG: &str = r#"
experiment:
  name: "reno-rtt-unfairness"
  description: "Short and long RTT flows sharing one link"
bottleneck:
  capacity: "1Mbps"
  delay: "100ms"
fairness:
  fair: 0.9
  moderate: 0.8
utilization_warning_pct: 75
sampling:
  window: "2s"
flow_groups:
  fast: [0, 1, 2]
  slow: [3, 4, 5]
output:
  dir: "results"
"#;

    #[test]
    fn test_full_config_parsing() {
        let config: Config = serde_yaml::from_str(FULL_CONFIG).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.capacity_bps().unwrap(), 1_000_000.0);
        assert_eq!(config.bottleneck.delay, Some(Duration::from_millis(100)));
        assert_eq!(config.fairness.fair, 0.9);
        assert_eq!(config.utilization_warning_pct, 75.0);
        assert_eq!(config.sampling.window, Duration::from_secs(2));
        assert_eq!(config.flow_groups["slow"], vec![3, 4, 5]);
        assert_eq!(config.output.dir, PathBuf::from("results"));
    }

    #[test]
    fn test_minimal_config_defaults() {
        let yaml = r#"
experiment:
  name: "baseline"
bottleneck:
  capacity: "10 mbit"
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.fairness, FairnessThresholds::default());
        assert_eq!(config.utilization_warning_pct, 80.0);
        assert_eq!(config.sampling.window, Duration::from_secs(3));
        assert!(config.flow_groups.is_empty());
        assert_eq!(config.output.dir, PathBuf::from("metrics_output"));
    }

    fn minimal() -> Config {
        serde_yaml::from_str("experiment:\n  name: x\nbottleneck:\n  capacity: 1Mbps\n").unwrap()
    }

    #[test]
    fn test_validation_errors() {
        let mut config = minimal();
        config.bottleneck.capacity = "0".to_string();
        assert!(matches!(config.validate(), Err(ValidationError::InvalidBottleneck(_))));

        let mut config = minimal();
        config.bottleneck.capacity = "fast".to_string();
        assert!(matches!(config.validate(), Err(ValidationError::InvalidBottleneck(_))));

        let mut config = minimal();
        config.experiment.name = "  ".to_string();
        assert!(matches!(config.validate(), Err(ValidationError::InvalidExperiment(_))));

        let mut config = minimal();
        config.fairness = FairnessThresholds { fair: 0.4, moderate: 0.6 };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidFairness(_))));

        let mut config = minimal();
        config.sampling.window = Duration::ZERO;
        assert!(matches!(config.validate(), Err(ValidationError::InvalidSampling(_))));
    }

    #[test]
    fn test_group_validation() {
        let mut config = minimal();
        config.flow_groups.insert("empty".to_string(), vec![]);
        assert!(matches!(config.validate(), Err(ValidationError::InvalidGroups(_))));

        let mut config = minimal();
        config.flow_groups.insert("dup".to_string(), vec![1, 2, 1]);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("flow 1 listed twice"));
    }
}
