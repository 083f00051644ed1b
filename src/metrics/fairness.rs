//! Human-readable fairness verdicts.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Verdict for a Jain's fairness index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FairnessVerdict {
    /// index >= fair threshold
    Fair,
    /// moderate threshold <= index < fair threshold
    Moderate,
    /// index < moderate threshold
    Unfair,
}

impl fmt::Display for FairnessVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FairnessVerdict::Fair => write!(f, "FAIR"),
            FairnessVerdict::Moderate => write!(f, "MODERATE"),
            FairnessVerdict::Unfair => write!(f, "UNFAIR"),
        }
    }
}

/// Classification thresholds for fairness verdicts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FairnessThresholds {
    /// Lowest index still considered fair
    #[serde(default = "default_fair_threshold")]
    pub fair: f64,
    /// Lowest index considered moderately fair
    #[serde(default = "default_moderate_threshold")]
    pub moderate: f64,
}

fn default_fair_threshold() -> f64 {
    0.8
}

fn default_moderate_threshold() -> f64 {
    0.5
}

impl Default for FairnessThresholds {
    fn default() -> Self {
        Self {
            fair: default_fair_threshold(),
            moderate: default_moderate_threshold(),
        }
    }
}

impl FairnessThresholds {
    /// Check that 0 <= moderate <= fair <= 1
    pub fn validate(&self) -> Result<(), String> {
        if !(self.fair.is_finite() && self.moderate.is_finite()) {
            return Err("fairness thresholds must be finite".to_string());
        }
        if !(0.0..=1.0).contains(&self.fair) || !(0.0..=1.0).contains(&self.moderate) {
            return Err(format!(
                "fairness thresholds must lie in [0, 1] (fair: {}, moderate: {})",
                self.fair, self.moderate
            ));
        }
        if self.moderate > self.fair {
            return Err(format!(
                "moderate threshold {} is above fair threshold {}",
                self.moderate, self.fair
            ));
        }
        Ok(())
    }

    /// Classify a fairness index. NaN classifies as unfair.
    pub fn classify(&self, index: f64) -> FairnessVerdict {
        if index >= self.fair {
            FairnessVerdict::Fair
        } else if index >= self.moderate {
            FairnessVerdict::Moderate
        } else {
            FairnessVerdict::Unfair
        }
    }
}

/// Classify a fairness index with the default 0.8 / 0.5 thresholds
///
/// # Examples
/// ```
/// use bottlenet::metrics::{classify_fairness, FairnessVerdict};
///
/// assert_eq!(classify_fairness(0.95), FairnessVerdict::Fair);
/// assert_eq!(classify_fairness(0.6), FairnessVerdict::Moderate);
/// assert_eq!(classify_fairness(0.25), FairnessVerdict::Unfair);
/// ```
pub fn classify_fairness(index: f64) -> FairnessVerdict {
    FairnessThresholds::default().classify(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries() {
        assert_eq!(classify_fairness(1.0), FairnessVerdict::Fair);
        assert_eq!(classify_fairness(0.8), FairnessVerdict::Fair);
        assert_eq!(classify_fairness(0.79999), FairnessVerdict::Moderate);
        assert_eq!(classify_fairness(0.5), FairnessVerdict::Moderate);
        assert_eq!(classify_fairness(0.49999), FairnessVerdict::Unfair);
        assert_eq!(classify_fairness(0.0), FairnessVerdict::Unfair);
        assert_eq!(classify_fairness(f64::NAN), FairnessVerdict::Unfair);
    }

    #[test]
    fn test_custom_thresholds() {
        let strict = FairnessThresholds { fair: 0.9, moderate: 0.8 };
        assert!(strict.validate().is_ok());
        assert_eq!(strict.classify(0.85), FairnessVerdict::Moderate);
        assert_eq!(strict.classify(0.7), FairnessVerdict::Unfair);
    }

    #[test]
    fn test_threshold_validation() {
        assert!(FairnessThresholds::default().validate().is_ok());
        assert!(FairnessThresholds { fair: 0.5, moderate: 0.8 }.validate().is_err());
        assert!(FairnessThresholds { fair: 1.5, moderate: 0.5 }.validate().is_err());
        assert!(FairnessThresholds { fair: 0.8, moderate: -0.1 }.validate().is_err());
        assert!(FairnessThresholds { fair: f64::NAN, moderate: 0.5 }.validate().is_err());
    }

    #[test]
    fn test_verdict_display_and_serde() {
        assert_eq!(FairnessVerdict::Moderate.to_string(), "MODERATE");
        assert_eq!(
            serde_json::to_string(&FairnessVerdict::Unfair).unwrap(),
            "\"UNFAIR\""
        );
    }

    #[test]
    fn test_thresholds_from_partial_yaml() {
        let thresholds: FairnessThresholds = serde_yaml::from_str("fair: 0.9").unwrap();
        assert_eq!(thresholds.fair, 0.9);
        assert_eq!(thresholds.moderate, 0.5);
    }
}
