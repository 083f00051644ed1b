use crate::config::Config;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::{info, warn};
use std::fs::File;
use std::path::Path;
use std::time::Duration;

/// Load and parse configuration from a YAML file
pub fn load_config(config_path: &Path) -> Result<Config> {
    info!("Loading configuration from: {:?}", config_path);

    let file = File::open(config_path)
        .wrap_err_with(|| format!("Failed to open configuration '{}'", config_path.display()))?;

    let config: Config = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse configuration '{}'", config_path.display()))?;

    config.validate()?;

    info!(
        "Experiment '{}': bottleneck {}, {} flow groups",
        config.experiment.name,
        config.bottleneck.capacity,
        config.flow_groups.len()
    );

    Ok(config)
}

/// CLI arguments that can override YAML settings
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub capacity: Option<String>,
    pub window: Option<Duration>,
}

/// Apply CLI overrides to a configuration
pub fn apply_overrides(config: &mut Config, overrides: &CliOverrides) -> Result<()> {
    if let Some(capacity) = &overrides.capacity {
        info!(
            "Overriding bottleneck capacity: {} -> {}",
            config.bottleneck.capacity, capacity
        );
        config.bottleneck.capacity = capacity.clone();
    }

    if let Some(window) = overrides.window {
        if window < Duration::from_millis(100) {
            warn!("Sampling window {:?} is shorter than typical reporting intervals", window);
        }
        config.sampling.window = window;
    }

    // Re-validate after applying overrides
    config.validate()?;

    Ok(())
}
