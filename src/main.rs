use clap::{Parser, Subcommand};
use color_eyre::eyre::{bail, WrapErr};
use color_eyre::Result;
use env_logger::Env;
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use bottlenet::config::Config;
use bottlenet::config_loader::{self, CliOverrides};
use bottlenet::metrics::{
    self, report::print_summary, ExperimentReport, FairnessThresholds, FairnessVerdict, FlowSample,
    LatencySample, ReportMetadata, RunSummary,
};
use bottlenet::source::{load_sample_set, FlowDataSource};

/// Fairness, utilization and latency metrics for bottleneck-link experiments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Path to the experiment configuration YAML file
    #[arg(short, long, global = true, default_value = "experiment.yaml")]
    config: PathBuf,

    /// Path to the sample document (JSON, or YAML with a .yaml/.yml extension)
    #[arg(short, long, global = true, default_value = "samples.json")]
    samples: PathBuf,

    /// Output directory for reports (overrides the configuration)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Bottleneck capacity override, e.g. "1Mbps"
    #[arg(long, global = true)]
    capacity: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Number of parallel workers (0 = auto-detect)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report on the final throughput of every flow
    Report {
        /// Drop malformed samples instead of aborting
        #[arg(long)]
        drop_invalid: bool,
    },

    /// Report per sampling window and summarize the run
    Series {
        /// Sampling window override, e.g. "3s"
        #[arg(long, value_parser = humantime_serde::re::humantime::parse_duration)]
        window: Option<Duration>,

        /// Drop malformed samples instead of aborting
        #[arg(long)]
        drop_invalid: bool,
    },

    /// Print the verdict for a fairness index
    Classify {
        /// Jain's fairness index in [0, 1]
        index: f64,
    },
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let args = Args::parse();

    env_logger::Builder::from_env(Env::default().default_filter_or(&args.log_level)).init();

    if args.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(args.threads)
            .build_global()
            .wrap_err("Failed to configure thread pool")?;
    }

    let (drop_invalid, window) = match args.command {
        Command::Classify { index } => {
            let verdict = run_classify(&args.config, index)?;
            println!("{:.4} -> {}", index, verdict);
            return Ok(());
        }
        Command::Report { drop_invalid } => (drop_invalid, None),
        Command::Series { drop_invalid, window } => (drop_invalid, window),
    };

    let mut config = config_loader::load_config(&args.config)?;

    config_loader::apply_overrides(
        &mut config,
        &CliOverrides {
            capacity: args.capacity.clone(),
            window,
        },
    )?;

    let output_dir = args.output.clone().unwrap_or_else(|| config.output.dir.clone());
    fs::create_dir_all(&output_dir)
        .wrap_err_with(|| format!("Failed to create output directory '{}'", output_dir.display()))?;

    let source = load_sample_set(&args.samples)?;

    let (report, stem) = match args.command {
        Command::Series { .. } => (run_series(&config, &source, drop_invalid)?, "series_report"),
        _ => (run_report(&config, &source, drop_invalid)?, "report"),
    };
    write_reports(&report, &output_dir, stem)?;
    print_summary(&report);

    info!("Analysis completed successfully");
    Ok(())
}

/// Classify a fairness index, with the configured thresholds when a config file exists
fn run_classify(config_path: &Path, index: f64) -> Result<FairnessVerdict> {
    if !(0.0..=1.0).contains(&index) {
        bail!("Fairness index must be within [0, 1], got {}", index);
    }

    let thresholds = if config_path.exists() {
        config_loader::load_config(config_path)?.fairness
    } else {
        info!(
            "No configuration at {}, using default thresholds",
            config_path.display()
        );
        FairnessThresholds::default()
    };

    Ok(thresholds.classify(index))
}

/// Fetch samples from the source, optionally dropping malformed ones
fn collect_samples(
    source: &dyn FlowDataSource,
    drop_invalid: bool,
) -> Result<(Vec<FlowSample>, Vec<LatencySample>)> {
    let flows = source.throughput_samples()?;
    let latencies = source.latency_samples()?;

    if !drop_invalid {
        return Ok((flows, latencies));
    }

    let (flows, rejected_flows) = metrics::partition_valid(flows);
    let (latencies, rejected_latencies) = metrics::partition_valid(latencies);
    let rejected = rejected_flows.len() + rejected_latencies.len();
    if rejected > 0 {
        warn!("Dropped {} malformed samples from {}", rejected, source.describe());
    }

    Ok((flows, latencies))
}

fn build_report(
    config: &Config,
    source: &dyn FlowDataSource,
    flows: &[FlowSample],
    latencies: &[LatencySample],
) -> Result<ExperimentReport> {
    let capacity = config.capacity_bps()?;

    let finals = metrics::latest_per_flow(flows).wrap_err("Failed to select final samples")?;
    let report = metrics::compute_report_from_samples(&finals, capacity, latencies)
        .wrap_err("Failed to compute final report")?;
    let groups = metrics::compute_group_reports(&finals, latencies, &config.flow_groups, capacity)
        .wrap_err("Failed to compute flow group reports")?;
    let verdict = config.fairness.classify(report.fairness_index());

    info!(
        "{} flows: utilization {:.2}%, fairness {:.4} ({})",
        report.flow_count(),
        report.link_utilization_pct(),
        report.fairness_index(),
        verdict
    );

    Ok(ExperimentReport {
        metadata: ReportMetadata {
            experiment: config.experiment.name.clone(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            sample_source: source.describe(),
            bottleneck_capacity_bps: capacity,
            flow_count: report.flow_count(),
        },
        report,
        flow_ids: finals.iter().map(|s| s.flow_id).collect(),
        verdict,
        groups,
        windows: Vec::new(),
        summary: None,
    })
}

fn run_report(config: &Config, source: &dyn FlowDataSource, drop_invalid: bool) -> Result<ExperimentReport> {
    let (flows, latencies) = collect_samples(source, drop_invalid)?;
    build_report(config, source, &flows, &latencies)
}

fn run_series(config: &Config, source: &dyn FlowDataSource, drop_invalid: bool) -> Result<ExperimentReport> {
    let (flows, latencies) = collect_samples(source, drop_invalid)?;
    let mut report = build_report(config, source, &flows, &latencies)?;

    let capacity = report.metadata.bottleneck_capacity_bps;
    let windows = metrics::windowed_reports(&flows, config.sampling.window, capacity)
        .wrap_err("Failed to compute window reports")?;
    if windows.is_empty() {
        warn!("No interval samples found; the run summary is empty");
    }

    report.summary = RunSummary::from_windows(&windows, &config.fairness, config.utilization_warning_pct);
    report.windows = windows;

    if let Some(summary) = &report.summary {
        info!(
            "{} windows: mean fairness {:.3} ({}), mean utilization {:.1}%",
            summary.window_count,
            summary.mean_fairness_index,
            summary.verdict,
            summary.mean_link_utilization_pct
        );
        if summary.low_utilization {
            warn!(
                "Mean link utilization {:.1}% is below {:.0}%",
                summary.mean_link_utilization_pct, summary.utilization_warning_pct
            );
        }
    }

    Ok(report)
}

fn write_reports(report: &ExperimentReport, output_dir: &Path, stem: &str) -> Result<()> {
    metrics::generate_json_report(report, &output_dir.join(format!("{}.json", stem)))?;
    metrics::generate_text_report(report, &output_dir.join(format!("{}.txt", stem)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bottlenet::source::SampleSet;

    fn test_config() -> Config {
        serde_yaml::from_str(
            "experiment:\n  name: test\nbottleneck:\n  capacity: 1000bps\nsampling:\n  window: 1s\nflow_groups:\n  a: [0]\n  b: [1]\n",
        )
        .unwrap()
    }

    #[test]
    fn test_cli_parsing() {
        let args = Args::parse_from(&["bottlenet", "--config", "exp.yaml", "report"]);

        assert_eq!(args.config, PathBuf::from("exp.yaml"));
        assert_eq!(args.samples, PathBuf::from("samples.json"));
        assert!(args.output.is_none());
        assert!(matches!(args.command, Command::Report { drop_invalid: false }));
    }

    #[test]
    fn test_series_args() {
        let args = Args::parse_from(&[
            "bottlenet",
            "series",
            "--window", "2s",
            "--samples", "flows.yaml",
            "--capacity", "1Mbps",
        ]);

        assert_eq!(args.samples, PathBuf::from("flows.yaml"));
        assert_eq!(args.capacity.as_deref(), Some("1Mbps"));
        match args.command {
            Command::Series { window, drop_invalid } => {
                assert_eq!(window, Some(Duration::from_secs(2)));
                assert!(!drop_invalid);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_classify_args() {
        let args = Args::parse_from(&["bottlenet", "classify", "0.65"]);
        assert!(matches!(args.command, Command::Classify { index } if index == 0.65));
    }

    #[test]
    fn test_run_report_with_groups() {
        let source = SampleSet {
            flows: vec![FlowSample::new(0, 600.0), FlowSample::new(1, 200.0)],
            latencies: vec![LatencySample::new(0, 20.0)],
            origin: None,
        };

        let report = run_report(&test_config(), &source, false).unwrap();
        assert_eq!(report.report.link_utilization_pct(), 80.0);
        assert_eq!(report.report.rtt_avg_ms(), Some(20.0));
        assert_eq!(report.groups.len(), 2);
        assert_eq!(report.groups["a"].throughputs(), &[600.0]);
        assert!(report.summary.is_none());
    }

    #[test]
    fn test_invalid_sample_aborts_unless_dropped() {
        let source = SampleSet {
            flows: vec![FlowSample::new(0, 500.0), FlowSample::new(1, -1.0)],
            latencies: Vec::new(),
            origin: None,
        };

        assert!(run_report(&test_config(), &source, false).is_err());

        let report = run_report(&test_config(), &source, true).unwrap();
        assert_eq!(report.report.flow_count(), 1);
        assert_eq!(report.report.link_utilization_pct(), 50.0);
    }

    #[test]
    fn test_dropped_flow_keeps_real_ids() {
        let source = SampleSet {
            flows: vec![
                FlowSample::new(0, 300.0),
                FlowSample::new(1, f64::NAN),
                FlowSample::new(2, 300.0),
            ],
            latencies: Vec::new(),
            origin: None,
        };

        let report = run_report(&test_config(), &source, true).unwrap();
        assert_eq!(report.flow_ids, vec![0, 2]);

        let text = metrics::report::render_text_report(&report);
        assert!(text.contains("  flow   0: 300 bps"));
        assert!(text.contains("  flow   2: 300 bps"));
        assert!(!text.contains("  flow   1:"));
    }

    #[test]
    fn test_malformed_interval_aborts_report() {
        let source = SampleSet {
            flows: vec![
                FlowSample::with_interval(0, 100.0, 0.0, f64::NAN),
                FlowSample::with_interval(0, 900.0, 0.0, 5.0),
            ],
            latencies: Vec::new(),
            origin: None,
        };

        assert!(run_report(&test_config(), &source, false).is_err());

        let report = run_report(&test_config(), &source, true).unwrap();
        assert_eq!(report.report.throughputs(), &[900.0]);
    }

    #[test]
    fn test_series_drops_malformed_interval() {
        let source = SampleSet {
            flows: vec![
                FlowSample::with_interval(0, 500.0, 0.0, 1.0),
                FlowSample::with_interval(1, 500.0, 0.0, f64::NAN),
            ],
            latencies: Vec::new(),
            origin: None,
        };

        assert!(run_series(&test_config(), &source, false).is_err());

        let report = run_series(&test_config(), &source, true).unwrap();
        assert_eq!(report.windows.len(), 1);
        assert_eq!(report.flow_ids, vec![0]);
    }

    #[test]
    fn test_classify_without_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("experiment.yaml");

        assert_eq!(run_classify(&missing, 0.9).unwrap(), FairnessVerdict::Fair);
        assert_eq!(run_classify(&missing, 0.65).unwrap(), FairnessVerdict::Moderate);
        assert_eq!(run_classify(&missing, 0.1).unwrap(), FairnessVerdict::Unfair);
    }

    #[test]
    fn test_classify_uses_configured_thresholds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("experiment.yaml");
        fs::write(
            &path,
            "experiment:\n  name: strict\nbottleneck:\n  capacity: 1Mbps\nfairness:\n  fair: 0.95\n  moderate: 0.8\n",
        )
        .unwrap();

        assert_eq!(run_classify(&path, 0.9).unwrap(), FairnessVerdict::Moderate);
    }

    #[test]
    fn test_classify_rejects_out_of_range_index() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("experiment.yaml");

        for index in [-0.1, 1.5, f64::NAN] {
            assert!(run_classify(&missing, index).is_err(), "index {} accepted", index);
        }
    }

    #[test]
    fn test_run_series() {
        let source = SampleSet {
            flows: vec![
                FlowSample::with_interval(0, 500.0, 0.0, 1.0),
                FlowSample::with_interval(1, 500.0, 0.0, 1.0),
                FlowSample::with_interval(0, 900.0, 1.0, 2.0),
                FlowSample::with_interval(1, 100.0, 1.0, 2.0),
            ],
            latencies: Vec::new(),
            origin: None,
        };

        let report = run_series(&test_config(), &source, false).unwrap();
        assert_eq!(report.windows.len(), 2);
        assert_eq!(report.report.throughputs(), &[900.0, 100.0]);

        let summary = report.summary.unwrap();
        assert_eq!(summary.window_count, 2);
        assert_eq!(summary.mean_link_utilization_pct, 100.0);
        assert!(!summary.low_utilization);
    }
}
