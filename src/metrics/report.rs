//! Report generation for bottleneck experiments.
//!
//! Generates both JSON and human-readable text reports.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use color_eyre::eyre::{Context, Result};
use serde::Serialize;

use super::fairness::FairnessVerdict;
use super::summary::RunSummary;
use super::types::{FlowId, Report, WindowReport};
use super::units::format_rate;

/// Run metadata attached to every experiment report
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub experiment: String,
    pub generated_at: String,
    pub sample_source: String,
    pub bottleneck_capacity_bps: f64,
    pub flow_count: usize,
}

/// Everything produced for one measurement run
#[derive(Debug, Clone, Serialize)]
pub struct ExperimentReport {
    pub metadata: ReportMetadata,
    pub report: Report,
    /// Flow id of each entry in `report.throughputs()`, same order
    pub flow_ids: Vec<FlowId>,
    pub verdict: FairnessVerdict,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub groups: BTreeMap<String, Report>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub windows: Vec<WindowReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<RunSummary>,
}

/// Generate JSON report
pub fn generate_json_report(report: &ExperimentReport, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)
        .context("Failed to serialize report to JSON")?;

    fs::write(output_path, json)
        .with_context(|| format!("Failed to write JSON report to {}", output_path.display()))?;

    log::info!("JSON report written to {}", output_path.display());
    Ok(())
}

fn push_report_lines(lines: &mut Vec<String>, report: &Report) {
    lines.push(format!("Flows: {}", report.flow_count()));
    lines.push(format!(
        "Total throughput:   {}",
        format_rate(report.total_throughput())
    ));
    lines.push(format!(
        "Average per flow:   {}",
        format_rate(report.average_throughput())
    ));
    lines.push(format!(
        "Min ~ Max:          {} ~ {}",
        format_rate(report.min_throughput()),
        format_rate(report.max_throughput())
    ));
    match report.max_min_ratio() {
        Some(ratio) => lines.push(format!("Max/Min ratio:      {:.2}x", ratio)),
        None => lines.push("Max/Min ratio:      n/a (a flow reported zero)".to_string()),
    }
    lines.push(format!(
        "Link utilization:   {:.2}%",
        report.link_utilization_pct()
    ));
    lines.push(format!(
        "Fairness (Jain):    {:.4}",
        report.fairness_index()
    ));

    if let (Some(avg), Some(min), Some(max)) =
        (report.rtt_avg_ms(), report.rtt_min_ms(), report.rtt_max_ms())
    {
        lines.push(format!("RTT avg:            {:.1} ms", avg));
        lines.push(format!("RTT min ~ max:      {:.1} ~ {:.1} ms", min, max));
    } else {
        lines.push("RTT:                no latency data".to_string());
    }
}

fn section(lines: &mut Vec<String>, title: &str) {
    lines.push("=".repeat(80));
    lines.push(format!("{:^80}", title));
    lines.push("=".repeat(80));
    lines.push(String::new());
}

/// Render the human-readable text report
pub fn render_text_report(report: &ExperimentReport) -> String {
    let mut lines: Vec<String> = Vec::new();

    section(&mut lines, "BOTTLENECK FAIRNESS REPORT");

    lines.push(format!("Experiment: {}", report.metadata.experiment));
    lines.push(format!("Generated: {}", report.metadata.generated_at));
    lines.push(format!("Samples: {}", report.metadata.sample_source));
    lines.push(format!(
        "Bottleneck capacity: {}",
        format_rate(report.metadata.bottleneck_capacity_bps)
    ));
    lines.push(String::new());

    section(&mut lines, "FINAL THROUGHPUT");
    push_report_lines(&mut lines, &report.report);
    lines.push(String::new());
    lines.push("Per-flow throughput:".to_string());
    for (flow_id, tput) in report.flow_ids.iter().zip(report.report.throughputs()) {
        lines.push(format!("  flow {:>3}: {}", flow_id, format_rate(*tput)));
    }
    lines.push(String::new());
    lines.push(format!("VERDICT: {}", report.verdict));
    lines.push(String::new());

    if !report.groups.is_empty() {
        section(&mut lines, "FLOW GROUPS");
        for (name, group) in &report.groups {
            lines.push(format!("[{}]", name));
            push_report_lines(&mut lines, group);
            lines.push(String::new());
        }
    }

    if !report.windows.is_empty() {
        section(&mut lines, "TIME SERIES");
        for window in &report.windows {
            lines.push(format!(
                "[{:>6.1}s - {:>6.1}s] FI={:.3}, LinkUtil={:.1}%, Avg={}, Max={}, Min={}",
                window.start,
                window.end,
                window.report.fairness_index(),
                window.report.link_utilization_pct(),
                format_rate(window.report.average_throughput()),
                format_rate(window.report.max_throughput()),
                format_rate(window.report.min_throughput()),
            ));
        }
        lines.push(String::new());
    }

    if let Some(ref summary) = report.summary {
        section(&mut lines, "RUN SUMMARY");
        lines.push(format!("Windows: {}", summary.window_count));
        lines.push(format!("Mean fairness index: {:.3}", summary.mean_fairness_index));
        lines.push(format!(
            "Mean link utilization: {:.1}%",
            summary.mean_link_utilization_pct
        ));
        lines.push(format!("Mean max flow: {}", format_rate(summary.mean_max_throughput)));
        lines.push(format!("Mean min flow: {}", format_rate(summary.mean_min_throughput)));
        if let Some(ratio) = summary.max_min_ratio {
            lines.push(format!("Max/Min ratio: {:.1}x", ratio));
        }
        lines.push(String::new());
        lines.push(format!("VERDICT: {}", summary.verdict));
        if summary.low_utilization {
            lines.push(format!(
                "WARNING: link utilization below {:.0}%",
                summary.utilization_warning_pct
            ));
        }
        lines.push(String::new());
    }

    lines.push("=".repeat(80));
    lines.join("\n")
}

/// Generate human-readable text report
pub fn generate_text_report(report: &ExperimentReport, output_path: &Path) -> Result<()> {
    let content = render_text_report(report);
    fs::write(output_path, content)
        .with_context(|| format!("Failed to write text report to {}", output_path.display()))?;

    log::info!("Text report written to {}", output_path.display());
    Ok(())
}

/// Print a summary to stdout
pub fn print_summary(report: &ExperimentReport) {
    println!("\n=== BOTTLENECK FAIRNESS SUMMARY ===\n");
    println!("Experiment: {}", report.metadata.experiment);
    println!("Flows: {}", report.metadata.flow_count);
    println!("Link utilization: {:.2}%", report.report.link_utilization_pct());
    println!(
        "Fairness index: {:.4} ({})",
        report.report.fairness_index(),
        report.verdict
    );
    if let Some(avg) = report.report.rtt_avg_ms() {
        println!("RTT avg: {:.1} ms", avg);
    }

    if let Some(ref summary) = report.summary {
        println!("\nTime series ({} windows):", summary.window_count);
        println!("  Mean fairness: {:.3} ({})", summary.mean_fairness_index, summary.verdict);
        println!("  Mean utilization: {:.1}%", summary.mean_link_utilization_pct);
    }

    println!();
}
