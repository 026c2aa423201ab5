//! Pairwise NCCL bandwidth sweep

use crate::output::{format_bandwidth, Formattable, OutputFormat, OutputFormatter};
use anyhow::Result;
use fleet_core::FleetConfig;
use fleet_scout::{ExecutionStrategy, HostSpec, PairOutcome, ScoutReport, ScoutSession, SshShell};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
struct PairRow {
    pair: String,
    bandwidth: String,
    threshold: String,
    verdict: String,
}

impl PairRow {
    fn from_outcome(outcome: &PairOutcome) -> Self {
        Self {
            pair: outcome.pair.to_string(),
            bandwidth: format_bandwidth(outcome.bandwidth_gbps, outcome.threshold_gbps),
            threshold: format!("{:.1}", outcome.threshold_gbps),
            verdict: if outcome.passed() { "PASS" } else { "FAIL" }.to_string(),
        }
    }
}

impl Formattable for PairRow {
    fn table_headers() -> Vec<String> {
        vec![
            "Pair".to_string(),
            "Bandwidth (GB/s)".to_string(),
            "Threshold".to_string(),
            "Verdict".to_string(),
        ]
    }

    fn table_row(&self) -> Vec<String> {
        vec![
            self.pair.clone(),
            self.bandwidth.clone(),
            self.threshold.clone(),
            self.verdict.clone(),
        ]
    }

    fn key_value_pairs(&self) -> Vec<(String, String)> {
        vec![
            ("Pair".to_string(), self.pair.clone()),
            ("Bandwidth".to_string(), self.bandwidth.clone()),
            ("Threshold".to_string(), self.threshold.clone()),
            ("Verdict".to_string(), self.verdict.clone()),
        ]
    }
}

/// Resolve the execution strategy from flags and configuration
fn strategy(config: &FleetConfig, parallel: bool, workers: Option<usize>) -> ExecutionStrategy {
    if !parallel {
        return ExecutionStrategy::Sequential;
    }
    match workers.or(config.scout.parallel_tests) {
        Some(workers) => ExecutionStrategy::Parallel { workers },
        None => ExecutionStrategy::parallel(),
    }
}

/// Run the sweep and render its report
pub async fn run_scout(
    config: &FleetConfig,
    hosts: Vec<String>,
    parallel: bool,
    workers: Option<usize>,
    output_format: OutputFormat,
) -> Result<()> {
    let formatter = OutputFormatter::new(output_format);
    let spec = HostSpec::from_args(&hosts)?;
    let strategy = strategy(config, parallel, workers);

    let shell = Arc::new(SshShell::new(&config.ssh));
    let session = ScoutSession::new(shell, config.catalog(), &config.scout);
    let report = session.run(spec, strategy).await?;

    if output_format.is_structured() {
        return formatter.print_value(&report);
    }
    render(&formatter, &report)
}

fn render(formatter: &OutputFormatter, report: &ScoutReport) -> Result<()> {
    formatter.print_heading("Pairwise bandwidth");
    let rows: Vec<PairRow> = report.outcomes.iter().map(PairRow::from_outcome).collect();
    formatter.print_list(&rows)?;

    if let (Some(max), Some(min)) = (report.max_bandwidth(), report.min_bandwidth()) {
        formatter.print_info(&format!(
            "{} pairs passed, {} failed; bandwidth {:.1}-{:.1} GB/s",
            report.good_pairs(),
            report.bad_pairs(),
            min,
            max
        ))?;
    }

    if !report.skipped.is_empty() {
        let skipped: Vec<String> = report.skipped.iter().map(|h| h.to_string()).collect();
        formatter.print_warning(&format!("skipped hosts: {}", skipped.join(", ")))?;
    }

    if !report.retests.is_empty() {
        formatter.print_heading("Retest against known-good host");
        let rows: Vec<PairRow> = report.retests.iter().map(PairRow::from_outcome).collect();
        formatter.print_list(&rows)?;
    }

    let condemned: Vec<String> = report
        .bad_hosts
        .iter()
        .filter(|h| !report.good_hosts.contains(*h))
        .map(|h| h.to_string())
        .collect();
    if condemned.is_empty() {
        formatter.print_success("no consistently bad hosts found")?;
    } else {
        formatter.print_warning(&format!("suspect hosts: {}", condemned.join(", ")))?;
    }
    Ok(())
}
