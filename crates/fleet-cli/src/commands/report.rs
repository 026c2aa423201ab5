//! Capacity-topology health report

use crate::output::{colorize_status, Formattable, OutputFormat, OutputFormatter};
use anyhow::Result;
use fleet_cloud::topology::{self, TopologyReport};
use fleet_cloud::CloudClient;
use fleet_core::FleetConfig;
use serde::Serialize;

#[derive(Serialize)]
struct StatusRow {
    status: String,
    count: usize,
}

impl Formattable for StatusRow {
    fn table_headers() -> Vec<String> {
        vec!["Status".to_string(), "Hosts".to_string()]
    }

    fn table_row(&self) -> Vec<String> {
        vec![colorize_status(&self.status).to_string(), self.count.to_string()]
    }

    fn key_value_pairs(&self) -> Vec<(String, String)> {
        vec![(self.status.clone(), self.count.to_string())]
    }
}

#[derive(Serialize)]
struct AttentionRow {
    host_id: String,
    instance: String,
    status: String,
}

impl Formattable for AttentionRow {
    fn table_headers() -> Vec<String> {
        vec![
            "Host".to_string(),
            "Instance".to_string(),
            "Status".to_string(),
        ]
    }

    fn table_row(&self) -> Vec<String> {
        vec![
            self.host_id.clone(),
            self.instance.clone(),
            colorize_status(&self.status).to_string(),
        ]
    }

    fn key_value_pairs(&self) -> Vec<(String, String)> {
        vec![
            ("Host".to_string(), self.host_id.clone()),
            ("Instance".to_string(), self.instance.clone()),
            ("Status".to_string(), self.status.clone()),
        ]
    }
}

/// Run the topology report and render it
pub async fn run_report(
    config: &FleetConfig,
    topology_id: &str,
    region: Option<&str>,
    output_format: OutputFormat,
) -> Result<()> {
    let formatter = OutputFormatter::new(output_format);
    let client = CloudClient::new(&config.cloud, region)?;
    let report = topology::run_report(&client, topology_id).await?;

    if output_format.is_structured() {
        return formatter.print_value(&report);
    }
    render(&formatter, &report)
}

fn render(formatter: &OutputFormatter, report: &TopologyReport) -> Result<()> {
    formatter.print_heading("Host status");
    let status_rows: Vec<StatusRow> = report
        .state_counts
        .iter()
        .map(|(status, count)| StatusRow {
            status: status.to_string(),
            count: *count,
        })
        .collect();
    formatter.print_list(&status_rows)?;
    formatter.print_info(&format!("{} hosts total", report.total))?;

    if !report.attention.is_empty() {
        formatter.print_heading("Needs attention");
        let attention_rows: Vec<AttentionRow> = report
            .attention
            .iter()
            .map(|entry| AttentionRow {
                host_id: entry.host_id.clone(),
                instance: entry
                    .instance_name
                    .clone()
                    .or_else(|| entry.instance_id.clone())
                    .unwrap_or_else(|| "-".to_string()),
                status: entry.status.to_string(),
            })
            .collect();
        formatter.print_list(&attention_rows)?;
    }
    Ok(())
}
