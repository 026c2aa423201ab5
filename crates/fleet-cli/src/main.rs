//! fleetops - GPU fleet operations CLI

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

mod commands;
mod output;

use fleet_core::FleetConfig;
use output::OutputFormat;

/// Operations tooling for GPU fleets: topology health reports,
/// unhealthy-instance tagging, and NCCL bandwidth scouting
#[derive(Debug, Parser)]
#[command(name = "fleetops")]
#[command(about = "GPU fleet operations: health reports, tagging, bandwidth scouting")]
#[command(version)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    output: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Enable JSON output (overrides --output)
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Report host health across a capacity topology
    #[command(name = "report")]
    Report {
        /// Capacity topology OCID
        #[arg(short, long)]
        capacity_id: String,

        /// Region override
        #[arg(short, long)]
        region: Option<String>,
    },

    /// Mark a compute instance unhealthy for remediation
    #[command(name = "tag")]
    Tag {
        /// Instance OCID (not needed with --check or --setup)
        #[arg(short, long)]
        instance_id: Option<String>,

        /// Region override
        #[arg(short, long)]
        region: Option<String>,

        /// Verify the tag namespace and key exist, then exit
        #[arg(long, conflicts_with = "setup")]
        check: bool,

        /// Create the tag namespace and key
        #[arg(long)]
        setup: bool,
    },

    /// Run pairwise NCCL bandwidth tests across cluster hosts
    #[command(name = "scout")]
    Scout {
        /// Hosts: none = Slurm discovery, one = hostfile, two = explicit pair
        hosts: Vec<String>,

        /// Run benchmarks in parallel
        #[arg(short, long)]
        parallel: bool,

        /// Concurrent benchmarks in parallel mode
        #[arg(long, requires = "parallel")]
        workers: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "fleet_cli={0},fleet_core={0},fleet_cloud={0},fleet_scout={0}",
            log_level
        ))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    debug!("starting fleetops with args: {:?}", cli);

    let config = FleetConfig::load(cli.config.as_deref())?;
    debug!("loaded configuration from {:?}", config.source());

    let output_format = if cli.json {
        OutputFormat::Json
    } else {
        cli.output
    };

    match cli.command {
        Commands::Report {
            capacity_id,
            region,
        } => {
            commands::report::run_report(&config, &capacity_id, region.as_deref(), output_format)
                .await?;
        }

        Commands::Tag {
            instance_id,
            region,
            check,
            setup,
        } => {
            commands::tag::run_tag(
                &config,
                instance_id,
                region.as_deref(),
                check,
                setup,
                output_format,
            )
            .await?;
        }

        Commands::Scout {
            hosts,
            parallel,
            workers,
        } => {
            commands::scout::run_scout(&config, hosts, parallel, workers, output_format).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert()
    }

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from(["fleetops", "report", "--capacity-id", "topo-1"]).unwrap();
        assert!(matches!(cli.command, Commands::Report { .. }));

        let cli = Cli::try_parse_from(["fleetops", "tag", "--check"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Tag {
                check: true,
                setup: false,
                ..
            }
        ));

        let cli = Cli::try_parse_from(["fleetops", "scout", "gpu-1", "gpu-2"]).unwrap();
        match cli.command {
            Commands::Scout { hosts, .. } => assert_eq!(hosts, vec!["gpu-1", "gpu-2"]),
            _ => panic!("expected scout"),
        }
    }

    #[test]
    fn test_conflicting_tag_flags_rejected() {
        assert!(Cli::try_parse_from(["fleetops", "tag", "--check", "--setup"]).is_err());
    }

    #[test]
    fn test_output_format_flags() {
        let cli =
            Cli::try_parse_from(["fleetops", "--json", "report", "-c", "topo-1"]).unwrap();
        assert!(cli.json);

        let cli =
            Cli::try_parse_from(["fleetops", "--output", "yaml", "report", "-c", "topo-1"])
                .unwrap();
        assert_eq!(cli.output, OutputFormat::Yaml);
    }
}
