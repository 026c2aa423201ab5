//! Candidate host discovery
//!
//! Hosts come from the Slurm controller, from a hostfile, or directly from
//! the command line; this module covers the first two.

use fleet_core::{Error, Host, Result};
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

/// List cluster nodes from the local Slurm controller (`sinfo -N -h -o %N`)
pub async fn hosts_from_slurm() -> Result<Vec<Host>> {
    let output = Command::new("sinfo")
        .args(["-N", "-h", "-o", "%N"])
        .output()
        .await
        .map_err(|e| Error::config(format!("failed to run sinfo: {}", e)))?;

    if !output.status.success() {
        return Err(Error::config(format!(
            "sinfo exited with {}: {}",
            output.status.code().unwrap_or(-1),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    let hosts = parse_host_lines(&String::from_utf8_lossy(&output.stdout));
    debug!(hosts = hosts.len(), "discovered hosts from slurm");
    Ok(hosts)
}

/// Read hosts from a file, one per line
pub async fn hosts_from_file(path: &Path) -> Result<Vec<Host>> {
    let content = tokio::fs::read_to_string(path).await?;
    let hosts = parse_host_lines(&content);
    debug!(hosts = hosts.len(), file = %path.display(), "read hosts from file");
    Ok(hosts)
}

fn parse_host_lines(content: &str) -> Vec<Host> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(Host::from)
        .collect()
}
