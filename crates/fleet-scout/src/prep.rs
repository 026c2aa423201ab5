//! Environment preparation before a sweep
//!
//! Makes the catalog's benchmark scripts executable and stages the rack
//! ordering helper next to the operator's home directory. All of this is
//! best-effort: a cluster missing one script can still sweep the shapes it
//! has, so filesystem errors are logged and swallowed.

use fleet_core::shapes::ShapeCatalog;
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, warn};

/// Rack-aware node ordering helper shipped with the HPC stack
const NODE_ORDERING_SCRIPT: &str = "/opt/oci-hpc/bin/node_ordering_by_rack.py";

/// Prepare the local environment for a sweep
pub async fn prepare(catalog: &ShapeCatalog) {
    ensure_scripts_executable(catalog).await;
    stage_node_ordering_script();
}

async fn ensure_scripts_executable(catalog: &ShapeCatalog) {
    for model in catalog.models() {
        match Command::new("chmod").arg("+x").arg(&model.script).output().await {
            Ok(output) if output.status.success() => {
                debug!(script = %model.script.display(), "benchmark script is executable");
            }
            Ok(output) => {
                warn!(
                    script = %model.script.display(),
                    stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                    "could not make benchmark script executable"
                );
            }
            Err(e) => {
                warn!(script = %model.script.display(), error = %e, "chmod failed");
            }
        }
    }
}

fn stage_node_ordering_script() {
    let Some(home) = dirs::home_dir() else {
        warn!("no home directory, skipping node ordering script");
        return;
    };
    let destination = home.join("node_ordering_by_rack.py");
    match std::fs::copy(Path::new(NODE_ORDERING_SCRIPT), &destination) {
        Ok(_) => debug!(destination = %destination.display(), "staged node ordering script"),
        Err(e) => {
            warn!(
                source = NODE_ORDERING_SCRIPT,
                error = %e,
                "could not stage node ordering script"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleet_core::shapes::GpuModel;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_scripts_become_executable() {
        let dir = TempDir::new().unwrap();
        let script = dir.path().join("bench.sh");
        std::fs::write(&script, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o644)).unwrap();

        let catalog = ShapeCatalog::new(vec![GpuModel {
            name: "TEST".to_string(),
            shapes: vec!["BM.GPU.TEST.8".to_string()],
            threshold_gbps: 1.0,
            script: script.clone(),
        }]);
        ensure_scripts_executable(&catalog).await;

        let mode = std::fs::metadata(&script).unwrap().permissions().mode();
        assert_ne!(mode & 0o100, 0, "owner execute bit should be set");
    }

    #[tokio::test]
    async fn test_missing_script_is_not_fatal() {
        let catalog = ShapeCatalog::new(vec![GpuModel {
            name: "TEST".to_string(),
            shapes: vec!["BM.GPU.TEST.8".to_string()],
            threshold_gbps: 1.0,
            script: "/nonexistent/bench.sh".into(),
        }]);
        // Must complete without panicking
        ensure_scripts_executable(&catalog).await;
    }
}
