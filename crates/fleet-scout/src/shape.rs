//! Hardware shape resolution
//!
//! Each host reports its own shape through the instance metadata service;
//! the shape string is then matched against the catalog to pick the
//! benchmark script and bandwidth threshold.

use crate::shell::RemoteShell;
use fleet_core::shapes::{GpuModel, ShapeCatalog};
use fleet_core::{Error, Host, Result};
use tracing::{debug, error};

/// Command a host runs to dump its own instance metadata
pub const METADATA_COMMAND: &str =
    "curl -sH \"Authorization: Bearer Oracle\" -L http://169.254.169.254/opc/v2/instance/";

/// Fetch a host's shape string from its metadata service
pub async fn fetch_shape(shell: &dyn RemoteShell, host: &Host) -> Result<String> {
    let output = shell.run(host, METADATA_COMMAND).await?;
    if !output.is_success() {
        return Err(Error::ssh(format!(
            "metadata query on {} exited with {}",
            host, output.exit_code
        )));
    }

    let metadata: serde_json::Value = serde_json::from_str(&output.stdout)
        .map_err(|e| Error::parse(format!("metadata from {} is not valid JSON: {}", host, e)))?;

    metadata
        .get("shape")
        .and_then(|s| s.as_str())
        .map(str::to_string)
        .ok_or_else(|| Error::parse(format!("metadata from {} has no shape field", host)))
}

/// Resolve a host to its catalog entry.
///
/// `None` means the host could not be benchmarked, either because the
/// metadata query failed or because the shape is not in the catalog; both
/// cases are logged and the caller skips the host.
pub async fn resolve_model<'a>(
    shell: &dyn RemoteShell,
    catalog: &'a ShapeCatalog,
    host: &Host,
) -> Option<&'a GpuModel> {
    let shape = match fetch_shape(shell, host).await {
        Ok(shape) => shape,
        Err(e) => {
            error!(host = %host, error = %e, "unable to fetch shape");
            return None;
        }
    };

    match catalog.resolve(&shape) {
        Some(model) => {
            debug!(host = %host, shape = %shape, model = %model.name, "resolved shape");
            Some(model)
        }
        None => {
            error!(host = %host, shape = %shape, "shape is not in the catalog");
            None
        }
    }
}
