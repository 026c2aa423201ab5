//! SSH reachability probing
//!
//! Fans probes out over a bounded worker pool and returns the subset of
//! hosts that answered. Unreachable hosts are logged and dropped; they
//! never fail the sweep.

use crate::shell::RemoteShell;
use fleet_core::Host;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Probe every host and return the reachable ones.
///
/// At most `max_workers` probes run at once. The result preserves the
/// input order and is always a subset of the input.
pub async fn check_hosts(
    shell: Arc<dyn RemoteShell>,
    hosts: &[Host],
    max_workers: usize,
) -> Vec<Host> {
    let semaphore = Arc::new(Semaphore::new(max_workers.max(1)));
    let mut probes = JoinSet::new();

    for (index, host) in hosts.iter().cloned().enumerate() {
        let shell = Arc::clone(&shell);
        let semaphore = Arc::clone(&semaphore);
        probes.spawn(async move {
            // Semaphore is never closed, acquire cannot fail
            let _permit = semaphore.acquire().await;
            let up = shell.probe(&host).await;
            (index, host, up)
        });
    }

    let mut reachable = Vec::new();
    while let Some(joined) = probes.join_next().await {
        match joined {
            Ok((index, host, true)) => {
                debug!(host = %host, "host is reachable");
                reachable.push((index, host));
            }
            Ok((_, host, false)) => {
                warn!(host = %host, "host is not reachable via ssh, skipping");
            }
            Err(e) => {
                warn!(error = %e, "reachability probe task failed");
            }
        }
    }

    reachable.sort_by_key(|(index, _)| *index);
    reachable.into_iter().map(|(_, host)| host).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::StaticShell;

    #[tokio::test]
    async fn test_unreachable_hosts_are_dropped() {
        let shell = StaticShell::new().with_host("gpu-1").with_host("gpu-3");
        let hosts = vec![Host::new("gpu-1"), Host::new("gpu-2"), Host::new("gpu-3")];

        let reachable = check_hosts(Arc::new(shell), &hosts, 10).await;
        assert_eq!(reachable, vec![Host::new("gpu-1"), Host::new("gpu-3")]);
    }

    #[tokio::test]
    async fn test_result_preserves_input_order() {
        let shell = StaticShell::new()
            .with_host("gpu-9")
            .with_host("gpu-2")
            .with_host("gpu-5");
        let hosts = vec![Host::new("gpu-9"), Host::new("gpu-2"), Host::new("gpu-5")];

        // Worker bound of 1 forces serial probing; order must still hold
        // for the parallel case, which join order does not guarantee.
        let reachable = check_hosts(Arc::new(shell.clone()), &hosts, 1).await;
        assert_eq!(reachable, hosts);

        let reachable = check_hosts(Arc::new(shell), &hosts, 10).await;
        assert_eq!(reachable, hosts);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let shell = StaticShell::new();
        let reachable = check_hosts(Arc::new(shell), &[], 10).await;
        assert!(reachable.is_empty());
    }
}
