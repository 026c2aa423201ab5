//! Capacity-topology reporting
//!
//! Reclassifies each bare-metal host's raw lifecycle state using host
//! occupancy, aggregates per-status counts, and collects the hosts that
//! need attention.

use crate::api::ComputeApi;
use fleet_core::{BareMetalHost, DerivedStatus, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// A host flagged for repair or follow-up
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttentionHost {
    /// Bare-metal host OCID
    pub host_id: String,

    /// Attached instance OCID, if any
    pub instance_id: Option<String>,

    /// Display name of the attached instance, resolved when available
    pub instance_name: Option<String>,

    /// Derived status that put this host on the list
    pub status: DerivedStatus,
}

/// Aggregate report over one capacity topology
#[derive(Debug, Clone, Serialize)]
pub struct TopologyReport {
    /// Report generation time (UTC)
    pub generated_at: chrono::DateTime<chrono::Utc>,

    /// Per-derived-status host counts
    pub state_counts: BTreeMap<DerivedStatus, usize>,

    /// Total hosts seen
    pub total: usize,

    /// Hosts needing repair or follow-up
    pub attention: Vec<AttentionHost>,
}

impl TopologyReport {
    /// Build a report from a host snapshot.
    ///
    /// Pure over its input apart from the timestamp.
    pub fn build(hosts: &[BareMetalHost]) -> Self {
        let mut state_counts: BTreeMap<DerivedStatus, usize> = BTreeMap::new();
        let mut attention = Vec::new();

        for host in hosts {
            let status = host.derived_status();
            *state_counts.entry(status.clone()).or_insert(0) += 1;

            if status.needs_attention() {
                attention.push(AttentionHost {
                    host_id: host.id.clone(),
                    instance_id: host.instance_id.clone(),
                    instance_name: None,
                    status,
                });
            }
        }

        Self {
            generated_at: chrono::Utc::now(),
            state_counts,
            total: hosts.len(),
            attention,
        }
    }

    /// Count for one status
    pub fn count(&self, status: &DerivedStatus) -> usize {
        self.state_counts.get(status).copied().unwrap_or(0)
    }
}

/// Fetch a topology's hosts and build the report.
///
/// For degraded-but-running hosts the attached instance's display name is
/// resolved so the attention list is actionable. Any API error aborts the
/// run; there is no partial-result recovery.
pub async fn run_report(compute: &dyn ComputeApi, topology_id: &str) -> Result<TopologyReport> {
    let hosts = compute.list_bare_metal_hosts(topology_id).await?;
    debug!(hosts = hosts.len(), "building topology report");

    let mut report = TopologyReport::build(&hosts);

    for entry in &mut report.attention {
        if entry.status == DerivedStatus::RunningDegraded {
            if let Some(ref instance_id) = entry.instance_id {
                let instance = compute.get_instance(instance_id).await?;
                entry.instance_name = Some(instance.display_name);
            }
        }
    }

    info!(
        total = report.total,
        attention = report.attention.len(),
        topology = %topology_id,
        "topology report complete"
    );
    Ok(report)
}
