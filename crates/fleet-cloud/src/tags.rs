//! Unhealthy-instance tagging
//!
//! Marks a compute instance for downstream remediation by merging a fixed
//! defined tag into its tag set, plus administrative check/setup of the
//! namespace and tag key the marker lives under.

use crate::api::{ComputeApi, IdentityApi};
use fleet_core::{Error, Result};
use tracing::{info, warn};

/// Namespace the remediation marker lives under
pub const TAG_NAMESPACE: &str = "ComputeInstanceHostActions";

/// Tag key for customer-reported host status
pub const TAG_KEY: &str = "CustomerReportedHostStatus";

/// Marker value consumed by remediation workflows
pub const TAG_VALUE: &str = "unhealthy";

/// Merge the unhealthy marker into an instance's defined tags.
///
/// The merge is client-side: existing namespaces and keys are preserved,
/// any prior value under the marker key is overwritten, and the result is
/// committed by a single update call.
pub async fn tag_unhealthy(compute: &dyn ComputeApi, instance_id: &str) -> Result<()> {
    let instance = compute.get_instance(instance_id).await?;

    let mut tags = instance.defined_tags;
    tags.entry(TAG_NAMESPACE.to_string())
        .or_default()
        .insert(TAG_KEY.to_string(), TAG_VALUE.to_string());

    info!(instance = %instance_id, "updating tags on instance");
    compute.update_instance_tags(instance_id, tags).await
}

/// Verify the tag namespace and tag key exist.
///
/// Returns the namespace id on success; a missing namespace or key is a
/// fatal [`Error::TagSetup`].
pub async fn check_tag_setup(identity: &dyn IdentityApi, compartment_id: &str) -> Result<String> {
    let namespaces = identity.list_tag_namespaces(compartment_id).await?;
    let namespace = namespaces
        .into_iter()
        .find(|ns| ns.name == TAG_NAMESPACE)
        .ok_or_else(|| {
            warn!(namespace = TAG_NAMESPACE, "tag namespace missing");
            Error::tag_setup(format!("tag namespace {} not found", TAG_NAMESPACE))
        })?;

    let tags = identity.list_tags(&namespace.id).await?;
    if !tags.iter().any(|t| t.name == TAG_KEY) {
        warn!(tag = TAG_KEY, "tag key missing");
        return Err(Error::tag_setup(format!("tag {} not found", TAG_KEY)));
    }

    info!(compartment = %compartment_id, "tags properly set up");
    Ok(namespace.id)
}

/// Create the tag namespace and tag key
pub async fn setup_tags(identity: &dyn IdentityApi, compartment_id: &str) -> Result<()> {
    let namespace = identity
        .create_tag_namespace(
            compartment_id,
            TAG_NAMESPACE,
            "Compute Instance Actions Tag Namespace",
        )
        .await?;
    info!(namespace = %namespace.name, "created tag namespace");

    let tag = identity
        .create_tag(
            &namespace.id,
            TAG_KEY,
            "Tag for reporting unhealthy instances",
        )
        .await?;
    info!(tag = %tag.name, "created tag");

    Ok(())
}
