//! Unhealthy-instance tagging

use crate::output::{OutputFormat, OutputFormatter};
use anyhow::{bail, Result};
use fleet_cloud::tags::{self, TAG_KEY, TAG_NAMESPACE, TAG_VALUE};
use fleet_cloud::CloudClient;
use fleet_core::FleetConfig;

/// Tag an instance unhealthy, or check/create the tag plumbing
pub async fn run_tag(
    config: &FleetConfig,
    instance_id: Option<String>,
    region: Option<&str>,
    check: bool,
    setup: bool,
    output_format: OutputFormat,
) -> Result<()> {
    let formatter = OutputFormatter::new(output_format);
    let client = CloudClient::new(&config.cloud, region)?;
    let tenancy = &config.cloud.tenancy_id;
    if tenancy.is_empty() {
        bail!("cloud.tenancy_id must be set in the configuration");
    }

    if setup {
        tags::setup_tags(&client, tenancy).await?;
        formatter.print_success(&format!(
            "created tag namespace {} with key {}",
            TAG_NAMESPACE, TAG_KEY
        ))?;
        return Ok(());
    }

    if check {
        tags::check_tag_setup(&client, tenancy).await?;
        formatter.print_success(&format!(
            "tag namespace {} and key {} are in place",
            TAG_NAMESPACE, TAG_KEY
        ))?;
        return Ok(());
    }

    let Some(instance_id) = instance_id else {
        bail!("an instance OCID is required unless --check or --setup is given");
    };

    // Tagging without the namespace in place would silently do nothing
    // useful, so verify first and fail loudly.
    tags::check_tag_setup(&client, tenancy).await?;
    tags::tag_unhealthy(&client, &instance_id).await?;
    formatter.print_success(&format!(
        "instance {} tagged {}.{} = {}",
        instance_id, TAG_NAMESPACE, TAG_KEY, TAG_VALUE
    ))?;
    Ok(())
}
