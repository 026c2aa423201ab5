//! Cloud API traits
//!
//! The reporter and tagger operate against these seams rather than a
//! concrete client, so tests can swap in [`crate::MockCloud`].

use crate::models::{DefinedTags, Instance, TagNamespaceSummary, TagSummary};
use async_trait::async_trait;
use fleet_core::{BareMetalHost, Result};

/// Compute-plane operations
#[async_trait]
pub trait ComputeApi: Send + Sync {
    /// List every bare-metal host in a capacity topology.
    ///
    /// Pagination is handled inside; the full set is returned.
    async fn list_bare_metal_hosts(&self, topology_id: &str) -> Result<Vec<BareMetalHost>>;

    /// Fetch one instance
    async fn get_instance(&self, instance_id: &str) -> Result<Instance>;

    /// Replace an instance's defined tags
    async fn update_instance_tags(&self, instance_id: &str, defined_tags: DefinedTags)
        -> Result<()>;
}

/// Identity-plane operations for tag administration
#[async_trait]
pub trait IdentityApi: Send + Sync {
    /// List tag namespaces in a compartment
    async fn list_tag_namespaces(&self, compartment_id: &str) -> Result<Vec<TagNamespaceSummary>>;

    /// List defined tag keys in a namespace
    async fn list_tags(&self, namespace_id: &str) -> Result<Vec<TagSummary>>;

    /// Create a tag namespace
    async fn create_tag_namespace(
        &self,
        compartment_id: &str,
        name: &str,
        description: &str,
    ) -> Result<TagNamespaceSummary>;

    /// Create a defined tag key in a namespace
    async fn create_tag(
        &self,
        namespace_id: &str,
        name: &str,
        description: &str,
    ) -> Result<TagSummary>;
}
