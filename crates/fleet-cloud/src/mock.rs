//! Mock cloud backend for testing
//!
//! In-memory implementation of [`ComputeApi`] and [`IdentityApi`];
//! mutations are visible to assertions.

use crate::api::{ComputeApi, IdentityApi};
use crate::models::{DefinedTags, Instance, TagNamespaceSummary, TagSummary};
use async_trait::async_trait;
use fleet_core::{BareMetalHost, Error, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct MockState {
    topologies: HashMap<String, Vec<BareMetalHost>>,
    instances: HashMap<String, Instance>,
    namespaces: Vec<TagNamespaceSummary>,
    tags: HashMap<String, Vec<TagSummary>>,
    fail_all: bool,
}

/// In-memory cloud backend
#[derive(Debug, Clone, Default)]
pub struct MockCloud {
    state: Arc<Mutex<MockState>>,
}

impl MockCloud {
    /// Create an empty mock
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a capacity topology and its hosts
    pub async fn with_topology(self, topology_id: &str, hosts: Vec<BareMetalHost>) -> Self {
        self.state
            .lock()
            .await
            .topologies
            .insert(topology_id.to_string(), hosts);
        self
    }

    /// Register an instance
    pub async fn with_instance(self, instance: Instance) -> Self {
        self.state
            .lock()
            .await
            .instances
            .insert(instance.id.clone(), instance);
        self
    }

    /// Register a tag namespace with its tag keys
    pub async fn with_namespace(self, namespace: &str, tag_names: &[&str]) -> Self {
        {
            let mut state = self.state.lock().await;
            let id = format!("ocid1.tagnamespace.oc1..{}", namespace.to_lowercase());
            state.namespaces.push(TagNamespaceSummary {
                id: id.clone(),
                name: namespace.to_string(),
            });
            state.tags.insert(
                id.clone(),
                tag_names
                    .iter()
                    .map(|name| TagSummary {
                        id: format!("{}.{}", id, name),
                        name: name.to_string(),
                    })
                    .collect(),
            );
        }
        self
    }

    /// Make every subsequent call fail with an API error
    pub async fn fail_all(&self) {
        self.state.lock().await.fail_all = true;
    }

    /// Current defined tags on an instance
    pub async fn instance_tags(&self, instance_id: &str) -> Option<DefinedTags> {
        self.state
            .lock()
            .await
            .instances
            .get(instance_id)
            .map(|i| i.defined_tags.clone())
    }

    /// Names of registered namespaces
    pub async fn namespace_names(&self) -> Vec<String> {
        self.state
            .lock()
            .await
            .namespaces
            .iter()
            .map(|ns| ns.name.clone())
            .collect()
    }
}

#[async_trait]
impl ComputeApi for MockCloud {
    async fn list_bare_metal_hosts(&self, topology_id: &str) -> Result<Vec<BareMetalHost>> {
        let state = self.state.lock().await;
        if state.fail_all {
            return Err(Error::api("mock failure"));
        }
        state
            .topologies
            .get(topology_id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("topology {}", topology_id)))
    }

    async fn get_instance(&self, instance_id: &str) -> Result<Instance> {
        let state = self.state.lock().await;
        if state.fail_all {
            return Err(Error::api("mock failure"));
        }
        state
            .instances
            .get(instance_id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("instance {}", instance_id)))
    }

    async fn update_instance_tags(
        &self,
        instance_id: &str,
        defined_tags: DefinedTags,
    ) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.fail_all {
            return Err(Error::api("mock failure"));
        }
        let instance = state
            .instances
            .get_mut(instance_id)
            .ok_or_else(|| Error::not_found(format!("instance {}", instance_id)))?;
        instance.defined_tags = defined_tags;
        Ok(())
    }
}

#[async_trait]
impl IdentityApi for MockCloud {
    async fn list_tag_namespaces(&self, _compartment_id: &str) -> Result<Vec<TagNamespaceSummary>> {
        let state = self.state.lock().await;
        if state.fail_all {
            return Err(Error::api("mock failure"));
        }
        Ok(state.namespaces.clone())
    }

    async fn list_tags(&self, namespace_id: &str) -> Result<Vec<TagSummary>> {
        let state = self.state.lock().await;
        if state.fail_all {
            return Err(Error::api("mock failure"));
        }
        Ok(state.tags.get(namespace_id).cloned().unwrap_or_default())
    }

    async fn create_tag_namespace(
        &self,
        _compartment_id: &str,
        name: &str,
        _description: &str,
    ) -> Result<TagNamespaceSummary> {
        let mut state = self.state.lock().await;
        if state.fail_all {
            return Err(Error::api("mock failure"));
        }
        let namespace = TagNamespaceSummary {
            id: format!("ocid1.tagnamespace.oc1..{}", name.to_lowercase()),
            name: name.to_string(),
        };
        state.namespaces.push(namespace.clone());
        state.tags.entry(namespace.id.clone()).or_default();
        Ok(namespace)
    }

    async fn create_tag(
        &self,
        namespace_id: &str,
        name: &str,
        _description: &str,
    ) -> Result<TagSummary> {
        let mut state = self.state.lock().await;
        if state.fail_all {
            return Err(Error::api("mock failure"));
        }
        let tag = TagSummary {
            id: format!("{}.{}", namespace_id, name),
            name: name.to_string(),
        };
        state
            .tags
            .entry(namespace_id.to_string())
            .or_default()
            .push(tag.clone());
        Ok(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleet_core::LifecycleState;

    #[tokio::test]
    async fn test_mock_topology_listing() {
        let mock = MockCloud::new()
            .with_topology(
                "topo-1",
                vec![BareMetalHost {
                    id: "host-1".to_string(),
                    lifecycle_details: LifecycleState::Available,
                    instance_id: None,
                    instance_shape: None,
                }],
            )
            .await;

        let hosts = mock.list_bare_metal_hosts("topo-1").await.unwrap();
        assert_eq!(hosts.len(), 1);

        let missing = mock.list_bare_metal_hosts("topo-2").await;
        assert!(matches!(missing, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_mock_failure_mode() {
        let mock = MockCloud::new();
        mock.fail_all().await;
        let result = mock.list_tag_namespaces("tenancy").await;
        assert!(matches!(result, Err(Error::Api(_))));
    }
}
