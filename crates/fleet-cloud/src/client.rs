//! REST client for the cloud provider API

use crate::api::{ComputeApi, IdentityApi};
use crate::models::{
    BareMetalHostSummary, CreateTagDetails, CreateTagNamespaceDetails, DefinedTags, Instance,
    TagNamespaceSummary, TagSummary, UpdateInstanceDetails,
};
use async_trait::async_trait;
use fleet_core::{BareMetalHost, CloudConfig, Error, Result};
use reqwest::header::HeaderMap;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, info};

/// Pagination continuation header used by list calls
const NEXT_PAGE_HEADER: &str = "opc-next-page";

/// Cloud API client backed by reqwest
#[derive(Clone)]
pub struct CloudClient {
    http: Client,
    endpoint: String,
    token: String,
}

impl CloudClient {
    /// Create a client for the given endpoint.
    ///
    /// The bearer token is read from the environment variable named in the
    /// config; auth internals beyond that are the provider's concern.
    pub fn new(config: &CloudConfig, region: Option<&str>) -> Result<Self> {
        let region = region.unwrap_or(&config.region);
        let endpoint = config.endpoint.replace("{region}", region);

        let token = std::env::var(&config.token_env)
            .map_err(|_| Error::auth(format!("missing API token in ${}", config.token_env)))?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::api(format!("failed to build HTTP client: {}", e)))?;

        info!(endpoint = %endpoint, "created cloud API client");
        Ok(Self {
            http,
            endpoint,
            token,
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(&self.token)
    }

    /// Surface a non-success response as a fatal API error
    async fn check(&self, response: Response, context: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(Error::auth(format!("{}: {} {}", context, status, body)));
        }
        if status == StatusCode::NOT_FOUND {
            return Err(Error::not_found(format!("{}: {}", context, body)));
        }
        Err(Error::api(format!("{}: {} {}", context, status, body)))
    }

    fn next_page(headers: &HeaderMap) -> Option<String> {
        headers
            .get(NEXT_PAGE_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
    }
}

#[async_trait]
impl ComputeApi for CloudClient {
    async fn list_bare_metal_hosts(&self, topology_id: &str) -> Result<Vec<BareMetalHost>> {
        let url = format!(
            "{}/computeCapacityTopologies/{}/computeBareMetalHosts",
            self.endpoint, topology_id
        );

        let mut hosts = Vec::new();
        let mut page: Option<String> = None;
        loop {
            let mut request = self.authorized(self.http.get(&url)).query(&[("limit", "100")]);
            if let Some(ref token) = page {
                request = request.query(&[("page", token.as_str())]);
            }

            let response = request
                .send()
                .await
                .map_err(|e| Error::api(format!("listing bare-metal hosts: {}", e)))?;
            let response = self.check(response, "listing bare-metal hosts").await?;

            page = Self::next_page(response.headers());
            let items: Vec<BareMetalHostSummary> = response
                .json()
                .await
                .map_err(|e| Error::api(format!("decoding bare-metal host page: {}", e)))?;

            debug!(count = items.len(), "fetched bare-metal host page");
            hosts.extend(items.into_iter().map(BareMetalHost::from));

            if page.is_none() {
                break;
            }
        }

        info!(total = hosts.len(), topology = %topology_id, "fetched capacity topology hosts");
        Ok(hosts)
    }

    async fn get_instance(&self, instance_id: &str) -> Result<Instance> {
        let url = format!("{}/instances/{}", self.endpoint, instance_id);
        let response = self
            .authorized(self.http.get(&url))
            .send()
            .await
            .map_err(|e| Error::api(format!("fetching instance: {}", e)))?;
        let response = self.check(response, "fetching instance").await?;
        response
            .json()
            .await
            .map_err(|e| Error::api(format!("decoding instance: {}", e)))
    }

    async fn update_instance_tags(
        &self,
        instance_id: &str,
        defined_tags: DefinedTags,
    ) -> Result<()> {
        let url = format!("{}/instances/{}", self.endpoint, instance_id);
        let payload = UpdateInstanceDetails { defined_tags };
        let response = self
            .authorized(self.http.put(&url))
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::api(format!("updating instance tags: {}", e)))?;
        self.check(response, "updating instance tags").await?;
        info!(instance = %instance_id, "updated instance tags");
        Ok(())
    }
}

#[async_trait]
impl IdentityApi for CloudClient {
    async fn list_tag_namespaces(&self, compartment_id: &str) -> Result<Vec<TagNamespaceSummary>> {
        let url = format!("{}/tagNamespaces", self.endpoint);
        let response = self
            .authorized(self.http.get(&url))
            .query(&[("compartmentId", compartment_id)])
            .send()
            .await
            .map_err(|e| Error::api(format!("listing tag namespaces: {}", e)))?;
        let response = self.check(response, "listing tag namespaces").await?;
        response
            .json()
            .await
            .map_err(|e| Error::api(format!("decoding tag namespaces: {}", e)))
    }

    async fn list_tags(&self, namespace_id: &str) -> Result<Vec<TagSummary>> {
        let url = format!("{}/tagNamespaces/{}/tags", self.endpoint, namespace_id);
        let response = self
            .authorized(self.http.get(&url))
            .send()
            .await
            .map_err(|e| Error::api(format!("listing tags: {}", e)))?;
        let response = self.check(response, "listing tags").await?;
        response
            .json()
            .await
            .map_err(|e| Error::api(format!("decoding tags: {}", e)))
    }

    async fn create_tag_namespace(
        &self,
        compartment_id: &str,
        name: &str,
        description: &str,
    ) -> Result<TagNamespaceSummary> {
        let url = format!("{}/tagNamespaces", self.endpoint);
        let payload = CreateTagNamespaceDetails {
            compartment_id: compartment_id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
        };
        let response = self
            .authorized(self.http.post(&url))
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::api(format!("creating tag namespace: {}", e)))?;
        let response = self.check(response, "creating tag namespace").await?;
        response
            .json()
            .await
            .map_err(|e| Error::api(format!("decoding tag namespace: {}", e)))
    }

    async fn create_tag(
        &self,
        namespace_id: &str,
        name: &str,
        description: &str,
    ) -> Result<TagSummary> {
        let url = format!("{}/tagNamespaces/{}/tags", self.endpoint, namespace_id);
        let payload = CreateTagDetails {
            name: name.to_string(),
            description: description.to_string(),
        };
        let response = self
            .authorized(self.http.post(&url))
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::api(format!("creating tag: {}", e)))?;
        let response = self.check(response, "creating tag").await?;
        response
            .json()
            .await
            .map_err(|e| Error::api(format!("decoding tag: {}", e)))
    }
}

impl std::fmt::Debug for CloudClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Token deliberately omitted
        f.debug_struct("CloudClient")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleet_core::CloudConfig;

    #[test]
    fn test_client_requires_token() {
        let mut config = CloudConfig::default();
        config.token_env = "FLEETOPS_TEST_TOKEN_DEFINITELY_UNSET".to_string();
        let result = CloudClient::new(&config, None);
        assert!(matches!(result, Err(Error::Auth(_))));
    }

    #[test]
    fn test_client_region_override() {
        let mut config = CloudConfig::default();
        config.token_env = "FLEETOPS_TEST_TOKEN_SET".to_string();
        std::env::set_var("FLEETOPS_TEST_TOKEN_SET", "tok");
        let client = CloudClient::new(&config, Some("eu-frankfurt-1")).unwrap();
        assert!(client.endpoint.contains("eu-frankfurt-1"));
    }
}
