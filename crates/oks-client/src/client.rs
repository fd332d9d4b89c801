//! OKS API client
//!
//! Implements the provider REST calls the CLI needs: project and cluster
//! lookups, the per-project network facts and kubeconfig retrieval.

use crate::common::{Credentials, HttpClient};
use crate::error::OksError;
use crate::models::*;
use crate::oks_trait::OksClientTrait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Default API endpoint for a region
pub fn default_endpoint(region: &str) -> String {
    format!("https://api.{}.oks.outscale.com/api/v2", region)
}

/// OKS API client
#[derive(Debug)]
pub struct OksClient {
    http: HttpClient,
}

impl OksClient {
    /// Create a new OKS client
    ///
    /// # Arguments
    /// * `base_url` - API root (e.g., "https://api.eu-west-2.oks.outscale.com/api/v2")
    /// * `credentials` - Profile credentials attached to every request
    pub fn new(base_url: String, credentials: Credentials) -> Result<Self, OksError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(OksError::Http)?;

        Ok(Self {
            http: HttpClient::new(client, base_url, credentials),
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    async fn get_as<T: DeserializeOwned>(
        &self,
        path: &str,
        filters: &[(&str, &str)],
    ) -> Result<T, OksError> {
        let value: Value = self.http.get(path, filters).await?;
        serde_json::from_value(value).map_err(OksError::Serialization)
    }

    /// Query projects by name
    ///
    /// # Returns
    /// * `Ok(Vec<Project>)` - Every project matching the name (may be empty)
    /// * `Err(OksError)` - If the request fails
    pub async fn find_projects(&self, name: &str) -> Result<Vec<Project>, OksError> {
        debug!("Querying projects named {}", name);
        self.get_as("projects", &[("name", name)]).await
    }

    /// Get a project by ID
    pub async fn get_project(&self, project_id: &str) -> Result<Project, OksError> {
        debug!("Fetching project {}", project_id);
        self.get_as(&format!("projects/{}", project_id), &[]).await
    }

    /// Get the virtual networks of a project
    pub async fn get_project_nets(&self, project_id: &str) -> Result<Vec<Net>, OksError> {
        debug!("Fetching nets of project {}", project_id);
        let wrapper: DataWrapper<NetList> = self
            .get_as(&format!("projects/{}/nets", project_id), &[])
            .await?;
        Ok(wrapper.data.nets)
    }

    /// Get the quota records of a project
    pub async fn get_project_quotas(&self, project_id: &str) -> Result<Vec<Quota>, OksError> {
        debug!("Fetching quotas of project {}", project_id);
        let wrapper: DataWrapper<QuotaList> = self
            .get_as(&format!("projects/{}/quotas", project_id), &[])
            .await?;
        Ok(wrapper.data.quotas)
    }

    /// Query clusters by name inside a project
    pub async fn find_clusters(
        &self,
        project_id: &str,
        name: &str,
    ) -> Result<Vec<Cluster>, OksError> {
        debug!("Querying clusters named {} in project {}", name, project_id);
        self.get_as("clusters", &[("name", name), ("project_id", project_id)])
            .await
    }

    /// Fetch a kubeconfig for a cluster
    ///
    /// # Arguments
    /// * `cluster_id` - Cluster ID
    /// * `user` / `group` - Optional identity embedded in the issued certificate
    ///
    /// # Returns
    /// * `Ok(String)` - Raw kubeconfig YAML
    /// * `Err(OksError::InvalidResponse)` - If the API returned an empty kubeconfig
    pub async fn get_kubeconfig(
        &self,
        cluster_id: &str,
        user: Option<&str>,
        group: Option<&str>,
    ) -> Result<String, OksError> {
        let mut params = Vec::new();
        if let Some(user) = user {
            params.push(("user", user));
        }
        if let Some(group) = group {
            params.push(("group", group));
        }

        debug!("Fetching kubeconfig of cluster {}", cluster_id);
        let wrapper: DataWrapper<KubeconfigData> = self
            .get_as(&format!("clusters/{}/kubeconfig", cluster_id), &params)
            .await?;

        match wrapper.data.kubeconfig {
            Some(kubeconfig) if !kubeconfig.is_empty() => Ok(kubeconfig),
            _ => Err(OksError::InvalidResponse(format!(
                "empty kubeconfig returned for cluster {}",
                cluster_id
            ))),
        }
    }
}

#[async_trait::async_trait]
impl OksClientTrait for OksClient {
    fn base_url(&self) -> &str {
        self.base_url()
    }

    async fn find_projects(&self, name: &str) -> Result<Vec<Project>, OksError> {
        self.find_projects(name).await
    }

    async fn get_project(&self, project_id: &str) -> Result<Project, OksError> {
        self.get_project(project_id).await
    }

    async fn get_project_nets(&self, project_id: &str) -> Result<Vec<Net>, OksError> {
        self.get_project_nets(project_id).await
    }

    async fn get_project_quotas(&self, project_id: &str) -> Result<Vec<Quota>, OksError> {
        self.get_project_quotas(project_id).await
    }

    async fn find_clusters(&self, project_id: &str, name: &str) -> Result<Vec<Cluster>, OksError> {
        self.find_clusters(project_id, name).await
    }

    async fn get_kubeconfig(
        &self,
        cluster_id: &str,
        user: Option<&str>,
        group: Option<&str>,
    ) -> Result<String, OksError> {
        self.get_kubeconfig(cluster_id, user, group).await
    }
}
