//! Mock OksClient for unit testing
//!
//! In-memory implementation of `OksClientTrait` so consumers can be tested
//! without a reachable API.

use crate::error::OksError;
use crate::models::*;
use crate::oks_trait::OksClientTrait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A recorded kubeconfig request: (cluster_id, user, group)
pub type KubeconfigRequest = (String, Option<String>, Option<String>);

/// Mock OksClient for testing
///
/// Stores resources in memory. Clones share the same storage so a test can
/// keep a handle after passing the client to the code under test.
#[derive(Clone, Default)]
pub struct MockOksClient {
    base_url: String,
    projects: Arc<Mutex<Vec<Project>>>,
    clusters: Arc<Mutex<Vec<Cluster>>>,
    nets: Arc<Mutex<HashMap<String, Vec<Net>>>>,
    quotas: Arc<Mutex<HashMap<String, Vec<Quota>>>>,
    kubeconfigs: Arc<Mutex<HashMap<String, String>>>,
    kubeconfig_requests: Arc<Mutex<Vec<KubeconfigRequest>>>,
}

impl std::fmt::Debug for MockOksClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockOksClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl MockOksClient {
    /// Create a new mock client
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Add a project (for test setup)
    pub fn add_project(&self, id: &str, name: &str, cidr: &str) {
        self.projects.lock().unwrap().push(Project {
            id: id.to_string(),
            name: name.to_string(),
            cidr: Some(cidr.to_string()),
            ..Default::default()
        });
    }

    /// Add a cluster to a project (for test setup)
    pub fn add_cluster(&self, project_id: &str, id: &str, name: &str) {
        self.clusters.lock().unwrap().push(Cluster {
            id: id.to_string(),
            name: name.to_string(),
            project_id: Some(project_id.to_string()),
            ..Default::default()
        });
    }

    /// Set the nets returned for a project (for test setup)
    pub fn set_nets(&self, project_id: &str, nets: Vec<Net>) {
        self.nets
            .lock()
            .unwrap()
            .insert(project_id.to_string(), nets);
    }

    /// Set the quotas returned for a project (for test setup)
    pub fn set_quotas(&self, project_id: &str, quotas: Vec<Quota>) {
        self.quotas
            .lock()
            .unwrap()
            .insert(project_id.to_string(), quotas);
    }

    /// Set the kubeconfig served for a cluster (for test setup)
    pub fn set_kubeconfig(&self, cluster_id: &str, kubeconfig: &str) {
        self.kubeconfigs
            .lock()
            .unwrap()
            .insert(cluster_id.to_string(), kubeconfig.to_string());
    }

    /// Kubeconfig requests received so far
    pub fn kubeconfig_requests(&self) -> Vec<KubeconfigRequest> {
        self.kubeconfig_requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl OksClientTrait for MockOksClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn find_projects(&self, name: &str) -> Result<Vec<Project>, OksError> {
        Ok(self
            .projects
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.name == name)
            .cloned()
            .collect())
    }

    async fn get_project(&self, project_id: &str) -> Result<Project, OksError> {
        self.projects
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == project_id)
            .cloned()
            .ok_or_else(|| OksError::NotFound(format!("Project {} not found", project_id)))
    }

    async fn get_project_nets(&self, project_id: &str) -> Result<Vec<Net>, OksError> {
        Ok(self
            .nets
            .lock()
            .unwrap()
            .get(project_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_project_quotas(&self, project_id: &str) -> Result<Vec<Quota>, OksError> {
        Ok(self
            .quotas
            .lock()
            .unwrap()
            .get(project_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn find_clusters(&self, project_id: &str, name: &str) -> Result<Vec<Cluster>, OksError> {
        Ok(self
            .clusters
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.name == name && c.project_id.as_deref() == Some(project_id))
            .cloned()
            .collect())
    }

    async fn get_kubeconfig(
        &self,
        cluster_id: &str,
        user: Option<&str>,
        group: Option<&str>,
    ) -> Result<String, OksError> {
        self.kubeconfig_requests.lock().unwrap().push((
            cluster_id.to_string(),
            user.map(str::to_string),
            group.map(str::to_string),
        ));
        self.kubeconfigs
            .lock()
            .unwrap()
            .get(cluster_id)
            .cloned()
            .ok_or_else(|| OksError::NotFound(format!("Cluster {} not found", cluster_id)))
    }
}
