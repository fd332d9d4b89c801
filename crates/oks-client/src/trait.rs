//! OksClient trait for mocking
//!
//! The concrete `OksClient` implements this trait; tests use `MockOksClient`.

use crate::error::OksError;
use crate::models::*;

/// Provider API operations needed by the CLI
///
/// All async methods must be `Send` to work with Tokio.
#[async_trait::async_trait]
pub trait OksClientTrait: Send + Sync {
    /// Get the base URL
    fn base_url(&self) -> &str;

    // Projects
    async fn find_projects(&self, name: &str) -> Result<Vec<Project>, OksError>;
    async fn get_project(&self, project_id: &str) -> Result<Project, OksError>;
    async fn get_project_nets(&self, project_id: &str) -> Result<Vec<Net>, OksError>;
    async fn get_project_quotas(&self, project_id: &str) -> Result<Vec<Quota>, OksError>;

    // Clusters
    async fn find_clusters(&self, project_id: &str, name: &str) -> Result<Vec<Cluster>, OksError>;
    async fn get_kubeconfig(
        &self,
        cluster_id: &str,
        user: Option<&str>,
        group: Option<&str>,
    ) -> Result<String, OksError>;
}
