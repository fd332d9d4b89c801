//! Resolves user-facing project/cluster names into ids, CIDRs and network facts

use std::fmt;
use std::sync::Arc;

use clap::ValueEnum;
use crds::{ACCOUNT_ID_LABEL, NETWORK_ID_LABEL, node_pool_label, parse_node_pool_list};
use kubectl_client::{ClusterTarget, KubectlRunner, kubectl_args};
use oks_client::OksClientTrait;
use tracing::debug;

use crate::{CliError, Result};

/// Where the (network id, account id) pair of an endpoint comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FactsSource {
    /// Labels of the first node pool on the endpoint's cluster
    #[default]
    NodePoolLabels,
    /// Provider `nets` and `quotas` endpoints
    ProviderApi,
}

impl fmt::Display for FactsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactsSource::NodePoolLabels => f.write_str("node-pool-labels"),
            FactsSource::ProviderApi => f.write_str("provider-api"),
        }
    }
}

/// Optional user/group identity used for every kubectl call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub user: Option<String>,
    pub group: Option<String>,
}

/// Project and cluster names resolved to ids
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEndpoint {
    pub project_name: String,
    pub cluster_name: String,
    pub project_id: String,
    pub cluster_id: String,
    pub cidr: String,
}

impl ResolvedEndpoint {
    pub fn target(&self, identity: &Identity) -> ClusterTarget {
        ClusterTarget::new(&self.project_id, &self.cluster_id)
            .with_identity(identity.user.clone(), identity.group.clone())
    }
}

/// Network id and owning account of an endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkFacts {
    pub network_id: String,
    pub account_id: String,
}

/// One fully-resolved side of a peering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeeringEndpoint {
    pub project_name: String,
    pub cluster_name: String,
    pub project_id: String,
    pub cluster_id: String,
    pub cidr: String,
    pub network_id: String,
    pub account_id: String,
}

impl PeeringEndpoint {
    pub fn new(resolved: ResolvedEndpoint, facts: NetworkFacts) -> Self {
        Self {
            project_name: resolved.project_name,
            cluster_name: resolved.cluster_name,
            project_id: resolved.project_id,
            cluster_id: resolved.cluster_id,
            cidr: resolved.cidr,
            network_id: facts.network_id,
            account_id: facts.account_id,
        }
    }

    pub fn target(&self, identity: &Identity) -> ClusterTarget {
        ClusterTarget::new(&self.project_id, &self.cluster_id)
            .with_identity(identity.user.clone(), identity.group.clone())
    }
}

/// Id of the single project named `name`
pub async fn find_project_id(oks: &dyn OksClientTrait, name: &str) -> Result<String> {
    let projects = oks.find_projects(name).await?;
    match projects.as_slice() {
        [project] => Ok(project.id.clone()),
        _ => Err(CliError::NotFound(format!(
            "{} projects match name '{}', expected exactly one",
            projects.len(),
            name
        ))),
    }
}

/// Id of the single cluster named `name` inside `project_id`
pub async fn find_cluster_id(oks: &dyn OksClientTrait, project_id: &str, name: &str) -> Result<String> {
    let clusters = oks.find_clusters(project_id, name).await?;
    match clusters.as_slice() {
        [cluster] => Ok(cluster.id.clone()),
        _ => Err(CliError::NotFound(format!(
            "{} clusters match name '{}' in project {}, expected exactly one",
            clusters.len(),
            name,
            project_id
        ))),
    }
}

/// Read-only lookups against the provider API and the clusters
pub struct ResourceLocator {
    oks: Arc<dyn OksClientTrait>,
    kubectl: Arc<dyn KubectlRunner>,
    facts_source: FactsSource,
    identity: Identity,
}

impl ResourceLocator {
    pub fn new(
        oks: Arc<dyn OksClientTrait>,
        kubectl: Arc<dyn KubectlRunner>,
        facts_source: FactsSource,
        identity: Identity,
    ) -> Self {
        Self {
            oks,
            kubectl,
            facts_source,
            identity,
        }
    }

    /// Resolve names to ids and the project CIDR
    pub async fn resolve(&self, project_name: &str, cluster_name: &str) -> Result<ResolvedEndpoint> {
        let project_id = find_project_id(self.oks.as_ref(), project_name).await?;
        let project = self.oks.get_project(&project_id).await?;
        let cidr = project.cidr.ok_or_else(|| {
            CliError::NotFound(format!("project '{}' has no CIDR", project_name))
        })?;
        let cluster_id = find_cluster_id(self.oks.as_ref(), &project_id, cluster_name).await?;

        debug!(
            "Resolved {}/{} to {}/{} ({})",
            project_name, cluster_name, project_id, cluster_id, cidr
        );
        Ok(ResolvedEndpoint {
            project_name: project_name.to_string(),
            cluster_name: cluster_name.to_string(),
            project_id,
            cluster_id,
            cidr,
        })
    }

    /// Network id and account id of `endpoint`, using the configured source
    pub async fn fetch_network_facts(&self, endpoint: &ResolvedEndpoint) -> Result<NetworkFacts> {
        match self.facts_source {
            FactsSource::NodePoolLabels => self.facts_from_node_pool(endpoint).await,
            FactsSource::ProviderApi => self.facts_from_provider(endpoint).await,
        }
    }

    async fn facts_from_node_pool(&self, endpoint: &ResolvedEndpoint) -> Result<NetworkFacts> {
        let output = self
            .kubectl
            .run(
                &endpoint.target(&self.identity),
                &kubectl_args(["get", "nodepool", "-o", "json"]),
                None,
            )
            .await?;
        if !output.success() {
            return Err(CliError::fetch(
                format!("node pools of cluster {}", endpoint.cluster_name),
                output.stderr_str(),
            ));
        }

        let pools = parse_node_pool_list(&output.stdout_str())?;
        let pool = pools.first().ok_or_else(|| {
            CliError::Resolution(format!("no node pool on cluster {}", endpoint.cluster_name))
        })?;
        let label = |key: &str| {
            node_pool_label(pool, key).map(str::to_string).ok_or_else(|| {
                CliError::Resolution(format!(
                    "node pool on cluster {} has no '{}' label",
                    endpoint.cluster_name, key
                ))
            })
        };

        Ok(NetworkFacts {
            network_id: label(NETWORK_ID_LABEL)?,
            account_id: label(ACCOUNT_ID_LABEL)?,
        })
    }

    async fn facts_from_provider(&self, endpoint: &ResolvedEndpoint) -> Result<NetworkFacts> {
        let nets = self.oks.get_project_nets(&endpoint.project_id).await?;
        let net = nets.first().ok_or_else(|| {
            CliError::Resolution(format!("no network for project {}", endpoint.project_name))
        })?;

        let quotas = self.oks.get_project_quotas(&endpoint.project_id).await?;
        let quota = quotas.first().ok_or_else(|| {
            CliError::Resolution(format!("no quota record for project {}", endpoint.project_name))
        })?;
        let account_id = quota.account_id.clone().filter(|id| !id.is_empty()).ok_or_else(|| {
            CliError::Resolution(format!(
                "quota record of project {} has no AccountId",
                endpoint.project_name
            ))
        })?;

        Ok(NetworkFacts {
            network_id: net.net_id.clone(),
            account_id,
        })
    }
}
