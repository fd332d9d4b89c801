//! NetPeering state machine
//!
//! `create` walks a request/acceptance handshake across two clusters:
//!
//! ```text
//! Validating -> CheckingExisting -> CreatingRequest -> AwaitingRequestId
//!   -> AwaitingPendingState -> CreatingAcceptance -> AwaitingActive
//!   -> Active | Aborted | Failed
//! ```
//!
//! Nothing is retried. Every failing step surfaces immediately with the
//! remote stderr attached; the only rollback is deleting the request when the
//! operator declines at the `before-acceptance` gate.

use std::fmt;
use std::sync::Arc;

use clap::ValueEnum;
use crds::{
    NetPeering, NetPeeringAcceptance, NetPeeringRequest, NetPeeringState, NetPeeringStatus,
    parse_net_peering, parse_net_peering_list,
};
use kubectl_client::{ClusterTarget, KubectlRunner, kubectl_args};
use oks_client::OksClientTrait;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::NetPeeringSettings;
use crate::locator::{Identity, PeeringEndpoint, ResolvedEndpoint, ResourceLocator};
use crate::netpeering::names::PeeringNames;
use crate::netpeering::network::ensure_disjoint;
use crate::netpeering::prompt::{Confirm, ConfirmStage};
use crate::poll::{PollError, PollPolicy, PollStatus, Poller, Sleeper};
use crate::{CliError, Result};

/// Steps of the create workflow, logged on entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateState {
    Validating,
    CheckingExisting,
    CreatingRequest,
    AwaitingRequestId,
    AwaitingPendingState,
    CreatingAcceptance,
    AwaitingActive,
    Active,
    Aborted,
    Failed,
}

impl fmt::Display for CreateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CreateState::Validating => "Validating",
            CreateState::CheckingExisting => "CheckingExisting",
            CreateState::CreatingRequest => "CreatingRequest",
            CreateState::AwaitingRequestId => "AwaitingRequestId",
            CreateState::AwaitingPendingState => "AwaitingPendingState",
            CreateState::CreatingAcceptance => "CreatingAcceptance",
            CreateState::AwaitingActive => "AwaitingActive",
            CreateState::Active => "Active",
            CreateState::Aborted => "Aborted",
            CreateState::Failed => "Failed",
        };
        f.write_str(name)
    }
}

/// Input of [`NetPeeringOrchestrator::create`]
#[derive(Debug, Clone, Default)]
pub struct CreateRequest {
    pub source_project: String,
    pub source_cluster: String,
    pub target_project: String,
    pub target_cluster: String,
    /// Base name, defaults to `<source>-to-<target>`
    pub name: Option<String>,
    /// Skip the confirmation prompt
    pub auto_approve: bool,
    pub dry_run: bool,
}

#[derive(Debug, Clone)]
pub enum CreateOutcome {
    /// Nothing was sent; the request that would have been created
    DryRun { request: NetPeeringRequest },
    /// Operator said no
    Declined { message: String },
    Created {
        net_peering: NetPeering,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    DryRun { message: String },
    Declined { message: String },
    Deleted { message: String },
}

impl DeleteOutcome {
    pub fn message(&self) -> &str {
        match self {
            DeleteOutcome::DryRun { message }
            | DeleteOutcome::Declined { message }
            | DeleteOutcome::Deleted { message } => message,
        }
    }
}

/// `list --status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum StatusFilter {
    Active,
    Deleted,
    #[default]
    All,
}

impl StatusFilter {
    pub fn matches(self, peering: &NetPeering) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => peering.state_str() == Some(NetPeeringState::Active.as_str()),
            StatusFilter::Deleted => peering.state_str() == Some(NetPeeringState::Deleted.as_str()),
        }
    }
}

/// Keep the peerings accepted by `filter`
pub fn filter_by_status(peerings: Vec<NetPeering>, filter: StatusFilter) -> Vec<NetPeering> {
    peerings.into_iter().filter(|p| filter.matches(p)).collect()
}

/// Parsed objects, or kubectl's own `-o wide` text passed through untouched
#[derive(Debug, Clone)]
pub enum Fetched<T> {
    Parsed(T),
    Raw(String),
}

/// Project/cluster the list, get and delete commands act on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterSelection {
    pub project_name: String,
    pub cluster_name: String,
}

impl ClusterSelection {
    pub fn new(project_name: impl Into<String>, cluster_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            cluster_name: cluster_name.into(),
        }
    }
}

/// Drives NetPeering objects through kubectl on one or two clusters
pub struct NetPeeringOrchestrator {
    locator: ResourceLocator,
    kubectl: Arc<dyn KubectlRunner>,
    confirm: Arc<dyn Confirm>,
    sleeper: Arc<dyn Sleeper>,
    settings: NetPeeringSettings,
    identity: Identity,
}

impl NetPeeringOrchestrator {
    pub fn new(
        oks: Arc<dyn OksClientTrait>,
        kubectl: Arc<dyn KubectlRunner>,
        confirm: Arc<dyn Confirm>,
        sleeper: Arc<dyn Sleeper>,
        settings: NetPeeringSettings,
        identity: Identity,
    ) -> Self {
        let locator = ResourceLocator::new(
            oks,
            Arc::clone(&kubectl),
            settings.facts_source,
            identity.clone(),
        );
        Self {
            locator,
            kubectl,
            confirm,
            sleeper,
            settings,
            identity,
        }
    }

    /// Create a peering from `request.source_*` to `request.target_*`
    pub async fn create(&self, request: &CreateRequest) -> Result<CreateOutcome> {
        let result = self.run_create(request).await;
        if let Err(e) = &result {
            enter(CreateState::Failed);
            debug!("NetPeering creation failed: {}", e);
        }
        result
    }

    async fn run_create(&self, request: &CreateRequest) -> Result<CreateOutcome> {
        enter(CreateState::Validating);
        let source = self
            .locator
            .resolve(&request.source_project, &request.source_cluster)
            .await?;
        let target = self
            .locator
            .resolve(&request.target_project, &request.target_cluster)
            .await?;
        ensure_disjoint(&source.cidr, &target.cidr)?;

        let source_facts = self.locator.fetch_network_facts(&source).await?;
        let target_facts = self.locator.fetch_network_facts(&target).await?;
        let source = PeeringEndpoint::new(source, source_facts);
        let target = PeeringEndpoint::new(target, target_facts);
        let source_cluster = source.target(&self.identity);
        let target_cluster = target.target(&self.identity);

        enter(CreateState::CheckingExisting);
        self.ensure_not_peered(&source, &target, &source_cluster).await?;

        let names = PeeringNames::generate(
            request.name.as_deref(),
            &source.project_name,
            &target.project_name,
        );
        let peering_request =
            NetPeeringRequest::for_accepter(&names.request, &target.network_id, &target.account_id);

        if request.dry_run {
            info!("Dry run, NetPeeringRequest {} not created", names.request);
            return Ok(CreateOutcome::DryRun {
                request: peering_request,
            });
        }

        let question = format!(
            "Are you sure you want to create NetPeering between projects {} and {}?",
            source.project_name, target.project_name
        );
        let gated = !request.auto_approve;

        if gated
            && self.settings.confirm_stage == ConfirmStage::BeforeRequest
            && !self.confirm.confirm(&question).await?
        {
            enter(CreateState::Aborted);
            return Ok(CreateOutcome::Declined {
                message: format!(
                    "NetPeering between projects '{}' and '{}' not created due to abort.",
                    source.project_name, target.project_name
                ),
            });
        }

        enter(CreateState::CreatingRequest);
        self.create_object(
            &source_cluster,
            &format!("NetPeeringRequest {}", names.request),
            &peering_request,
        )
        .await?;

        enter(CreateState::AwaitingRequestId);
        self.sleeper.sleep(self.settings.settle_delay).await;
        let status = self.fetch_request_status(&source_cluster, &names.request).await?;

        enter(CreateState::AwaitingPendingState);
        let state = status
            .net_peering_state
            .clone()
            .unwrap_or_else(|| "<none>".to_string());
        if state != NetPeeringState::PendingAcceptance.as_str() {
            return Err(CliError::UnexpectedState {
                object: format!("NetPeeringRequest {}", names.request),
                state,
            });
        }
        let net_peering_id = status
            .net_peering_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                CliError::fetch(
                    format!("NetPeeringRequest {}", names.request),
                    "status.netPeeringId is not set",
                )
            })?;
        debug!("NetPeeringRequest {} got id {}", names.request, net_peering_id);

        if gated
            && self.settings.confirm_stage == ConfirmStage::BeforeAcceptance
            && !self.confirm.confirm(&question).await?
        {
            enter(CreateState::Aborted);
            self.delete_request(&source_cluster, &names.request).await;
            return Ok(CreateOutcome::Declined {
                message: format!("NetPeering {} deleted due to abort.", names.request),
            });
        }

        enter(CreateState::CreatingAcceptance);
        let acceptance = NetPeeringAcceptance::for_peering(&names.acceptance, &net_peering_id);
        self.create_object(
            &target_cluster,
            &format!("NetPeeringAcceptance {}", names.acceptance),
            &acceptance,
        )
        .await?;

        enter(CreateState::AwaitingActive);
        let net_peering = self.await_active(&target_cluster, &net_peering_id).await?;

        enter(CreateState::Active);
        Ok(CreateOutcome::Created {
            message: format!(
                "NetPeering {} created between projects '{}' and '{}'",
                net_peering_id, source.project_name, target.project_name
            ),
            net_peering,
        })
    }

    /// Refuse when an active peering already links the two networks
    async fn ensure_not_peered(
        &self,
        source: &PeeringEndpoint,
        target: &PeeringEndpoint,
        source_cluster: &ClusterTarget,
    ) -> Result<()> {
        let existing = self.fetch_peerings(source_cluster, &source.cluster_name).await?;

        let duplicate = existing.iter().find(|peering| {
            let Some(status) = peering.status.as_ref() else {
                return false;
            };
            status.accepter_net_id.as_deref() == Some(target.network_id.as_str())
                && status.accepter_owner_id.as_deref() == Some(target.account_id.as_str())
                && status.source_net_id.as_deref() == Some(source.network_id.as_str())
                && status.source_owner_id.as_deref() == Some(source.account_id.as_str())
                && status.state() == Some(NetPeeringState::Active)
        });

        match duplicate {
            Some(peering) => Err(CliError::AlreadyExists {
                net_peering_id: peering.peering_id().unwrap_or("<unknown>").to_string(),
                source_project: source.project_name.clone(),
                target_project: target.project_name.clone(),
            }),
            None => Ok(()),
        }
    }

    /// `create -o json -f -` with the object on stdin
    async fn create_object<T: Serialize>(
        &self,
        cluster: &ClusterTarget,
        label: &str,
        object: &T,
    ) -> Result<()> {
        let body = serde_json::to_string(object)?;
        let output = self
            .kubectl
            .run(cluster, &kubectl_args(["create", "-o", "json", "-f", "-"]), Some(&body))
            .await?;
        if !output.success() {
            return Err(CliError::create(label, output.stderr_str()));
        }
        debug!("Created {}", label);
        Ok(())
    }

    async fn fetch_request_status(
        &self,
        cluster: &ClusterTarget,
        name: &str,
    ) -> Result<NetPeeringStatus> {
        let output = self
            .kubectl
            .run(
                cluster,
                &kubectl_args(["get", "netpeeringrequests", "-o", "json", name]),
                None,
            )
            .await?;
        if !output.success() {
            return Err(CliError::fetch(
                format!("NetPeeringRequest {}", name),
                output.stderr_str(),
            ));
        }

        let value: Value = serde_json::from_str(&output.stdout_str())?;
        match value.get("status") {
            Some(status) if !status.is_null() => Ok(serde_json::from_value(status.clone())?),
            _ => Ok(NetPeeringStatus::default()),
        }
    }

    /// Best-effort removal of a request after the operator declined
    async fn delete_request(&self, cluster: &ClusterTarget, name: &str) {
        let args = kubectl_args(["delete", "netpeeringrequests", name]);
        match self.kubectl.run(cluster, &args, None).await {
            Ok(output) if output.success() => debug!("Deleted NetPeeringRequest {}", name),
            Ok(output) => warn!(
                "Failed to delete NetPeeringRequest {}: {}",
                name,
                output.stderr_str()
            ),
            Err(e) => warn!("Failed to delete NetPeeringRequest {}: {}", name, e),
        }
    }

    async fn await_active(&self, cluster: &ClusterTarget, net_peering_id: &str) -> Result<NetPeering> {
        let policy = PollPolicy {
            interval: self.settings.poll_interval,
            timeout: self.settings.timeout,
        };
        let object = format!("NetPeering {}", net_peering_id);
        let poller = Poller::new(policy, self.sleeper.as_ref());

        match poller
            .poll(&object, || self.check_active(cluster, net_peering_id))
            .await
        {
            Ok(peering) => Ok(peering),
            Err(PollError::Failed(e)) => Err(e),
            Err(PollError::TimedOut { waited, last_state }) => Err(CliError::Timeout {
                object,
                waited_secs: waited.as_secs(),
                last_state: last_state.unwrap_or_else(|| "<none>".to_string()),
            }),
        }
    }

    async fn check_active(
        &self,
        cluster: &ClusterTarget,
        net_peering_id: &str,
    ) -> Result<PollStatus<NetPeering>> {
        let peering = self.fetch_peering(cluster, net_peering_id).await?;
        let state = peering.status.as_ref().and_then(NetPeeringStatus::state);
        match state {
            Some(NetPeeringState::Active) => Ok(PollStatus::Ready(peering)),
            Some(state) if state.is_terminal_failure() => Err(CliError::UnexpectedState {
                object: format!("NetPeering {}", net_peering_id),
                state: state.to_string(),
            }),
            Some(state) => Ok(PollStatus::Pending(state.to_string())),
            None => Ok(PollStatus::Pending("<none>".to_string())),
        }
    }

    async fn fetch_peering(&self, cluster: &ClusterTarget, net_peering_id: &str) -> Result<NetPeering> {
        let output = self
            .kubectl
            .run(
                cluster,
                &kubectl_args(["get", "netpeering", net_peering_id, "-o", "json"]),
                None,
            )
            .await?;
        if !output.success() {
            return Err(CliError::fetch(
                format!("NetPeering {}", net_peering_id),
                output.stderr_str(),
            ));
        }
        Ok(parse_net_peering(serde_json::from_str(&output.stdout_str())?)?)
    }

    async fn fetch_peerings(&self, cluster: &ClusterTarget, cluster_name: &str) -> Result<Vec<NetPeering>> {
        let output = self
            .kubectl
            .run(cluster, &kubectl_args(["get", "netpeerings", "-o", "json"]), None)
            .await?;
        if !output.success() {
            return Err(CliError::fetch(
                format!("NetPeerings on cluster {}", cluster_name),
                output.stderr_str(),
            ));
        }
        Ok(parse_net_peering_list(&output.stdout_str())?)
    }

    async fn resolve_selection(&self, selection: &ClusterSelection) -> Result<ResolvedEndpoint> {
        self.locator
            .resolve(&selection.project_name, &selection.cluster_name)
            .await
    }

    /// Delete a peering from the selected cluster.
    ///
    /// Deletion is asynchronous on the provider side; nothing waits for it.
    pub async fn delete(
        &self,
        selection: &ClusterSelection,
        net_peering_id: &str,
        dry_run: bool,
        force: bool,
    ) -> Result<DeleteOutcome> {
        if dry_run {
            return Ok(DeleteOutcome::DryRun {
                message: format!("Dry run: The netpeering {} would be deleted.", net_peering_id),
            });
        }

        let question = format!("Are you sure you want to delete NetPeering {}?", net_peering_id);
        if !force && !self.confirm.confirm(&question).await? {
            return Ok(DeleteOutcome::Declined {
                message: format!("NetPeering {} not deleted due to abort.", net_peering_id),
            });
        }

        let context = self.resolve_selection(selection).await?;
        let output = self
            .kubectl
            .run(
                &context.target(&self.identity),
                &kubectl_args(["delete", "netpeering", net_peering_id]),
                None,
            )
            .await?;
        if !output.success() {
            return Err(CliError::Delete {
                object: format!("NetPeering {}", net_peering_id),
                stderr: output.stderr_str(),
            });
        }

        info!("Deletion of NetPeering {} requested", net_peering_id);
        Ok(DeleteOutcome::Deleted {
            message: format!(
                "NetPeering {} is being deleted; it can take a few minutes to disappear from both projects.",
                net_peering_id
            ),
        })
    }

    /// Peerings visible from the selected cluster
    pub async fn list(
        &self,
        selection: &ClusterSelection,
        filter: StatusFilter,
        wide: bool,
    ) -> Result<Fetched<Vec<NetPeering>>> {
        let context = self.resolve_selection(selection).await?;
        let cluster = context.target(&self.identity);

        if wide {
            let raw = self
                .raw_get(&cluster, &["get", "netpeerings", "-o", "wide"], "NetPeerings")
                .await?;
            return Ok(Fetched::Raw(raw));
        }

        let peerings = self.fetch_peerings(&cluster, &context.cluster_name).await?;
        Ok(Fetched::Parsed(filter_by_status(peerings, filter)))
    }

    /// One peering by id, from the selected cluster
    pub async fn get(
        &self,
        selection: &ClusterSelection,
        net_peering_id: &str,
        wide: bool,
    ) -> Result<Fetched<NetPeering>> {
        let context = self.resolve_selection(selection).await?;
        let cluster = context.target(&self.identity);

        if wide {
            let raw = self
                .raw_get(
                    &cluster,
                    &["get", "netpeering", net_peering_id, "-o", "wide"],
                    &format!("NetPeering {}", net_peering_id),
                )
                .await?;
            return Ok(Fetched::Raw(raw));
        }

        Ok(Fetched::Parsed(self.fetch_peering(&cluster, net_peering_id).await?))
    }

    async fn raw_get(&self, cluster: &ClusterTarget, args: &[&str], object: &str) -> Result<String> {
        let output = self.kubectl.run(cluster, &kubectl_args(args.iter().copied()), None).await?;
        if !output.success() {
            return Err(CliError::fetch(object, output.stderr_str()));
        }
        Ok(output.stdout_str())
    }
}

fn enter(state: CreateState) {
    info!(state = %state, "NetPeering create: {}", state);
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod orchestrator_test;
