//! Shared fixtures for the NetPeering tests

use std::sync::Arc;
use std::time::Duration;

use kubectl_client::MockKubectlRunner;
use oks_client::MockOksClient;
use serde_json::{Value, json};

use crate::config::NetPeeringSettings;
use crate::locator::Identity;
use crate::netpeering::prompt::ScriptedConfirm;
use crate::netpeering::{ClusterSelection, CreateRequest, NetPeeringOrchestrator};
use crate::poll::RecordingSleeper;

pub const SOURCE_NET: &str = "vpc-a";
pub const SOURCE_ACCOUNT: &str = "111111111111";
pub const TARGET_NET: &str = "vpc-b";
pub const TARGET_ACCOUNT: &str = "222222222222";

/// Two projects `alpha` and `beta` with one cluster each, plus test doubles
pub struct Fixture {
    pub oks: MockOksClient,
    pub kubectl: MockKubectlRunner,
    pub sleeper: RecordingSleeper,
    pub confirm: ScriptedConfirm,
    pub settings: NetPeeringSettings,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_cidrs("10.50.0.0/16", "10.60.0.0/16")
    }

    pub fn with_cidrs(source_cidr: &str, target_cidr: &str) -> Self {
        let oks = MockOksClient::new("https://api.eu-west-2.oks.outscale.com/api/v2");
        oks.add_project("proj-a", "alpha", source_cidr);
        oks.add_cluster("proj-a", "cl-a", "alpha-k8s");
        oks.add_project("proj-b", "beta", target_cidr);
        oks.add_cluster("proj-b", "cl-b", "beta-k8s");

        Self {
            oks,
            kubectl: MockKubectlRunner::new(),
            sleeper: RecordingSleeper::new(),
            confirm: ScriptedConfirm::default(),
            settings: NetPeeringSettings::default(),
        }
    }

    pub fn orchestrator(&self) -> NetPeeringOrchestrator {
        NetPeeringOrchestrator::new(
            Arc::new(self.oks.clone()),
            Arc::new(self.kubectl.clone()),
            Arc::new(self.confirm.clone()),
            Arc::new(self.sleeper.clone()),
            self.settings.clone(),
            Identity::default(),
        )
    }

    /// Queue the node pool lookups of both endpoints
    pub fn push_facts(&self) {
        self.kubectl.push_json(&node_pools(SOURCE_NET, SOURCE_ACCOUNT));
        self.kubectl.push_json(&node_pools(TARGET_NET, TARGET_ACCOUNT));
    }

    /// Facts, an empty peering list, and a successful request creation
    pub fn push_until_request_created(&self) {
        self.push_facts();
        self.kubectl.push_json(&peering_list(vec![]));
        self.kubectl.push_success("{}");
    }

    /// Every kubectl command issued, joined with spaces
    pub fn commands(&self) -> Vec<String> {
        self.kubectl.commands()
    }

    pub fn create_commands(&self) -> usize {
        self.commands().iter().filter(|c| c.starts_with("create")).count()
    }
}

pub fn fast_settings() -> NetPeeringSettings {
    NetPeeringSettings {
        timeout: Duration::from_secs(9),
        ..NetPeeringSettings::default()
    }
}

pub fn alpha_to_beta() -> CreateRequest {
    CreateRequest {
        source_project: "alpha".to_string(),
        source_cluster: "alpha-k8s".to_string(),
        target_project: "beta".to_string(),
        target_cluster: "beta-k8s".to_string(),
        name: None,
        auto_approve: true,
        dry_run: false,
    }
}

pub fn alpha_selection() -> ClusterSelection {
    ClusterSelection::new("alpha", "alpha-k8s")
}

pub fn node_pools(network_id: &str, account_id: &str) -> Value {
    json!({
        "apiVersion": "v1",
        "kind": "List",
        "metadata": {"resourceVersion": ""},
        "items": [{
            "apiVersion": "oks.dev/v1beta2",
            "kind": "NodePool",
            "metadata": {
                "name": "pool-1",
                "labels": {"oks.network_id": network_id, "oks.account-id": account_id}
            }
        }]
    })
}

pub fn peering_list(items: Vec<Value>) -> Value {
    json!({
        "apiVersion": "v1",
        "kind": "List",
        "metadata": {"resourceVersion": ""},
        "items": items
    })
}

/// A NetPeering between the fixture networks
pub fn peering(id: &str, state: &str) -> Value {
    json!({
        "apiVersion": "oks.dev/v1beta",
        "kind": "NetPeering",
        "metadata": {"name": id},
        "status": {
            "netPeeringId": id,
            "netPeeringState": state,
            "netPeeringStateMessage": format!("peering is {}", state),
            "sourceNetId": SOURCE_NET,
            "sourceOwnerId": SOURCE_ACCOUNT,
            "accepterNetId": TARGET_NET,
            "accepterOwnerId": TARGET_ACCOUNT,
            "expirationDate": "2026-12-01T00:00:00Z"
        }
    })
}

pub fn request_with_status(name: &str, id: Option<&str>, state: &str) -> Value {
    let mut status = json!({"netPeeringState": state});
    if let Some(id) = id {
        status["netPeeringId"] = json!(id);
    }
    json!({
        "apiVersion": "oks.dev/v1beta",
        "kind": "NetPeeringRequest",
        "metadata": {"name": name},
        "spec": {"accepterNetId": TARGET_NET, "accepterOwnerId": TARGET_ACCOUNT},
        "status": status
    })
}
