//! NetPeering CRD
//!
//! The converged peering object, created by the controller once both sides
//! agreed. Its name is the `netPeeringId`.

use crate::state::NetPeeringState;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(CustomResource, Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "oks.dev",
    version = "v1beta",
    kind = "NetPeering",
    status = "NetPeeringStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct NetPeeringSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_net_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepter_net_id: Option<String>,
}

/// Status shared by every peering resource
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NetPeeringStatus {
    /// Cloud peering identifier, assigned asynchronously
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_peering_id: Option<String>,

    /// Raw state string (see [`NetPeeringState`])
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_peering_state: Option<String>,

    /// Human-readable explanation of the state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_peering_state_message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_net_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_owner_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepter_net_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepter_owner_id: Option<String>,

    /// Expiration of a pending request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
}

impl NetPeeringStatus {
    /// Parsed state, if reported
    pub fn state(&self) -> Option<NetPeeringState> {
        self.net_peering_state.as_deref().map(NetPeeringState::from)
    }
}

impl NetPeering {
    /// Status state string, if any
    pub fn state_str(&self) -> Option<&str> {
        self.status.as_ref()?.net_peering_state.as_deref()
    }

    /// `status.netPeeringId`, falling back to the object name
    pub fn peering_id(&self) -> Option<&str> {
        self.status
            .as_ref()
            .and_then(|s| s.net_peering_id.as_deref())
            .or(self.metadata.name.as_deref())
    }
}

/// Parse one NetPeering object as printed by `kubectl get -o json`.
///
/// Objects created by the controller may omit `spec`; it defaults to empty.
pub fn parse_net_peering(mut value: Value) -> Result<NetPeering, serde_json::Error> {
    if let Value::Object(map) = &mut value {
        map.entry("spec")
            .or_insert_with(|| Value::Object(serde_json::Map::new()));
    }
    serde_json::from_value(value)
}

/// Parse `kubectl get netpeerings -o json` output.
///
/// Accepts a `List` (items) or a single object.
pub fn parse_net_peering_list(raw: &str) -> Result<Vec<NetPeering>, serde_json::Error> {
    let value: Value = serde_json::from_str(raw)?;
    match value {
        Value::Object(mut map) if map.contains_key("items") => {
            let items = match map.remove("items") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            };
            items.into_iter().map(parse_net_peering).collect()
        }
        other => Ok(vec![parse_net_peering(other)?]),
    }
}
