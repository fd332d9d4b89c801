//! NetPeeringRequest CRD
//!
//! Offer to peer, created on the source cluster. The controller fills in the
//! peering id and moves it to `pending-acceptance`.

use crate::net_peering::NetPeeringStatus;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Name suffix of every request object
pub const REQUEST_SUFFIX: &str = "-npr";

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[kube(
    group = "oks.dev",
    version = "v1beta",
    kind = "NetPeeringRequest",
    status = "NetPeeringStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct NetPeeringRequestSpec {
    /// Network id of the accepting (target) project
    pub accepter_net_id: String,

    /// Cloud account owning the accepting network
    pub accepter_owner_id: String,
}

impl NetPeeringRequest {
    /// Build a request addressed to the given accepter network
    pub fn for_accepter(name: &str, accepter_net_id: &str, accepter_owner_id: &str) -> Self {
        NetPeeringRequest::new(
            name,
            NetPeeringRequestSpec {
                accepter_net_id: accepter_net_id.to_string(),
                accepter_owner_id: accepter_owner_id.to_string(),
            },
        )
    }
}
