//! NetPeeringAcceptance CRD
//!
//! Consent of the target side, created on the target cluster once the
//! request reached `pending-acceptance`.

use crate::net_peering::NetPeeringStatus;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Name suffix of every acceptance object
pub const ACCEPTANCE_SUFFIX: &str = "-npa";

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[kube(
    group = "oks.dev",
    version = "v1beta",
    kind = "NetPeeringAcceptance",
    status = "NetPeeringStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct NetPeeringAcceptanceSpec {
    /// Must equal `status.netPeeringId` of the matching request
    pub net_peering_id: String,
}

impl NetPeeringAcceptance {
    pub fn for_peering(name: &str, net_peering_id: &str) -> Self {
        NetPeeringAcceptance::new(
            name,
            NetPeeringAcceptanceSpec {
                net_peering_id: net_peering_id.to_string(),
            },
        )
    }
}
