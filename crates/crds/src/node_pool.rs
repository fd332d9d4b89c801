//! NodePool labels
//!
//! Workload node pools carry the cloud network facts of their cluster as
//! labels. Only the labels are read, so pools are handled as dynamic objects.

use kube::core::{DynamicObject, ObjectList};

/// Label holding the VPC / Net id
pub const NETWORK_ID_LABEL: &str = "oks.network_id";

/// Label holding the cloud account id
pub const ACCOUNT_ID_LABEL: &str = "oks.account-id";

/// Parse `kubectl get nodepool -o json` output.
pub fn parse_node_pool_list(raw: &str) -> Result<Vec<DynamicObject>, serde_json::Error> {
    let list: ObjectList<DynamicObject> = serde_json::from_str(raw)?;
    Ok(list.items)
}

/// Read a label off a node pool
pub fn node_pool_label<'a>(pool: &'a DynamicObject, key: &str) -> Option<&'a str> {
    pool.metadata
        .labels
        .as_ref()
        .and_then(|labels| labels.get(key))
        .map(String::as_str)
}
