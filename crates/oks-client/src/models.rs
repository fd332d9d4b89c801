//! OKS API data models
//!
//! Only the fields the CLI reads are modelled; unknown fields are ignored.

use serde::{Deserialize, Serialize};

/// A project (one private network per project)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Private address range of the project, CIDR notation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cidr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// A Kubernetes cluster inside a project
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Cloud virtual network backing a project
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Net {
    pub net_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// Quota record; carries the owning cloud account
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Quota {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota_collection: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_value: Option<u64>,
}

/// `{"data": {...}}` wrapper used by the per-project and kubeconfig endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataWrapper<T> {
    pub data: T,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetList {
    #[serde(default)]
    pub nets: Vec<Net>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuotaList {
    #[serde(default)]
    pub quotas: Vec<Quota>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KubeconfigData {
    #[serde(default)]
    pub kubeconfig: Option<String>,
}
