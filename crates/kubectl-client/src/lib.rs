//! kubectl client
//!
//! Runs `kubectl` against OKS clusters. Each call resolves a kubeconfig for
//! the (project, cluster, user, group) tuple from an on-disk cache and
//! transparently refreshes it through the provider API when the cached
//! client certificate has expired.

pub mod cache;
pub mod certificate;
pub mod client;
pub mod error;
#[path = "trait.rs"]
pub mod runner_trait;
#[cfg(feature = "test-util")]
pub mod mock;

pub use cache::KubeconfigCache;
pub use client::KubectlClient;
pub use error::KubectlError;
pub use runner_trait::KubectlRunner;
#[cfg(feature = "test-util")]
pub use mock::{KubectlCall, MockKubectlRunner};

/// Cluster a kubectl call is aimed at, plus the identity to use
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClusterTarget {
    pub project_id: String,
    pub cluster_id: String,
    pub user: Option<String>,
    pub group: Option<String>,
}

impl ClusterTarget {
    pub fn new(project_id: impl Into<String>, cluster_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            cluster_id: cluster_id.into(),
            user: None,
            group: None,
        }
    }

    /// Attach an optional user / group identity
    #[must_use]
    pub fn with_identity(mut self, user: Option<String>, group: Option<String>) -> Self {
        self.user = user;
        self.group = group;
        self
    }
}

/// Result of a kubectl invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KubectlOutput {
    pub exit_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl KubectlOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn stdout_str(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// Trimmed stderr, for error messages
    pub fn stderr_str(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

/// Turn string-ish arguments into the owned form the runner takes
pub fn kubectl_args<I, S>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    args.into_iter().map(Into::into).collect()
}

#[cfg(test)]
pub(crate) mod test_support;
