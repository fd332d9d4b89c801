//! KubectlRunner trait for mocking

use crate::error::KubectlError;
use crate::{ClusterTarget, KubectlOutput};

/// Executes kubectl verbs against one cluster.
#[async_trait::async_trait]
pub trait KubectlRunner: Send + Sync {
    /// Run `kubectl <args>` against `target`, piping `stdin` when given.
    async fn run(
        &self,
        target: &ClusterTarget,
        args: &[String],
        stdin: Option<&str>,
    ) -> Result<KubectlOutput, KubectlError>;
}
