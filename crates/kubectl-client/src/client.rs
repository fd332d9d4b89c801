//! Subprocess-backed kubectl runner

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;

use chrono::Utc;
use oks_client::OksClientTrait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

use crate::cache::KubeconfigCache;
use crate::certificate;
use crate::error::KubectlError;
use crate::runner_trait::KubectlRunner;
use crate::{ClusterTarget, KubectlOutput};

const DEFAULT_BINARY: &str = "kubectl";

/// Runs the `kubectl` executable with `KUBECONFIG` pointing at a cached,
/// still-valid kubeconfig for the target cluster.
pub struct KubectlClient {
    oks: Arc<dyn OksClientTrait>,
    cache: KubeconfigCache,
    binary: PathBuf,
}

impl KubectlClient {
    /// Create a runner that fetches kubeconfigs through `oks` and caches them in `cache`
    pub fn new(oks: Arc<dyn OksClientTrait>, cache: KubeconfigCache) -> Self {
        Self {
            oks,
            cache,
            binary: PathBuf::from(DEFAULT_BINARY),
        }
    }

    /// Use a different kubectl executable
    #[must_use]
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Path of a usable kubeconfig for `target`, refreshing it if needed
    pub async fn ensure_kubeconfig(&self, target: &ClusterTarget) -> Result<PathBuf, KubectlError> {
        let cached = self.cache.load(target).map_err(|e| {
            KubectlError::Credential(format!("cannot read cached kubeconfig: {}", e))
        })?;

        match cached {
            Some(contents) if certificate::is_usable(&contents, Utc::now()) => {
                debug!("Using cached kubeconfig for cluster {}", target.cluster_id);
                return Ok(self.cache.path(target));
            }
            Some(_) => info!(
                "Cached kubeconfig for cluster {} has expired, refreshing",
                target.cluster_id
            ),
            None => debug!("No cached kubeconfig for cluster {}", target.cluster_id),
        }

        let kubeconfig = self
            .oks
            .get_kubeconfig(
                &target.cluster_id,
                target.user.as_deref(),
                target.group.as_deref(),
            )
            .await
            .map_err(|e| {
                KubectlError::Credential(format!(
                    "cannot fetch kubeconfig for cluster {}: {}",
                    target.cluster_id, e
                ))
            })?;

        self.cache
            .store(target, &kubeconfig)
            .map_err(|e| KubectlError::Credential(format!("cannot cache kubeconfig: {}", e)))
    }
}

#[async_trait::async_trait]
impl KubectlRunner for KubectlClient {
    async fn run(
        &self,
        target: &ClusterTarget,
        args: &[String],
        stdin: Option<&str>,
    ) -> Result<KubectlOutput, KubectlError> {
        let kubeconfig = self.ensure_kubeconfig(target).await?;
        debug!("Running {} {}", self.binary.display(), args.join(" "));

        let mut child = Command::new(&self.binary)
            .args(args)
            .env("KUBECONFIG", &kubeconfig)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                KubectlError::Connectivity(format!(
                    "failed to start {}: {}",
                    self.binary.display(),
                    e
                ))
            })?;

        if let Some(input) = stdin {
            if let Some(mut pipe) = child.stdin.take() {
                // kubectl may exit before reading its input; its status tells why
                match pipe.write_all(input.as_bytes()).await {
                    Ok(()) => {}
                    Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                        debug!("kubectl closed stdin early");
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }

        let output = child.wait_with_output().await?;
        let result = KubectlOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: output.stdout,
            stderr: output.stderr,
        };
        debug!("kubectl exited with {}", result.exit_code);
        Ok(result)
    }
}
