//! On-disk kubeconfig cache
//!
//! Layout: `<root>/<project>-<cluster>/<user|default>/<group|default>/kubeconfig`

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::ClusterTarget;

const DEFAULT_SEGMENT: &str = "default";
const KUBECONFIG_FILE: &str = "kubeconfig";

#[derive(Debug, Clone)]
pub struct KubeconfigCache {
    root: PathBuf,
}

impl KubeconfigCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of the cached kubeconfig for `target`
    pub fn path(&self, target: &ClusterTarget) -> PathBuf {
        self.root
            .join(format!("{}-{}", target.project_id, target.cluster_id))
            .join(target.user.as_deref().unwrap_or(DEFAULT_SEGMENT))
            .join(target.group.as_deref().unwrap_or(DEFAULT_SEGMENT))
            .join(KUBECONFIG_FILE)
    }

    /// Read the cached kubeconfig, `None` when nothing is cached yet
    pub fn load(&self, target: &ClusterTarget) -> io::Result<Option<String>> {
        let path = self.path(target);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Write a kubeconfig for `target`, readable by the owner only
    pub fn store(&self, target: &ClusterTarget, kubeconfig: &str) -> io::Result<PathBuf> {
        let path = self.path(target);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, kubeconfig)?;
        restrict_permissions(&path)?;
        debug!("Stored kubeconfig at {}", path.display());
        Ok(path)
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> io::Result<()> {
    Ok(())
}
