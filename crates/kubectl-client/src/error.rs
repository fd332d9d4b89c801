//! kubectl runner errors

use thiserror::Error;

/// Transport-level failures of a kubectl invocation.
///
/// A non-zero kubectl exit status is not an error; callers inspect
/// [`crate::KubectlOutput`] instead.
#[derive(Debug, Error)]
pub enum KubectlError {
    /// Kubeconfig could not be fetched, refreshed or stored
    #[error("credential error: {0}")]
    Credential(String),

    /// kubectl could not be started
    #[error("connectivity error: {0}")]
    Connectivity(String),

    /// I/O error while talking to the child process
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
