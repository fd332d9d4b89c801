//! Error types for the CLI

use kubectl_client::KubectlError;
use oks_client::OksError;

/// CLI Result type
pub type Result<T> = std::result::Result<T, CliError>;

/// Every failure the CLI can report. All of them exit with status 1; usage
/// errors are reported by clap before any of this runs.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Networks overlap: {source_cidr} and {target_cidr}, you can't create netpeering")]
    Overlap {
        source_cidr: String,
        target_cidr: String,
    },

    #[error("NetPeering {net_peering_id} already exists between projects '{source_project}' and '{target_project}'")]
    AlreadyExists {
        net_peering_id: String,
        source_project: String,
        target_project: String,
    },

    #[error("failed to create {object}: {stderr}")]
    Create { object: String, stderr: String },

    #[error("failed to fetch {object}: {detail}")]
    Fetch { object: String, detail: String },

    #[error("{object} is in wrong state: {state}")]
    UnexpectedState { object: String, state: String },

    #[error("timed out after {waited_secs}s waiting for {object} to become active (last state: {last_state})")]
    Timeout {
        object: String,
        waited_secs: u64,
        last_state: String,
    },

    #[error("failed to delete {object}: {stderr}")]
    Delete { object: String, stderr: String },

    #[error("credential error: {0}")]
    Credential(String),

    #[error("connectivity error: {0}")]
    Connectivity(String),

    #[error("{0}")]
    NotFound(String),

    #[error("cannot resolve network facts: {0}")]
    Resolution(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Api(#[from] OksError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid CIDR '{cidr}': {reason}")]
    InvalidCidr { cidr: String, reason: String },
}

impl CliError {
    pub fn fetch(object: impl Into<String>, detail: impl Into<String>) -> Self {
        CliError::Fetch {
            object: object.into(),
            detail: detail.into(),
        }
    }

    pub fn create(object: impl Into<String>, stderr: impl Into<String>) -> Self {
        CliError::Create {
            object: object.into(),
            stderr: stderr.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        CliError::Config(message.into())
    }

    /// Process exit status for this error
    pub fn exit_code(&self) -> u8 {
        1
    }
}

impl From<KubectlError> for CliError {
    fn from(err: KubectlError) -> Self {
        match err {
            KubectlError::Credential(message) => CliError::Credential(message),
            KubectlError::Connectivity(message) => CliError::Connectivity(message),
            KubectlError::Io(e) => CliError::Io(e),
        }
    }
}
