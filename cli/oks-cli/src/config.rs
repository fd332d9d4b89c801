//! CLI configuration stored at `~/.oks_cli/`.
//!
//! - `~/.oks_cli/config.json`: profiles keyed by name
//! - `~/.oks_cli/cache/`: per-cluster kubeconfig cache
//!
//! `OKS_CLI_HOME` replaces `~/.oks_cli` entirely.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use oks_client::{Credentials, OksClient, default_endpoint};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::locator::FactsSource;
use crate::netpeering::ConfirmStage;
use crate::{CliError, Result};

const CONFIG_DIR_NAME: &str = ".oks_cli";
const CONFIG_FILE_NAME: &str = "config.json";
const CACHE_DIR_NAME: &str = "cache";

/// Profile used when neither `--profile` nor `OKS_PROFILE` is given
pub const DEFAULT_PROFILE: &str = "default";

/// How a profile authenticates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    #[serde(rename = "ak/sk")]
    AccessKey,
    #[serde(rename = "username/password")]
    UsernamePassword,
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountType::AccessKey => f.write_str("ak/sk"),
            AccountType::UsernamePassword => f.write_str("username/password"),
        }
    }
}

/// One entry of `config.json`
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub account_type: Option<AccountType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub jwt: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_cluster: Option<String>,
}

impl fmt::Debug for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Profile")
            .field("region_name", &self.region_name)
            .field("account_type", &self.account_type)
            .field("endpoint", &self.endpoint)
            .field("default_project", &self.default_project)
            .field("default_cluster", &self.default_cluster)
            .finish_non_exhaustive()
    }
}

impl Profile {
    /// API base URL: explicit `endpoint`, else derived from `region_name`
    pub fn api_endpoint(&self) -> Result<String> {
        if let Some(endpoint) = &self.endpoint {
            return Ok(endpoint.trim_end_matches('/').to_string());
        }
        self.region_name
            .as_deref()
            .map(default_endpoint)
            .ok_or_else(|| CliError::config("profile has neither endpoint nor region_name"))
    }

    /// Credentials for the profile's account type.
    ///
    /// Profiles without a `type` are classified by the fields they carry.
    /// Token (`jwt`) authentication is refused rather than ignored.
    pub fn credentials(&self) -> Result<Credentials> {
        if self.jwt {
            return Err(CliError::config("jwt authentication is not supported"));
        }
        let account_type = match self.account_type {
            Some(t) => t,
            None if self.access_key.is_some() => AccountType::AccessKey,
            None if self.username.is_some() => AccountType::UsernamePassword,
            None => return Err(CliError::config("profile has no credentials")),
        };

        match account_type {
            AccountType::AccessKey => match (&self.access_key, &self.secret_key) {
                (Some(access_key), Some(secret_key)) => Ok(Credentials::AccessKey {
                    access_key: access_key.clone(),
                    secret_key: secret_key.clone(),
                }),
                _ => Err(CliError::config("ak/sk profile needs access_key and secret_key")),
            },
            AccountType::UsernamePassword => match (&self.username, &self.password) {
                (Some(username), Some(password)) => Ok(Credentials::Basic {
                    username: username.clone(),
                    password: password.clone(),
                }),
                _ => Err(CliError::config(
                    "username/password profile needs username and password",
                )),
            },
        }
    }
}

/// All profiles of `config.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileStore {
    profiles: BTreeMap<String, Profile>,
}

impl ProfileStore {
    pub fn from_json(data: &str) -> Result<Self> {
        Ok(serde_json::from_str(data)?)
    }

    /// Load profiles from `path`; a missing file yields an empty store
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No profile file at {}", path.display());
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path).map_err(|e| {
            CliError::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&data).map_err(|e| {
            CliError::config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    pub fn get(&self, name: &str) -> Result<&Profile> {
        self.profiles.get(name).ok_or_else(|| self.missing(name))
    }

    pub fn names(&self) -> Vec<&str> {
        self.profiles.keys().map(String::as_str).collect()
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut Profile> {
        if !self.profiles.contains_key(name) {
            return Err(self.missing(name));
        }
        Ok(self.profiles.entry(name.to_string()).or_default())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.profiles.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Profile)> {
        self.profiles.iter().map(|(name, profile)| (name.as_str(), profile))
    }

    pub fn insert(&mut self, name: impl Into<String>, profile: Profile) {
        self.profiles.insert(name.into(), profile);
    }

    pub fn remove(&mut self, name: &str) -> Result<Profile> {
        match self.profiles.remove(name) {
            Some(profile) => Ok(profile),
            None => Err(self.missing(name)),
        }
    }

    /// Write all profiles to `path`, readable by the owner only
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)?;
        restrict_permissions(path)?;
        debug!("Saved {} profile(s) to {}", self.profiles.len(), path.display());
        Ok(())
    }

    fn missing(&self, name: &str) -> CliError {
        CliError::config(format!(
            "profile '{}' not found, available profiles: [{}]",
            name,
            self.names().join(", ")
        ))
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

/// `<home>/config.json`
pub fn profiles_path(home: &Path) -> PathBuf {
    home.join(CONFIG_FILE_NAME)
}

/// `~/.oks_cli`, unless overridden
pub fn config_home(override_dir: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = override_dir {
        return Ok(dir.to_path_buf());
    }
    let home = dirs::home_dir()
        .ok_or_else(|| CliError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Tunables of the NetPeering workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetPeeringSettings {
    /// Wait between request creation and the first request fetch
    pub settle_delay: Duration,
    /// Wait between two polls of the peering
    pub poll_interval: Duration,
    /// Upper bound of the active-state poll
    pub timeout: Duration,
    pub facts_source: FactsSource,
    pub confirm_stage: ConfirmStage,
}

impl Default for NetPeeringSettings {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_secs(3),
            poll_interval: Duration::from_secs(3),
            timeout: Duration::from_secs(300),
            facts_source: FactsSource::default(),
            confirm_stage: ConfirmStage::default(),
        }
    }
}

/// Everything a command needs, loaded once per process
#[derive(Debug, Clone)]
pub struct CliContext {
    pub home: PathBuf,
    pub profile_name: String,
    pub profile: Profile,
    /// Project selected with `-p`, else the profile default
    pub project: Option<String>,
    /// Cluster selected with `-c`, else the profile default
    pub cluster: Option<String>,
    pub user: Option<String>,
    pub group: Option<String>,
    pub settings: NetPeeringSettings,
}

impl CliContext {
    /// Load the named profile from `<home>/config.json`
    pub fn load(home: PathBuf, profile_name: &str) -> Result<Self> {
        let store = ProfileStore::load(&profiles_path(&home))?;
        let profile = store.get(profile_name)?.clone();
        debug!("Using profile '{}'", profile_name);
        Ok(Self::with_profile(home, profile_name, profile))
    }

    pub fn with_profile(home: PathBuf, profile_name: &str, profile: Profile) -> Self {
        Self {
            project: profile.default_project.clone(),
            cluster: profile.default_cluster.clone(),
            home,
            profile_name: profile_name.to_string(),
            profile,
            user: None,
            group: None,
            settings: NetPeeringSettings::default(),
        }
    }

    /// Override the profile's default project/cluster when given
    #[must_use]
    pub fn with_selection(mut self, project: Option<String>, cluster: Option<String>) -> Self {
        if project.is_some() {
            self.project = project;
        }
        if cluster.is_some() {
            self.cluster = cluster;
        }
        self
    }

    #[must_use]
    pub fn with_identity(mut self, user: Option<String>, group: Option<String>) -> Self {
        self.user = user;
        self.group = group;
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: NetPeeringSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.home.join(CACHE_DIR_NAME)
    }

    /// Selected project and cluster names, required by list/get/delete
    pub fn selection(&self) -> Result<(&str, &str)> {
        let project = self.project.as_deref().ok_or_else(|| {
            CliError::config("no project selected, pass --project-name or set default_project")
        })?;
        let cluster = self.cluster.as_deref().ok_or_else(|| {
            CliError::config("no cluster selected, pass --cluster-name or set default_cluster")
        })?;
        Ok((project, cluster))
    }

    /// Provider API client authenticated with this profile
    pub fn oks_client(&self) -> Result<OksClient> {
        let endpoint = self.profile.api_endpoint()?;
        let credentials = self.profile.credentials()?;
        Ok(OksClient::new(endpoint, credentials)?)
    }
}
