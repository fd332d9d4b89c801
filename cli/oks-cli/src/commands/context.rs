//! `oks-cli project|cluster login|logout` - persist the default selection
//!
//! The selection is stored by name in the active profile (`default_project`,
//! `default_cluster`) and used by every command that acts on "the" cluster
//! when `-p`/`-c` are not given. Login checks that the name resolves to
//! exactly one object before saving it.

use std::path::Path;

use clap::{Args, Subcommand};
use oks_client::OksClientTrait;
use tracing::debug;

use crate::config::{CliContext, ProfileStore, profiles_path};
use crate::locator::{find_cluster_id, find_project_id};
use crate::{CliError, Result};

/// Project related commands
#[derive(Args, Debug)]
pub struct ProjectArgs {
    #[command(subcommand)]
    pub command: ProjectCommand,
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommand {
    /// Set the default project
    Login {
        #[arg(short = 'p', long = "project-name")]
        project_name: String,
    },
    /// Unset the default project and cluster
    Logout,
}

/// Cluster related commands
#[derive(Args, Debug)]
pub struct ClusterArgs {
    #[command(subcommand)]
    pub command: ClusterCommand,
}

#[derive(Subcommand, Debug)]
pub enum ClusterCommand {
    /// Set the default cluster
    Login {
        /// Project of the cluster (default: profile's default_project)
        #[arg(short = 'p', long = "project-name")]
        project_name: Option<String>,
        #[arg(short = 'c', long = "cluster-name")]
        cluster_name: String,
    },
    /// Unset the default cluster
    Logout,
}

pub async fn run_project(args: ProjectArgs, home: &Path, profile: &str) -> Result<()> {
    let path = profiles_path(home);
    let mut store = ProfileStore::load(&path)?;
    let message = match args.command {
        ProjectCommand::Login { project_name } => {
            let oks = provider(home, profile, &store)?;
            project_login(&mut store, profile, &oks, &project_name).await?
        }
        ProjectCommand::Logout => project_logout(&mut store, profile)?,
    };
    store.save(&path)?;
    println!("{}", message);
    Ok(())
}

pub async fn run_cluster(args: ClusterArgs, home: &Path, profile: &str) -> Result<()> {
    let path = profiles_path(home);
    let mut store = ProfileStore::load(&path)?;
    let message = match args.command {
        ClusterCommand::Login {
            project_name,
            cluster_name,
        } => {
            let oks = provider(home, profile, &store)?;
            cluster_login(&mut store, profile, &oks, project_name.as_deref(), &cluster_name).await?
        }
        ClusterCommand::Logout => cluster_logout(&mut store, profile)?,
    };
    store.save(&path)?;
    println!("{}", message);
    Ok(())
}

fn provider(home: &Path, profile: &str, store: &ProfileStore) -> Result<oks_client::OksClient> {
    CliContext::with_profile(home.to_path_buf(), profile, store.get(profile)?.clone()).oks_client()
}

/// Make `project_name` the default project; clears the default cluster
pub async fn project_login(
    store: &mut ProfileStore,
    profile: &str,
    oks: &dyn OksClientTrait,
    project_name: &str,
) -> Result<String> {
    store.get(profile)?;
    let project_id = find_project_id(oks, project_name).await?;
    debug!("Project {} has id {}", project_name, project_id);

    let entry = store.get_mut(profile)?;
    entry.default_project = Some(project_name.to_string());
    entry.default_cluster = None;
    Ok(format!("Logged into project: {}", project_name))
}

pub fn project_logout(store: &mut ProfileStore, profile: &str) -> Result<String> {
    let entry = store.get_mut(profile)?;
    entry.default_project = None;
    entry.default_cluster = None;
    Ok("Logged out from the current project".to_string())
}

/// Make `cluster_name` the default cluster of `project_name`, or of the
/// current default project
pub async fn cluster_login(
    store: &mut ProfileStore,
    profile: &str,
    oks: &dyn OksClientTrait,
    project_name: Option<&str>,
    cluster_name: &str,
) -> Result<String> {
    let project_name = match project_name {
        Some(name) => name.to_string(),
        None => store.get(profile)?.default_project.clone().ok_or_else(|| {
            CliError::config("no project selected, run 'oks-cli project login' or pass --project-name")
        })?,
    };
    let project_id = find_project_id(oks, &project_name).await?;
    let cluster_id = find_cluster_id(oks, &project_id, cluster_name).await?;
    debug!("Cluster {} has id {}", cluster_name, cluster_id);

    let entry = store.get_mut(profile)?;
    entry.default_project = Some(project_name);
    entry.default_cluster = Some(cluster_name.to_string());
    Ok(format!("Logged into cluster: {}", cluster_name))
}

pub fn cluster_logout(store: &mut ProfileStore, profile: &str) -> Result<String> {
    let entry = store.get_mut(profile)?;
    if entry.default_cluster.take().is_none() {
        return Ok("You are not connected to any cluster.".to_string());
    }
    Ok("Logged out from the current cluster".to_string())
}
