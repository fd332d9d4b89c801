//! OKS CLI library
//!
//! Command line client for OKS. The `netpeering` commands peer the networks
//! of two projects by driving NetPeeringRequest / NetPeeringAcceptance
//! objects through `kubectl` on the clusters of each side. `profile`,
//! `project` and `cluster` manage credentials and the default selection.

pub mod commands;
pub mod config;
pub mod error;
pub mod locator;
pub mod netpeering;
pub mod poll;
pub mod presenter;

#[cfg(test)]
mod test_utils;

pub use error::{CliError, Result};

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

/// OKS - managed Kubernetes command line client
#[derive(Parser, Debug)]
#[command(name = "oks-cli")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration profile to use
    #[arg(long, env = "OKS_PROFILE", default_value = config::DEFAULT_PROFILE, global = true)]
    pub profile: String,

    /// Configuration directory (default: ~/.oks_cli)
    #[arg(long, env = "OKS_CLI_HOME", value_name = "DIR", global = true)]
    pub config_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Profile related commands
    Profile(commands::profile::ProfileArgs),
    /// Project related commands
    Project(commands::context::ProjectArgs),
    /// Cluster related commands
    Cluster(commands::context::ClusterArgs),
    /// NetPeering related commands
    Netpeering(commands::netpeering::NetPeeringArgs),
}

impl Cli {
    /// Default log filter for the requested verbosity
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }

    /// Run the CLI command
    pub async fn run(self) -> Result<()> {
        let home = config::config_home(self.config_dir.as_deref())?;
        match self.command {
            Commands::Profile(args) => commands::profile::run(args, &home).await,
            Commands::Project(args) => {
                commands::context::run_project(args, &home, &self.profile).await
            }
            Commands::Cluster(args) => {
                commands::context::run_cluster(args, &home, &self.profile).await
            }
            Commands::Netpeering(args) => {
                commands::netpeering::run(args, &home, &self.profile).await
            }
        }
    }
}
