//! `oks-cli profile` - manage the profiles of `config.json`
//!
//! ```bash
//! oks-cli profile add --profile-name prod --region eu-west-2 --access-key AK --secret-key SK
//! oks-cli profile list -o yaml
//! oks-cli profile delete --profile-name prod --force
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use clap::{ArgGroup, Args, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;

use crate::config::{AccountType, DEFAULT_PROFILE, Profile, ProfileStore, profiles_path};
use crate::netpeering::{Confirm, StdinConfirm};
use crate::presenter::{OutputFormat, format_table, render_object};
use crate::Result;

const PROFILE_COLUMNS: [&str; 4] = ["PROFILE", "ACCOUNT TYPE", "REGION", "ENDPOINT"];

/// Profile related commands
#[derive(Args, Debug)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub command: ProfileCommand,
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    /// Add an ak/sk or username/password profile
    Add(AddArgs),
    /// Change the region or endpoint of a profile
    Update(UpdateArgs),
    /// Delete a profile
    Delete(DeleteArgs),
    /// List profiles without their secrets
    List(ListArgs),
}

/// Supported regions
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Region {
    #[value(name = "eu-west-2")]
    EuWest2,
    #[value(name = "cloudgouv-eu-west-1")]
    CloudgouvEuWest1,
}

impl Region {
    pub fn as_str(self) -> &'static str {
        match self {
            Region::EuWest2 => "eu-west-2",
            Region::CloudgouvEuWest1 => "cloudgouv-eu-west-1",
        }
    }
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("credentials").required(true).args(["access_key", "username"])))]
pub struct AddArgs {
    /// Name of the profile
    #[arg(long, default_value = DEFAULT_PROFILE)]
    pub profile_name: String,

    #[arg(long, requires = "secret_key")]
    pub access_key: Option<String>,

    #[arg(long, requires = "access_key")]
    pub secret_key: Option<String>,

    #[arg(long, requires = "password", conflicts_with = "access_key")]
    pub username: Option<String>,

    #[arg(long, requires = "username")]
    pub password: Option<String>,

    #[arg(long, value_enum)]
    pub region: Region,

    /// API endpoint, default derived from the region
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Replace an existing profile without asking
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    #[arg(long)]
    pub profile_name: String,

    #[arg(long, value_enum)]
    pub region: Option<Region>,

    #[arg(long)]
    pub endpoint: Option<String>,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    #[arg(long)]
    pub profile_name: String,

    /// Do not ask for confirmation
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,
}

/// What `profile list` shows of a profile
#[derive(Debug, Serialize)]
struct ProfileSummary<'a> {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    account_type: Option<AccountType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    region_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_project: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_cluster: Option<&'a str>,
}

impl<'a> ProfileSummary<'a> {
    fn new(profile: &'a Profile) -> Self {
        Self {
            account_type: profile.account_type,
            region_name: profile.region_name.as_deref(),
            endpoint: profile.api_endpoint().ok(),
            default_project: profile.default_project.as_deref(),
            default_cluster: profile.default_cluster.as_deref(),
        }
    }
}

/// Run the profile command
pub async fn run(args: ProfileArgs, home: &Path) -> Result<()> {
    let rendered = execute(home, args.command, &StdinConfirm).await?;
    println!("{}", rendered.trim_end());
    Ok(())
}

/// Execute a subcommand against `<home>/config.json` and return the text to print
pub async fn execute(home: &Path, command: ProfileCommand, confirm: &dyn Confirm) -> Result<String> {
    let path = profiles_path(home);
    let mut store = ProfileStore::load(&path)?;

    match command {
        ProfileCommand::Add(args) => {
            if store.contains(&args.profile_name)
                && !args.force
                && !confirm
                    .confirm(&format!(
                        "The profile '{}' already exists. Do you want to replace it?",
                        args.profile_name
                    ))
                    .await?
            {
                return Ok("Aborted.".to_string());
            }

            let name = args.profile_name.clone();
            store.insert(name.clone(), new_profile(args));
            store.save(&path)?;
            info!("Profile '{}' written to {}", name, path.display());
            Ok(format!("Profile {} has been successfully added", name))
        }
        ProfileCommand::Update(args) => {
            let profile = store.get_mut(&args.profile_name)?;
            if let Some(region) = args.region {
                profile.region_name = Some(region.as_str().to_string());
            }
            if let Some(endpoint) = args.endpoint {
                profile.endpoint = Some(endpoint);
            }
            store.save(&path)?;
            Ok(format!("Profile {} has been successfully updated", args.profile_name))
        }
        ProfileCommand::Delete(args) => {
            store.get(&args.profile_name)?;
            let question = format!(
                "Are you sure you want to delete the profile with name {}?",
                args.profile_name
            );
            if !args.force && !confirm.confirm(&question).await? {
                return Ok("Aborted.".to_string());
            }
            store.remove(&args.profile_name)?;
            store.save(&path)?;
            Ok(format!("Profile {} has been successfully deleted", args.profile_name))
        }
        ProfileCommand::List(args) => render_profiles(&store, args.output),
    }
}

fn new_profile(args: AddArgs) -> Profile {
    let account_type = if args.access_key.is_some() {
        AccountType::AccessKey
    } else {
        AccountType::UsernamePassword
    };
    Profile {
        region_name: Some(args.region.as_str().to_string()),
        account_type: Some(account_type),
        access_key: args.access_key,
        secret_key: args.secret_key,
        username: args.username,
        password: args.password,
        endpoint: args.endpoint,
        ..Default::default()
    }
}

fn render_profiles(store: &ProfileStore, format: OutputFormat) -> Result<String> {
    if store.is_empty() {
        return Ok("There are no profiles".to_string());
    }

    match format {
        OutputFormat::Json | OutputFormat::Yaml => {
            let summaries: BTreeMap<&str, ProfileSummary<'_>> = store
                .iter()
                .map(|(name, profile)| (name, ProfileSummary::new(profile)))
                .collect();
            render_object(&summaries, format)
        }
        OutputFormat::Table | OutputFormat::Wide => {
            let rows: Vec<Vec<String>> = store
                .iter()
                .map(|(name, profile)| {
                    let summary = ProfileSummary::new(profile);
                    vec![
                        name.to_string(),
                        summary.account_type.map_or("<none>".to_string(), |t| t.to_string()),
                        summary.region_name.unwrap_or("<none>").to_string(),
                        summary.endpoint.unwrap_or_else(|| "<none>".to_string()),
                    ]
                })
                .collect();
            Ok(format_table(&PROFILE_COLUMNS, &rows))
        }
    }
}
