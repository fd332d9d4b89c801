//! `oks-cli netpeering` - manage NetPeerings between projects

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Subcommand};
use kubectl_client::{KubeconfigCache, KubectlClient, KubectlRunner};
use oks_client::OksClientTrait;

use crate::config::{CliContext, NetPeeringSettings};
use crate::locator::{FactsSource, Identity};
use crate::netpeering::{
    ClusterSelection, ConfirmStage, CreateOutcome, CreateRequest, DeleteOutcome, Fetched,
    NetPeeringOrchestrator, StatusFilter, StdinConfirm,
};
use crate::poll::TokioSleeper;
use crate::presenter::{
    DocumentFormat, OutputFormat, render_created, render_message, render_object, render_peering,
    render_peerings,
};
use crate::Result;

/// NetPeering related commands
#[derive(Args, Debug)]
pub struct NetPeeringArgs {
    /// Project used by list, get and delete (default: profile's default_project)
    #[arg(short = 'p', long = "project-name", global = true)]
    pub project_name: Option<String>,

    /// Cluster used by list, get and delete (default: profile's default_cluster)
    #[arg(short = 'c', long = "cluster-name", global = true)]
    pub cluster_name: Option<String>,

    /// User to fetch the kubeconfig for
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// Group to fetch the kubeconfig for
    #[arg(long, global = true)]
    pub group: Option<String>,

    #[command(flatten)]
    pub tuning: TuningArgs,

    #[command(subcommand)]
    pub command: NetPeeringCommand,
}

/// Workflow tunables
#[derive(Args, Debug, Clone)]
pub struct TuningArgs {
    /// Seconds to wait before reading back a new NetPeeringRequest
    #[arg(long, env = "OKS_NETPEERING_SETTLE_DELAY", default_value_t = 3, value_name = "SECONDS", global = true)]
    pub settle_delay: u64,

    /// Seconds between two polls of the NetPeering state
    #[arg(long, env = "OKS_NETPEERING_POLL_INTERVAL", default_value_t = 3, value_name = "SECONDS", global = true,
          value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_interval: u64,

    /// Maximum seconds to wait for the NetPeering to become active
    #[arg(long, env = "OKS_NETPEERING_TIMEOUT", default_value_t = 300, value_name = "SECONDS", global = true)]
    pub timeout: u64,

    /// Where network and account ids are read from
    #[arg(long, env = "OKS_NETPEERING_FACTS_SOURCE", value_enum, default_value_t = FactsSource::NodePoolLabels, global = true)]
    pub facts_source: FactsSource,

    /// When `create` asks for confirmation
    #[arg(long, env = "OKS_NETPEERING_CONFIRM_STAGE", value_enum, default_value_t = ConfirmStage::BeforeRequest, global = true)]
    pub confirm_stage: ConfirmStage,
}

impl TuningArgs {
    pub fn settings(&self) -> NetPeeringSettings {
        NetPeeringSettings {
            settle_delay: Duration::from_secs(self.settle_delay),
            poll_interval: Duration::from_secs(self.poll_interval),
            timeout: Duration::from_secs(self.timeout),
            facts_source: self.facts_source,
            confirm_stage: self.confirm_stage,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum NetPeeringCommand {
    /// Create a NetPeering between 2 projects
    Create(CreateArgs),
    /// Delete a NetPeering
    Delete(DeleteArgs),
    /// List NetPeerings
    List(ListArgs),
    /// Show one NetPeering
    Get(GetArgs),
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Source project name
    #[arg(long, visible_alias = "from-project")]
    pub source_project: String,

    /// Source cluster name
    #[arg(long, visible_alias = "from-cluster")]
    pub source_cluster: String,

    /// Target project name
    #[arg(long, visible_alias = "to-project")]
    pub target_project: String,

    /// Target cluster name
    #[arg(long, visible_alias = "to-cluster")]
    pub target_cluster: String,

    /// Base name of the objects, default '<source-project>-to-<target-project>'
    #[arg(long)]
    pub netpeering_name: Option<String>,

    /// Do not ask for confirmation
    #[arg(long, visible_alias = "auto-approve")]
    pub force: bool,

    /// Only print the NetPeeringRequest that would be sent
    #[arg(long)]
    pub dry_run: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = DocumentFormat::Json)]
    pub output: DocumentFormat,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// NetPeering to remove
    #[arg(long)]
    pub netpeering_id: String,

    /// Run without any action
    #[arg(long)]
    pub dry_run: bool,

    /// Do not ask for confirmation
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Keep only peerings in this state
    #[arg(long, value_enum, default_value_t = StatusFilter::All)]
    pub status: StatusFilter,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// NetPeering to show
    #[arg(long)]
    pub netpeering_id: String,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,
}

/// Run the netpeering command
pub async fn run(args: NetPeeringArgs, home: &Path, profile: &str) -> Result<()> {
    let ctx = CliContext::load(home.to_path_buf(), profile)?
        .with_selection(args.project_name, args.cluster_name)
        .with_identity(args.user, args.group)
        .with_settings(args.tuning.settings());

    let orchestrator = build_orchestrator(&ctx)?;
    let rendered = execute(&orchestrator, &ctx, args.command).await?;
    println!("{}", rendered.trim_end());
    Ok(())
}

fn build_orchestrator(ctx: &CliContext) -> Result<NetPeeringOrchestrator> {
    let oks: Arc<dyn OksClientTrait> = Arc::new(ctx.oks_client()?);
    let kubectl: Arc<dyn KubectlRunner> = Arc::new(KubectlClient::new(
        Arc::clone(&oks),
        KubeconfigCache::new(ctx.cache_dir()),
    ));

    Ok(NetPeeringOrchestrator::new(
        oks,
        kubectl,
        Arc::new(StdinConfirm),
        Arc::new(TokioSleeper),
        ctx.settings.clone(),
        Identity {
            user: ctx.user.clone(),
            group: ctx.group.clone(),
        },
    ))
}

/// Execute a subcommand and return the text to print
pub async fn execute(
    orchestrator: &NetPeeringOrchestrator,
    ctx: &CliContext,
    command: NetPeeringCommand,
) -> Result<String> {
    match command {
        NetPeeringCommand::Create(args) => {
            let request = CreateRequest {
                source_project: args.source_project,
                source_cluster: args.source_cluster,
                target_project: args.target_project,
                target_cluster: args.target_cluster,
                name: args.netpeering_name,
                auto_approve: args.force,
                dry_run: args.dry_run,
            };
            match orchestrator.create(&request).await? {
                CreateOutcome::DryRun { request } => render_object(&request, args.output.into()),
                CreateOutcome::Declined { message } => Ok(message),
                CreateOutcome::Created {
                    net_peering,
                    message,
                } => render_created(&message, &net_peering, args.output),
            }
        }
        NetPeeringCommand::Delete(args) => {
            let selection = selection(ctx)?;
            let outcome = orchestrator
                .delete(&selection, &args.netpeering_id, args.dry_run, args.force)
                .await?;
            match outcome {
                DeleteOutcome::DryRun { message } => render_message(&message, OutputFormat::Json),
                other => Ok(other.message().to_string()),
            }
        }
        NetPeeringCommand::List(args) => {
            let wide = args.output == OutputFormat::Wide;
            match orchestrator.list(&selection(ctx)?, args.status, wide).await? {
                Fetched::Parsed(peerings) => render_peerings(&peerings, args.output),
                Fetched::Raw(raw) => Ok(raw),
            }
        }
        NetPeeringCommand::Get(args) => {
            let wide = args.output == OutputFormat::Wide;
            match orchestrator
                .get(&selection(ctx)?, &args.netpeering_id, wide)
                .await?
            {
                Fetched::Parsed(peering) => render_peering(&peering, args.output),
                Fetched::Raw(raw) => Ok(raw),
            }
        }
    }
}

fn selection(ctx: &CliContext) -> Result<ClusterSelection> {
    let (project, cluster) = ctx.selection()?;
    Ok(ClusterSelection::new(project, cluster))
}
