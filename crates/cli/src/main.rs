use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use deintensify_catalog::{HttpCatalog, IntensityCatalog, StaticCatalog, DEFAULT_ENDPOINT};
use deintensify_core::{FieldPolicy, ManagedResource, ResourceType};
use deintensify_kubehub::{get_kube_client, KubeStore};
use deintensify_reconcile::{select_target, Reconciler, ResourceOutcome, RunReport, Selection};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "deintensify", version, about = "Move cluster resources to the lowest-carbon region")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, global = true, default_value_t = Output::Human)]
    output: Output,

    /// Resource key: group/version/resource (or version/resource for the core group)
    #[arg(long, global = true, env = "DEINTENSIFY_RESOURCE", value_parser = ResourceType::parse,
          default_value = "infrastructure.cluster.x-k8s.io/v1beta1/gcpclusters")]
    resource: ResourceType,

    /// Kind written into created records
    #[arg(long, global = true, env = "DEINTENSIFY_KIND", default_value = "GCPCluster")]
    kind: String,

    /// Namespace to reconcile
    #[arg(long = "ns", global = true, env = "DEINTENSIFY_NAMESPACE", default_value = "default")]
    namespace: String,

    /// Kubeconfig context (default: current context or in-cluster config)
    #[arg(long, global = true, env = "DEINTENSIFY_CONTEXT")]
    context: Option<String>,

    /// Where intensity data comes from
    #[arg(long, global = true, value_enum, env = "DEINTENSIFY_SOURCE", default_value_t = Source::Http)]
    source: Source,

    /// Emissions feed endpoint (source=http)
    #[arg(long, global = true, env = "DEINTENSIFY_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    #[arg(long = "fetch-timeout-ms", global = true, env = "DEINTENSIFY_FETCH_TIMEOUT_MS", default_value_t = 2000)]
    fetch_timeout_ms: u64,

    /// Deadline for each list/create/delete call
    #[arg(long = "call-timeout-secs", global = true, env = "DEINTENSIFY_CALL_TIMEOUT_SECS", default_value_t = 30)]
    call_timeout_secs: u64,

    /// Step past this many lowest-intensity entries
    #[arg(long, global = true, env = "DEINTENSIFY_SKIP", default_value_t = 0)]
    skip: usize,

    /// Only consider catalog entries tagged with this provider (e.g. GCP)
    #[arg(long, global = true, env = "DEINTENSIFY_PROVIDER")]
    provider: Option<String>,

    /// Fail planning when generateName, network.name, project or region is absent
    #[arg(long = "strict-fields", global = true, env = "DEINTENSIFY_STRICT_FIELDS", action = ArgAction::SetTrue)]
    strict_fields: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Output {
    Human,
    Json,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Source {
    Http,
    Static,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the catalog ordered by intensity and the selected target
    Regions,
    /// List resources and show what would be migrated, without writing
    Plan,
    /// Migrate every out-of-region resource to the target
    Run,
}

impl Cli {
    fn catalog(&self) -> Arc<dyn IntensityCatalog> {
        match self.source {
            Source::Static => Arc::new(StaticCatalog::new()),
            Source::Http => Arc::new(
                HttpCatalog::new(self.endpoint.clone()).with_timeout(Duration::from_millis(self.fetch_timeout_ms)),
            ),
        }
    }

    fn selection(&self) -> Selection {
        Selection { skip: self.skip, provider: self.provider.clone() }
    }

    async fn reconciler(&self) -> Result<Reconciler> {
        let client = get_kube_client(self.context.as_deref()).await?;
        let store = KubeStore::new(client).with_call_timeout(Duration::from_secs(self.call_timeout_secs));
        let resource = ManagedResource::new(self.resource.clone(), self.kind.clone());
        let policy = if self.strict_fields { FieldPolicy::Strict } else { FieldPolicy::Compat };
        Ok(Reconciler::new(self.catalog(), Arc::new(store), resource, self.namespace.clone())
            .with_selection(self.selection())
            .with_field_policy(policy))
    }
}

fn init_tracing() {
    let env = std::env::var("DEINTENSIFY_LOG").unwrap_or_else(|_| "info".to_string());
    let filter = tracing_subscriber::EnvFilter::from_str(&env).unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Regions => {
            info!(source = ?cli.source, "regions invoked");
            let sel = select_target(cli.catalog().as_ref(), &cli.selection()).await?;
            match cli.output {
                Output::Human => {
                    for r in &sel.ordered {
                        let mark = if r.name == sel.target { "*" } else { " " };
                        let provider = r.provider.as_deref().unwrap_or("-");
                        println!("{} {:<28} {:<6} {}", mark, r.name, provider, r.intensity);
                    }
                    println!("target: {}", sel.target);
                }
                Output::Json => {
                    let v = serde_json::json!({ "target": sel.target, "ordered": sel.ordered });
                    println!("{}", serde_json::to_string_pretty(&v)?);
                }
            }
        }
        Commands::Plan | Commands::Run => {
            let dry_run = matches!(cli.command, Commands::Plan);
            info!(resource = %cli.resource, kind = %cli.kind, ns = %cli.namespace, dry_run, "reconcile invoked");
            let rec = cli.reconciler().await?;
            let report = if dry_run { rec.plan_only().await? } else { rec.run().await? };
            match cli.output {
                Output::Human => print_report(&report),
                Output::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            }
            if let Some(abort) = &report.abort {
                error!(resource = %abort.resource, error = %abort.cause, "reconciliation aborted");
                return Err(anyhow!("reconciliation aborted at {}: {}", abort.resource, abort.cause));
            }
        }
    }

    Ok(())
}

fn print_report(report: &RunReport) {
    println!("target region: {}", report.target);
    for o in &report.outcomes {
        match o {
            ResourceOutcome::Stable { name, region } => println!("{} is on region {}", name, region),
            ResourceOutcome::Planned { name, from, to, .. } => {
                println!("{} is on region {}", name, from);
                println!("  would move from {} to {}", from, to);
            }
            ResourceOutcome::Migrated { name, from, to, created } => {
                println!("{} is on region {}", name, from);
                println!("  moving from {} to {}", from, to);
                println!("  {} created", created);
                println!("  {} deleted", name);
            }
        }
    }
    if let Some(abort) = &report.abort {
        println!("{} is on region {}", abort.resource, abort.region);
        println!("  aborted while {:?}: {}", abort.stage, abort.cause);
        if let Some(created) = &abort.created {
            println!("  {} created but {} was NOT deleted; both records exist", created, abort.resource);
        }
        if !report.untouched.is_empty() {
            println!("not examined: {}", report.untouched.join(", "));
        }
    }
}
