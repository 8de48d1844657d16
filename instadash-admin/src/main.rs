//! instadash-admin - operator maintenance commands
//!
//! One-shot commands against the same store the API serves. Each command
//! runs once, prints its result as JSON on stdout and exits non-zero on
//! failure. Nothing is retried.

use anyhow::{anyhow, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};

use instadash_common::maintenance;
use instadash_common::services::{Punctuator, WorkflowClient};
use instadash_common::store::{self, Store};
use instadash_common::Config;

/// Dashboard maintenance commands
#[derive(Debug, Parser)]
#[command(name = "instadash-admin", version, about)]
struct Args {
    /// TOML config file (defaults to the platform config directory)
    #[arg(long, global = true, env = "INSTADASH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Set every competitor active except the reserved placeholder row
    ActivateCompetitors,

    /// Row count and sample rows for every dashboard table
    TableReport {
        /// Sample rows per table
        #[arg(long, default_value_t = 3)]
        sample: u32,
    },

    /// Delete the seeded demonstration posts
    CleanupDemo,

    /// Insert the demonstration posts
    SeedDemo {
        /// Owning client for the seeded posts
        #[arg(long)]
        client_id: Option<String>,
    },

    /// Punctuate Spanish text (returns the input unchanged when unavailable)
    Punctuate {
        text: String,
    },

    /// Workflow automation API
    #[command(subcommand)]
    Workflow(WorkflowCommand),
}

#[derive(Debug, Subcommand)]
enum WorkflowCommand {
    /// Activate a workflow by id or by exact name
    Activate(ActivateTarget),

    /// Show a workflow's current state
    Status {
        id: String,
    },
}

#[derive(Debug, ClapArgs)]
#[group(required = true, multiple = false)]
struct ActivateTarget {
    /// Workflow id
    id: Option<String>,

    /// Workflow name (exact match)
    #[arg(long)]
    name: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;

    match args.command {
        Command::ActivateCompetitors => {
            let store = open_store(&config).await?;
            let report = maintenance::activate_competitors(store.as_ref(), &config.placeholder_competitor_id)
                .await
                .context("Competitor activation failed")?;
            info!(
                updated = report.updated.len(),
                active = report.active.len(),
                "Competitor activation complete"
            );
            print_json(&report)
        }
        Command::TableReport { sample } => {
            let store = open_store(&config).await?;
            let report = maintenance::table_report(store.as_ref(), sample).await;
            for summary in report.iter().filter(|s| s.error.is_some()) {
                warn!(table = %summary.table, "Table could not be read");
            }
            print_json(&report)
        }
        Command::CleanupDemo => {
            let store = open_store(&config).await?;
            let report = maintenance::cleanup_demo_posts(store.as_ref(), &config.demo_post_ids)
                .await
                .context("Demo cleanup failed")?;
            print_json(&json!({
                "count": report.count(),
                "deleted": report.deleted,
            }))
        }
        Command::SeedDemo { client_id } => {
            let store = open_store(&config).await?;
            let posts = maintenance::seed_demo_posts(store.as_ref(), &config.demo_post_ids, client_id.as_deref())
                .await
                .context("Demo seeding failed")?;
            print_json(&posts)
        }
        Command::Punctuate { text } => {
            let punctuator = Punctuator::new(config.openai.clone())?;
            if !punctuator.is_configured() {
                warn!("OPENAI_API_KEY not set, text will be returned unchanged");
            }
            let result = punctuator.punctuate(&text).await;
            print_json(&result)
        }
        Command::Workflow(command) => {
            let workflow_config = config
                .workflow
                .as_ref()
                .ok_or_else(|| anyhow!("Workflow automation API not configured (set N8N_BASE_URL and N8N_API_KEY)"))?;
            let client = WorkflowClient::new(workflow_config)?;

            let status = match command {
                WorkflowCommand::Activate(ActivateTarget { id: Some(id), .. }) => client.activate(&id).await?,
                WorkflowCommand::Activate(ActivateTarget { name: Some(name), .. }) => {
                    client.activate_by_name(&name).await?
                }
                WorkflowCommand::Activate(_) => return Err(anyhow!("Workflow id or --name required")),
                WorkflowCommand::Status { id } => client.status(&id).await?,
            };
            print_json(&status)
        }
    }
}

async fn open_store(config: &Config) -> Result<Arc<dyn Store>> {
    let store = store::connect(&config.store)
        .await
        .context("Failed to open store")?;
    info!("✓ Store ready ({})", store.backend_name());
    Ok(store)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
