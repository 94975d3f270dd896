use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use weft_agents::{AgentCatalog, AgentRegistry};
use weft_core::config::AppConfig;
use weft_core::types::{RunMetadata, WorkflowGraph};
use weft_engine::{NodeDispatcher, WorkflowRunner};
use weft_gateway::GatewayServer;

#[derive(Parser)]
#[command(name = "weft", version, about = "Workflow engine for pipelined agent graphs")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "weft.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway server
    Serve,
    /// Execute a workflow graph from a JSON file and print the report
    Run {
        /// Path to a workflow JSON file ({nodes, edges, teamId?})
        file: PathBuf,
    },
    /// List the deterministic agent catalog
    Agents,
    /// Show the effective configuration
    Config,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn build_runner(config: &AppConfig) -> Arc<WorkflowRunner> {
    let registry = Arc::new(AgentRegistry::with_builtins());
    let provider = weft_llm::create_provider(&config.provider);
    Arc::new(WorkflowRunner::new(NodeDispatcher::new(registry, provider)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = AppConfig::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Serve => {
            let runner = build_runner(&config);
            let catalog = Arc::new(AgentCatalog::builtin());
            let server = GatewayServer::new(config.gateway.clone(), runner, catalog);

            let shutdown = CancellationToken::new();
            let signal_token = shutdown.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Shutdown signal received");
                    signal_token.cancel();
                }
            });

            server.run(shutdown).await?;
        }
        Commands::Run { file } => {
            let content = std::fs::read_to_string(&file)?;
            let graph: WorkflowGraph = serde_json::from_str(&content)?;

            let catalog = AgentCatalog::builtin();
            let nodes = catalog.resolve_all(graph.nodes)?;
            let runner = build_runner(&config);

            let metadata = RunMetadata::new(graph.team_id.clone());
            match runner.run(&nodes, &graph.edges, &metadata).await {
                Ok(report) => {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                    if !report.success {
                        std::process::exit(1);
                    }
                }
                Err(e) => {
                    error!(error = %e, "Workflow failed before execution");
                    std::process::exit(1);
                }
            }
        }
        Commands::Agents => {
            let catalog = AgentCatalog::builtin();
            for entry in catalog.entries() {
                println!("{:>3}  {:<16} {}", entry.id, entry.identifier, entry.description);
            }
        }
        Commands::Config => {
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
