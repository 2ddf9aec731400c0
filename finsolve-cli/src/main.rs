//! `finsolve` - ingest trigger and role-scoped query entrypoint.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use finsolve_rag::{Answer, Gateway, IngestReport, Resources, Settings};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "finsolve", about = "Role-based assistant over FinSolve departmental documents", version)]
struct Cli {
    /// Root directory holding one subdirectory per department (overrides FINSOLVE_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Qdrant gRPC URL (overrides QDRANT_URL; in-memory index when unset)
    #[arg(long, global = true)]
    qdrant_url: Option<String>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Build the departmental collection if it does not exist
    Ingest {
        /// Drop and rebuild an existing collection
        #[arg(long)]
        force: bool,
    },

    /// Ask a question as a given role
    Ask {
        /// Requester role: c_level, engineering, finance, general, marketing or hr
        #[arg(long)]
        role: String,
        /// The question
        query: String,
    },

    /// List collections in the index and the chunk count of the configured one
    Collections,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let mut settings = Settings::from_env().context("failed to read settings")?;
    if let Some(dir) = cli.data_dir {
        settings.data_dir = dir;
    }
    if cli.qdrant_url.is_some() {
        settings.qdrant_url = cli.qdrant_url;
    }

    let resources = Resources::from_settings(&settings)?;
    let gateway = Gateway::builder()
        .config(settings.rag.clone())
        .data_dir(settings.data_dir.clone())
        .generation(settings.generation.clone())
        .resources(resources)
        .build()?;

    match cli.command {
        Command::Ingest { force } => {
            let report = gateway.ingest(force).await?;
            print_report(&cli.format, gateway.collection(), &report)?;
        }
        Command::Ask { role, query } => {
            gateway.policy().authorize(&role)?;
            let report = gateway.ingest(false).await?;
            info!(?report, "collection ready");
            let answer = gateway.ask(&query, &role).await?;
            print_answer(&cli.format, &answer)?;
        }
        Command::Collections => {
            let collections = gateway.collections().await?;
            let count = gateway.chunk_count().await?;
            match cli.format {
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::json!({
                        "collections": collections,
                        "configured": gateway.collection(),
                        "chunk_count": count,
                    })
                ),
                OutputFormat::Plain => {
                    for name in &collections {
                        println!("{name}");
                    }
                    match count {
                        Some(n) => println!("{}: {n} chunks", gateway.collection()),
                        None => println!("{}: not ingested", gateway.collection()),
                    }
                }
            }
        }
    }

    Ok(())
}

fn print_report(format: &OutputFormat, collection: &str, report: &IngestReport) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(report)?),
        OutputFormat::Plain => match report {
            IngestReport::Created { chunk_count } => {
                println!("Ingested {chunk_count} chunks into '{collection}'")
            }
            IngestReport::AlreadyPresent => println!("Collection '{collection}' already exists"),
        },
    }
    Ok(())
}

fn print_answer(format: &OutputFormat, answer: &Answer) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(answer)?),
        OutputFormat::Plain => {
            println!("{}", answer.text);
            if !answer.sources.is_empty() {
                println!();
                println!("Sources: {}", answer.sources.join(", "));
            }
        }
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}
