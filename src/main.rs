//! Themis server entry point
//!
//! Loads configuration, selects the scorer and retriever backends once for
//! the process lifetime, and launches the HTTP API.

use clap::{Parser, Subcommand};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use themis_core::{
    embeddings::LocalEmbeddingService,
    retrieval::{self, Retriever, StubRetriever, VectorRetriever},
    scoring::{ModelScorer, ModelScorerConfig, Scorer, StubScorer},
    ApiServer, ApiServerConfig, Evaluator, ScorerProvider, ThemisConfig,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "themis", version, about = "Project-evaluation scoring service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP API server
    Serve {
        /// Bind host
        #[arg(long, env = "THEMIS_HOST")]
        host: Option<String>,

        /// Bind port
        #[arg(long, env = "THEMIS_PORT")]
        port: Option<u16>,

        /// Path to a TOML config file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Knowledge corpus directory (overrides config)
        #[arg(long, env = "THEMIS_KNOWLEDGE_DIR")]
        knowledge_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("themis=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve {
        host: None,
        port: None,
        config: None,
        knowledge_dir: None,
    }) {
        Command::Serve {
            host,
            port,
            config,
            knowledge_dir,
        } => {
            let mut cfg = ThemisConfig::load(config.as_deref())?;

            if let Some(host) = host {
                cfg.server.host = host;
            }
            if let Some(port) = port {
                cfg.server.port = port;
            }
            if let Some(dir) = knowledge_dir {
                cfg.knowledge.dir = Some(dir);
            }

            serve(cfg).await
        }
    }
}

async fn serve(cfg: ThemisConfig) -> anyhow::Result<()> {
    let scorer = build_scorer(&cfg)?;
    let retriever = build_retriever(&cfg).await?;

    info!(
        "Backends selected: scorer={}, retriever={}",
        scorer.kind(),
        retriever.kind()
    );

    let evaluator = Arc::new(Evaluator::new(scorer, retriever, cfg.knowledge.top_k));

    let ip: IpAddr = cfg.server.host.parse()?;
    let addr = SocketAddr::new(ip, cfg.server.port);

    ApiServer::new(ApiServerConfig { addr }, evaluator)
        .serve()
        .await
}

/// Select the scorer backend for the process lifetime
fn build_scorer(cfg: &ThemisConfig) -> anyhow::Result<Arc<dyn Scorer>> {
    Ok(match cfg.scorer.provider {
        ScorerProvider::Stub => Arc::new(StubScorer::new()),
        ScorerProvider::Model => {
            let config = ModelScorerConfig::from_settings(&cfg.scorer)?;
            Arc::new(ModelScorer::new(config)?)
        }
    })
}

/// Select the retriever backend: vector-backed when the knowledge directory
/// holds documents, otherwise the trivial stub
async fn build_retriever(cfg: &ThemisConfig) -> anyhow::Result<Arc<dyn Retriever>> {
    let Some(dir) = cfg.knowledge.dir.as_deref() else {
        info!("No knowledge directory configured, using stub retriever");
        return Ok(Arc::new(StubRetriever::new()));
    };

    let docs = retrieval::vector::load_knowledge_dir(dir)?;
    if docs.is_empty() {
        info!(
            "No knowledge documents found in {:?}, using stub retriever",
            dir
        );
        return Ok(Arc::new(StubRetriever::new()));
    }

    info!("Embedding {} knowledge documents from {:?}", docs.len(), dir);
    let embedder = Arc::new(LocalEmbeddingService::new(cfg.embedding.clone()).await?);
    Ok(Arc::new(VectorRetriever::new(docs, embedder).await?))
}
