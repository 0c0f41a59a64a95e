//! asmdoc worker binary.
//!
//! Loads a recorded program snapshot, wires the documentation pipeline and
//! runs one full pass, then idles until Ctrl+C.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::sync::watch;
use tracing::info;

use asmdoc::agents::{AnalysisAgent, DocumentationAgent};
use asmdoc::catalog::CatalogBuilder;
use asmdoc::config::AppConfig;
use asmdoc::llm::create_chat_client;
use asmdoc::pipeline::{DispatchPipeline, NormalizeClassHandler};
use asmdoc::reconstruct::SourceReconstructor;
use asmdoc::sink::MemoryDocStore;
use asmdoc::snapshot::ProgramSnapshot;
use asmdoc::templates::PromptEngine;
use asmdoc::worker::Worker;

/// Documents a compiled program image through an LLM completion service.
#[derive(Parser, Debug)]
#[command(name = "asmdoc", version, about)]
struct Args {
    /// Path to a recorded program snapshot (JSON).
    image: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let config = AppConfig::from_env().context("loading configuration")?;

    let snapshot = ProgramSnapshot::load(&args.image)
        .with_context(|| format!("loading program snapshot {}", args.image.display()))?;
    let (image, backend) = snapshot.into_parts();
    info!(program = image.root_namespace(), "program image loaded");

    // Template registration is fail-fast: a broken asset stops startup.
    let engine = Arc::new(PromptEngine::new().context("registering prompt templates")?);

    let client = create_chat_client(&config);
    info!(
        provider = client.provider_name(),
        model = client.model_name(),
        "completion client ready"
    );

    let sink = Arc::new(MemoryDocStore::new());
    let pipeline = DispatchPipeline::new(Box::new(NormalizeClassHandler))
        .subscribe(Box::new(DocumentationAgent::new(
            engine.clone(),
            client.clone(),
            sink.clone(),
            config.max_rounds,
        )))
        .subscribe(Box::new(AnalysisAgent::new(
            engine,
            client,
            sink.clone(),
            config.max_rounds,
        )));

    let catalog = CatalogBuilder::new(image, SourceReconstructor::new(backend));
    let worker = Worker::new(catalog, pipeline);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(true);
        }
    });

    let summary = worker.run(shutdown_rx).await?;
    info!(
        processed = summary.processed,
        failed = summary.failed,
        records = sink.len().await,
        "documentation records produced"
    );

    Ok(())
}
