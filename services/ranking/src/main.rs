use std::sync::Arc;

use anyhow::Context;
use ranking::backoff::Backoff;
use ranking::config::{ServiceConfig, SourceKind};
use ranking::ingestion::spawn_ingestion;
use ranking::router::create_router;
use ranking::source::LineSource;
use ranking::AppState;
use tokio::io::BufReader;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServiceConfig::from_env().context("loading configuration")?;
    tracing::info!(
        version = ranking::SERVICE_VERSION,
        source = %config.source,
        "Starting ranking service"
    );

    let state = AppState::new();
    let ingestion = start_ingestion(&config, &state)?;

    let app = create_router(state);

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;

    tracing::info!("Listening on {}", config.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    ingestion.abort();
    tracing::info!("Ranking service stopped");
    Ok(())
}

fn start_ingestion(config: &ServiceConfig, state: &AppState) -> anyhow::Result<JoinHandle<u64>> {
    let backoff = Backoff::new(config.backoff.clone());
    let store = Arc::clone(&state.store);
    let metrics = Arc::clone(&state.metrics);

    match config.source {
        SourceKind::Stdin => {
            let source = LineSource::new(BufReader::new(tokio::io::stdin()), "stdin");
            Ok(spawn_ingestion(source, backoff, store, metrics))
        }
        #[cfg(feature = "kafka")]
        SourceKind::Kafka => {
            let source = ranking::source::KafkaSource::connect(&config.kafka)
                .context("connecting to Kafka")?;
            Ok(spawn_ingestion(source, backoff, store, metrics))
        }
        #[cfg(not(feature = "kafka"))]
        SourceKind::Kafka => {
            anyhow::bail!("RANKING_SOURCE=kafka requires building with the `kafka` feature")
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
