use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use std::sync::Arc;

use maru::api::{create_router, AppState};
use maru::config::Config;
use maru::db::{Database, DatabaseBackend, LibSqlBackend, SessionStore};
use maru::embeddings::EmbeddingProvider;
use maru::llm::LlmProvider;
use maru::vector::VectorSearchProvider;

/// Expired session sweep cadence.
const SESSION_PURGE_INTERVAL_SECS: u64 = 3600;

#[derive(Parser)]
#[command(name = "maru")]
#[command(about = "Open-source, self-hostable AI travel assistant")]
struct Args {
    /// Validate configuration and exit without starting the server
    #[arg(long)]
    config_check: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "maru=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    if args.config_check {
        tracing::info!("Configuration OK");
        tracing::info!("  server:      {}:{}", config.server.host, config.server.port);
        tracing::info!("  database:    {}", config.database.url);
        tracing::info!("  embeddings:  {}", config.embeddings.model);
        tracing::info!(
            "  vector:      {} ({}, {}, {})",
            config.vector.url,
            config.vector.festival_collection,
            config.vector.attraction_collection,
            config.vector.restaurant_collection
        );
        match &config.llm {
            Some(llm) => tracing::info!("  llm:         {}", llm.model),
            None => tracing::info!("  llm:         not configured"),
        }
        return Ok(());
    }

    tracing::info!("Initializing database...");
    let raw_db = Database::new(&config.database).await?;
    let db: Arc<dyn DatabaseBackend> = Arc::new(LibSqlBackend::new(raw_db));

    tracing::info!("Loading embedding model: {}...", config.embeddings.model);
    let embeddings = EmbeddingProvider::new(&config.embeddings)?;

    tracing::info!("Connecting vector search at {}...", config.vector.url);
    let vector = VectorSearchProvider::new(&config.vector)?;

    if let Some(llm_config) = &config.llm {
        tracing::info!("Initializing LLM provider: {}...", llm_config.model);
    }
    let llm = LlmProvider::new(config.llm.as_ref());
    if !llm.is_available() {
        tracing::warn!("LLM unavailable - chat answers cannot be generated");
    }

    let state = AppState::new(config.clone(), db, embeddings, vector, llm);

    let cancel_token = CancellationToken::new();

    tracing::info!("Starting session purge task...");
    let purge_db = state.db.clone();
    let token = cancel_token.child_token();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::info!("Session purge task shutting down...");
                    break;
                }
                _ = tokio::time::sleep(tokio::time::Duration::from_secs(SESSION_PURGE_INTERVAL_SECS)) => {
                    match purge_db.purge_expired_sessions().await {
                        Ok(0) => {}
                        Ok(removed) => tracing::info!(removed, "purged expired sessions"),
                        Err(e) => tracing::error!("Session purge error: {}", e),
                    }
                }
            }
        }
    });

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Maru starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/api/v1/health", addr);
    tracing::info!("  API docs:     http://{}/api/v1/docs", addr);
    tracing::info!("  OpenAPI spec: http://{}/api/v1/openapi.json", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel_token))
        .await?;

    Ok(())
}

async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, cancelling background tasks...");
    cancel_token.cancel();
}
