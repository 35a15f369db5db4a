use std::sync::Arc;
use stockdesk::config::Config;
use stockdesk::services::{seed_if_empty, SeedOutcome, SqliteStore};
use stockdesk::AppState;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stockdesk=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Arc::new(Config::from_env());
    info!("Starting Stockdesk server on {}", config.bind_address());

    let store = Arc::new(SqliteStore::new(&config.database_path)?);

    // Seed an empty database before accepting requests
    match seed_if_empty(store.as_ref(), &config.seed_path) {
        Ok(SeedOutcome::Skipped { existing }) => {
            info!(existing, "Market data already present");
        }
        Ok(SeedOutcome::Loaded(report)) => {
            if report.failed() > 0 {
                warn!(
                    "Seeded {} records, {} rows failed",
                    report.inserted(),
                    report.failed()
                );
            } else {
                info!("Seeded {} records", report.inserted());
            }
        }
        Err(e) => error!("Error checking table data: {}", e),
    }

    let state = AppState {
        config: config.clone(),
        store: store.clone(),
    };
    let app = stockdesk::app(state);

    // Start the server
    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Stockdesk server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    drop(store);
    info!("Database connection closed");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
