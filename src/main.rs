use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::{mpsc, watch, RwLock};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sportsplex_matches::api::SportsPlexClient;
use sportsplex_matches::config::Config;
use sportsplex_matches::db::TransitionStore;
use sportsplex_matches::status::MatchBoard;
use sportsplex_matches::workers::{MatchPollerWorker, TransitionReporterWorker};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sportsplex_matches=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting sportsplex-matches");

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded (API: {})", config.api_url);

    // Initialize database
    let transition_store = Arc::new(TransitionStore::new(&config.database_url).await?);
    info!("Database initialized");

    // Initialize API client
    let client = SportsPlexClient::new(
        &config.api_url,
        config.api_token.clone(),
        Duration::from_secs(config.request_timeout),
    )
    .context("Failed to build SportsPlex client")?;
    info!("API client initialized");

    // Shared state
    let board: Arc<RwLock<MatchBoard>> = Arc::new(RwLock::new(MatchBoard::default()));

    // Channel for board updates
    let (update_tx, update_rx) = mpsc::channel(16);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Create workers
    let poller = MatchPollerWorker::new(
        client,
        Arc::clone(&board),
        update_tx,
        config.match_poll_interval,
        shutdown_rx,
    );

    let reporter = TransitionReporterWorker::new(Arc::clone(&transition_store), update_rx);

    // Spawn workers
    let mut poller_handle = tokio::spawn(poller.run());
    let reporter_handle = tokio::spawn(reporter.run());

    info!("All workers started");

    // Wait for shutdown signal
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
            let _ = shutdown_tx.send(true);
            if let Err(e) = (&mut poller_handle).await {
                error!("Match poller failed during shutdown: {:?}", e);
            }
        }
        result = &mut poller_handle => {
            error!("Match poller exited unexpectedly: {:?}", result);
        }
    }

    // Poller has dropped its sender, so the reporter drains and exits
    if let Err(e) = reporter_handle.await {
        error!("Transition reporter failed: {:?}", e);
    }

    match transition_store.get_transition_count().await {
        Ok(count) => info!("{} transitions recorded", count),
        Err(e) => error!("Failed to count transitions: {}", e),
    }

    info!("Shutting down sportsplex-matches");
    Ok(())
}
