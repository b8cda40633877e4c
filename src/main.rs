//! StockDash feed daemon
//!
//! Scrapes live TWII/WTX/VIX quotes through CORS relays on a fixed cadence
//! and keeps an in-memory rolling series fresh, degrading to simulated
//! quotes when the network is unreachable.

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use stockdash::config::AppConfig;
use stockdash::engine::{RefreshEngine, RefreshEvent, RefreshTrigger};
use stockdash::feed::ProxyClient;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    info!(config = %config.digest(), "🚀 StockDash feed starting");

    let fetcher = ProxyClient::new(&config.fetch).context("Failed to build proxy client")?;
    let (tx, mut rx) = mpsc::channel::<RefreshEvent>(32);
    let mut engine = RefreshEngine::new(fetcher, config).with_events(tx);

    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match &event {
                RefreshEvent::Updated {
                    observation,
                    outcome,
                } => {
                    info!(
                        date = %observation.date,
                        twii = observation.twii,
                        wtx = observation.wtx,
                        vix = observation.vix,
                        spread = observation.spread(),
                        outcome = ?outcome,
                        "📈 Series updated"
                    );
                }
                other => info!(status = other.status_line(), "Refresh phase"),
            }
        }
    });

    // Startup fetch counts as user-initiated: it seeds today's row and may
    // clear a sticky simulation left over from a previous failure.
    engine.refresh(RefreshTrigger::Manual).await;

    tokio::select! {
        _ = engine.run_auto_refresh() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, stopping feed");
        }
    }

    Ok(())
}
