//! Acquisition-cycle engine
//!
//! Drives refreshes through the Idle → Fetching → {success, degraded,
//! simulating} cycle, owns the rolling series and the sticky simulation
//! flag as explicit state, and emits typed phase events for whatever
//! presentation layer is attached.

use chrono::{DateTime, Local};
use std::time::Duration;
use tokio::sync::mpsc::Sender;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::feed::{self, PageFetcher};
use crate::series::{today_label, MarketSeries};
use crate::simulate;
use crate::types::MarketObservation;

/// What started a refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    /// User-initiated; always attempts a live fetch and clears simulation
    /// stickiness on success
    Manual,
    /// Timer-initiated; stays on the simulator while simulation is sticky
    Auto,
}

/// How a refresh resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// All three symbols resolved live
    Live,
    /// Primary signal live, at least one field carried forward
    Degraded,
    /// Live acquisition skipped or failed; synthetic row committed
    Simulated,
}

/// Phase events consumed by the presentation layer
#[derive(Debug, Clone)]
pub enum RefreshEvent {
    /// Live fetch started
    Connecting,
    /// Quotes received, merging into the series
    Integrating,
    /// A row was committed
    Updated {
        observation: MarketObservation,
        outcome: RefreshOutcome,
    },
    /// Live acquisition failed entirely; entering simulation mode
    SimulationFallback,
}

impl RefreshEvent {
    /// Human-readable status line for the dashboard header
    pub fn status_line(&self) -> &'static str {
        match self {
            RefreshEvent::Connecting => "connecting to proxy relays...",
            RefreshEvent::Integrating => "integrating market data...",
            RefreshEvent::Updated {
                outcome: RefreshOutcome::Simulated,
                ..
            } => "network restricted, showing simulated data",
            RefreshEvent::Updated { .. } => "update successful",
            RefreshEvent::SimulationFallback => "network restricted, showing simulated data",
        }
    }
}

/// Owns the rolling series and the acquisition-cycle state machine.
///
/// Triggers are serialized through the single owner of this engine
/// (`&mut self`), so refresh cycles can never overlap.
pub struct RefreshEngine<F: PageFetcher> {
    fetcher: F,
    config: AppConfig,
    series: MarketSeries,
    simulating: bool,
    last_updated: Option<DateTime<Local>>,
    events: Option<Sender<RefreshEvent>>,
}

impl<F: PageFetcher> RefreshEngine<F> {
    pub fn new(fetcher: F, config: AppConfig) -> Self {
        Self {
            fetcher,
            config,
            series: MarketSeries::seeded(),
            simulating: false,
            last_updated: None,
            events: None,
        }
    }

    /// Attach a phase-event channel
    pub fn with_events(mut self, tx: Sender<RefreshEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn series(&self) -> &MarketSeries {
        &self.series
    }

    /// True while the sticky simulation flag is set
    pub fn is_simulating(&self) -> bool {
        self.simulating
    }

    pub fn last_updated(&self) -> Option<DateTime<Local>> {
        self.last_updated
    }

    /// Run one acquisition cycle and commit exactly one row.
    pub async fn refresh(&mut self, trigger: RefreshTrigger) -> RefreshOutcome {
        let today = today_label(Local::now());

        // Sticky simulation: automatic refreshes skip the network entirely
        // until a manual refresh succeeds.
        if self.simulating && trigger == RefreshTrigger::Auto {
            return self.commit_simulated(&today).await;
        }

        self.emit(RefreshEvent::Connecting).await;

        match feed::fetch_live_quotes(&self.fetcher).await {
            Ok(quotes) => {
                self.emit(RefreshEvent::Integrating).await;

                let outcome = if quotes.twii.is_some() && quotes.wtx.is_some() && quotes.vix.is_some()
                {
                    RefreshOutcome::Live
                } else {
                    RefreshOutcome::Degraded
                };

                let observation = self.series.merge_live(&quotes, &today);
                self.simulating = false;
                self.last_updated = Some(Local::now());

                info!(
                    date = %observation.date,
                    twii = observation.twii,
                    wtx = observation.wtx,
                    vix = observation.vix,
                    outcome = ?outcome,
                    "✅ Committed live observation"
                );
                self.emit(RefreshEvent::Updated {
                    observation,
                    outcome,
                })
                .await;

                outcome
            }
            Err(e) => {
                warn!(
                    error = %e,
                    trigger = ?trigger,
                    "Live acquisition failed, falling back to simulation"
                );
                self.emit(RefreshEvent::SimulationFallback).await;
                self.simulating = true;
                self.commit_simulated(&today).await
            }
        }
    }

    /// Recurring silent refresh at the configured period. Runs until the
    /// owning task is cancelled; pair it with a shutdown select in `main`.
    pub async fn run_auto_refresh(&mut self) {
        let period = Duration::from_secs(self.config.refresh.auto_interval_secs);
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately; the initial fetch is the
        // caller's manual refresh, not ours.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            self.refresh(RefreshTrigger::Auto).await;
        }
    }

    async fn commit_simulated(&mut self, today: &str) -> RefreshOutcome {
        let observation =
            simulate::next_observation(self.series.last(), today, &self.config.simulation);
        self.series.commit(observation.clone());
        self.last_updated = Some(Local::now());

        info!(
            date = %observation.date,
            twii = observation.twii,
            wtx = observation.wtx,
            "🎲 Committed simulated observation"
        );
        self.emit(RefreshEvent::Updated {
            observation,
            outcome: RefreshOutcome::Simulated,
        })
        .await;

        RefreshOutcome::Simulated
    }

    async fn emit(&self, event: RefreshEvent) {
        if let Some(tx) = &self.events {
            // A detached or saturated consumer never blocks acquisition
            let _ = tx.try_send(event);
        }
    }
}
