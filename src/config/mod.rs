//! Configuration management for StockDash
//!
//! Defaults + optional YAML files + environment variables via .env

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub fetch: FetchConfig,
    pub refresh: RefreshConfig,
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Hard deadline for a single proxied request in milliseconds
    pub timeout_ms: u64,
    /// Pause between proxy attempts in milliseconds
    pub proxy_backoff_ms: u64,
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn proxy_backoff(&self) -> Duration {
        Duration::from_millis(self.proxy_backoff_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshConfig {
    /// Automatic (silent) refresh period in seconds
    pub auto_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    /// Uniform perturbation bound for index/futures prices (fraction, ±)
    pub price_jitter_pct: f64,
    /// Uniform perturbation bound for the volatility index (fraction, ±)
    pub vix_jitter_pct: f64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 8_000,
            proxy_backoff_ms: 500,
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            auto_interval_secs: 60,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            price_jitter_pct: 0.0015,
            vix_jitter_pct: 0.01,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            refresh: RefreshConfig::default(),
            simulation: SimulationConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, optional YAML files, and
    /// STOCKDASH__-prefixed environment variables
    pub fn load() -> Result<Self> {
        let config = Config::builder()
            // Fetch defaults
            .set_default("fetch.timeout_ms", 8_000)?
            .set_default("fetch.proxy_backoff_ms", 500)?
            // Refresh defaults
            .set_default("refresh.auto_interval_secs", 60)?
            // Simulation defaults
            .set_default("simulation.price_jitter_pct", 0.0015)?
            .set_default("simulation.vix_jitter_pct", 0.01)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // Override with environment variables (STOCKDASH_*)
            .add_source(Environment::with_prefix("STOCKDASH").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        let app_config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        Ok(app_config)
    }

    /// Generate a one-line digest of the config for startup logging
    pub fn digest(&self) -> String {
        format!(
            "timeout_ms={} backoff_ms={} auto_secs={} jitter_px={:.4} jitter_vix={:.4}",
            self.fetch.timeout_ms,
            self.fetch.proxy_backoff_ms,
            self.refresh.auto_interval_secs,
            self.simulation.price_jitter_pct,
            self.simulation.vix_jitter_pct,
        )
    }
}

impl std::fmt::Display for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.digest())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.fetch.timeout(), Duration::from_secs(8));
        assert_eq!(cfg.fetch.proxy_backoff(), Duration::from_millis(500));
        assert_eq!(cfg.refresh.auto_interval_secs, 60);
        assert!((cfg.simulation.price_jitter_pct - 0.0015).abs() < 1e-12);
        assert!((cfg.simulation.vix_jitter_pct - 0.01).abs() < 1e-12);
    }

    #[test]
    fn digest_mentions_every_section() {
        let digest = AppConfig::default().digest();
        assert!(digest.contains("timeout_ms=8000"));
        assert!(digest.contains("auto_secs=60"));
        assert!(digest.contains("jitter_px=0.0015"));
    }
}
