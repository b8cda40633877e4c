//! Rolling market series: seed data and the merge policy
//!
//! The series is non-empty from construction, ordered by date ascending,
//! and only ever grows by one row per calendar day. Intraday refreshes
//! overwrite the "today" row in place instead of appending duplicates.

use chrono::{DateTime, Local};

use crate::types::{LiveQuotes, MarketObservation};

/// Day label used as the series key, e.g. "12/16"
pub fn today_label(now: DateTime<Local>) -> String {
    now.format("%m/%d").to_string()
}

/// Rolling, date-ascending series of market observations
#[derive(Debug, Clone)]
pub struct MarketSeries {
    rows: Vec<MarketObservation>,
}

impl MarketSeries {
    /// Start from the fixed historical seed dataset
    pub fn seeded() -> Self {
        Self { rows: seed_rows() }
    }

    /// Build from explicit rows; the series must never be empty
    pub fn from_rows(rows: Vec<MarketObservation>) -> Self {
        debug_assert!(!rows.is_empty(), "market series must be non-empty");
        Self { rows }
    }

    pub fn rows(&self) -> &[MarketObservation] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Latest committed observation
    pub fn last(&self) -> &MarketObservation {
        self.rows.last().expect("series is never empty")
    }

    /// Commit one observation: replace the last row when the day label
    /// matches, otherwise append. Never inserts out of order.
    pub fn commit(&mut self, obs: MarketObservation) {
        if self.last().date == obs.date {
            let last = self.rows.len() - 1;
            self.rows[last] = obs;
        } else {
            self.rows.push(obs);
        }
    }

    /// Merge one live result for `today`. Live values win when present and
    /// non-zero, otherwise the prior row's value carries forward. Margin and
    /// short interest have no live feed and always carry forward. Returns
    /// the committed observation.
    pub fn merge_live(&mut self, quotes: &LiveQuotes, today: &str) -> MarketObservation {
        let last = self.last();
        let obs = MarketObservation {
            date: today.to_string(),
            twii: pick(quotes.twii, last.twii),
            wtx: pick(quotes.wtx, last.wtx),
            vix: pick(quotes.vix, last.vix),
            margin: last.margin,
            short: last.short,
        };
        self.commit(obs.clone());
        obs
    }
}

/// Live value when present, finite and non-zero, else the committed fallback
fn pick(live: Option<f64>, fallback: f64) -> f64 {
    match live {
        Some(v) if v != 0.0 && v.is_finite() => v,
        _ => fallback,
    }
}

fn row(date: &str, twii: f64, wtx: f64, vix: f64, margin: f64, short: f64) -> MarketObservation {
    MarketObservation {
        date: date.to_string(),
        twii,
        wtx,
        vix,
        margin,
        short,
    }
}

/// Fixed 12-row historical seed carried over from the static dashboard
/// dataset
fn seed_rows() -> Vec<MarketObservation> {
    vec![
        row("12/01", 27342.53, 27380.00, 14.80, 3193.60, 301654.0),
        row("12/02", 27564.27, 27600.00, 14.50, 3197.37, 305582.0),
        row("12/03", 27793.04, 27820.00, 14.20, 3214.25, 302856.0),
        row("12/04", 27795.71, 27805.00, 14.10, 3228.26, 299991.0),
        row("12/05", 27980.89, 28020.00, 14.30, 3229.17, 303648.0),
        row("12/08", 28303.78, 28350.00, 14.60, 3247.39, 310486.0),
        row("12/09", 28182.60, 28200.00, 14.90, 3268.84, 313708.0),
        row("12/10", 28400.73, 28450.00, 15.20, 3276.95, 303179.0),
        row("12/11", 28024.75, 28050.00, 15.80, 3266.72, 307829.0),
        row("12/12", 28198.02, 28240.00, 15.70, 3293.50, 307405.0),
        row("12/15", 27866.94, 27910.00, 16.20, 3318.59, 304195.0),
        row("12/16", 27536.66, 27624.00, 16.50, 3325.10, 302500.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_is_twelve_rows_date_ascending() {
        let series = MarketSeries::seeded();
        assert_eq!(series.len(), 12);
        assert_eq!(series.rows()[0].date, "12/01");
        assert_eq!(series.last().date, "12/16");
        for pair in series.rows().windows(2) {
            assert!(pair[0].date < pair[1].date);
        }
    }

    #[test]
    fn merge_new_day_appends_exactly_one_row() {
        let mut series = MarketSeries::seeded();
        let before = series.len();
        series.merge_live(
            &LiveQuotes {
                twii: Some(27600.0),
                wtx: Some(27700.0),
                vix: Some(16.8),
            },
            "12/17",
        );
        assert_eq!(series.len(), before + 1);
    }

    #[test]
    fn merge_same_day_is_idempotent_on_length() {
        let mut series = MarketSeries::seeded();
        let quotes = LiveQuotes {
            twii: Some(27600.0),
            wtx: Some(27700.0),
            vix: Some(16.8),
        };
        series.merge_live(&quotes, "12/17");
        let len_after_first = series.len();

        let updated = LiveQuotes {
            twii: Some(27650.0),
            ..quotes
        };
        series.merge_live(&updated, "12/17");
        assert_eq!(series.len(), len_after_first);
        assert_eq!(series.last().twii, 27650.0);
    }

    #[test]
    fn missing_vix_carries_previous_value_forward() {
        let mut series = MarketSeries::seeded();
        let prior_vix = series.last().vix;
        let obs = series.merge_live(
            &LiveQuotes {
                twii: Some(27600.0),
                wtx: Some(27700.0),
                vix: None,
            },
            "12/17",
        );
        assert_eq!(obs.vix, prior_vix);
    }

    #[test]
    fn zero_extraction_sentinel_falls_back_like_missing() {
        let mut series = MarketSeries::seeded();
        let prior = series.last().clone();
        let obs = series.merge_live(
            &LiveQuotes {
                twii: Some(0.0),
                wtx: Some(27700.0),
                vix: Some(16.8),
            },
            "12/17",
        );
        assert_eq!(obs.twii, prior.twii);
        assert_eq!(obs.wtx, 27700.0);
    }

    #[test]
    fn margin_and_short_always_carry_forward() {
        let mut series = MarketSeries::seeded();
        let prior = series.last().clone();
        let obs = series.merge_live(
            &LiveQuotes {
                twii: Some(27600.0),
                wtx: Some(27700.0),
                vix: Some(16.8),
            },
            "12/17",
        );
        assert_eq!(obs.margin, prior.margin);
        assert_eq!(obs.short, prior.short);
    }

    #[test]
    fn merged_row_matches_worked_example() {
        // Seed last row is 12/16: twii 27536.66, wtx 27624.00, vix 16.50,
        // margin 3325.10, short 302500.
        let mut series = MarketSeries::seeded();
        let obs = series.merge_live(
            &LiveQuotes {
                twii: Some(27600.0),
                wtx: None,
                vix: Some(16.8),
            },
            "12/17",
        );
        assert_eq!(obs.date, "12/17");
        assert_eq!(obs.twii, 27600.0);
        assert_eq!(obs.wtx, 27624.00);
        assert_eq!(obs.vix, 16.8);
        assert_eq!(obs.margin, 3325.10);
        assert_eq!(obs.short, 302500.0);
    }

    #[test]
    fn committed_rows_are_never_nan() {
        let mut series = MarketSeries::from_rows(vec![row(
            "12/16", 27536.66, 27624.00, 16.50, 3325.10, 302500.0,
        )]);
        assert!(!series.is_empty());
        let obs = series.merge_live(
            &LiveQuotes {
                twii: Some(f64::NAN),
                wtx: Some(27700.0),
                vix: None,
            },
            "12/17",
        );
        assert!(obs.twii.is_finite());
        assert!(obs.vix.is_finite());
    }

    #[test]
    fn today_label_is_zero_padded_month_day() {
        let date = chrono::NaiveDate::from_ymd_opt(2025, 12, 5)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
            .and_local_timezone(Local)
            .unwrap();
        assert_eq!(today_label(date), "12/05");
    }
}
