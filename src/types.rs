//! Core types used throughout StockDash
//!
//! Defines the rolling-series row, the transient live-quote result, and the
//! fixed set of scraped symbols.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Symbols scraped on each acquisition cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    /// Taiwan weighted index (spot)
    Twii,
    /// Taiwan index futures
    Wtx,
    /// Volatility index
    Vix,
}

impl Symbol {
    pub const ALL: [Symbol; 3] = [Symbol::Twii, Symbol::Wtx, Symbol::Vix];

    /// Quote page for this symbol
    pub fn quote_url(&self) -> &'static str {
        match self {
            Symbol::Twii => "https://tw.stock.yahoo.com/quote/%5ETWII",
            Symbol::Wtx => "https://tw.stock.yahoo.com/future/WTX&",
            Symbol::Vix => "https://tw.stock.yahoo.com/quote/%5EVIX",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Twii => write!(f, "TWII"),
            Symbol::Wtx => write!(f, "WTX"),
            Symbol::Vix => write!(f, "VIX"),
        }
    }
}

/// One committed row of the rolling market series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketObservation {
    /// Short month/day label, unique within the series
    pub date: String,
    /// Weighted index last price
    pub twii: f64,
    /// Index futures last price
    pub wtx: f64,
    /// Volatility index
    pub vix: f64,
    /// Margin balance (hundred million TWD); no live feed, carried forward
    pub margin: f64,
    /// Short interest (contracts); no live feed, carried forward
    pub short: f64,
}

impl MarketObservation {
    /// Futures-minus-spot basis shown on the dashboard
    pub fn spread(&self) -> f64 {
        self.wtx - self.twii
    }
}

/// Transient result of one live acquisition cycle; consumed immediately by
/// the merge step, never persisted
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LiveQuotes {
    pub twii: Option<f64>,
    pub wtx: Option<f64>,
    pub vix: Option<f64>,
}

impl LiveQuotes {
    /// True when at least one of the primary symbols (TWII, WTX) resolved
    pub fn has_primary(&self) -> bool {
        self.twii.is_some() || self.wtx.is_some()
    }
}
