//! StockDash Library
//!
//! Live data pipeline for a Taiwan market dashboard: proxy-scraped
//! TWII/WTX/VIX quotes, a rolling observation series, and a simulated
//! fallback that keeps the series moving when every network path fails.

pub mod config;
pub mod engine;
pub mod feed;
pub mod series;
pub mod simulate;
pub mod types;
