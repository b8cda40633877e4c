//! Feed module - live quote acquisition over CORS relays
//!
//! Scrapes the TWII, WTX and VIX quote pages concurrently through a fixed
//! rotation of proxies and reduces them to a single [`LiveQuotes`] result.
//! Individual symbol failures never abort the siblings; the whole cycle
//! fails only when both primary symbols are unavailable.

mod extract;
mod proxy;

pub use extract::extract_price;
pub use proxy::{HttpTransport, ProxyClient, ProxyEndpoint, ProxyKind, Transport, TransportResponse};

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use crate::types::{LiveQuotes, Symbol};

/// Errors from the acquisition pipeline
#[derive(Debug, Error)]
pub enum FetchError {
    /// A single proxied request exceeded its deadline
    #[error("request timed out after {0}ms")]
    Timeout(u64),

    /// Non-success HTTP status from a proxy
    #[error("proxy returned HTTP {0}")]
    ProxyHttp(reqwest::StatusCode),

    /// JSON envelope missing the expected `contents` field
    #[error("proxy envelope missing `contents` field")]
    ProxyShape,

    /// Transport-level failure (DNS, TLS, connection reset, ...)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Every proxy in the rotation failed for one target
    #[error("all proxies failed")]
    AllProxiesFailed(#[source] Option<Box<FetchError>>),

    /// Both primary symbols unavailable; the cycle cannot produce a usable row
    #[error("index and futures quotes both unavailable")]
    InsufficientData,
}

/// Seam between the orchestrator and the proxy transport layer, so markup
/// and rotation logic can be exercised without a network
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the raw HTML of one quote page
    async fn fetch_html(&self, target_url: &str) -> Result<String, FetchError>;
}

/// Fetches all three symbols concurrently and applies the minimum-success
/// policy: TWII and WTX must not both be missing, VIX alone may degrade to
/// carry-forward in the merge step.
pub async fn fetch_live_quotes<F: PageFetcher>(fetcher: &F) -> Result<LiveQuotes, FetchError> {
    let (twii, wtx, vix) = tokio::join!(
        fetch_symbol(fetcher, Symbol::Twii),
        fetch_symbol(fetcher, Symbol::Wtx),
        fetch_symbol(fetcher, Symbol::Vix),
    );

    let quotes = LiveQuotes { twii, wtx, vix };
    if !quotes.has_primary() {
        return Err(FetchError::InsufficientData);
    }

    Ok(quotes)
}

/// One symbol's fetch + extract; failures collapse to None rather than
/// aborting the sibling fetches.
async fn fetch_symbol<F: PageFetcher>(fetcher: &F, symbol: Symbol) -> Option<f64> {
    let html = match fetcher.fetch_html(symbol.quote_url()).await {
        Ok(html) => html,
        Err(e) => {
            warn!(symbol = %symbol, error = %e, "Quote page fetch failed");
            return None;
        }
    };

    // 0.0 is the extractor's "not found" sentinel
    let price = extract::extract_price(&html);
    if price == 0.0 {
        warn!(symbol = %symbol, bytes = html.len(), "No price found in quote page");
        return None;
    }

    Some(price)
}
