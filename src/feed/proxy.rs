//! Proxy rotation with a hard per-request deadline
//!
//! Quote pages sit behind CORS relays; each relay is tried in fixed list
//! order with a short backoff between attempts. Rotation is sequential on
//! purpose so we never hammer several third-party relays at once for the
//! same page.

use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use crate::config::FetchConfig;
use crate::feed::{FetchError, PageFetcher};

/// How a proxy wraps the upstream body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyKind {
    /// JSON envelope with the page inside a `contents` string field
    JsonEnvelope,
    /// Body is the upstream page verbatim
    RawText,
}

/// One relay in the rotation; list order is the try order
#[derive(Debug, Clone)]
pub struct ProxyEndpoint {
    pub name: &'static str,
    pub kind: ProxyKind,
    prefix: &'static str,
}

impl ProxyEndpoint {
    /// The fixed rotation, defined once at startup
    pub fn defaults() -> Vec<ProxyEndpoint> {
        vec![
            ProxyEndpoint {
                name: "allorigins",
                kind: ProxyKind::JsonEnvelope,
                prefix: "https://api.allorigins.win/get?url=",
            },
            ProxyEndpoint {
                name: "corsproxy",
                kind: ProxyKind::RawText,
                prefix: "https://corsproxy.io/?",
            },
        ]
    }

    /// Build the relay URL for a target page
    pub fn proxied_url(&self, target: &str) -> String {
        format!("{}{}", self.prefix, encode_component(target))
    }
}

/// Status and body of one relay response
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub body: String,
}

/// One deadline-bounded GET; retry policy lives in the rotation above
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str, deadline: Duration) -> Result<TransportResponse, FetchError>;
}

/// Production transport over a shared reqwest client
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> anyhow::Result<Self> {
        use anyhow::Context;

        let client = reqwest::Client::builder()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, deadline: Duration) -> Result<TransportResponse, FetchError> {
        // One cancellation timer covers the whole exchange, headers and body.
        // Expiry drops the in-flight request.
        let exchange = async {
            let response = self.client.get(url).send().await?;
            let status = response.status();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>(TransportResponse { status, body })
        };

        match timeout(deadline, exchange).await {
            Ok(result) => result.map_err(FetchError::from),
            Err(_) => Err(FetchError::Timeout(deadline.as_millis() as u64)),
        }
    }
}

/// Tries each relay in order until one yields usable page content
pub struct ProxyClient<T: Transport = HttpTransport> {
    transport: T,
    proxies: Vec<ProxyEndpoint>,
    deadline: Duration,
    backoff: Duration,
}

impl ProxyClient<HttpTransport> {
    pub fn new(cfg: &FetchConfig) -> anyhow::Result<Self> {
        Ok(Self::with_transport(
            HttpTransport::new()?,
            ProxyEndpoint::defaults(),
            cfg,
        ))
    }
}

impl<T: Transport> ProxyClient<T> {
    pub fn with_transport(transport: T, proxies: Vec<ProxyEndpoint>, cfg: &FetchConfig) -> Self {
        Self {
            transport,
            proxies,
            deadline: cfg.timeout(),
            backoff: cfg.proxy_backoff(),
        }
    }

    /// Fetch one target page, rotating through the relay list. Surfaces the
    /// last per-proxy error when the rotation is exhausted.
    pub async fn fetch_html(&self, target_url: &str) -> Result<String, FetchError> {
        let mut last_error: Option<FetchError> = None;

        for (i, proxy) in self.proxies.iter().enumerate() {
            // Fixed pause after each failure before hitting the next relay
            if i > 0 {
                sleep(self.backoff).await;
            }

            match self.attempt(proxy, target_url).await {
                Ok(html) => {
                    debug!(proxy = proxy.name, target = target_url, "Proxy fetch succeeded");
                    return Ok(html);
                }
                Err(e) => {
                    warn!(
                        proxy = proxy.name,
                        target = target_url,
                        error = %e,
                        "Proxy attempt failed"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(FetchError::AllProxiesFailed(last_error.map(Box::new)))
    }

    async fn attempt(&self, proxy: &ProxyEndpoint, target_url: &str) -> Result<String, FetchError> {
        let url = proxy.proxied_url(target_url);
        let response = self.transport.get(&url, self.deadline).await?;

        if !response.status.is_success() {
            return Err(FetchError::ProxyHttp(response.status));
        }

        match proxy.kind {
            ProxyKind::JsonEnvelope => {
                let envelope: serde_json::Value =
                    serde_json::from_str(&response.body).map_err(|_| FetchError::ProxyShape)?;
                match envelope.get("contents").and_then(|v| v.as_str()) {
                    Some(contents) if !contents.is_empty() => Ok(contents.to_string()),
                    _ => Err(FetchError::ProxyShape),
                }
            }
            ProxyKind::RawText => Ok(response.body),
        }
    }
}

#[async_trait]
impl<T: Transport> PageFetcher for ProxyClient<T> {
    async fn fetch_html(&self, target_url: &str) -> Result<String, FetchError> {
        ProxyClient::fetch_html(self, target_url).await
    }
}

/// encodeURIComponent-style escaping for the target URL placed in the relay
/// query string
fn encode_component(input: &str) -> String {
    let mut out = String::with_capacity(input.len() * 3);
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
