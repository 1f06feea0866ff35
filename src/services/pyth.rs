/// Pyth Hermes price feed client
///
/// Latest prices come from `/v2/updates/price/latest`; live updates come from
/// the server-sent event stream at `/v2/updates/price/stream`.

use crate::config::ServiceConfig;
use crate::services::{PriceOracle, ServiceError};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::{sync::mpsc, task::JoinHandle};

/// ETH/USD feed, preselected on new oracle nodes
pub const ETH_USD_FEED_ID: &str =
    "0xff61491a931112ddf1bd8147cd1b641375f79f5825126d665480874634fd0ace";

/// Scaled price with its confidence interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub feed_id: String,
    pub price: f64,
    pub confidence: f64,
    pub ema_price: Option<f64>,
    pub ema_confidence: Option<f64>,
    pub publish_time: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct HermesUpdate {
    #[serde(default)]
    parsed: Vec<ParsedFeed>,
}

#[derive(Debug, Deserialize)]
struct ParsedFeed {
    id: String,
    price: RawPrice,
    ema_price: Option<RawPrice>,
}

/// Mantissa strings with a decimal exponent, as Hermes sends them
#[derive(Debug, Deserialize)]
struct RawPrice {
    price: String,
    conf: String,
    expo: i32,
    publish_time: i64,
}

impl RawPrice {
    fn scaled(&self) -> Result<(f64, f64), ServiceError> {
        let factor = 10f64.powi(self.expo);
        let price: f64 = self
            .price
            .parse()
            .map_err(|_| ServiceError::Decode(format!("bad price mantissa '{}'", self.price)))?;
        let conf: f64 = self
            .conf
            .parse()
            .map_err(|_| ServiceError::Decode(format!("bad confidence '{}'", self.conf)))?;
        Ok((price * factor, conf * factor))
    }
}

impl ParsedFeed {
    fn into_quote(self) -> Result<PriceQuote, ServiceError> {
        let (price, confidence) = self.price.scaled()?;
        let ema = self.ema_price.as_ref().map(RawPrice::scaled).transpose()?;
        let publish_time = Utc
            .timestamp_opt(self.price.publish_time, 0)
            .single()
            .ok_or_else(|| ServiceError::Decode("publish_time out of range".to_string()))?;

        Ok(PriceQuote {
            feed_id: self.id,
            price,
            confidence,
            ema_price: ema.map(|(p, _)| p),
            ema_confidence: ema.map(|(_, c)| c),
            publish_time,
        })
    }
}

fn first_quote(body: &str) -> Result<Option<PriceQuote>, ServiceError> {
    let update: HermesUpdate =
        serde_json::from_str(body).map_err(|e| ServiceError::Decode(e.to_string()))?;
    update.parsed.into_iter().next().map(ParsedFeed::into_quote).transpose()
}

/// Splits a byte stream into SSE `data:` payloads
#[derive(Debug, Default)]
struct SseBuffer {
    pending: Vec<u8>,
}

impl SseBuffer {
    fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);
        let mut payloads = Vec::new();
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(['\n', '\r']);
            if let Some(data) = line.strip_prefix("data:") {
                payloads.push(data.trim_start().to_string());
            }
        }
        payloads
    }
}

/// Live quote stream; the background reader stops when this is dropped
#[derive(Debug)]
pub struct PriceSubscription {
    rx: mpsc::Receiver<PriceQuote>,
    task: JoinHandle<()>,
}

impl PriceSubscription {
    /// Next quote, or `None` once the stream has ended
    pub async fn next(&mut self) -> Option<PriceQuote> {
        self.rx.recv().await
    }
}

impl Drop for PriceSubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[derive(Debug, Clone)]
pub struct HermesClient {
    http: reqwest::Client,
    base_url: String,
}

impl HermesClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder().connect_timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Client against the configured Hermes endpoint and timeout
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ServiceError> {
        Self::new(config.hermes_url.as_str(), config.http_timeout())
    }

    fn url(&self, path: &str, feed_id: &str) -> String {
        format!("{}{}?ids[]={}", self.base_url, path, feed_id)
    }
}

#[async_trait]
impl PriceOracle for HermesClient {
    async fn latest_price(&self, feed_id: &str) -> Result<PriceQuote, ServiceError> {
        let body = self
            .http
            .get(self.url("/v2/updates/price/latest", feed_id))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        first_quote(&body)?
            .ok_or_else(|| ServiceError::Decode(format!("no price for feed {}", feed_id)))
    }

    async fn subscribe(&self, feed_id: &str) -> Result<PriceSubscription, ServiceError> {
        let mut response = self
            .http
            .get(self.url("/v2/updates/price/stream", feed_id))
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await?
            .error_for_status()?;

        let (tx, rx) = mpsc::channel(16);
        let feed = feed_id.to_string();
        let task = tokio::spawn(async move {
            let mut buffer = SseBuffer::default();
            loop {
                let chunk = match response.chunk().await {
                    Ok(Some(chunk)) => chunk,
                    Ok(None) => break,
                    Err(e) => {
                        tracing::warn!("⚠️ Price stream for {} failed: {}", feed, e);
                        break;
                    }
                };
                for payload in buffer.push(&chunk) {
                    match first_quote(&payload) {
                        Ok(Some(quote)) => {
                            if tx.send(quote).await.is_err() {
                                return;
                            }
                        }
                        Ok(None) => {}
                        Err(e) => tracing::debug!("Skipping price update: {}", e),
                    }
                }
            }
            tracing::info!("Price stream for {} closed", feed);
        });

        Ok(PriceSubscription { rx, task })
    }
}
