/// External collaborators used by the editor
///
/// The editor never talks to a network directly; it goes through these traits.
/// Failures surface as `ServiceError` and are turned into notices by the
/// session, so a broken service never touches graph state.

// Telegram Bot API: credential verification and update polling
pub mod telegram;

// Pyth Hermes price feeds: snapshot fetch and streaming subscription
pub mod pyth;

// OFT contract calls carried by blockchain-action nodes
pub mod chain;

use crate::workflow::types::BotInfo;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use chain::{ChainClient, ChainRequest};
pub use pyth::{HermesClient, PriceQuote, PriceSubscription};
pub use telegram::TelegramClient;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request rejected: {reason}")]
    Rejected { reason: String },

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Stream closed")]
    Closed,
}

impl ServiceError {
    pub fn rejected(reason: impl Into<String>) -> Self {
        ServiceError::Rejected {
            reason: reason.into(),
        }
    }
}

/// Latest inbound message seen by a bot, shown as a live preview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundUpdate {
    pub update_id: i64,
    pub chat_id: Option<i64>,
    pub from: Option<String>,
    pub text: Option<String>,
}

#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Check a bot token and return the bot's metadata
    async fn verify(&self, token: &str) -> Result<BotInfo, ServiceError>;
}

#[async_trait]
pub trait UpdatePoller: Send + Sync {
    /// Most recent update for a verified token, if any
    async fn latest_update(&self, token: &str) -> Result<Option<InboundUpdate>, ServiceError>;
}

#[async_trait]
pub trait PriceOracle: Send + Sync {
    async fn latest_price(&self, feed_id: &str) -> Result<PriceQuote, ServiceError>;

    /// Push stream of quotes; dropping the subscription stops it
    async fn subscribe(&self, feed_id: &str) -> Result<PriceSubscription, ServiceError>;
}
