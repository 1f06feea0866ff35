/// Telegram Bot API client
///
/// `getMe` verifies a token; `getUpdates` with offset -1 returns the newest update
/// without acknowledging older ones.

use crate::config::ServiceConfig;
use crate::services::{CredentialVerifier, InboundUpdate, ServiceError, UpdatePoller};
use crate::workflow::types::BotInfo;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    api_base: String,
}

/// Envelope every Bot API response uses
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUser {
    id: i64,
    first_name: String,
    username: Option<String>,
}

impl TelegramClient {
    pub fn new(api_base: impl Into<String>, timeout: Duration) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    /// Client against the configured Bot API base and timeout
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ServiceError> {
        Self::new(config.telegram_api_base.as_str(), config.http_timeout())
    }

    fn method_url(&self, token: &str, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, token, method)
    }

    async fn call<T: for<'de> Deserialize<'de>>(
        &self,
        token: &str,
        method: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ServiceError> {
        // The Bot API reports errors in the body even on 4xx, so don't bail on status
        let response: ApiResponse<T> = self
            .http
            .get(self.method_url(token, method))
            .query(query)
            .send()
            .await?
            .json()
            .await?;

        if !response.ok {
            return Err(ServiceError::rejected(
                response
                    .description
                    .unwrap_or_else(|| format!("{} failed", method)),
            ));
        }
        response
            .result
            .ok_or_else(|| ServiceError::Decode(format!("{} returned no result", method)))
    }
}

#[async_trait]
impl CredentialVerifier for TelegramClient {
    async fn verify(&self, token: &str) -> Result<BotInfo, ServiceError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ServiceError::rejected("Bot token is empty"));
        }

        let user: ApiUser = self.call(token, "getMe", &[]).await?;
        tracing::info!("🤖 Verified Telegram bot @{}", user.username.as_deref().unwrap_or("?"));
        Ok(BotInfo {
            id: user.id,
            username: user.username,
            display_name: user.first_name,
        })
    }
}

#[async_trait]
impl UpdatePoller for TelegramClient {
    async fn latest_update(&self, token: &str) -> Result<Option<InboundUpdate>, ServiceError> {
        let updates: Vec<Value> = self
            .call(token.trim(), "getUpdates", &[("offset", "-1"), ("limit", "1")])
            .await?;
        Ok(updates.last().and_then(parse_update))
    }
}

/// Pull the fields the preview shows out of a raw update
fn parse_update(update: &Value) -> Option<InboundUpdate> {
    let update_id = update.get("update_id")?.as_i64()?;
    let message = update
        .get("message")
        .or_else(|| update.get("channel_post"))
        .or_else(|| update.get("edited_message"));

    let chat_id = message
        .and_then(|m| m.pointer("/chat/id"))
        .and_then(Value::as_i64);
    let from = message
        .and_then(|m| m.get("from"))
        .and_then(|f| f.get("username").or_else(|| f.get("first_name")))
        .and_then(Value::as_str)
        .map(str::to_string);
    let text = message
        .and_then(|m| m.get("text"))
        .and_then(Value::as_str)
        .map(str::to_string);

    Some(InboundUpdate {
        update_id,
        chat_id,
        from,
        text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_uses_configured_api_base() {
        let config = ServiceConfig {
            telegram_api_base: "http://localhost:8081/".into(),
            ..ServiceConfig::default()
        };
        let client = TelegramClient::from_config(&config).unwrap();
        assert_eq!(
            client.method_url("123:abc", "getMe"),
            "http://localhost:8081/bot123:abc/getMe"
        );
    }

    #[test]
    fn test_parse_message_update() {
        let raw = json!({
            "update_id": 9001,
            "message": {
                "chat": {"id": -42},
                "from": {"first_name": "Ada", "username": "ada_l"},
                "text": "/price ETH"
            }
        });
        let update = parse_update(&raw).unwrap();
        assert_eq!(update.update_id, 9001);
        assert_eq!(update.chat_id, Some(-42));
        assert_eq!(update.from.as_deref(), Some("ada_l"));
        assert_eq!(update.text.as_deref(), Some("/price ETH"));
    }

    #[test]
    fn test_parse_update_without_message() {
        let update = parse_update(&json!({"update_id": 7, "poll": {}})).unwrap();
        assert_eq!(update.chat_id, None);
        assert!(parse_update(&json!({"message": {}})).is_none());
    }

    #[test]
    fn test_api_error_envelope() {
        let body = r#"{"ok":false,"error_code":401,"description":"Unauthorized"}"#;
        let parsed: ApiResponse<ApiUser> = serde_json::from_str(body).unwrap();
        assert!(!parsed.ok);
        assert_eq!(parsed.description.as_deref(), Some("Unauthorized"));
    }

    #[test]
    fn test_method_url_strips_trailing_slash() {
        let client = TelegramClient::new("https://api.telegram.org/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.method_url("123:abc", "getMe"),
            "https://api.telegram.org/bot123:abc/getMe"
        );
    }

    #[tokio::test]
    async fn test_empty_token_is_rejected_locally() {
        let client = TelegramClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let err = client.verify("   ").await.unwrap_err();
        assert!(matches!(err, ServiceError::Rejected { .. }));
    }
}
