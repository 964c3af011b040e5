//! HTTP dispatcher for the configured webhook endpoint.
//!
//! One POST per message, a bounded wait, and the reply handed to the
//! normalizer. The endpoint's expected request shape is unknown, so the
//! payload carries the text under every field name seen in the wild.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Serialize;

use crate::chat::{normalize, NormalizedReply, ReplyProvider};
use crate::error::ChatError;

/// Default bounded wait for a webhook reply.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Default identifier sent as `userId` with every payload.
pub const DEFAULT_USER_ID: &str = "sylphie-user";

/// Configuration for the webhook client.
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// Endpoint receiving the POSTed messages.
    pub url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Identifier sent as `userId` with every payload.
    pub user_id: String,
    /// Additional request headers, e.g. an Authorization header. Empty by
    /// default.
    pub extra_headers: Vec<(String, String)>,
}

impl WebhookConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            user_id: DEFAULT_USER_ID.to_string(),
            extra_headers: Vec::new(),
        }
    }

    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.timeout = Duration::from_millis(ms);
        self
    }

    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.push((name.into(), value.into()));
        self
    }
}

/// Client for a single webhook endpoint.
///
/// The client uses `Arc` internally for configuration, making cloning cheap.
#[derive(Debug, Clone)]
pub struct WebhookClient {
    config: Arc<WebhookConfig>,
    client: Client,
}

/// Outgoing payload. The text is duplicated across `message`, `text`,
/// `input`, and `query` because the remote workflow's expected field name
/// is unknown and varies between deployments.
#[derive(Serialize)]
struct WebhookRequest<'a> {
    message: &'a str,
    text: &'a str,
    input: &'a str,
    query: &'a str,
    #[serde(rename = "sessionId", skip_serializing_if = "Option::is_none")]
    session_id: Option<&'a str>,
    #[serde(rename = "conversationId", skip_serializing_if = "Option::is_none")]
    conversation_id: Option<&'a str>,
    #[serde(rename = "userId")]
    user_id: &'a str,
    timestamp: String,
}

impl WebhookClient {
    /// Creates a client for `config`, validating the endpoint URL.
    pub fn new(config: WebhookConfig) -> Result<Self, ChatError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ChatError::from)?;
        Self::with_client(config, client)
    }

    /// Creates a client with a caller-supplied HTTP client.
    pub fn with_client(config: WebhookConfig, client: Client) -> Result<Self, ChatError> {
        reqwest::Url::parse(&config.url)
            .map_err(|_| ChatError::InvalidUrl(config.url.clone()))?;
        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }

    pub fn config(&self) -> &WebhookConfig {
        &self.config
    }
}

#[async_trait]
impl ReplyProvider for WebhookClient {
    /// Sends one message to the webhook endpoint.
    ///
    /// Non-2xx statuses become `ChatError::Http`, elapsed timers become
    /// `ChatError::Timeout`, and a reply whose body carries an `error`
    /// field becomes `ChatError::Remote`. Everything else is normalized
    /// into displayable text.
    async fn send(
        &self,
        text: &str,
        conversation_id: Option<&str>,
    ) -> Result<NormalizedReply, ChatError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ChatError::EmptyInput);
        }

        let body = WebhookRequest {
            message: trimmed,
            text: trimmed,
            input: trimmed,
            query: trimmed,
            session_id: conversation_id,
            conversation_id,
            user_id: &self.config.user_id,
            timestamp: Utc::now().to_rfc3339(),
        };

        if log::log_enabled!(log::Level::Trace) {
            if let Ok(json) = serde_json::to_string(&body) {
                log::trace!("webhook request payload: {json}");
            }
        }

        let mut request = self
            .client
            .post(&self.config.url)
            .json(&body)
            .timeout(self.config.timeout);
        for (name, value) in &self.config.extra_headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let resp = request.send().await?;
        let status = resp.status();
        log::debug!("webhook HTTP status: {status}");

        if !status.is_success() {
            return Err(ChatError::Http {
                status: status.as_u16(),
            });
        }

        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let raw = resp.text().await?;

        let reply = normalize(&raw, content_type.as_deref());
        if reply.is_remote_error() {
            return Err(ChatError::Remote(reply.text));
        }
        Ok(reply)
    }
}
