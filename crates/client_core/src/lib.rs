use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use shared::{
    error::SendError,
    protocol::{Acknowledgement, BackendMessageReply, BackendMessageRequest},
};
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Delivers one user message to whatever answers it.
#[async_trait]
pub trait MessageBackend: Send + Sync {
    async fn send(&self, message: &str) -> Result<Acknowledgement, SendError>;
}

/// HTTP client for the backend API: one JSON POST per user message.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Client,
    endpoint: Option<String>,
}

impl BackendClient {
    pub fn new(endpoint: Option<String>, timeout: Duration) -> Self {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "failed to build configured http client; using defaults");
                Client::new()
            });
        Self {
            http,
            endpoint: endpoint
                .map(|endpoint| endpoint.trim().to_string())
                .filter(|endpoint| !endpoint.is_empty()),
        }
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    fn resolve_endpoint(&self) -> Result<Url, SendError> {
        let raw = self.endpoint.as_deref().ok_or(SendError::NotConfigured)?;
        let url = Url::parse(raw).map_err(|err| SendError::InvalidEndpoint {
            endpoint: raw.to_string(),
            reason: err.to_string(),
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(SendError::InvalidEndpoint {
                endpoint: raw.to_string(),
                reason: format!("unsupported scheme '{other}'"),
            }),
        }
    }
}

#[async_trait]
impl MessageBackend for BackendClient {
    async fn send(&self, message: &str) -> Result<Acknowledgement, SendError> {
        let url = self.resolve_endpoint()?;
        debug!(%url, bytes = message.len(), "posting user message to backend");

        let response = self
            .http
            .post(url)
            .json(&BackendMessageRequest {
                message: message.to_string(),
            })
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SendError::Rejected {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(transport_error)?;
        Ok(Acknowledgement {
            status: status.as_u16(),
            reply: parse_reply(&body),
        })
    }
}

fn transport_error(err: reqwest::Error) -> SendError {
    if err.is_timeout() {
        SendError::Unreachable {
            reason: "request timed out".to_string(),
        }
    } else if err.is_connect() {
        SendError::Unreachable {
            reason: format!("connection failed: {err}"),
        }
    } else if err.is_body() || err.is_decode() {
        SendError::Protocol {
            reason: err.to_string(),
        }
    } else {
        SendError::Unreachable {
            reason: err.to_string(),
        }
    }
}

/// Backends may answer with `{"reply": "..."}`; anything else is a bare ack.
fn parse_reply(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<BackendMessageReply>(body)
        .ok()
        .and_then(|reply| reply.reply)
        .filter(|reply| !reply.trim().is_empty())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
