//! Data Client
//!
//! Wraps HTTP GET + JSON decode behind the [`JsonSource`] trait and
//! normalizes every failure into a single [`ClientError`] value.
//! Nothing here retries; callers decide what to surface.

mod endpoint;

pub use endpoint::{channel_link, video_link, AdvancedMetric, Endpoint, TagBoard, TopMetric};

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// Failure taxonomy of a single backend request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Transport-level failure, no response was received.
    #[error("0 network error - {message}")]
    Network { message: String },
    /// The backend answered with a non-2xx status.
    #[error("{status} {status_text} - {body}")]
    Http {
        status: u16,
        status_text: String,
        body: String,
    },
    /// The body was not the JSON shape the caller expected.
    #[error("invalid response body: {message}")]
    Decode { message: String },
}

impl ClientError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network { message: message.into() }
    }

    pub fn http(status: u16, status_text: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Http {
            status,
            status_text: status_text.into(),
            body: body.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode { message: message.into() }
    }

    /// HTTP status, `0` when no response was received.
    pub fn status(&self) -> u16 {
        match self {
            Self::Http { status, .. } => *status,
            Self::Network { .. } | Self::Decode { .. } => 0,
        }
    }

    pub fn status_text(&self) -> &str {
        match self {
            Self::Http { status_text, .. } => status_text,
            Self::Network { .. } => "network error",
            Self::Decode { .. } => "decode error",
        }
    }

    /// Message without any prefix; HTTP failures keep their full status text.
    pub fn message(&self) -> String {
        match self {
            Self::Http { .. } => self.to_string(),
            Self::Network { message } | Self::Decode { message } => message.clone(),
        }
    }

    /// Literal text shown in a panel for this failure.
    pub fn display_text(&self) -> String {
        match self {
            Self::Http { .. } => self.to_string(),
            Self::Network { message } | Self::Decode { message } => format!("Error: {}", message),
        }
    }
}

/// Anything that can answer a GET with a JSON document.
#[async_trait]
pub trait JsonSource: Send + Sync {
    /// Fetch `url` (path and query, relative to the backend root).
    async fn fetch_json(&self, url: &str) -> Result<Value, ClientError>;
}

/// Fetch an endpoint and decode it into `T`.
pub async fn fetch_as<T: DeserializeOwned>(
    source: &dyn JsonSource,
    endpoint: &Endpoint,
) -> Result<T, ClientError> {
    let url = endpoint.url();
    let value = source.fetch_json(&url).await?;
    serde_json::from_value(value).map_err(|e| {
        warn!("Failed to decode {}: {}", url, e);
        ClientError::decode(e.to_string())
    })
}

/// [`JsonSource`] backed by `reqwest`.
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .user_agent(concat!("trendboard/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn absolute(&self, url: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), url)
    }
}

#[async_trait]
impl JsonSource for HttpClient {
    async fn fetch_json(&self, url: &str) -> Result<Value, ClientError> {
        let absolute = self.absolute(url);
        debug!("GET {}", absolute);

        let response = self
            .client
            .get(&absolute)
            .send()
            .await
            .map_err(|e| ClientError::network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::http(
                status.as_u16(),
                status.canonical_reason().unwrap_or(""),
                body,
            ));
        }

        let text = response
            .text()
            .await
            .map_err(|e| ClientError::network(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| ClientError::decode(e.to_string()))
    }
}
