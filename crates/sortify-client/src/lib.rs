#![warn(missing_docs)]
//! # sortify-client
//!
//! ## Purpose
//! Sends mail text to the remote classification backend and returns the
//! parsed, still-untrusted classification payload.
//!
//! ## Responsibilities
//! - Validate endpoint transport policy (HTTPS unless explicitly relaxed).
//! - Execute requests through an injectable [`ClassifierTransport`].
//! - Bound every call with an explicit timeout.
//! - Classify failures into timeout, backend, transport, and decode errors.
//!
//! ## Data flow
//! [`ClassifyRequest`] -> [`ClassifierClient::classify`] ->
//! [`ClassifierTransport::send`] -> [`TransportResponse`] ->
//! [`ClassificationResult`].
//!
//! ## Ownership and lifetimes
//! The transport is shared behind `Arc` so one client can serve concurrent
//! requests; responses are returned owned.
//!
//! ## Error model
//! All failures surface as [`ClientError`]. There is no retry: a newer user
//! action supersedes a failed one.
//!
//! ## Security and privacy notes
//! Request bodies contain mail text and are never logged; only lengths,
//! status codes, and timings are.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use sortify_classification_contract::{
    ClassificationContractError, ClassificationResult, parse_classification_response,
};
use sortify_core::ClassifyRequest;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

/// Production classification endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://sortify-y7ru.onrender.com/classify";

/// Default upper bound for one classification call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client behavior knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientConfig {
    /// Upper bound for one classification call.
    pub timeout: Duration,
    /// Permits plain `http` endpoints (local testing only).
    pub allow_insecure_http: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            allow_insecure_http: false,
        }
    }
}

/// Raw backend response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl TransportResponse {
    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Abstract transport used by the classifier client.
#[async_trait]
pub trait ClassifierTransport: Send + Sync {
    /// Posts `request` to `endpoint` and returns the raw response.
    async fn send(
        &self,
        endpoint: &Url,
        request: &ClassifyRequest,
    ) -> Result<TransportResponse, ClientError>;
}

/// `reqwest`-backed JSON transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Builds a transport whose HTTP client also enforces `timeout`.
    ///
    /// # Errors
    /// Returns [`ClientError::Build`] when the HTTP client cannot be created.
    pub fn new(timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("sortify/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|error| ClientError::Build(error.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ClassifierTransport for HttpTransport {
    async fn send(
        &self,
        endpoint: &Url,
        request: &ClassifyRequest,
    ) -> Result<TransportResponse, ClientError> {
        let response = self
            .client
            .post(endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(ClientError::from_reqwest)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(ClientError::from_reqwest)?;
        Ok(TransportResponse { status, body })
    }
}

/// Classification client with endpoint policy and timeout.
#[derive(Clone)]
pub struct ClassifierClient {
    endpoint: Url,
    config: ClientConfig,
    transport: Arc<dyn ClassifierTransport>,
}

impl ClassifierClient {
    /// Creates a validated client over `transport`.
    ///
    /// # Errors
    /// Returns [`ClientError::InvalidEndpoint`] when the URL is malformed or
    /// not HTTPS (unless `config.allow_insecure_http` is set).
    pub fn new(
        endpoint: &str,
        config: ClientConfig,
        transport: Arc<dyn ClassifierTransport>,
    ) -> Result<Self, ClientError> {
        let endpoint = validate_endpoint(endpoint, config.allow_insecure_http)?;
        Ok(Self {
            endpoint,
            config,
            transport,
        })
    }

    /// Creates a client over the default [`HttpTransport`].
    ///
    /// # Errors
    /// Same as [`ClassifierClient::new`], plus [`ClientError::Build`].
    pub fn http(endpoint: &str, config: ClientConfig) -> Result<Self, ClientError> {
        let transport = HttpTransport::new(config.timeout)?;
        Self::new(endpoint, config, Arc::new(transport))
    }

    /// Configured endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Configured behavior.
    pub fn config(&self) -> ClientConfig {
        self.config
    }

    /// Classifies one request.
    ///
    /// # Errors
    /// - [`ClientError::Timeout`] when no response arrives within the timeout.
    /// - [`ClientError::Backend`] for non-2xx statuses, carrying the body text.
    /// - [`ClientError::Transport`] for connection-level failures.
    /// - [`ClientError::Decode`] when a 2xx body is not JSON.
    pub async fn classify(
        &self,
        request: &ClassifyRequest,
    ) -> Result<ClassificationResult, ClientError> {
        let started = Instant::now();
        debug!(
            stage = "client",
            action = "send",
            endpoint = %self.endpoint,
            text_len = request.text.len(),
            attachment = %request.attachment
        );

        let response = tokio::time::timeout(
            self.config.timeout,
            self.transport.send(&self.endpoint, request),
        )
        .await
        .map_err(|_| ClientError::Timeout)??;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        if !response.is_success() {
            warn!(
                stage = "client",
                action = "backend_error",
                status = response.status,
                elapsed_ms
            );
            return Err(ClientError::Backend {
                status: response.status,
                body: response.body,
            });
        }

        debug!(
            stage = "client",
            action = "received",
            status = response.status,
            body_len = response.body.len(),
            elapsed_ms
        );
        parse_classification_response(&response.body).map_err(ClientError::Decode)
    }
}

/// Validates classification endpoint transport policy.
///
/// # Errors
/// Returns [`ClientError::InvalidEndpoint`] for malformed URLs, schemes other
/// than `https` (or `http` when `allow_insecure_http`), and URLs without host.
pub fn validate_endpoint(endpoint: &str, allow_insecure_http: bool) -> Result<Url, ClientError> {
    let parsed = Url::parse(endpoint)
        .map_err(|error| ClientError::InvalidEndpoint(format!("invalid url: {error}")))?;

    match parsed.scheme() {
        "https" => {}
        "http" if allow_insecure_http => {}
        "http" => {
            return Err(ClientError::InvalidEndpoint(
                "classification endpoint must use https".to_string(),
            ));
        }
        other => {
            return Err(ClientError::InvalidEndpoint(format!(
                "unsupported scheme {other:?}"
            )));
        }
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(ClientError::InvalidEndpoint(
            "endpoint has no host".to_string(),
        ));
    }

    Ok(parsed)
}

/// Classifier client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Endpoint violates URL or transport policy.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
    /// HTTP client could not be constructed.
    #[error("http client build failure: {0}")]
    Build(String),
    /// No response within the configured timeout.
    #[error("classification request timed out")]
    Timeout,
    /// Backend answered with a non-2xx status.
    #[error("backend {status}: {body}")]
    Backend {
        /// HTTP status code.
        status: u16,
        /// Response body text.
        body: String,
    },
    /// Connection-level failure.
    #[error("transport failure: {0}")]
    Transport(String),
    /// 2xx body was not JSON.
    #[error("response decode failure: {0}")]
    Decode(#[from] ClassificationContractError),
}

impl ClientError {
    /// Returns `true` for [`ClientError::Timeout`].
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(error.to_string())
        }
    }
}
