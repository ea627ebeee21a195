//! Chat: resolve a citizen question into an answer.
//!
//! DESIGN
//! ======
//! Resolution is a two-step pipeline. Step one asks the remote
//! [`ChatBackend`] and yields a `Result`; step two, taken only on `Err` (or
//! when no backend is configured), answers from the deterministic table in
//! [`mock`]. Each failed call falls back exactly once and is never retried,
//! so [`Resolver::resolve`] is infallible from the caller's point of view.

pub mod mock;
pub mod remote;
pub mod session;

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::{ClientConfig, ConfigError};
use crate::error::ErrorCode;
use crate::types::{ChatRequest, ChatResponse, Language, ServiceType};

pub use remote::HttpChatBackend;
pub use session::{ChatSession, SessionError};

// =============================================================================
// ERROR
// =============================================================================

/// Failures of the remote chat step. All of them are masked by the mock.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// Transport-level failure (DNS, connect, reset, timeout).
    #[error("chat request failed: {0}")]
    Request(String),

    /// The backend answered with a non-success HTTP status.
    #[error("chat API error: status {status}")]
    Status { status: u16, body: String },

    /// The body was not the JSON shape we expect.
    #[error("chat response parse failed: {0}")]
    Parse(String),
}

impl ErrorCode for ChatError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Request(_) => "E_CHAT_REQUEST",
            Self::Status { .. } => "E_CHAT_STATUS",
            Self::Parse(_) => "E_CHAT_PARSE",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Status { status: 429 | 500..=599, .. })
    }
}

// =============================================================================
// BACKEND TRAIT
// =============================================================================

/// Remote answer source. Enables mocking in tests.
#[async_trait::async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send one question to the backend.
    ///
    /// # Errors
    ///
    /// Returns a [`ChatError`] on transport failure, non-2xx status or an
    /// unparseable body.
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, ChatError>;
}

// =============================================================================
// RESOLVER
// =============================================================================

/// Resolves chat requests against an optional remote backend with a local
/// fallback. Cheap to clone.
#[derive(Clone)]
pub struct Resolver {
    backend: Option<Arc<dyn ChatBackend>>,
    mock_delay: Duration,
}

impl Resolver {
    /// Resolver that tries `backend` first.
    #[must_use]
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self { backend: Some(backend), mock_delay: Duration::ZERO }
    }

    /// Resolver that never touches the network.
    #[must_use]
    pub fn mock_only() -> Self {
        Self { backend: None, mock_delay: Duration::ZERO }
    }

    /// Simulated latency applied on the local path.
    #[must_use]
    pub fn with_mock_delay(mut self, delay: Duration) -> Self {
        self.mock_delay = delay;
        self
    }

    /// Build from typed config: mock mode skips the backend entirely.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        let resolver = if config.use_mock {
            Self::mock_only()
        } else {
            let http = config.http_client()?;
            Self::new(Arc::new(HttpChatBackend::new(http, &config.api_base_url)))
        };
        Ok(resolver.with_mock_delay(config.mock_delay()))
    }

    #[must_use]
    pub fn is_mock_only(&self) -> bool {
        self.backend.is_none()
    }

    /// Resolve a request. Never fails: any remote error yields the local answer.
    pub async fn resolve(&self, request: &ChatRequest) -> ChatResponse {
        let Some(backend) = &self.backend else {
            debug!(lang = %request.lang, "chat: mock mode, answering locally");
            return self.fallback(request).await;
        };

        match backend.send(request).await {
            Ok(response) => {
                info!(id = %response.id, citations = response.citations.len(), "chat: remote answer");
                response
            }
            Err(e) => {
                warn!(error = %e, code = e.error_code(), "chat: remote failed, falling back to local answers");
                self.fallback(request).await
            }
        }
    }

    /// Shorthand for resolving a bare message.
    pub async fn resolve_message(
        &self,
        message: &str,
        lang: Language,
        service: Option<ServiceType>,
    ) -> ChatResponse {
        self.resolve(&ChatRequest::new(message, lang, service)).await
    }

    async fn fallback(&self, request: &ChatRequest) -> ChatResponse {
        if !self.mock_delay.is_zero() {
            tokio::time::sleep(self.mock_delay).await;
        }
        mock::respond(request)
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
