//! Answer feedback. Fire-and-forget: a failed submission is logged and
//! dropped, never shown to the citizen.

use tracing::{info, warn};

use crate::config::{ClientConfig, ConfigError};
use crate::error::ErrorCode;
use crate::types::FeedbackRequest;

pub const FEEDBACK_PATH: &str = "/api/v1/chat/feedback";

#[derive(Debug, thiserror::Error)]
pub enum FeedbackError {
    #[error("feedback request failed: {0}")]
    Request(String),

    #[error("feedback rejected: status {status}")]
    Status { status: u16, body: String },
}

impl ErrorCode for FeedbackError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Request(_) => "E_FEEDBACK_REQUEST",
            Self::Status { .. } => "E_FEEDBACK_STATUS",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Status { status: 429 | 500..=599, .. })
    }
}

pub struct FeedbackClient {
    http: reqwest::Client,
    /// `None` in mock mode: submissions are only logged.
    endpoint: Option<String>,
}

impl FeedbackClient {
    #[must_use]
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        let endpoint = format!("{}{FEEDBACK_PATH}", base_url.trim_end_matches('/'));
        Self { http, endpoint: Some(endpoint) }
    }

    #[must_use]
    pub fn log_only() -> Self {
        Self { http: reqwest::Client::new(), endpoint: None }
    }

    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        if config.use_mock {
            return Ok(Self::log_only());
        }
        Ok(Self::new(config.http_client()?, &config.api_base_url))
    }

    /// Submit and report the outcome.
    ///
    /// # Errors
    ///
    /// Returns a [`FeedbackError`] on transport failure or non-2xx status.
    pub async fn try_submit(&self, feedback: &FeedbackRequest) -> Result<(), FeedbackError> {
        let Some(endpoint) = &self.endpoint else {
            return Ok(());
        };

        let response = self
            .http
            .post(endpoint)
            .json(feedback)
            .send()
            .await
            .map_err(|e| FeedbackError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedbackError::Status { status: status.as_u16(), body });
        }
        Ok(())
    }

    /// Submit and swallow any failure.
    pub async fn submit(&self, feedback: &FeedbackRequest) {
        match self.try_submit(feedback).await {
            Ok(()) => info!(
                chat_id = %feedback.chat_id,
                message_id = %feedback.message_id,
                rating = ?feedback.rating,
                "feedback: submitted"
            ),
            Err(e) => warn!(error = %e, code = e.error_code(), "feedback: submission failed, dropped"),
        }
    }
}

#[cfg(test)]
#[path = "feedback_test.rs"]
mod tests;
