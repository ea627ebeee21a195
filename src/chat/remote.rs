//! HTTP chat backend and backend → client response translation.
//!
//! The backend answers `{reply, citations: [{title, filename, source}]}`;
//! [`translate_response`] maps that onto [`ChatResponse`] with a defined
//! default for every optional field. Parsing is kept pure for testability.

use serde::{Deserialize, Serialize};

use super::{ChatBackend, ChatError};
use crate::types::{ChatRequest, ChatResponse, Citation, next_message_id};

pub const CHAT_MESSAGES_PATH: &str = "/api/v1/chat/messages";
pub const DEVICE: &str = "web";
pub const NO_RESPONSE_ANSWER: &str = "No response received";
pub const UNTITLED_CITATION: &str = "Untitled";

// =============================================================================
// CLIENT
// =============================================================================

pub struct HttpChatBackend {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpChatBackend {
    #[must_use]
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        let endpoint = format!("{}{CHAT_MESSAGES_PATH}", base_url.trim_end_matches('/'));
        Self { http, endpoint }
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl ChatBackend for HttpChatBackend {
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, ChatError> {
        let body = WireRequest::from_request(request);

        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatError::Request(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ChatError::Request(e.to_string()))?;

        if !status.is_success() {
            return Err(ChatError::Status { status: status.as_u16(), body: text });
        }

        parse_response(&text)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct WireRequest<'a> {
    pub message: &'a str,
    pub language: &'a str,
    pub device: &'static str,
    pub conversation_id: Option<&'a str>,
}

impl<'a> WireRequest<'a> {
    pub(crate) fn from_request(request: &'a ChatRequest) -> Self {
        Self { message: &request.message, language: request.lang.code(), device: DEVICE, conversation_id: None }
    }
}

/// Backend response body. Every field is optional on the wire.
#[derive(Debug, Default, Deserialize)]
pub struct WireResponse {
    #[serde(default)]
    pub reply: Option<String>,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub citations: Option<Vec<WireCitation>>,
}

/// A citation as the backend sends it: either a record or a bare string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum WireCitation {
    Record(WireCitationRecord),
    Bare(String),
}

#[derive(Debug, Default, Deserialize)]
pub struct WireCitationRecord {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
}

// =============================================================================
// TRANSLATION
// =============================================================================

/// Parse a backend body and translate it, assigning a fresh message id.
///
/// # Errors
///
/// Returns [`ChatError::Parse`] if the body is not the expected JSON shape.
pub fn parse_response(json: &str) -> Result<ChatResponse, ChatError> {
    let wire: WireResponse = serde_json::from_str(json).map_err(|e| ChatError::Parse(e.to_string()))?;
    Ok(translate_response(wire, next_message_id()))
}

/// Total mapping from the backend shape to [`ChatResponse`].
///
/// Empty strings count as absent, so `answer` is never empty.
#[must_use]
pub fn translate_response(wire: WireResponse, id: String) -> ChatResponse {
    let answer = present(wire.reply)
        .or_else(|| present(wire.answer))
        .unwrap_or_else(|| NO_RESPONSE_ANSWER.to_owned());

    let citations = wire
        .citations
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(idx, citation)| translate_citation(idx, citation))
        .collect();

    ChatResponse { id, stream: false, answer, citations, actions: None }
}

#[must_use]
pub fn translate_citation(idx: usize, citation: WireCitation) -> Citation {
    match citation {
        WireCitation::Record(record) => {
            let filename = present(record.filename);
            Citation {
                id: filename.clone().unwrap_or_else(|| fallback_citation_id(idx)),
                title: present(record.title).unwrap_or_else(|| UNTITLED_CITATION.to_owned()),
                url: present(record.source).or(filename).unwrap_or_default(),
                snippet: present(record.snippet),
            }
        }
        WireCitation::Bare(text) => match present(Some(text)) {
            Some(text) => Citation { id: fallback_citation_id(idx), title: text.clone(), url: text, snippet: None },
            None => Citation {
                id: fallback_citation_id(idx),
                title: UNTITLED_CITATION.to_owned(),
                url: String::new(),
                snippet: None,
            },
        },
    }
}

fn fallback_citation_id(idx: usize) -> String {
    format!("cit_{idx}")
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "remote_test.rs"]
mod tests;
