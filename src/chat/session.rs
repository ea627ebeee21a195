//! Chat session: the transcript and widget state for one conversation.
//!
//! DESIGN
//! ======
//! An explicit state container owned by the application shell. The
//! resolver is passed in per call rather than reached through a global,
//! and `send_message` takes `&mut self`, so at most one reply is ever
//! outstanding per conversation. `is_typing` is the visible form of that
//! gate while the reply is pending.

use tracing::debug;
use uuid::Uuid;

use super::Resolver;
use crate::error::ErrorCode;
use crate::types::{ChatContext, ChatMessage, ChatRequest, FeedbackRequest, Language, Rating, Role, ServiceType};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("message is empty")]
    EmptyMessage,
    #[error("a reply is already pending")]
    ReplyPending,
    #[error("no message with id {0}")]
    UnknownMessage(String),
}

impl ErrorCode for SessionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyMessage => "E_EMPTY_MESSAGE",
            Self::ReplyPending => "E_REPLY_PENDING",
            Self::UnknownMessage(_) => "E_UNKNOWN_MESSAGE",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::ReplyPending)
    }
}

#[derive(Debug, Clone)]
pub struct ChatSession {
    id: Uuid,
    messages: Vec<ChatMessage>,
    is_open: bool,
    is_typing: bool,
    current_service: Option<ServiceType>,
    language: Language,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new(Language::default())
    }
}

impl ChatSession {
    #[must_use]
    pub fn new(language: Language) -> Self {
        Self {
            id: Uuid::new_v4(),
            messages: Vec::new(),
            is_open: false,
            is_typing: false,
            current_service: None,
            language,
        }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    #[must_use]
    pub fn is_typing(&self) -> bool {
        self.is_typing
    }

    #[must_use]
    pub fn language(&self) -> Language {
        self.language
    }

    #[must_use]
    pub fn current_service(&self) -> Option<ServiceType> {
        self.current_service
    }

    pub fn open(&mut self) {
        self.is_open = true;
    }

    pub fn close(&mut self) {
        self.is_open = false;
    }

    pub fn set_typing(&mut self, typing: bool) {
        self.is_typing = typing;
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub fn set_service(&mut self, service: Option<ServiceType>) {
        self.current_service = service;
    }

    /// Append a message and return a reference to the stored copy.
    pub fn append_message(&mut self, message: ChatMessage) -> &ChatMessage {
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    pub fn clear_messages(&mut self) {
        self.messages.clear();
    }

    /// Most recent bot reply, if any.
    #[must_use]
    pub fn last_bot_message(&self) -> Option<&ChatMessage> {
        self.messages.iter().rev().find(|m| m.role == Role::Bot)
    }

    /// Request for `text` under the session's current language and service.
    #[must_use]
    pub fn build_request(&self, text: &str) -> ChatRequest {
        ChatRequest {
            user_id: None,
            lang: self.language,
            message: text.to_owned(),
            context: self
                .current_service
                .map(|service| ChatContext { service: Some(service), county: None }),
        }
    }

    /// Append the user's message, resolve a reply and append it.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::EmptyMessage`] for blank input and
    /// [`SessionError::ReplyPending`] while another reply is outstanding.
    /// The resolver itself cannot fail.
    pub async fn send_message(&mut self, resolver: &Resolver, text: &str) -> Result<&ChatMessage, SessionError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SessionError::EmptyMessage);
        }
        if self.is_typing {
            return Err(SessionError::ReplyPending);
        }

        let request = self.build_request(text);
        self.append_message(ChatMessage::user(text));

        let response = {
            let _typing = TypingGuard::raise(&mut self.is_typing);
            resolver.resolve(&request).await
        };

        debug!(session = %self.id, reply = %response.id, "chat: reply appended");
        Ok(self.append_message(ChatMessage::bot(response)))
    }

    /// Feedback record for a bot message in this session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownMessage`] if no bot message has that id.
    pub fn feedback_for(
        &self,
        message_id: &str,
        rating: Rating,
        comments: Option<String>,
    ) -> Result<FeedbackRequest, SessionError> {
        let known = self
            .messages
            .iter()
            .any(|m| m.role == Role::Bot && m.id == message_id);
        if !known {
            return Err(SessionError::UnknownMessage(message_id.to_owned()));
        }
        Ok(FeedbackRequest {
            chat_id: self.id.to_string(),
            message_id: message_id.to_owned(),
            rating,
            comments: comments.filter(|c| !c.trim().is_empty()),
        })
    }
}

/// Holds `is_typing` up for the duration of a reply, including when the
/// reply future is dropped before it completes.
struct TypingGuard<'a>(&'a mut bool);

impl<'a> TypingGuard<'a> {
    fn raise(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for TypingGuard<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
