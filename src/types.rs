//! Data model shared by the chat resolver, the dashboard aggregator and
//! the admin client.
//!
//! DESIGN
//! ======
//! Field names serialize in camelCase so these types can be handed to a
//! browser front end unchanged. Message ids are `msg_<millis>` strings
//! drawn from a process-wide monotonic clock, so two messages created in
//! the same millisecond still get distinct ids.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

// =============================================================================
// IDS AND TIMESTAMPS
// =============================================================================

static LAST_MESSAGE_MS: AtomicU64 = AtomicU64::new(0);

/// Current time as milliseconds since Unix epoch.
#[must_use]
pub fn now_ms() -> u64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    u64::try_from(dur.as_millis()).unwrap_or(0)
}

/// Next message id of the form `msg_<millis>`. Strictly increasing within
/// the process.
#[must_use]
pub fn next_message_id() -> String {
    let now = now_ms();
    let mut prev = LAST_MESSAGE_MS.load(Ordering::Relaxed);
    loop {
        let next = now.max(prev + 1);
        match LAST_MESSAGE_MS.compare_exchange_weak(prev, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return format!("msg_{next}"),
            Err(actual) => prev = actual,
        }
    }
}

/// RFC 3339 timestamp for "now", used on transcript entries.
#[must_use]
pub fn now_timestamp() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}

// =============================================================================
// PARSE ERROR
// =============================================================================

/// A string did not name a known enum value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}

// =============================================================================
// LANGUAGE / SERVICE
// =============================================================================

/// Reply language requested by the citizen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Sw,
    Sheng,
}

impl Language {
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Sw => "sw",
            Self::Sheng => "sheng",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "sw" => Ok(Self::Sw),
            "sheng" => Ok(Self::Sheng),
            _ => Err(ParseEnumError { kind: "language", value: s.to_owned(), expected: "en, sw, sheng" }),
        }
    }
}

/// Government service a conversation is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    Nhif,
    Kra,
    Huduma,
}

impl ServiceType {
    pub const ALL: [Self; 3] = [Self::Nhif, Self::Kra, Self::Huduma];

    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Nhif => "nhif",
            Self::Kra => "kra",
            Self::Huduma => "huduma",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ServiceType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nhif" => Ok(Self::Nhif),
            "kra" => Ok(Self::Kra),
            "huduma" => Ok(Self::Huduma),
            _ => Err(ParseEnumError { kind: "service", value: s.to_owned(), expected: "nhif, kra, huduma" }),
        }
    }
}

// =============================================================================
// CHAT
// =============================================================================

/// A source document backing a bot answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

/// Kind of follow-up a bot message offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActionKind {
    Book,
    Link,
    Form,
}

/// Structured follow-up attached to a bot message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageAction {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

/// Author of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
    System,
}

/// One transcript entry. Immutable once appended to a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citations: Option<Vec<Citation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<MessageAction>>,
    pub timestamp: String,
}

impl ChatMessage {
    /// A message typed by the citizen.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: next_message_id(),
            role: Role::User,
            text: text.into(),
            citations: None,
            actions: None,
            timestamp: now_timestamp(),
        }
    }

    /// A bot message built from a resolved response.
    #[must_use]
    pub fn bot(response: ChatResponse) -> Self {
        Self {
            id: response.id,
            role: Role::Bot,
            text: response.answer,
            citations: Some(response.citations),
            actions: response.actions,
            timestamp: now_timestamp(),
        }
    }

    /// A local notice rendered in the transcript (not sent to the backend).
    #[must_use]
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            id: next_message_id(),
            role: Role::System,
            text: text.into(),
            citations: None,
            actions: None,
            timestamp: now_timestamp(),
        }
    }
}

/// Optional context narrowing a chat request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<ServiceType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,
}

/// A citizen question on its way to the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub lang: Language,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<ChatContext>,
}

impl ChatRequest {
    #[must_use]
    pub fn new(message: impl Into<String>, lang: Language, service: Option<ServiceType>) -> Self {
        Self {
            user_id: None,
            lang,
            message: message.into(),
            context: service.map(|service| ChatContext { service: Some(service), county: None }),
        }
    }

    /// Service key from the request context, if any.
    #[must_use]
    pub fn service(&self) -> Option<ServiceType> {
        self.context.as_ref().and_then(|c| c.service)
    }
}

/// Answer returned by the resolver. `answer` is never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub id: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub stream: bool,
    pub answer: String,
    #[serde(default)]
    pub citations: Vec<Citation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<MessageAction>>,
}

// =============================================================================
// FEEDBACK
// =============================================================================

/// Citizen verdict on a bot answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Helpful,
    NotHelpful,
}

impl FromStr for Rating {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "helpful" => Ok(Self::Helpful),
            "not_helpful" => Ok(Self::NotHelpful),
            _ => Err(ParseEnumError { kind: "rating", value: s.to_owned(), expected: "helpful, not_helpful" }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    pub chat_id: String,
    pub message_id: String,
    pub rating: Rating,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

// =============================================================================
// DASHBOARD
// =============================================================================

/// Per-county reference figures. Static data, never mutated at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountyMetric {
    pub county_name: String,
    pub queries: u64,
    pub escalations: u64,
    /// Percentage, 0 to 100.
    pub satisfaction: u8,
    /// `[lat, lng]`.
    pub coordinates: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentMetric {
    pub intent: String,
    pub count: u64,
    pub percentage: u8,
}

/// Derived dashboard figures for one `(county, range)` selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub total_queries: u64,
    pub satisfaction_rate: u8,
    /// Seconds.
    pub avg_response_time: f64,
    pub escalations: u64,
    pub top_intents: Vec<IntentMetric>,
    pub county_summary: Vec<CountyMetric>,
}

/// Dashboard reporting window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "7d")]
    Week,
    #[default]
    #[serde(rename = "30d")]
    Month,
    #[serde(rename = "90d")]
    Quarter,
}

impl TimeRange {
    pub const ALL: [Self; 3] = [Self::Week, Self::Month, Self::Quarter];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Week => "7d",
            Self::Month => "30d",
            Self::Quarter => "90d",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "7d" => Ok(Self::Week),
            "30d" => Ok(Self::Month),
            "90d" => Ok(Self::Quarter),
            _ => Err(ParseEnumError { kind: "time range", value: s.to_owned(), expected: "7d, 30d, 90d" }),
        }
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
