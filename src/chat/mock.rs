//! Local answer table used when the backend is unavailable.
//!
//! Resolution order: keyword topic in the message text, then the service
//! context key, then the default answer. The booking action depends only
//! on the context key. Everything here is pure; the
//! only non-deterministic part of a response is its message id.

use serde_json::json;

use crate::types::{
    ActionKind, ChatRequest, ChatResponse, Citation, Language, MessageAction, ServiceType, next_message_id,
};

pub const NHIF_ANSWER: &str = "To register for NHIF, visit any Huduma Centre with your ID card and KRA PIN. \
You can also register online at www.nhif.or.ke. The minimum monthly contribution is KES 500 for self-employed \
individuals. Registration is free and immediate.";

pub const KRA_ANSWER: &str = "To get a KRA PIN, visit www.kra.go.ke and click on \"iTax Registration\". \
You will need your ID number, email, and phone number. The PIN is generated instantly. You can also visit any \
KRA office or Huduma Centre for assistance.";

pub const HUDUMA_ANSWER: &str = "To book a Huduma Centre appointment, visit www.hudumakenya.go.ke and select \
\"Book Appointment\". Choose your preferred service, date, and time. You will receive an SMS confirmation. \
Walk-ins are also welcome, but appointments get priority.";

pub const DEFAULT_ANSWER: &str = "I can help you with NHIF, KRA, and Huduma Centre services. Please ask me a \
specific question about health insurance, tax services, or government document processing.";

pub const BOOK_ACTION_LABEL: &str = "Book Appointment";

/// Most citations attached to one mock answer.
pub const MAX_CITATIONS: usize = 2;

/// Topic keywords, checked in order. The first topic with a hit wins.
const TOPIC_KEYWORDS: [(ServiceType, &[&str]); 3] = [
    (ServiceType::Nhif, &["nhif", "health", "insurance"]),
    (ServiceType::Kra, &["kra", "tax", "pin"]),
    (ServiceType::Huduma, &["huduma", "id", "passport"]),
];

/// Tags matched against both message and citation title.
const CITATION_TAGS: [&str; 3] = ["nhif", "kra", "huduma"];

// =============================================================================
// CITATIONS
// =============================================================================

#[derive(Debug, Clone, Copy)]
pub struct MockCitation {
    pub id: &'static str,
    pub title: &'static str,
    pub url: &'static str,
    pub snippet: &'static str,
}

impl MockCitation {
    #[must_use]
    pub fn to_citation(&self) -> Citation {
        Citation {
            id: self.id.to_owned(),
            title: self.title.to_owned(),
            url: self.url.to_owned(),
            snippet: Some(self.snippet.to_owned()),
        }
    }
}

pub const MOCK_CITATIONS: [MockCitation; 4] = [
    MockCitation {
        id: "1",
        title: "NHIF Act 1998",
        url: "https://www.nhif.or.ke/act",
        snippet: "National Hospital Insurance Fund regulations and guidelines",
    },
    MockCitation {
        id: "2",
        title: "KRA Tax Guide 2024",
        url: "https://www.kra.go.ke/taxpayers-guide",
        snippet: "Complete guide to tax filing and compliance in Kenya",
    },
    MockCitation {
        id: "3",
        title: "Huduma Centre Services",
        url: "https://www.hudumakenya.go.ke/services",
        snippet: "List of all services offered at Huduma Centres",
    },
    MockCitation {
        id: "4",
        title: "eCitizen Portal Guide",
        url: "https://www.ecitizen.go.ke/guide",
        snippet: "How to access government services online",
    },
];

/// Citation used when nothing in the message matches a tagged title.
#[must_use]
pub fn default_citation() -> Citation {
    MOCK_CITATIONS[3].to_citation()
}

/// Up to [`MAX_CITATIONS`] tagged citations for a lowercased message, or
/// the default citation. Never empty.
#[must_use]
pub fn citations_for(message_lower: &str) -> Vec<Citation> {
    let matched: Vec<Citation> = MOCK_CITATIONS
        .iter()
        .filter(|citation| {
            let title = citation.title.to_lowercase();
            CITATION_TAGS
                .iter()
                .any(|tag| message_lower.contains(tag) && title.contains(tag))
        })
        .take(MAX_CITATIONS)
        .map(MockCitation::to_citation)
        .collect();

    if matched.is_empty() { vec![default_citation()] } else { matched }
}

// =============================================================================
// ANSWER SELECTION
// =============================================================================

/// Canned answer for a service key, or the default.
#[must_use]
pub fn canned_answer(service: Option<ServiceType>) -> &'static str {
    match service {
        Some(ServiceType::Nhif) => NHIF_ANSWER,
        Some(ServiceType::Kra) => KRA_ANSWER,
        Some(ServiceType::Huduma) => HUDUMA_ANSWER,
        None => DEFAULT_ANSWER,
    }
}

/// Topic named by keywords in a lowercased message, if any.
#[must_use]
pub fn keyword_service(message_lower: &str) -> Option<ServiceType> {
    TOPIC_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| message_lower.contains(k)))
        .map(|(service, _)| *service)
}

/// Effective service: keyword match beats the context key.
#[must_use]
pub fn resolve_service(request: &ChatRequest) -> Option<ServiceType> {
    keyword_service(&request.message.to_lowercase()).or_else(|| request.service())
}

/// Bracketed tag prepended to answers in non-default languages.
#[must_use]
pub fn language_tag(lang: Language) -> Option<&'static str> {
    match lang {
        Language::En => None,
        Language::Sw => Some("[Swahili]"),
        Language::Sheng => Some("[Sheng]"),
    }
}

#[must_use]
pub fn localize(answer: &str, lang: Language) -> String {
    match language_tag(lang) {
        Some(tag) => format!("{tag} {answer}"),
        None => answer.to_owned(),
    }
}

#[must_use]
pub fn book_action() -> MessageAction {
    MessageAction {
        kind: ActionKind::Book,
        label: BOOK_ACTION_LABEL.to_owned(),
        payload: Some(json!({ "service": ServiceType::Huduma.key() })),
    }
}

// =============================================================================
// ENTRY POINT
// =============================================================================

/// Build the local answer for a request.
#[must_use]
pub fn respond(request: &ChatRequest) -> ChatResponse {
    let message_lower = request.message.to_lowercase();
    let service = resolve_service(request);

    let answer = localize(canned_answer(service), request.lang);
    let citations = citations_for(&message_lower);
    // Booking follows the selected service, not the keyword topic.
    let actions = (request.service() == Some(ServiceType::Huduma)).then(|| vec![book_action()]);

    ChatResponse { id: next_message_id(), stream: false, answer, citations, actions }
}

#[cfg(test)]
#[path = "mock_test.rs"]
mod tests;
