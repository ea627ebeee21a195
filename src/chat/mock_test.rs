use super::*;

fn request(message: &str, lang: Language, service: Option<ServiceType>) -> ChatRequest {
    ChatRequest::new(message, lang, service)
}

// =========================================================================
// answer selection
// =========================================================================

#[test]
fn every_service_key_yields_non_empty_answer() {
    for service in [Some(ServiceType::Nhif), Some(ServiceType::Kra), Some(ServiceType::Huduma), None] {
        let resp = respond(&request("hello there", Language::En, service));
        assert!(!resp.answer.is_empty());
        assert!(resp.id.starts_with("msg_"));
    }
}

#[test]
fn service_key_selects_canned_answer() {
    let resp = respond(&request("hello", Language::En, Some(ServiceType::Nhif)));
    assert_eq!(resp.answer, NHIF_ANSWER);
}

#[test]
fn no_service_and_no_keyword_gives_default() {
    let resp = respond(&request("hello", Language::En, None));
    assert_eq!(resp.answer, DEFAULT_ANSWER);
}

#[test]
fn tax_keyword_overrides_service_context() {
    for service in [Some(ServiceType::Nhif), Some(ServiceType::Huduma), None] {
        let resp = respond(&request("When is the TAX deadline?", Language::En, service));
        assert_eq!(resp.answer, KRA_ANSWER);
    }
}

#[test]
fn keyword_topics_checked_in_order() {
    assert_eq!(keyword_service("health insurance and tax"), Some(ServiceType::Nhif));
    assert_eq!(keyword_service("my pin"), Some(ServiceType::Kra));
    assert_eq!(keyword_service("renew passport"), Some(ServiceType::Huduma));
    assert_eq!(keyword_service("hello"), None);
}

#[test]
fn keyword_matching_is_case_insensitive() {
    let resp = respond(&request("NHIF Registration", Language::En, None));
    assert_eq!(resp.answer, NHIF_ANSWER);
}

// =========================================================================
// language prefix
// =========================================================================

#[test]
fn swahili_and_sheng_get_bracketed_tag() {
    let sw = respond(&request("hello", Language::Sw, None));
    assert!(sw.answer.starts_with("[Swahili] "));
    assert!(sw.answer.ends_with(DEFAULT_ANSWER));

    let sheng = respond(&request("hello", Language::Sheng, None));
    assert!(sheng.answer.contains("[Sheng]"));
}

#[test]
fn english_has_no_tag() {
    let en = respond(&request("hello", Language::En, None));
    assert!(!en.answer.contains("[Swahili]"));
    assert!(!en.answer.contains("[Sheng]"));
}

// =========================================================================
// citations
// =========================================================================

#[test]
fn unmatched_message_gets_exactly_default_citation() {
    let resp = respond(&request("hello", Language::En, Some(ServiceType::Kra)));
    assert_eq!(resp.citations, vec![default_citation()]);
    assert_eq!(resp.citations[0].title, "eCitizen Portal Guide");
}

#[test]
fn citations_capped_at_two() {
    let citations = citations_for("nhif kra huduma");
    assert_eq!(citations.len(), MAX_CITATIONS);
    assert_eq!(citations[0].title, "NHIF Act 1998");
    assert_eq!(citations[1].title, "KRA Tax Guide 2024");
}

#[test]
fn citation_tag_must_appear_in_message() {
    // "tax" routes the answer to KRA but is not a citation tag.
    let citations = citations_for("tax deadline");
    assert_eq!(citations, vec![default_citation()]);
}

// =========================================================================
// actions
// =========================================================================

#[test]
fn huduma_service_attaches_one_book_action() {
    let resp = respond(&request("book appointment", Language::En, Some(ServiceType::Huduma)));
    assert_eq!(resp.answer, HUDUMA_ANSWER);
    let actions = resp.actions.unwrap();
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].kind, ActionKind::Book);
    assert_eq!(actions[0].label, BOOK_ACTION_LABEL);
    assert_eq!(actions[0].payload, Some(serde_json::json!({ "service": "huduma" })));
}

#[test]
fn keyword_huduma_without_context_offers_no_booking() {
    let resp = respond(&request("renew my passport", Language::En, None));
    assert_eq!(resp.answer, HUDUMA_ANSWER);
    assert!(resp.actions.is_none());
}

#[test]
fn huduma_context_keeps_booking_when_keyword_picks_kra() {
    let resp = respond(&request("tax question", Language::En, Some(ServiceType::Huduma)));
    assert_eq!(resp.answer, KRA_ANSWER);
    let actions = resp.actions.unwrap();
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].kind, ActionKind::Book);
}

#[test]
fn kra_pin_question_without_context() {
    let resp = respond(&request("How do I get a KRA PIN?", Language::En, None));
    assert_eq!(resp.answer, KRA_ANSWER);
    assert!((1..=2).contains(&resp.citations.len()));
    assert!(resp.citations.iter().all(|c| c.title.contains("KRA")));
    assert!(resp.actions.is_none());
}
