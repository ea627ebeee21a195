use super::*;

// =============================================================================
// ids
// =============================================================================

fn id_millis(id: &str) -> u64 {
    id.strip_prefix("msg_")
        .and_then(|digits| digits.parse().ok())
        .unwrap()
}

#[test]
fn message_ids_have_msg_prefix_and_digits() {
    let id = next_message_id();
    assert!(id.starts_with("msg_"));
    assert!(id["msg_".len()..].chars().all(|c| c.is_ascii_digit()));
}

#[test]
fn message_ids_strictly_increase() {
    let ids: Vec<u64> = (0..50).map(|_| id_millis(&next_message_id())).collect();
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn timestamp_is_rfc3339() {
    let ts = now_timestamp();
    assert!(ts.contains('T'));
    assert!(OffsetDateTime::parse(&ts, &Rfc3339).is_ok());
}

// =============================================================================
// enums
// =============================================================================

#[test]
fn language_parses_case_insensitively() {
    assert_eq!("SW".parse::<Language>().unwrap(), Language::Sw);
    assert_eq!(" sheng ".parse::<Language>().unwrap(), Language::Sheng);
    assert_eq!(Language::default(), Language::En);
}

#[test]
fn language_rejects_unknown_code() {
    let err = "fr".parse::<Language>().unwrap_err();
    assert_eq!(err.kind, "language");
    assert!(err.to_string().contains("'fr'"));
}

#[test]
fn service_type_round_trips_through_display() {
    for service in ServiceType::ALL {
        assert_eq!(service.to_string().parse::<ServiceType>().unwrap(), service);
    }
}

#[test]
fn time_range_parses_known_windows_only() {
    assert_eq!("7d".parse::<TimeRange>().unwrap(), TimeRange::Week);
    assert_eq!("90d".parse::<TimeRange>().unwrap(), TimeRange::Quarter);
    assert!("1y".parse::<TimeRange>().is_err());
    assert_eq!(TimeRange::default(), TimeRange::Month);
}

#[test]
fn rating_parses_snake_case() {
    assert_eq!("not_helpful".parse::<Rating>().unwrap(), Rating::NotHelpful);
    assert!("meh".parse::<Rating>().is_err());
}

// =============================================================================
// serde shapes
// =============================================================================

#[test]
fn action_serializes_type_in_uppercase() {
    let action = MessageAction {
        kind: ActionKind::Book,
        label: "Book Appointment".into(),
        payload: Some(serde_json::json!({ "service": "huduma" })),
    };
    let json = serde_json::to_value(&action).unwrap();
    assert_eq!(json["type"], "BOOK");
    assert_eq!(json["payload"]["service"], "huduma");
}

#[test]
fn feedback_request_uses_camel_case() {
    let req = FeedbackRequest {
        chat_id: "c1".into(),
        message_id: "m1".into(),
        rating: Rating::NotHelpful,
        comments: None,
    };
    let json = serde_json::to_value(&req).unwrap();
    assert_eq!(json, serde_json::json!({ "chatId": "c1", "messageId": "m1", "rating": "not_helpful" }));
}

#[test]
fn county_metric_deserializes_from_dataset_shape() {
    let json = r#"{"countyName":"Nairobi","queries":10,"escalations":1,"satisfaction":90,"coordinates":[-1.28,36.82]}"#;
    let county: CountyMetric = serde_json::from_str(json).unwrap();
    assert_eq!(county.county_name, "Nairobi");
    assert_eq!(county.satisfaction, 90);
    assert!((county.coordinates[1] - 36.82).abs() < f64::EPSILON);
}

#[test]
fn chat_response_citations_default_to_empty() {
    let resp: ChatResponse = serde_json::from_str(r#"{"id":"msg_1","answer":"hi"}"#).unwrap();
    assert!(resp.citations.is_empty());
    assert!(resp.actions.is_none());
    assert!(!resp.stream);
}

#[test]
fn chat_request_without_service_has_no_context() {
    let req = ChatRequest::new("hello", Language::En, None);
    assert!(req.context.is_none());
    assert_eq!(req.service(), None);

    let req = ChatRequest::new("hello", Language::Sw, Some(ServiceType::Kra));
    assert_eq!(req.service(), Some(ServiceType::Kra));
}

#[test]
fn bot_message_takes_response_id_and_answer() {
    let resp = ChatResponse {
        id: "msg_42".into(),
        stream: false,
        answer: "answer".into(),
        citations: vec![],
        actions: None,
    };
    let msg = ChatMessage::bot(resp);
    assert_eq!(msg.id, "msg_42");
    assert_eq!(msg.role, Role::Bot);
    assert_eq!(msg.text, "answer");
    assert_eq!(msg.citations, Some(vec![]));
}
