use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Router;
use axum::http::StatusCode;
use axum::routing::post;

use super::*;
use crate::chat::mock::{DEFAULT_ANSWER, HUDUMA_ANSWER, KRA_ANSWER};
use crate::test_support::{dead_backend, spawn_backend};
use crate::types::{ActionKind, Citation};

// =========================================================================
// MockBackend
// =========================================================================

struct MockBackend {
    results: Mutex<Vec<Result<ChatResponse, ChatError>>>,
    calls: AtomicUsize,
}

impl MockBackend {
    fn new(results: Vec<Result<ChatResponse, ChatError>>) -> Self {
        Self { results: Mutex::new(results), calls: AtomicUsize::new(0) }
    }

    fn failing() -> Self {
        Self::new(vec![Err(ChatError::Request("connection refused".into()))])
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ChatBackend for MockBackend {
    async fn send(&self, _request: &ChatRequest) -> Result<ChatResponse, ChatError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut results = self.results.lock().unwrap();
        if results.is_empty() {
            Err(ChatError::Status { status: 500, body: String::new() })
        } else {
            results.remove(0)
        }
    }
}

fn remote_answer() -> ChatResponse {
    ChatResponse {
        id: "msg_remote".into(),
        stream: false,
        answer: "from the backend".into(),
        citations: vec![Citation { id: "a.md".into(), title: "A".into(), url: "a.md".into(), snippet: None }],
        actions: None,
    }
}

// =========================================================================
// pipeline
// =========================================================================

#[tokio::test]
async fn remote_success_is_returned_unchanged() {
    let backend = Arc::new(MockBackend::new(vec![Ok(remote_answer())]));
    let resolver = Resolver::new(backend.clone());

    let resp = resolver
        .resolve_message("tax", Language::Sw, None)
        .await;
    assert_eq!(resp, remote_answer());
    assert_eq!(backend.calls(), 1);
}

#[tokio::test]
async fn remote_failure_falls_back_once_without_retry() {
    let backend = Arc::new(MockBackend::failing());
    let resolver = Resolver::new(backend.clone());

    let resp = resolver
        .resolve_message("tax", Language::En, None)
        .await;
    assert_eq!(resp.answer, KRA_ANSWER);
    assert_eq!(backend.calls(), 1);
}

#[tokio::test]
async fn every_error_kind_is_masked() {
    let errors = vec![
        Err(ChatError::Request("reset".into())),
        Err(ChatError::Status { status: 404, body: "missing".into() }),
        Err(ChatError::Parse("bad json".into())),
    ];
    let resolver = Resolver::new(Arc::new(MockBackend::new(errors)));

    for _ in 0..3 {
        let resp = resolver.resolve_message("hello", Language::En, None).await;
        assert_eq!(resp.answer, DEFAULT_ANSWER);
    }
}

#[tokio::test]
async fn failing_backend_answers_for_every_service() {
    let resolver = Resolver::new(Arc::new(MockBackend::new(vec![])));
    for service in [Some(ServiceType::Nhif), Some(ServiceType::Kra), Some(ServiceType::Huduma), None] {
        let resp = resolver.resolve_message("hello", Language::En, service).await;
        assert!(!resp.answer.is_empty());
        assert!(resp.id.starts_with("msg_"));
        assert!(resp.id["msg_".len()..].chars().all(|c| c.is_ascii_digit()));
    }
}

#[tokio::test]
async fn mock_only_never_calls_backend() {
    let resolver = Resolver::mock_only();
    assert!(resolver.is_mock_only());
    let resp = resolver.resolve_message("hello", Language::Sheng, None).await;
    assert!(resp.answer.starts_with("[Sheng]"));
}

#[tokio::test]
async fn mock_delay_is_applied_on_fallback() {
    let resolver = Resolver::mock_only().with_mock_delay(Duration::from_millis(20));
    let started = std::time::Instant::now();
    let _ = resolver.resolve_message("hello", Language::En, None).await;
    assert!(started.elapsed() >= Duration::from_millis(20));
}

// =========================================================================
// from_config
// =========================================================================

#[test]
fn from_config_mock_mode_has_no_backend() {
    let config = ClientConfig { use_mock: true, ..ClientConfig::default() };
    assert!(Resolver::from_config(&config).unwrap().is_mock_only());
}

#[test]
fn from_config_live_mode_has_backend() {
    let config = ClientConfig::default();
    assert!(!Resolver::from_config(&config).unwrap().is_mock_only());
}

// =========================================================================
// end to end over HTTP
// =========================================================================

#[tokio::test]
async fn kra_pin_with_unreachable_backend() {
    let config = ClientConfig { api_base_url: dead_backend().await, ..ClientConfig::default() };
    let resolver = Resolver::from_config(&config).unwrap();

    let resp = resolver
        .resolve_message("How do I get a KRA PIN?", Language::En, None)
        .await;
    assert_eq!(resp.answer, KRA_ANSWER);
    assert!((1..=2).contains(&resp.citations.len()));
    assert!(resp.citations.iter().all(|c| c.title.contains("KRA")));
    assert!(resp.actions.is_none());
}

#[tokio::test]
async fn booking_with_unreachable_backend() {
    let config = ClientConfig { api_base_url: dead_backend().await, ..ClientConfig::default() };
    let resolver = Resolver::from_config(&config).unwrap();

    let resp = resolver
        .resolve_message("book appointment", Language::En, Some(ServiceType::Huduma))
        .await;
    assert_eq!(resp.answer, HUDUMA_ANSWER);
    let actions = resp.actions.unwrap();
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].kind, ActionKind::Book);
}

#[tokio::test]
async fn server_error_status_falls_back() {
    let router = Router::new().route(
        remote::CHAT_MESSAGES_PATH,
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let config = ClientConfig { api_base_url: spawn_backend(router).await, ..ClientConfig::default() };
    let resolver = Resolver::from_config(&config).unwrap();

    let resp = resolver.resolve_message("health cover", Language::Sw, None).await;
    assert!(resp.answer.starts_with("[Swahili] "));
    assert!(resp.answer.contains("NHIF"));
}

#[tokio::test]
async fn malformed_body_falls_back() {
    let router = Router::new().route(remote::CHAT_MESSAGES_PATH, post(|| async { "not json" }));
    let config = ClientConfig { api_base_url: spawn_backend(router).await, ..ClientConfig::default() };
    let resolver = Resolver::from_config(&config).unwrap();

    let resp = resolver.resolve_message("hello", Language::En, None).await;
    assert_eq!(resp.answer, DEFAULT_ANSWER);
}
