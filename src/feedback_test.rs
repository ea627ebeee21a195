use std::sync::{Arc, Mutex};

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use serde_json::Value;

use super::*;
use crate::test_support::{dead_backend, spawn_backend};
use crate::types::Rating;

fn sample() -> FeedbackRequest {
    FeedbackRequest {
        chat_id: "chat-1".into(),
        message_id: "msg_1".into(),
        rating: Rating::Helpful,
        comments: Some("clear answer".into()),
    }
}

#[tokio::test]
async fn submit_posts_camel_case_body() {
    let received: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(Vec::new()));
    let router = Router::new()
        .route(
            FEEDBACK_PATH,
            post(|State(store): State<Arc<Mutex<Vec<Value>>>>, Json(body): Json<Value>| async move {
                store.lock().unwrap().push(body);
                StatusCode::NO_CONTENT
            }),
        )
        .with_state(received.clone());
    let client = FeedbackClient::new(reqwest::Client::new(), &spawn_backend(router).await);

    client.try_submit(&sample()).await.unwrap();

    let bodies = received.lock().unwrap();
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["chatId"], "chat-1");
    assert_eq!(bodies[0]["rating"], "helpful");
    assert_eq!(bodies[0]["comments"], "clear answer");
}

#[tokio::test]
async fn try_submit_surfaces_status() {
    let router = Router::new().route(FEEDBACK_PATH, post(|| async { StatusCode::SERVICE_UNAVAILABLE }));
    let client = FeedbackClient::new(reqwest::Client::new(), &spawn_backend(router).await);

    let err = client.try_submit(&sample()).await.unwrap_err();
    assert!(matches!(err, FeedbackError::Status { status: 503, .. }));
    assert_eq!(err.error_code(), "E_FEEDBACK_STATUS");
    assert!(err.retryable());
}

#[tokio::test]
async fn transport_failure_has_feedback_code() {
    let client = FeedbackClient::new(reqwest::Client::new(), &dead_backend().await);
    let err = client.try_submit(&sample()).await.unwrap_err();
    assert!(matches!(err, FeedbackError::Request(_)));
    assert_eq!(err.error_code(), "E_FEEDBACK_REQUEST");
}

#[tokio::test]
async fn submit_swallows_transport_failure() {
    let client = FeedbackClient::new(reqwest::Client::new(), &dead_backend().await);
    client.submit(&sample()).await;
}

#[tokio::test]
async fn log_only_client_succeeds_without_network() {
    let config = ClientConfig { use_mock: true, ..ClientConfig::default() };
    let client = FeedbackClient::from_config(&config).unwrap();
    assert!(client.try_submit(&sample()).await.is_ok());
}
