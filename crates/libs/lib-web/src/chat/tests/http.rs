//! # HTTP Route Tests
//!
//! Merchant dashboard and presence endpoints, driven through the full router.

use super::*;
use crate::chat::state::ChatAppState;
use crate::server::create_router;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use shared::{ErrorResponse, MessageHistoryResponse, PresenceResponse, SessionListResponse};
use tower::ServiceExt;

async fn test_app() -> (Router, Arc<ChatAppState>) {
    let pool = setup_test_db().await;
    let state = Arc::new(ChatAppState::new(pool, test_config(), ScriptedResponder::new("Hello!")));
    let app = create_router(state.clone(), Vec::new());
    (app, state)
}

fn merchant_token(merchant_id: &str) -> String {
    let config = test_config();
    lib_auth::encode_jwt(merchant_id, "Shop".to_string(), &config.jwt_secret, 1)
        .expect("Failed to encode token")
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    request("GET", uri, token)
}

fn request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn json_body<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_dashboard_routes_require_merchant_token() {
    let (app, _state) = test_app().await;

    for req in [
        get("/api/chat/sessions", None),
        get("/api/chat/sessions", Some("not-a-jwt")),
        get("/api/chat/sessions/s1/messages", None),
        request("POST", "/api/chat/sessions/s1/close", None),
    ] {
        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body: ErrorResponse = json_body(response).await;
        assert_eq!(body.code, "Unauthorized");
    }
}

#[tokio::test]
async fn test_list_sessions_shows_last_message() {
    // Arrange
    let (app, state) = test_app().await;
    let (customer, session) = join_customer(&state.gateway, "m1", None).await;
    let outcome = state
        .gateway
        .send_message(customer.conn, message(&session.id, "Is this in stock?", SenderType::Customer))
        .await
        .unwrap();
    outcome.ai_task.unwrap().await.unwrap();
    join_customer(&state.gateway, "m2", None).await;

    // Act
    let response = app
        .oneshot(get("/api/chat/sessions", Some(&merchant_token("m1"))))
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let body: SessionListResponse = json_body(response).await;
    assert_eq!(body.sessions.len(), 1);
    assert_eq!(body.sessions[0].id, session.id);
    assert_eq!(body.sessions[0].customer_name, "Alice");
    assert_eq!(body.sessions[0].last_message.as_deref(), Some("Hello!"));
}

#[tokio::test]
async fn test_session_messages_are_scoped_to_owner() {
    // Arrange
    let (app, state) = test_app().await;
    let (customer, session) = join_customer(&state.gateway, "m1", None).await;
    let outcome = state
        .gateway
        .send_message(customer.conn, message(&session.id, "Hi", SenderType::Customer))
        .await
        .unwrap();
    outcome.ai_task.unwrap().await.unwrap();
    let uri = format!("/api/chat/sessions/{}/messages", session.id);

    // Act
    let missing = app
        .clone()
        .oneshot(get("/api/chat/sessions/nope/messages", Some(&merchant_token("m1"))))
        .await
        .unwrap();
    let foreign = app
        .clone()
        .oneshot(get(&uri, Some(&merchant_token("m2"))))
        .await
        .unwrap();
    let owned = app.oneshot(get(&uri, Some(&merchant_token("m1")))).await.unwrap();

    // Assert
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert_eq!(foreign.status(), StatusCode::FORBIDDEN);
    assert_eq!(owned.status(), StatusCode::OK);

    let body: MessageHistoryResponse = json_body(owned).await;
    assert_eq!(body.session_id, session.id);
    let turns: Vec<(SenderType, &str)> = body
        .messages
        .iter()
        .map(|m| (m.sender_type, m.content.as_str()))
        .collect();
    assert_eq!(turns, [(SenderType::Customer, "Hi"), (SenderType::Ai, "Hello!")]);
}

#[tokio::test]
async fn test_close_session_notifies_customer() {
    // Arrange
    let (app, state) = test_app().await;
    let (mut customer, session) = join_customer(&state.gateway, "m1", None).await;
    let uri = format!("/api/chat/sessions/{}/close", session.id);

    // Act
    let foreign = app
        .clone()
        .oneshot(request("POST", &uri, Some(&merchant_token("m2"))))
        .await
        .unwrap();
    let response = app
        .clone()
        .oneshot(request("POST", &uri, Some(&merchant_token("m1"))))
        .await
        .unwrap();
    let again = app
        .oneshot(request("POST", &uri, Some(&merchant_token("m1"))))
        .await
        .unwrap();

    // Assert
    assert_eq!(foreign.status(), StatusCode::FORBIDDEN);
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(again.status(), StatusCode::NO_CONTENT);
    assert_eq!(customer.drain_names(), ["session:closed"]);
    assert!(state.gateway.list_sessions("m1").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_presence_endpoint_is_public() {
    let (app, state) = test_app().await;

    let before: PresenceResponse = json_body(
        app.clone()
            .oneshot(get("/api/chat/merchants/m1/presence", None))
            .await
            .unwrap(),
    )
    .await;
    let _tab = join_merchant(&state.gateway, "m1").await;
    let after: PresenceResponse = json_body(
        app.oneshot(get("/api/chat/merchants/m1/presence", None))
            .await
            .unwrap(),
    )
    .await;

    assert_eq!(before, PresenceResponse { merchant_id: "m1".to_string(), online: false });
    assert!(after.online);
}

#[tokio::test]
async fn test_health_and_unknown_routes() {
    let (app, _state) = test_app().await;

    let health = app.clone().oneshot(get("/health", None)).await.unwrap();
    let missing = app.oneshot(get("/api/nope", None)).await.unwrap();

    assert_eq!(health.status(), StatusCode::OK);
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let (app, _state) = test_app().await;
    let req = Request::builder()
        .uri("/health")
        .header(crate::middleware::REQUEST_ID_HEADER, "req-123")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(req).await.unwrap();

    assert_eq!(
        response.headers().get(crate::middleware::REQUEST_ID_HEADER).unwrap(),
        "req-123"
    );
}
