use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use wayfarer_api::{build_router, ApiState};
use wayfarer_providers::ProviderRegistry;
use wayfarer_storage::Store;

fn offline_app() -> Router {
    build_router(ApiState::new(
        ProviderRegistry::offline(),
        Store::memory(),
        Vec::new(),
    ))
}

fn chat_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/chat")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn health_reports_capabilities() {
    let app = offline_app();

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let parsed = read_json(response).await;
    assert_eq!(parsed["status"], "ok");
    assert_eq!(parsed["capabilities"]["primary_intent"], "mock");
    assert_eq!(parsed["capabilities"]["live_weather"], false);
    assert_eq!(parsed["store"], "memory");
}

#[tokio::test]
async fn chat_returns_reply_shape() {
    let app = offline_app();

    let response = app
        .oneshot(chat_request(json!({
            "message": "Plan a 3-day trip to Paris under €900",
            "sessionId": "session-a"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let parsed = read_json(response).await;
    assert_eq!(parsed["sessionId"], "session-a");
    assert!(parsed["timestamp"].as_i64().unwrap() > 0);
    let text = parsed["response"].as_str().unwrap();
    assert!(text.starts_with("[Primary intent] plan_trip"));
    assert!(text.contains("Here is a 3-day plan for Paris:"));
}

#[tokio::test]
async fn invalid_requests_are_rejected_with_error_field() {
    let app = offline_app();

    let cases = [
        json!({ "sessionId": "s" }),
        json!({ "message": "hi" }),
        json!({ "message": "   ", "sessionId": "s" }),
        json!({ "message": "x".repeat(1001), "sessionId": "s" }),
        json!({ "message": "hi", "sessionId": "s".repeat(101) }),
    ];

    for body in cases {
        let response = app.clone().oneshot(chat_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let parsed = read_json(response).await;
        assert!(parsed["error"].as_str().is_some_and(|error| !error.is_empty()));
    }
}

#[tokio::test]
async fn oversized_body_is_a_bad_request_with_error_field() {
    let app = offline_app();
    let body = json!({ "message": "x".repeat(20_000), "sessionId": "s" }).to_string();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/chat")
                .header("content-type", "application/json")
                .header("content-length", body.len())
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let parsed = read_json(response).await;
    assert!(parsed["error"].is_string());
}

#[tokio::test]
async fn preflight_is_permissive() {
    let app = offline_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/chat")
                .header("origin", "https://anywhere.example")
                .header("access-control-request-method", "POST")
                .header("access-control-request-headers", "content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|value| value.to_str().ok()),
        Some("*")
    );
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(body.is_empty());
}

#[tokio::test]
async fn follow_up_and_history_round_trip() {
    let app = offline_app();

    let first = app
        .clone()
        .oneshot(chat_request(json!({
            "message": "Plan a 3-day trip to Paris under €900",
            "sessionId": "session-b"
        })))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .clone()
        .oneshot(chat_request(json!({
            "message": "yes",
            "sessionId": "session-b"
        })))
        .await
        .unwrap();
    let parsed = read_json(second).await;
    assert!(parsed["response"]
        .as_str()
        .unwrap()
        .contains("Current weather in Paris"));

    let history = app
        .oneshot(
            Request::builder()
                .uri("/sessions/session-b/history")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(history.status(), StatusCode::OK);

    let parsed = read_json(history).await;
    let turns = parsed["turns"].as_array().unwrap();
    assert_eq!(turns.len(), 4);
    let senders: Vec<_> = turns.iter().map(|turn| turn["sender"].clone()).collect();
    assert_eq!(senders, vec!["user", "bot", "user", "bot"]);
    assert_eq!(turns[2]["message"], "yes");
    assert!(turns[0]["expiresAt"].as_i64().unwrap() > turns[0]["timestamp"].as_i64().unwrap() / 1000);
}

#[tokio::test]
async fn message_is_sanitized_before_storage() {
    let app = offline_app();

    let response = app
        .clone()
        .oneshot(chat_request(json!({
            "message": "  <b>hello</b> & \"friends\"  ",
            "sessionId": "session-c"
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let history = app
        .oneshot(
            Request::builder()
                .uri("/sessions/session-c/history")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let parsed = read_json(history).await;
    assert_eq!(parsed["turns"][0]["message"], "bhello/b  friends");
}
