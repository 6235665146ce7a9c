use std::env;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Json, Path, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use wayfarer_agents::TravelAgent;
use wayfarer_core::input::MAX_SESSION_ID_CHARS;
use wayfarer_core::{validate_chat_request, ChatRequest, ConversationTurn};
use wayfarer_observability::{AppMetrics, MetricsSnapshot};
use wayfarer_providers::{
    build_http_client, ProviderCapabilities, ProviderRegistry, ProviderSettings,
};
use wayfarer_storage::{SessionContexts, Store, StoreKind};

/// Larger bodies fail JSON extraction and are answered with the usual 400.
const MAX_REQUEST_BODY_BYTES: usize = 16 * 1024;

#[derive(Clone)]
pub struct ApiState {
    pub agent: Arc<TravelAgent<Store>>,
    pub metrics: Arc<AppMetrics>,
    pub store_kind: StoreKind,
    /// Empty means any origin.
    pub allowed_origins: Arc<Vec<String>>,
}

impl ApiState {
    pub fn new(registry: ProviderRegistry, store: Store, allowed_origins: Vec<String>) -> Self {
        let metrics = AppMetrics::shared();
        let store_kind = store.kind();
        let agent = Arc::new(TravelAgent::new(
            registry,
            Arc::new(store),
            SessionContexts::new(),
            metrics.clone(),
        ));

        Self {
            agent,
            metrics,
            store_kind,
            allowed_origins: Arc::new(allowed_origins),
        }
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp_utc: String,
    metrics: MetricsSnapshot,
    capabilities: ProviderCapabilities,
    store: StoreKind,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HistoryResponse {
    session_id: String,
    turns: Vec<ConversationTurn>,
}

/// Reads configuration from the environment and builds the router.
pub async fn build_app() -> Result<Router> {
    Ok(build_router(build_state().await?))
}

pub async fn build_state() -> Result<ApiState> {
    let settings = ProviderSettings::from_env().context("invalid provider configuration")?;
    let registry = ProviderRegistry::from_settings(&settings, build_http_client()?);

    let store = match env::var("WAYFARER_DATABASE_URL") {
        Ok(database_url) if !database_url.trim().is_empty() => {
            Store::sqlite(database_url.trim()).await?
        }
        _ => Store::memory(),
    };

    let allowed_origins =
        parse_allowed_origins(env::var("WAYFARER_ALLOWED_ORIGINS").ok().as_deref());

    let state = ApiState::new(registry, store, allowed_origins);
    let capabilities = state.agent.capabilities();
    info!(
        primary_intent = ?capabilities.primary_intent,
        secondary_dialog = ?capabilities.secondary_dialog,
        sentiment = ?capabilities.sentiment,
        live_weather = capabilities.live_weather,
        secondary_weather = capabilities.secondary_weather,
        store = ?state.store_kind,
        "providers wired"
    );

    Ok(state)
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/chat", post(chat))
        .route("/sessions/:session_id/history", get(session_history))
        .layer(build_cors_layer(&state.allowed_origins))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .with_state(state)
}

async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    let payload = HealthResponse {
        status: "ok",
        timestamp_utc: chrono::Utc::now().to_rfc3339(),
        metrics: state.metrics.snapshot(),
        capabilities: state.agent.capabilities(),
        store: state.store_kind,
    };
    (StatusCode::OK, Json(payload))
}

async fn chat(
    State(state): State<ApiState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return bad_request(rejection.body_text()),
    };

    let validated = match validate_chat_request(&request) {
        Ok(validated) => validated,
        Err(error) => return bad_request(error.to_string()),
    };

    match state.agent.handle_chat(validated).await {
        Ok(reply) => (StatusCode::OK, Json(reply)).into_response(),
        Err(error) => {
            error!(error = %error, "chat failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": "chat_failed",
                    "message": format!("{:#}", error),
                })),
            )
                .into_response()
        }
    }
}

async fn session_history(
    State(state): State<ApiState>,
    Path(session_id): Path<String>,
) -> Response {
    let session_id = session_id.trim().to_string();
    if session_id.is_empty() || session_id.chars().count() > MAX_SESSION_ID_CHARS {
        return bad_request(format!(
            "sessionId must be between 1 and {} characters",
            MAX_SESSION_ID_CHARS
        ));
    }

    match state.agent.history(&session_id).await {
        Ok(turns) => (
            StatusCode::OK,
            Json(HistoryResponse { session_id, turns }),
        )
            .into_response(),
        Err(error) => {
            error!(error = %error, session_id = %session_id, "history read failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": "history_failed",
                    "message": format!("{:#}", error),
                })),
            )
                .into_response()
        }
    }
}

fn bad_request(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": message.into() })),
    )
        .into_response()
}

fn parse_allowed_origins(value: Option<&str>) -> Vec<String> {
    value
        .map(|value| {
            value
                .split(',')
                .map(|origin| origin.trim().trim_end_matches('/').to_string())
                .filter(|origin| !origin.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn build_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins = allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect::<Vec<_>>();
    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::HeaderName::from_static("x-request-id"),
        ])
        .expose_headers(Any)
}
