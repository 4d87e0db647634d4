//! HTTP Endpoints
//!
//! REST API for parsing, running and managing command drafts.

use axum::{
    extract::{Json, Path, State},
    http::{HeaderValue, Method, StatusCode},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use voice_command_agent::{
    ClauseReport, ExecutionOutcome, ParsedCommand, ResolvedCommand, Validation,
};
use voice_command_core::{CanonicalCommand, Draft, Language, ParseSource, ReasonCode};

use crate::metrics::metrics_handler;
use crate::state::AppState;
use crate::ServerError;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let server = &state.config.server;
    let cors_layer = build_cors_layer(&server.cors_origins, server.cors_enabled);
    let timeout = Duration::from_secs(server.timeout_seconds);

    Router::new()
        // Command endpoints
        .route("/api/commands/parse", post(parse_command))
        .route("/api/commands/resolve", post(resolve_command))
        .route("/api/commands/validate", post(validate_command))
        .route("/api/commands/run", post(run_commands))
        // Draft endpoints
        .route("/api/drafts/:id", get(get_draft))
        .route("/api/drafts/:id/clarifications", post(answer_clarification))
        .route("/api/drafts/:id/confirm", post(confirm_draft))
        .route("/api/drafts/:id/reject", post(reject_draft))
        .route("/api/drafts/:id/execute", post(execute_draft))
        // Health check
        .route("/health", get(health_check))
        // Prometheus metrics
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(timeout))
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins
///
/// - If cors_enabled is false, returns permissive layer (for dev)
/// - If no configured origin parses, defaults to localhost:3000
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins (NOT FOR PRODUCTION)");
        return CorsLayer::permissive();
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if parsed_origins.is_empty() {
        tracing::info!("No usable CORS origins configured, defaulting to localhost:3000");
        return layer.allow_origin(HeaderValue::from_static("http://localhost:3000"));
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    layer.allow_origin(parsed_origins)
}

#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: String,
    #[serde(default)]
    pub language: Option<Language>,
}

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub command: CanonicalCommand,
    pub raw_text: String,
    pub parse_source: ParseSource,
    pub confidence: f32,
    #[serde(default)]
    pub language: Option<Language>,
}

#[derive(Debug, Deserialize)]
pub struct ClarificationAnswer {
    pub reason: ReasonCode,
    #[serde(default)]
    pub item_index: Option<usize>,
    pub value: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExecuteRequest {
    /// Candidate chosen after a selection prompt
    #[serde(default)]
    pub selection: Option<Uuid>,
    #[serde(default)]
    pub language: Option<Language>,
}

#[derive(Debug, Serialize)]
pub struct ExecuteResponse {
    pub draft: Draft,
    pub outcome: ExecutionOutcome,
}

#[derive(Debug, Serialize)]
pub struct RunResponse {
    pub clauses: Vec<ClauseReport>,
}

/// Rule-only parse
async fn parse_command(
    State(state): State<AppState>,
    Json(request): Json<TextRequest>,
) -> Json<ParsedCommand> {
    Json(state.pipeline.parse(&request.text))
}

/// Parse with AI fallback
async fn resolve_command(
    State(state): State<AppState>,
    Json(request): Json<TextRequest>,
) -> Json<ResolvedCommand> {
    Json(state.pipeline.resolve(&request.text).await)
}

/// Validate a parsed command. Runs inline: validation only reads the
/// conversion table and never awaits I/O.
async fn validate_command(
    State(state): State<AppState>,
    Json(request): Json<ValidateRequest>,
) -> Result<Json<Validation>, ServerError> {
    if !(0.0..=1.0).contains(&request.confidence) {
        return Err(ServerError::InvalidRequest(format!(
            "confidence {} outside [0, 1]",
            request.confidence
        )));
    }
    let language = request.language.unwrap_or_else(|| state.default_language());
    let resolved = ResolvedCommand {
        raw_text: request.raw_text,
        command: request.command,
        source: request.parse_source,
        confidence: request.confidence,
    };
    Ok(Json(state.pipeline.validate(&resolved, language)))
}

/// Split, resolve, validate and (where clean) execute every clause
async fn run_commands(
    State(state): State<AppState>,
    Json(request): Json<TextRequest>,
) -> Json<RunResponse> {
    let language = request.language.unwrap_or_else(|| state.default_language());
    let clauses = state.pipeline.run(&request.text, language).await;
    Json(RunResponse { clauses })
}

async fn get_draft(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Draft>, ServerError> {
    Ok(Json(state.pipeline.load_draft(id).await?))
}

async fn answer_clarification(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(answer): Json<ClarificationAnswer>,
) -> Result<Json<Draft>, ServerError> {
    let draft = state
        .pipeline
        .answer_clarification(id, answer.reason, answer.item_index, &answer.value)
        .await?;
    Ok(Json(draft))
}

async fn confirm_draft(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Draft>, ServerError> {
    Ok(Json(state.pipeline.confirm_draft(id).await?))
}

async fn reject_draft(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Draft>, ServerError> {
    Ok(Json(state.pipeline.reject_draft(id).await?))
}

async fn execute_draft(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Option<Json<ExecuteRequest>>,
) -> Result<Json<ExecuteResponse>, ServerError> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let language = request.language.unwrap_or_else(|| state.default_language());
    let (draft, outcome) = state
        .pipeline
        .execute_draft(id, request.selection, language)
        .await?;
    Ok(Json(ExecuteResponse { draft, outcome }))
}

async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
            "environment": state.config.environment,
            "ai_fallback": state.pipeline.has_ai(),
            "drafts": state.persistence.drafts.len(),
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;
    use voice_command_config::Settings;

    async fn call(
        router: Router,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        let body = match body {
            Some(json) => Body::from(json.to_string()),
            None => Body::empty(),
        };
        let response = router.oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[test]
    fn test_router_creation() {
        let state = AppState::new(Settings::default());
        let _ = create_router(state);
    }

    #[tokio::test]
    async fn test_health() {
        let router = create_router(AppState::new(Settings::default()));
        let (status, json) = call(router, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["ai_fallback"], false);
    }

    #[tokio::test]
    async fn test_parse_endpoint() {
        let router = create_router(AppState::new(Settings::default()));
        let (status, json) = call(
            router,
            "POST",
            "/api/commands/parse",
            Some(serde_json::json!({ "text": "ankur 8mm ka rate 65 kar do" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["command"]["intent"], "UPDATE_RATE");
        assert_eq!(json["command"]["items"][0]["brand"], "Ankur");
    }

    #[tokio::test]
    async fn test_validate_endpoint() {
        let router = create_router(AppState::new(Settings::default()));
        let (status, json) = call(
            router.clone(),
            "POST",
            "/api/commands/validate",
            Some(serde_json::json!({
                "command": {
                    "intent": "CREATE_ESTIMATE",
                    "items": [{"category": "tmt", "size": "10mm", "quantity": 5, "uom": "pieces"}]
                },
                "raw_text": "tmt 10mm 5 pieces",
                "parse_source": "rule_engine",
                "confidence": 0.8,
                "language": "en"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "DRAFT");
        assert_eq!(json["render_data"]["you_said"], "tmt 10mm 5 pieces");
        let weight = json["render_data"]["conversions"][0]["weight_kg"].as_f64().unwrap();
        assert!((weight - 37.04).abs() < 0.01);

        let (status, _) = call(
            router,
            "POST",
            "/api/commands/validate",
            Some(serde_json::json!({
                "command": {"intent": "CHECK_RATE"},
                "raw_text": "rate",
                "parse_source": "manual",
                "confidence": 1.5
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_run_then_answer_clarification() {
        let state = AppState::new(Settings::default());
        let router = create_router(state);

        let (status, json) = call(
            router.clone(),
            "POST",
            "/api/commands/run",
            Some(serde_json::json!({ "text": "rate kitna hai", "language": "en" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let clause = &json["clauses"][0];
        assert_eq!(clause["status"], "needs_clarification");
        let id = clause["draft"]["id"].as_str().unwrap().to_string();

        let (status, _) = call(
            router.clone(),
            "POST",
            &format!("/api/drafts/{}/confirm", id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, json) = call(
            router.clone(),
            "POST",
            &format!("/api/drafts/{}/clarifications", id),
            Some(serde_json::json!({
                "reason": "MISSING_BRAND",
                "item_index": 0,
                "value": "Ankur"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "DRAFT");

        let (status, json) = call(router, "POST", &format!("/api/drafts/{}/confirm", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "CONFIRMED");
    }

    #[tokio::test]
    async fn test_unknown_draft() {
        let router = create_router(AppState::new(Settings::default()));
        let uri = format!("/api/drafts/{}", Uuid::new_v4());
        let (status, json) = call(router, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(json["error"].as_str().unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn test_metrics_disabled_without_recorder() {
        let router = create_router(AppState::new(Settings::default()));
        let (status, _) = call(router, "GET", "/metrics", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
