mod catalog;
mod extract;
mod fallback;
mod llm;
mod matching;
mod parse;
mod triage;
mod types;

use axum::{
    extract::{Path, State},
    http::{HeaderValue, Request, StatusCode},
    middleware::{from_fn, Next},
    response::Json,
    routing::{get, post},
    Router,
};
use rig::completion::Message;
use serde::Serialize;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn, Instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use triage_session::{
    ChatMessage, InMemorySessionStorage, Phase, Role, Session, SessionError, SessionStorage,
};
use uuid::Uuid;

use crate::extract::extract_symptoms;
use crate::matching::{match_tests, match_tests_capped};
use crate::types::{
    ErrorResponse, HealthRecommendRequest, HealthRecommendResponse, RecommendContextRequest,
    RecommendContextResponse, RecommendRequest, RecommendResponse,
};

#[derive(Clone)]
struct AppState {
    session_storage: Arc<dyn SessionStorage>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AdvanceResponse {
    session_id: String,
    phase: Phase,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
            details: None,
        }),
    )
}

fn internal_error(message: &str, details: Option<String>) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: message.to_string(),
            details,
        }),
    )
}

/// The 400 message is displayed verbatim by the kiosk UI
fn validate_symptoms(symptoms: Option<&str>) -> Result<String, ApiError> {
    match symptoms {
        Some(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
        _ => Err(bad_request(
            "Symptoms field is required and must be a non-empty string",
        )),
    }
}

fn missing_api_key_error() -> ApiError {
    internal_error(
        "Service configuration error: GEMINI_API_KEY is not set",
        None,
    )
}

/// Missing key is a per-request configuration error, not a startup failure
fn require_api_key() -> Result<String, ApiError> {
    llm::api_key().map_err(|_| {
        error!("GEMINI_API_KEY not set");
        missing_api_key_error()
    })
}

fn to_rig_history(messages: &[ChatMessage]) -> Vec<Message> {
    messages
        .iter()
        .map(|m| match m.role {
            Role::User => Message::user(m.content.clone()),
            Role::Assistant => Message::assistant(m.content.clone()),
        })
        .collect()
}

/// Initialize structured JSON tracing based on environment variables
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "triage_service=debug,triage_session=debug,tower_http=debug".into());

    match log_format.as_str() {
        "pretty" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_level(true),
                )
                .init();
        }
    }
}

/// Middleware to add a correlation ID to all requests
async fn correlation_id_middleware(
    mut request: Request<axum::body::Body>,
    next: Next,
) -> axum::response::Response {
    let correlation_id = Uuid::new_v4().to_string();

    request.headers_mut().insert(
        "x-correlation-id",
        HeaderValue::from_str(&correlation_id).unwrap(),
    );

    let span = tracing::info_span!("http_request", correlation_id = %correlation_id);
    next.run(request).instrument(span).await
}

async fn health_check() -> &'static str {
    "OK"
}

/// POST /api/yolo-recommend — stateless recommendation
async fn recommend(
    State(_state): State<AppState>,
    Json(request): Json<RecommendRequest>,
) -> Result<Json<RecommendResponse>, ApiError> {
    let text = validate_symptoms(request.symptoms.as_deref())?;
    let api_key = require_api_key()?;

    let symptoms = extract_symptoms(&text);
    let matched = match_tests_capped(&symptoms);
    let history = to_rig_history(&request.conversation_history);

    info!(
        symptom_count = symptoms.len(),
        matched_count = matched.len(),
        "processing stateless recommendation"
    );

    let outcome = triage::run_triage(&api_key, &text, &symptoms, &matched, history, &[])
        .await
        .map_err(|e| internal_error("Failed to parse model response", Some(e.to_string())))?;

    Ok(Json(RecommendResponse {
        symptoms,
        matched_tests_count: outcome.reply.recommendations.len(),
        recommendations: outcome.reply.recommendations,
        general_advice: outcome.reply.general_advice,
        urgency_level: outcome.reply.urgency_level,
        ai_generated: outcome.ai_generated,
    }))
}

/// POST /api/yolo-recommend-context — session-aware recommendation
async fn recommend_context(
    State(state): State<AppState>,
    Json(request): Json<RecommendContextRequest>,
) -> Result<Json<RecommendContextResponse>, ApiError> {
    let text = validate_symptoms(request.symptoms.as_deref())?;
    let api_key = require_api_key()?;

    let session_id = request
        .session_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    // An unknown id gets a fresh session rather than a 404
    let (mut session, existed) = match state.session_storage.get(&session_id).await {
        Ok(Some(session)) => (session, true),
        Ok(None) => {
            info!(session_id = %session_id, "creating new session");
            (Session::new(session_id.clone()), false)
        }
        Err(e) => {
            error!(session_id = %session_id, error = %e, "failed to load session");
            return Err(internal_error("Failed to load session", None));
        }
    };

    // A mid-conversation client can replay its transcript into a fresh session
    if !existed {
        for message in &request.conversation_history {
            match message.role {
                Role::User => {
                    session
                        .context
                        .add_user_message(message.content.clone())
                        .await
                }
                Role::Assistant => {
                    session
                        .context
                        .add_assistant_message(message.content.clone())
                        .await
                }
            }
        }
    }

    // Merge the client's view of accumulated symptoms, then this turn's
    // extraction; both are deduplicated into first-seen order
    session.add_symptoms(
        request
            .accumulated_symptoms
            .into_iter()
            .filter(|s| !s.trim().is_empty()),
    );
    let extracted = extract_symptoms(&text);
    session.add_symptoms(extracted.iter().cloned());

    if session.phase == Phase::Initial {
        session.advance_phase();
    }

    let history = session.context.rig_messages().await;
    session.context.add_user_message(text.clone()).await;

    let matched = match_tests(&session.symptoms);

    info!(
        session_id = %session.id,
        accumulated = session.symptoms.len(),
        matched_count = matched.len(),
        follow_up = request.is_follow_up || existed,
        "processing contextual recommendation"
    );

    let outcome = triage::run_triage(
        &api_key,
        &text,
        &session.symptoms,
        &matched,
        history,
        &session.recommended,
    )
    .await
    .map_err(|e| internal_error("Failed to parse model response", Some(e.to_string())))?;

    session.record_recommendations(
        outcome
            .reply
            .recommendations
            .iter()
            .map(|r| r.test_name.clone()),
    );
    session
        .context
        .add_assistant_message(outcome.reply.general_advice.clone())
        .await;

    if session.phase == Phase::Chat && !outcome.reply.recommendations.is_empty() {
        session.advance_phase();
    }

    let response = RecommendContextResponse {
        session_id: session.id.clone(),
        symptoms: extracted,
        accumulated_symptoms: session.symptoms.clone(),
        is_follow_up: request.is_follow_up || existed,
        phase: session.phase,
        matched_tests_count: outcome.reply.recommendations.len(),
        recommendations: outcome.reply.recommendations,
        general_advice: outcome.reply.general_advice,
        urgency_level: outcome.reply.urgency_level,
        ai_generated: outcome.ai_generated,
    };

    if let Err(e) = state.session_storage.save(session).await {
        error!(error = %e, "failed to save session");
        return Err(internal_error("Failed to save session", None));
    }

    Ok(Json(response))
}

/// POST /api/yolo-health/recommend — free-text guidance variant
async fn health_recommend(
    State(_state): State<AppState>,
    Json(request): Json<HealthRecommendRequest>,
) -> Result<Json<HealthRecommendResponse>, ApiError> {
    let text = validate_symptoms(request.symptoms.as_deref())?;
    let api_key = require_api_key()?;

    let symptoms = extract_symptoms(&text);
    let matched = match_tests_capped(&symptoms);

    let outcome = triage::run_health(&api_key, &text, &symptoms, &matched)
        .await
        .map_err(|e| internal_error("Failed to parse model response", Some(e.to_string())))?;

    Ok(Json(HealthRecommendResponse {
        symptoms,
        recommendations: outcome.reply.recommendations,
        next_steps: outcome.reply.next_steps,
        urgency_level: outcome.reply.urgency_level,
        ai_generated: outcome.ai_generated,
    }))
}

fn session_error_response(session_id: &str, e: SessionError) -> ApiError {
    match e {
        SessionError::SessionNotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Session not found: {session_id}"),
                details: None,
            }),
        ),
        e => {
            error!(session_id = %session_id, error = %e, "failed to load session");
            internal_error("Failed to load session", None)
        }
    }
}

async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Session>, ApiError> {
    state
        .session_storage
        .get_required(&session_id)
        .await
        .map(Json)
        .map_err(|e| session_error_response(&session_id, e))
}

/// DELETE /session/{id} — "start new assessment", idempotent
async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.session_storage.delete(&session_id).await.map_err(|e| {
        error!(session_id = %session_id, error = %e, "failed to delete session");
        internal_error("Failed to delete session", None)
    })?;
    info!(session_id = %session_id, "session discarded for new assessment");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /session/{id}/advance — kiosk UI confirms the current step
async fn advance_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<AdvanceResponse>, ApiError> {
    let mut session = state
        .session_storage
        .get_required(&session_id)
        .await
        .map_err(|e| session_error_response(&session_id, e))?;

    let phase = session.advance_phase();
    state.session_storage.save(session).await.map_err(|e| {
        error!(session_id = %session_id, error = %e, "failed to save session");
        internal_error("Failed to save session", None)
    })?;

    Ok(Json(AdvanceResponse {
        session_id,
        phase,
    }))
}

#[tokio::main]
async fn main() {
    init_tracing();

    // Surfaced per request as a configuration error, not a startup failure
    if llm::api_key().is_err() {
        warn!("GEMINI_API_KEY not set; recommendation routes will return configuration errors");
    }

    let session_storage: Arc<dyn SessionStorage> = Arc::new(InMemorySessionStorage::new());
    let state = AppState { session_storage };

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/api/yolo-recommend", post(recommend))
        .route("/api/yolo-recommend-context", post(recommend_context))
        .route("/api/yolo-health/recommend", post(health_recommend))
        .route("/session/{id}", get(get_session).delete(delete_session))
        .route("/session/{id}/advance", post(advance_session))
        .layer(from_fn(correlation_id_middleware))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state);

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(3000);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .unwrap();

    info!("Server running on http://0.0.0.0:{port}");
    info!("Available endpoints:");
    info!("  GET    /health                       - Health check");
    info!("  POST   /api/yolo-recommend           - Stateless test recommendation");
    info!("  POST   /api/yolo-recommend-context   - Session-aware recommendation");
    info!("  POST   /api/yolo-health/recommend    - Free-text health guidance");
    info!("  GET    /session/{{id}}                 - Inspect a session");
    info!("  DELETE /session/{{id}}                 - Start a new assessment");
    info!("  POST   /session/{{id}}/advance         - Advance the kiosk flow");

    axum::serve(listener, app).await.unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_blank_symptoms_are_rejected() {
        for input in [None, Some(""), Some("   ")] {
            let (status, body) = validate_symptoms(input).unwrap_err();
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(
                body.0.error,
                "Symptoms field is required and must be a non-empty string"
            );
        }
    }

    #[test]
    fn missing_api_key_maps_to_configuration_500() {
        let (status, body) = missing_api_key_error();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body.0.error,
            "Service configuration error: GEMINI_API_KEY is not set"
        );
    }

    #[test]
    fn unknown_session_maps_to_404() {
        let (status, body) = session_error_response(
            "ghost",
            SessionError::SessionNotFound("ghost".to_string()),
        );
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.0.error, "Session not found: ghost");
    }

    #[test]
    fn valid_symptoms_are_trimmed() {
        let text = validate_symptoms(Some("  fever and cough ")).unwrap();
        assert_eq!(text, "fever and cough");
    }

    #[test]
    fn history_conversion_preserves_order() {
        let messages = vec![
            ChatMessage::user("I feel dizzy"),
            ChatMessage::assistant("Since when?"),
        ];
        assert_eq!(to_rig_history(&messages).len(), 2);
    }
}
