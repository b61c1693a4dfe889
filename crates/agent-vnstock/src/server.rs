//! HTTP front door: `POST /api/chat` and `GET /api/health`

use crate::error::{Result, StockError};
use agent_core::QuestionAnswerer;
use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

#[derive(Clone)]
struct AppState {
    answerer: Arc<dyn QuestionAnswerer>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    pub question: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

/// Failures a handler turns into a `{"detail": ...}` body
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            Self::BadRequest(detail) => (StatusCode::BAD_REQUEST, detail),
            Self::Internal(detail) => (StatusCode::INTERNAL_SERVER_ERROR, detail),
        };
        (status, Json(ErrorResponse { detail })).into_response()
    }
}

/// Routes with CORS and request tracing
pub fn router(answerer: Arc<dyn QuestionAnswerer>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/chat", post(chat))
        .route("/api/health", get(health))
        .with_state(AppState { answerer })
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

async fn health() -> impl IntoResponse {
    Json(Health { status: "ok" })
}

async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> std::result::Result<Json<ChatResponse>, ApiError> {
    if request.question.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Câu hỏi không được để trống.".to_string(),
        ));
    }

    info!(answerer = state.answerer.name(), question = %request.question, "Received question");
    match state.answerer.answer(request.question).await {
        Ok(answer) => Ok(Json(ChatResponse { answer })),
        Err(err) => {
            error!(error = %err, "Failed to answer question");
            Err(ApiError::Internal(err.to_string()))
        }
    }
}

/// Bind `addr` and serve until Ctrl-C
pub async fn serve(addr: &str, app: Router) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| StockError::Server(format!("bind {addr} failed: {err}")))?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| StockError::Server(format!("server error: {err}")))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "Cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
