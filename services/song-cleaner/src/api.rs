//!
//! src/api.rs
//!
//! Http routes: a health check and the cleaned song listing
//!

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::errors::CleanerError;
use crate::fetch::{Source, SourceLoader};
use crate::pipeline;
use crate::types::CleanedRecord;

/// Shared across handlers, nothing in here is mutated per request
#[derive(Clone, Debug)]
pub struct AppState {
    pub loader: SourceLoader,
    pub source: Source,
}

impl AppState {
    pub fn new(loader: SourceLoader, source: Source) -> Self {
        Self { loader, source }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

/// GET /
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "saludable",
        message: "Servicio en ejecución",
    })
}

/// GET /cleaned_songs
pub async fn cleaned_songs(State(state): State<AppState>) ->
    Result<Json<Vec<CleanedRecord>>, ApiError> {
    let records = pipeline::run(&state.loader, &state.source).await?;
    info!(records = records.len(), "cleaned_songs.ok");
    Ok( Json(records) )
}

/// Any pipeline failure, rendered as a 500 with a `detail` message
#[derive(Debug)]
pub struct ApiError(CleanerError);

impl From<CleanerError> for ApiError {
    fn from(e: CleanerError) -> Self { ApiError(e) }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!(error = %self.0, detail = ?self.0, "cleaned_songs.failed");
        let body = json!({
            "detail": format!("Error al procesar los datos: {}", self.0)
        });
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/cleaned_songs", get(cleaned_songs))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
