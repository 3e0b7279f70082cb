use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, Request, State, rejection::JsonRejection},
    http::{HeaderValue, Method, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use log::{error, info};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::analyzer::Analyzer;
use crate::{Captions, is_video_id};
use crate::error::Error;
use crate::shape::AnalysisResponse;

#[derive(Clone)]
pub struct AppState {
    analyzer: Arc<Analyzer>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct CaptionsQuery {
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "en".to_string()
}

#[derive(Debug, Serialize)]
pub struct LanguagesResponse {
    pub languages: Vec<String>,
}

/// Error body is always `{"detail": "..."}`
#[derive(Debug)]
pub struct ApiError(Error);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Upstream { .. } | Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "detail": self.0.to_string() }))).into_response()
    }
}

pub fn router(analyzer: Arc<Analyzer>, allow_origin: HeaderValue) -> Router {
    Router::new()
        .route("/analyze", post(analyze))
        .route("/languages/{video_id}", get(languages))
        .route("/captions/{video_id}", get(captions))
        .route("/health", get(health))
        .layer(middleware::from_fn_with_state(allow_origin, cors))
        .with_state(AppState { analyzer })
}

pub async fn serve(addr: &str, app: Router) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
    }
    info!("Shutting down");
}

async fn cors(State(origin): State<HeaderValue>, request: Request, next: Next) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };

    let headers = response.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("*"));
    response
}

async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let Json(request) = payload
        .map_err(|e| Error::InvalidInput(e.body_text()))
        .inspect_err(|e| error!("Rejected analyze request: {e}"))?;

    let response = state
        .analyzer
        .analyze(&request.url)
        .await
        .inspect_err(|e| error!("Error processing video: {e}"))?;

    Ok(Json(response))
}

fn check_video_id(video_id: &str) -> Result<(), ApiError> {
    if is_video_id(video_id) {
        return Ok(());
    }
    error!("Rejected video ID {video_id:?}");
    Err(Error::InvalidInput("Invalid YouTube video ID".to_string()).into())
}

async fn languages(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> Result<Json<LanguagesResponse>, ApiError> {
    check_video_id(&video_id)?;
    let languages = state
        .analyzer
        .languages(&video_id)
        .await
        .inspect_err(|e| error!("Error getting languages for {video_id}: {e}"))?;

    Ok(Json(LanguagesResponse { languages }))
}

async fn captions(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    Query(query): Query<CaptionsQuery>,
) -> Result<Json<Captions>, ApiError> {
    check_video_id(&video_id)?;
    let captions = state
        .analyzer
        .captions(&video_id, &query.language)
        .await
        .inspect_err(|e| error!("Error getting captions for {video_id} ({}): {e}", query.language))?;

    Ok(Json(captions))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
