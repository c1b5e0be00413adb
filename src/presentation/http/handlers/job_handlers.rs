//! Job status/cancel endpoints. Translate/transcribe jobs created by
//! the search loop live in [`JobRepository`]; whisper-queue jobs are
//! additionally cancellable through [`WhisperQueue`].

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use uuid::Uuid;

use crate::domain::repositories::JobRepository;
use crate::infrastructure::jobs::WhisperQueue;

pub async fn get_job(
    State(job_repository): State<Arc<dyn JobRepository>>,
    Path(job_id): Path<Uuid>,
) -> impl IntoResponse {
    match job_repository.find_by_id(job_id).await {
        Ok(Some(job)) => (StatusCode::OK, Json(json!(job))),
        Ok(None) => (StatusCode::NOT_FOUND, Json(json!({ "error": "job not found" }))),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() }))),
    }
}

pub async fn cancel_whisper_job(
    State(whisper_queue): State<Arc<WhisperQueue>>,
    Path(job_id): Path<Uuid>,
) -> impl IntoResponse {
    match whisper_queue.cancel(job_id).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "cancelled": true }))),
        Err(e) => (StatusCode::CONFLICT, Json(json!({ "error": e.to_string() }))),
    }
}
