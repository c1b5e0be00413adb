//! Trigger endpoints for the wanted-item pipeline: catalog scan, and
//! search/translate for one item or a bounded batch.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::application::{BatchSearchWantedUseCase, ScanWantedUseCase, SearchWantedItemUseCase, TranslateFileUseCase};
use crate::domain::entities::{ItemType, SubtitleKind};

pub async fn trigger_scan(State(use_case): State<Arc<ScanWantedUseCase>>) -> impl IntoResponse {
    match use_case.execute().await {
        Ok(summary) => (
            StatusCode::OK,
            Json(json!({ "inserted": summary.inserted, "already_known": summary.already_known })),
        ),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() }))),
    }
}

#[derive(Deserialize)]
pub struct BatchSearchParams {
    #[serde(default = "default_max_items")]
    max_items: usize,
}

fn default_max_items() -> usize {
    50
}

pub async fn trigger_batch_search(
    State(use_case): State<Arc<BatchSearchWantedUseCase>>,
    Json(params): Json<BatchSearchParams>,
) -> impl IntoResponse {
    match use_case.execute(params.max_items).await {
        Ok(results) => {
            let succeeded = results.iter().filter(|r| r.is_ok()).count();
            let failed = results.len() - succeeded;
            (StatusCode::OK, Json(json!({ "processed": results.len(), "succeeded": succeeded, "failed": failed })))
        }
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() }))),
    }
}

pub async fn trigger_search_one(
    State(use_case): State<Arc<SearchWantedItemUseCase>>,
    Path(wanted_item_id): Path<Uuid>,
) -> impl IntoResponse {
    match use_case.execute(wanted_item_id).await {
        Ok(outcome) => (StatusCode::OK, Json(json!({ "outcome": format!("{outcome:?}") }))),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() }))),
    }
}

#[derive(Deserialize)]
pub struct TranslateFileParams {
    item_type: ItemType,
    video_path: String,
    language: String,
    #[serde(default = "default_subtitle_kind")]
    subtitle_kind: SubtitleKind,
}

fn default_subtitle_kind() -> SubtitleKind {
    SubtitleKind::Translated
}

pub async fn trigger_translate_file(
    State(use_case): State<Arc<TranslateFileUseCase>>,
    Json(params): Json<TranslateFileParams>,
) -> impl IntoResponse {
    match use_case.execute(params.item_type, params.video_path, params.language, params.subtitle_kind).await {
        Ok(outcome) => (StatusCode::OK, Json(json!({ "outcome": format!("{outcome:?}") }))),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() }))),
    }
}
