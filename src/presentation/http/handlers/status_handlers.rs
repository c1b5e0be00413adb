//! Daily stats status endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::domain::repositories::StatsRepository;

pub async fn today_stats(State(stats_repository): State<Arc<dyn StatsRepository>>) -> impl IntoResponse {
    let today = chrono::Utc::now().date_naive();
    match stats_repository.get(today).await {
        Ok(Some(stat)) => (StatusCode::OK, Json(json!(stat))),
        Ok(None) => (StatusCode::OK, Json(json!(crate::domain::entities::DailyStat::new(today)))),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() }))),
    }
}
