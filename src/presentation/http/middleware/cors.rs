//! CORS Middleware
//!
//! Configures Cross-Origin Resource Sharing for the trigger/status API.

use tower_http::cors::{AllowOrigin, CorsLayer};
use axum::http::{header, Method};
use std::time::Duration;

/// Creates a predefined CORS layer
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |_, _| true))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
