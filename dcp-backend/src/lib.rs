// src/lib.rs
pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod extractors;
pub mod logging;
pub mod middleware;
pub mod repository;
pub mod service;
pub mod shared;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use types::ApiResponse;

use crate::api::handlers::{
    admin_handler::admin_router, auth_handler::auth_router,
    entreprise_handler::entreprise_router, public_handler::public_router,
};
use crate::api::AppState;
use crate::logging::{inject_request_context, logging_middleware};
use crate::middleware::auth::{cors_layer, security_headers_middleware};
use axum::{
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Router,
};
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

const REQUEST_TIMEOUT_SECS: u64 = 60;

async fn health_check_handler() -> &'static str {
    "OK"
}

/// 全ルーターとグローバルミドルウェアを組み立てる
pub fn build_app(app_state: AppState) -> Router {
    let config = app_state.config.clone();

    Router::new()
        .route("/health", get(health_check_handler))
        .nest("/api/auth", auth_router(app_state.clone()))
        .nest("/api/public", public_router(app_state.clone()))
        .nest("/api/entreprise", entreprise_router(app_state.clone()))
        .nest("/api/admin", admin_router(app_state.clone()))
        .layer(DefaultBodyLimit::max(config.server.body_limit))
        .layer(from_fn_with_state(app_state, security_headers_middleware))
        .layer(TimeoutLayer::new(Duration::from_secs(REQUEST_TIMEOUT_SECS)))
        .layer(cors_layer(&config.cors_allowed_origins))
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(logging_middleware))
        // 最外層でリクエストIDを付与する
        .layer(from_fn(inject_request_context))
}
