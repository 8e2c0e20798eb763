//! HTTP server module

mod api;
mod media;
mod pages;
pub mod render;
mod static_files;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::AppState;

pub use api::{HealthResponse, ItemExposure, LedgerResponse, StatsResponse};
pub use pages::{AnswerForm, StartForm};

/// Create the HTTP router with all routes configured
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(pages::setup))
        .route("/start", post(pages::start))
        .route("/quiz/:id", get(pages::question))
        .route("/quiz/:id/answer", post(pages::answer))
        .route("/quiz/:id/done", get(pages::done))
        .route("/quiz/:id/restart", post(pages::restart))
        .route("/media/:category/:item", get(media::media_handler))
        .route("/assets/*path", get(static_files::static_handler))
        .route("/api/health", get(api::health))
        .route("/api/stats", get(api::stats))
        .route("/api/ledger", get(api::ledger))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
