//! REST API handlers for researchers

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the server
    pub status: String,
    /// Server version
    pub version: String,
    /// Seconds since server started
    pub uptime_seconds: i64,
    /// Number of quiz sessions held in memory
    pub active_sessions: usize,
}

/// Health check endpoint
///
/// Returns server status, version, uptime, and active session count.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        active_sessions: state.session_count().await,
    })
}

/// Participation and dataset statistics
#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    /// Completed participants in the results file
    pub participants: usize,
    pub average_age: Option<f64>,
    pub genders: BTreeMap<String, usize>,
    /// Category names in quiz order
    pub categories: Vec<String>,
    /// Items across all categories
    pub items: usize,
    pub items_per_category: usize,
}

/// GET /api/stats - participation summary plus catalog size
pub async fn stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatsResponse>, (StatusCode, String)> {
    let summary = state
        .results
        .summary()
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(StatsResponse {
        participants: summary.participants,
        average_age: summary.average_age,
        genders: summary.genders,
        categories: state.catalog.category_names().map(str::to_string).collect(),
        items: state.catalog.len(),
        items_per_category: state.config.items_per_category,
    }))
}

/// Exposure of one item
#[derive(Debug, Serialize, Deserialize)]
pub struct ItemExposure {
    pub category: String,
    pub item_id: String,
    pub shown_count: u64,
}

/// Response for the exposure ledger
#[derive(Debug, Serialize, Deserialize)]
pub struct LedgerResponse {
    pub total_exposures: u64,
    pub items: Vec<ItemExposure>,
}

/// GET /api/ledger - per-item shown counts (participant ids are not exposed)
pub async fn ledger(State(state): State<Arc<AppState>>) -> Json<LedgerResponse> {
    let ledger = state.assigner.snapshot().await;

    Json(LedgerResponse {
        total_exposures: ledger.total_exposures(),
        items: ledger
            .iter()
            .map(|(category, item_id, record)| ItemExposure {
                category: category.to_string(),
                item_id: item_id.to_string(),
                shown_count: record.shown_count(),
            })
            .collect(),
    })
}
