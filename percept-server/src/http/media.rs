//! Media files for catalog items

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::AppState;

/// GET /media/:category/:item - serve the image of a catalog item.
///
/// Only files the catalog knows about are served, so arbitrary paths under
/// the dataset root are never reachable.
pub async fn media_handler(
    State(state): State<Arc<AppState>>,
    Path((category, item_id)): Path<(String, String)>,
) -> Response {
    let Some(item) = state.catalog.item(&category, &item_id) else {
        return (StatusCode::NOT_FOUND, "Unknown item").into_response();
    };

    match tokio::fs::read(&item.media_path).await {
        Ok(bytes) => {
            let mime = mime_guess::from_path(&item.media_path).first_or_octet_stream();
            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, mime.as_ref())
                .body(Body::from(bytes))
                .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
        }
        Err(e) => {
            warn!("Failed to read {}: {}", item.media_path.display(), e);
            (StatusCode::NOT_FOUND, "Media file unavailable").into_response()
        }
    }
}
