//! Static file serving for embedded page assets

use axum::{
    body::Body,
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use rust_embed::RustEmbed;

/// Stylesheet and other assets compiled into the binary
#[derive(RustEmbed)]
#[folder = "assets/"]
struct PageAssets;

/// Handler for serving files from embedded assets under `/assets/`
pub async fn static_handler(uri: Uri) -> impl IntoResponse {
    let path = uri.path().trim_start_matches("/assets/");

    serve_file(path).unwrap_or_else(|| (StatusCode::NOT_FOUND, "Asset not found").into_response())
}

/// Serve a file from embedded assets
fn serve_file(path: &str) -> Option<Response<Body>> {
    let file = PageAssets::get(path)?;

    // Determine content type from file extension
    let mime = mime_guess::from_path(path).first_or_octet_stream();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime.as_ref())
        .body(Body::from(file.data.into_owned()))
        .ok()
}
