//! Embedded form page (web/).

use axum::http::{StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use rust_embed::Embed;
use serde_json::json;

#[derive(Embed)]
#[folder = "web/"]
struct PageAssets;

/// Serve the form page for bare `/` requests.
pub async fn index() -> Response {
    serve_embedded::<PageAssets>("index.html").unwrap_or_else(|| not_found("/"))
}

/// Fallback handler: embedded assets, or a JSON 404 under `/api`.
pub async fn fallback(uri: Uri) -> Response {
    let request_path = uri.path();
    if is_api_path(request_path) {
        return not_found(request_path);
    }

    serve_embedded::<PageAssets>(request_path.trim_start_matches('/'))
        .unwrap_or_else(|| not_found(request_path))
}

fn is_api_path(path: &str) -> bool {
    path == "/api"
        || path
            .strip_prefix("/api")
            .is_some_and(|rest| rest.starts_with('/'))
}

fn not_found(path: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        axum::Json(json!({
            "error": "Not Found",
            "path": path,
        })),
    )
        .into_response()
}

fn serve_embedded<E: Embed>(path: &str) -> Option<Response> {
    let content = E::get(path)?;
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    Some(
        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, mime.as_ref())],
            content.data.to_vec(),
        )
            .into_response(),
    )
}
