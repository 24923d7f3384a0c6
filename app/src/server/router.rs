use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use super::{api, assets};
use crate::app::SharedState;

/// Headroom for multipart framing and text fields on top of the image.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Create the axum router with all routes.
pub fn create_router(state: SharedState) -> Router {
    let upload_limit = state.config().max_upload_bytes + FORM_OVERHEAD_BYTES;

    Router::new()
        // --- Core ---
        .route("/status", get(status_handler))
        // --- QR card ---
        .route("/api/qr", post(api::qr::generate_qr))
        .route("/api/qr/last", get(api::qr::get_last))
        .route("/api/qr/preview.png", get(api::qr::preview_qr))
        .route("/api/qr/download", get(api::qr::download_qr))
        // --- Background ---
        .route(
            "/api/background",
            get(api::background::get_background)
                .post(api::background::upload_background)
                .delete(api::background::delete_background),
        )
        // --- Page ---
        .route("/", get(assets::index))
        .fallback(assets::fallback)
        // --- Middleware ---
        .layer(DefaultBodyLimit::max(upload_limit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn status_handler() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::path::Path;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use base64::Engine;
    use image::{ImageFormat, Rgb, RgbImage};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::create_router;
    use crate::app::SharedState;
    use crate::config::AppConfig;

    const BOUNDARY: &str = "qrcardtestboundary";

    fn test_state(dir: &Path) -> SharedState {
        test_state_with(dir, &[])
    }

    fn test_state_with(dir: &Path, vars: &[(&str, &str)]) -> SharedState {
        let config = AppConfig::from_lookup(dir.to_path_buf(), |key| match key {
            // Keep font resolution deterministic: built-in bitmap font only.
            "SYSTEM_FONT_NAME" => Some("no-such-font-for-tests.ttf".to_string()),
            _ => vars
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string()),
        });
        SharedState::new(config)
    }

    fn png_bytes(color: Rgb<u8>) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        RgbImage::from_pixel(6, 4, color)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    fn multipart(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((name, data)) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"bg.png\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn multipart_request(method: &str, uri: &str, body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn download_before_generate_is_client_error() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(test_state(dir.path()));

        let response = app.oneshot(get("/api/qr/download")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "No QR generated yet");
    }

    #[tokio::test]
    async fn generate_then_download() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let body = multipart(
            &[
                ("name", "Abilash Nickal"),
                ("message", "Hi"),
                ("image_url", ""),
                ("link1", ""),
                ("box_size", "6"),
                ("error_level", "L"),
                ("custom_text", ""),
            ],
            None,
        );
        let response = create_router(state.clone())
            .oneshot(multipart_request("POST", "/api/qr", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        assert_eq!(
            json["target_url"],
            format!(
                "{}?name=Abilash+Nickal&message=Hi",
                card_engine::target_url::DEFAULT_BASE_URL
            )
        );
        assert_eq!(json["box_size"], 6);
        assert_eq!(json["error_level"], "L");
        let png = base64::engine::general_purpose::STANDARD
            .decode(json["image"].as_str().unwrap())
            .unwrap();
        let preview = image::load_from_memory(&png).unwrap();

        let response = create_router(state)
            .oneshot(get("/api/qr/download"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Abilash_Nickal_qr.png\""
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let downloaded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(downloaded.to_rgb8(), preview.to_rgb8());
    }

    #[tokio::test]
    async fn field_values_are_encoded_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let body = multipart(&[("name", "  Abilash  "), ("message", "   ")], None);
        let response = create_router(test_state(dir.path()))
            .oneshot(multipart_request("POST", "/api/qr", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(
            json["target_url"],
            format!(
                "{}?name=++Abilash++&message=+++",
                card_engine::target_url::DEFAULT_BASE_URL
            )
        );
    }

    #[tokio::test]
    async fn oversized_upload_is_payload_too_large() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state_with(dir.path(), &[("MAX_UPLOAD_MB", "1")]);
        let big = vec![0u8; 3 * 1024 * 1024];
        let body = multipart(&[], Some((super::api::BACKGROUND_FIELD, big.as_slice())));

        let response = create_router(state.clone())
            .oneshot(multipart_request("POST", "/api/background", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(json_body(response).await["status"], "error");
        assert!(!state.backgrounds().path().exists());
    }

    #[tokio::test]
    async fn background_info_reflects_upload() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let response = create_router(state.clone())
            .oneshot(get("/api/background"))
            .await
            .unwrap();
        assert_eq!(json_body(response).await["background"]["has_background"], false);

        let body = multipart(
            &[],
            Some((super::api::BACKGROUND_FIELD, png_bytes(Rgb([9, 9, 9])).as_slice())),
        );
        let response = create_router(state.clone())
            .oneshot(multipart_request("POST", "/api/background", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = create_router(state)
            .oneshot(get("/api/background"))
            .await
            .unwrap();
        let json = json_body(response).await;
        assert_eq!(json["background"]["has_background"], true);
        assert_eq!(json["background"]["width"], 6);
        assert_eq!(json["background"]["height"], 4);
    }

    #[tokio::test]
    async fn data_too_long_is_unprocessable() {
        let dir = tempfile::tempdir().unwrap();
        let long = "x".repeat(3000);
        let body = multipart(&[("message", long.as_str()), ("error_level", "H")], None);
        let response = create_router(test_state(dir.path()))
            .oneshot(multipart_request("POST", "/api/qr", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = json_body(response).await;
        assert!(json["error"].as_str().unwrap().contains("(H)"));
    }

    #[tokio::test]
    async fn invalid_background_upload_is_rejected_and_existing_kept() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let field = super::api::BACKGROUND_FIELD;

        let good = multipart(&[], Some((field, png_bytes(Rgb([5, 6, 7])).as_slice())));
        let response = create_router(state.clone())
            .oneshot(multipart_request("POST", "/api/background", good))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let before = std::fs::read(state.backgrounds().path()).unwrap();

        let bad = multipart(&[], Some((field, &b"not an image"[..])));
        let response = create_router(state.clone())
            .oneshot(multipart_request("POST", "/api/background", bad))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(std::fs::read(state.backgrounds().path()).unwrap(), before);
    }

    #[tokio::test]
    async fn uploaded_background_shows_in_card_and_delete_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let color = Rgb([12, 200, 34]);

        let body = multipart(
            &[("name", "bg")],
            Some((super::api::BACKGROUND_FIELD, png_bytes(color).as_slice())),
        );
        let response = create_router(state.clone())
            .oneshot(multipart_request("POST", "/api/qr", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = create_router(state.clone())
            .oneshot(get("/api/qr/preview.png"))
            .await
            .unwrap();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let card = image::load_from_memory(&bytes).unwrap().to_rgb8();
        assert_eq!(*card.get_pixel(0, 0), color);
        assert_eq!(*card.get_pixel(card.width() - 1, card.height() - 1), color);

        let response = create_router(state.clone())
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/background")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["deleted"], true);

        let response = create_router(state)
            .oneshot(get("/api/qr/preview.png"))
            .await
            .unwrap();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let card = image::load_from_memory(&bytes).unwrap().to_rgb8();
        assert_eq!(*card.get_pixel(0, 0), card_engine::background::FALLBACK_FILL);
    }

    #[tokio::test]
    async fn delete_without_background_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let response = create_router(test_state(dir.path()))
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/background")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["deleted"], false);
    }

    #[tokio::test]
    async fn status_reports_ok() {
        let dir = tempfile::tempdir().unwrap();
        let response = create_router(test_state(dir.path()))
            .oneshot(get("/status"))
            .await
            .unwrap();
        assert_eq!(json_body(response).await["status"], "ok");
    }
}
