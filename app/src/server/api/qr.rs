//! QR card generation, preview and download API.

use axum::Json;
use axum::body::Body;
use axum::extract::{Multipart, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use card_engine::{CardError, Field};
use serde_json::{Value, json};

use crate::app::SharedState;
use crate::services::card::{RenderError, render_png, session_from_form};
use crate::services::session::Session;

use super::{ApiError, ApiResult, BACKGROUND_FIELD, background_err, err_json, read_form};

fn render_err(e: RenderError) -> ApiError {
    match e {
        RenderError::Card(CardError::DataTooLong { level }) => err_json(
            422,
            &format!(
                "data too long for selected error-correction level ({level}); \
                 lower the error correction or shorten the fields"
            ),
        ),
        other => {
            tracing::error!("Card render failed: {other}");
            err_json(500, &other.to_string())
        }
    }
}

fn session_json(session: &Session) -> Value {
    let fields: serde_json::Map<String, Value> = Field::ALL
        .iter()
        .map(|f| (f.key().to_string(), json!(session.fields.get(*f))))
        .collect();
    json!({
        "fields": fields,
        "custom_text": session.caption,
        "box_size": session.options.box_size,
        "error_level": session.options.error_correction.as_str(),
        "target_url": session.target.as_str(),
        "display_url": session.target.display(),
    })
}

/// POST /api/qr – Generate a card from the submitted form
///
/// Handles `delete_bg=1` and an uploaded background before composing.
pub async fn generate_qr(State(state): State<SharedState>, multipart: Multipart) -> ApiResult {
    let form = read_form(multipart, BACKGROUND_FIELD).await?;

    if form.fields.get("delete_bg").is_some_and(|v| v == "1") {
        state.backgrounds().delete().await.map_err(background_err)?;
    }
    if let Some(data) = form.file {
        state.backgrounds().save(data).await.map_err(background_err)?;
    }

    let session = session_from_form(&state, &form.fields);
    let png = render_png(&state, &session).await.map_err(render_err)?;

    tracing::info!(
        target_url = %session.target,
        box_size = session.options.box_size,
        level = %session.options.error_correction,
        bytes = png.len(),
        "QR card generated"
    );

    let mut body = session_json(&session);
    body["success"] = json!(true);
    body["image"] = json!(BASE64.encode(&png));
    state.session().replace(session).await;

    Ok(Json(body))
}

/// GET /api/qr/last – Values of the last submission
pub async fn get_last(State(state): State<SharedState>) -> ApiResult {
    let session = state
        .session()
        .current()
        .await
        .map_err(|e| err_json(404, &e.to_string()))?;
    Ok(Json(session_json(&session)))
}

/// GET /api/qr/preview.png – Last card, inline
pub async fn preview_qr(State(state): State<SharedState>) -> Result<Response, ApiError> {
    let session = last_session(&state).await?;
    serve_card(&state, &session, None).await
}

/// GET /api/qr/download – Last card as an attachment
pub async fn download_qr(State(state): State<SharedState>) -> Result<Response, ApiError> {
    let session = last_session(&state).await?;
    let filename = session.download_filename();
    serve_card(&state, &session, Some(&filename)).await
}

async fn last_session(state: &SharedState) -> Result<Session, ApiError> {
    state
        .session()
        .current()
        .await
        .map_err(|e| err_json(400, &e.to_string()))
}

async fn serve_card(
    state: &SharedState,
    session: &Session,
    attachment: Option<&str>,
) -> Result<Response, ApiError> {
    let png = render_png(state, session).await.map_err(render_err)?;

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "image/png")
        .header(header::CACHE_CONTROL, "no-store");
    if let Some(name) = attachment {
        builder = builder.header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{name}\""),
        );
    }
    builder
        .body(Body::from(png))
        .map_err(|e| err_json(500, &e.to_string()))
}
