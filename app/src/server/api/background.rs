//! Background image management API.

use axum::Json;
use axum::extract::{Multipart, State};
use serde_json::json;

use crate::app::SharedState;

use super::{ApiResult, BACKGROUND_FIELD, background_err, err_json, read_form};

/// GET /api/background – Current background info
pub async fn get_background(State(state): State<SharedState>) -> ApiResult {
    let info = state.backgrounds().info().await.map_err(background_err)?;
    Ok(Json(json!({ "background": info })))
}

/// POST /api/background – Upload a background image
pub async fn upload_background(
    State(state): State<SharedState>,
    multipart: Multipart,
) -> ApiResult {
    let form = read_form(multipart, BACKGROUND_FIELD).await?;
    let data = form
        .file
        .ok_or_else(|| err_json(400, "No background image provided"))?;
    let info = state.backgrounds().save(data).await.map_err(background_err)?;
    Ok(Json(json!({ "success": true, "background": info })))
}

/// DELETE /api/background – Remove the background image
pub async fn delete_background(State(state): State<SharedState>) -> ApiResult {
    let existed = state.backgrounds().delete().await.map_err(background_err)?;
    Ok(Json(json!({ "success": true, "deleted": existed })))
}
