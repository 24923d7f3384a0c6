//! REST API handlers grouped by domain.

pub mod background;
pub mod qr;

use std::collections::HashMap;

use axum::Json;
use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::services::background::BackgroundError;

type ApiError = (StatusCode, Json<Value>);
type ApiResult = Result<Json<Value>, ApiError>;

/// Multipart field carrying a background image.
pub const BACKGROUND_FIELD: &str = "background_image_file";

/// Standard error response.
pub fn err_json(status: u16, message: &str) -> ApiError {
    (
        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(json!({ "status": "error", "error": message })),
    )
}

fn background_err(e: BackgroundError) -> ApiError {
    let status = match e {
        BackgroundError::InvalidImage(_) | BackgroundError::Empty => 400,
        BackgroundError::FileTooLarge { .. } => 413,
        BackgroundError::Io(_) | BackgroundError::Task(_) => 500,
    };
    if status == 500 {
        tracing::error!("Background store failed: {e}");
    }
    err_json(status, &e.to_string())
}

/// Malformed forms are 400; bodies over the upload limit are 413.
fn multipart_err(e: MultipartError) -> ApiError {
    err_json(e.status().as_u16(), &e.body_text())
}

/// Text fields plus an optional uploaded file from a multipart form.
#[derive(Debug, Default)]
pub struct FormUpload {
    pub fields: HashMap<String, String>,
    pub file: Option<Vec<u8>>,
}

/// Read every part of `multipart`. The part named `file_field` is kept as
/// raw bytes when it carries a file name; every other part is read as text.
pub async fn read_form(mut multipart: Multipart, file_field: &str) -> Result<FormUpload, ApiError> {
    let mut form = FormUpload::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_err)?
    {
        let name = field.name().unwrap_or("").to_string();
        if name == file_field {
            let has_file = field.file_name().is_some_and(|f| !f.is_empty());
            let data = field
                .bytes()
                .await
                .map_err(multipart_err)?;
            if has_file {
                form.file = Some(data.to_vec());
            }
            continue;
        }
        let value = field
            .text()
            .await
            .map_err(multipart_err)?;
        form.fields.insert(name, value);
    }

    Ok(form)
}
