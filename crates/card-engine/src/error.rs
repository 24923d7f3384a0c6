//! Errors surfaced by card rendering.

use crate::qr::ErrorLevel;

#[derive(Debug, thiserror::Error)]
pub enum CardError {
    #[error("data too long for selected error-correction level ({level})")]
    DataTooLong { level: ErrorLevel },
    #[error("QR encode error: {0}")]
    Symbol(String),
    #[error("image encode error: {0}")]
    Encode(#[from] image::ImageError),
}
