//! QR card rendering pipeline.
//!
//! Builds a deterministic target URL from profile fields, renders it as a QR
//! symbol, and composites the symbol onto a captioned background card.

pub mod background;
pub mod bitmap_font;
pub mod compose;
pub mod error;
pub mod fallback;
pub mod font;
pub mod qr;
pub mod resize;
pub mod target_url;
pub mod text;

// Re-exports for convenience
pub use compose::{Card, CardAssets, compose};
pub use error::CardError;
pub use qr::{ErrorLevel, QrOptions, make_symbol};
pub use target_url::{EncodedTarget, Field, FieldSet, KeyStyle, TargetUrlBuilder, encode};

/// Space around the QR symbol on every side, in pixels.
pub const PADDING: u32 = 30;

/// Height of the caption band below the QR symbol, in pixels.
pub const CAPTION_BAND_HEIGHT: u32 = 40;

/// Caption shown when the caller supplies none.
pub const DEFAULT_CAPTION: &str = "Scan Me!";

/// Render a finished card for an already-encoded target.
///
/// Fails only when the target does not fit any QR version at the requested
/// error-correction level.
pub fn render_card(
    target: &EncodedTarget,
    options: &QrOptions,
    caption: &str,
    assets: &CardAssets,
) -> Result<Card, CardError> {
    let symbol = make_symbol(target.as_str(), options)?;
    Ok(compose(&symbol, caption, assets))
}
