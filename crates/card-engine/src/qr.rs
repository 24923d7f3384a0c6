//! QR symbol generation.

use std::fmt;

use image::{DynamicImage, GrayImage, Luma};
use qrcode::{EcLevel, QrCode, types::QrError};
use tracing::{debug, warn};

use crate::error::CardError;

/// Default pixels per QR module.
pub const DEFAULT_BOX_SIZE: u32 = 6;

/// Largest accepted pixels per module. Larger requests are clamped.
pub const MAX_BOX_SIZE: u32 = 40;

/// Quiet zone width in modules on each side of the symbol.
pub const QUIET_ZONE: u32 = 4;

/// QR error-correction tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ErrorLevel {
    #[default]
    L,
    M,
    Q,
    H,
}

impl ErrorLevel {
    /// Parse `L`/`M`/`Q`/`H` (case-insensitive, surrounding whitespace ignored).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "L" => Some(Self::L),
            "M" => Some(Self::M),
            "Q" => Some(Self::Q),
            "H" => Some(Self::H),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::L => "L",
            Self::M => "M",
            Self::Q => "Q",
            Self::H => "H",
        }
    }
}

impl fmt::Display for ErrorLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ErrorLevel> for EcLevel {
    fn from(level: ErrorLevel) -> Self {
        match level {
            ErrorLevel::L => EcLevel::L,
            ErrorLevel::M => EcLevel::M,
            ErrorLevel::Q => EcLevel::Q,
            ErrorLevel::H => EcLevel::H,
        }
    }
}

/// Validated symbol rendering options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QrOptions {
    pub box_size: u32,
    pub error_correction: ErrorLevel,
}

impl Default for QrOptions {
    fn default() -> Self {
        Self {
            box_size: DEFAULT_BOX_SIZE,
            error_correction: ErrorLevel::default(),
        }
    }
}

impl QrOptions {
    /// Build options, replacing a box size below 1 with `defaults.box_size`
    /// and clamping anything above [`MAX_BOX_SIZE`].
    pub fn new(box_size: i64, error_correction: ErrorLevel, defaults: QrOptions) -> Self {
        let box_size = if box_size < 1 {
            debug!(box_size, "Box size below 1, using default");
            defaults.box_size
        } else if box_size > i64::from(MAX_BOX_SIZE) {
            warn!(box_size, max = MAX_BOX_SIZE, "Box size too large, clamping");
            MAX_BOX_SIZE
        } else {
            box_size as u32
        };

        Self {
            box_size,
            error_correction,
        }
    }

    /// Parse raw form values. Empty or unparsable input falls back to
    /// `defaults`.
    pub fn parse(box_size_raw: &str, level_raw: &str, defaults: QrOptions) -> Self {
        let box_size = box_size_raw
            .trim()
            .parse::<i64>()
            .unwrap_or(i64::from(defaults.box_size));
        let level = ErrorLevel::parse(level_raw).unwrap_or(defaults.error_correction);
        Self::new(box_size, level, defaults)
    }

    /// [`QrOptions::parse`] against the built-in defaults.
    pub fn from_form(box_size_raw: &str, level_raw: &str) -> Self {
        Self::parse(box_size_raw, level_raw, Self::default())
    }
}

/// Render `data` as a QR symbol.
///
/// The smallest QR version that fits `data` at the requested level is
/// selected. Each module becomes `box_size` x `box_size` pixels and a
/// [`QUIET_ZONE`]-module white border surrounds the symbol.
pub fn make_symbol(data: &str, options: &QrOptions) -> Result<DynamicImage, CardError> {
    let level = options.error_correction;
    let code = QrCode::with_error_correction_level(data.as_bytes(), level.into()).map_err(
        |e| match e {
            QrError::DataTooLong => CardError::DataTooLong { level },
            other => CardError::Symbol(other.to_string()),
        },
    )?;

    let modules = code.to_colors();
    let module_count = code.width() as u32;
    let scale = options.box_size.max(1);
    let img_size = (module_count + 2 * QUIET_ZONE) * scale;

    let mut img = GrayImage::from_pixel(img_size, img_size, Luma([255u8]));

    for (i, color) in modules.iter().enumerate() {
        if *color != qrcode::Color::Dark {
            continue;
        }
        let x = (i as u32) % module_count + QUIET_ZONE;
        let y = (i as u32) / module_count + QUIET_ZONE;
        for dx in 0..scale {
            for dy in 0..scale {
                img.put_pixel(x * scale + dx, y * scale + dy, Luma([0u8]));
            }
        }
    }

    debug!(
        modules = module_count,
        box_size = scale,
        level = %level,
        size = img_size,
        "QR symbol rendered"
    );

    Ok(DynamicImage::ImageLuma8(img))
}
