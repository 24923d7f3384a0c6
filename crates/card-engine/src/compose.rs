//! Card composition: background, QR symbol, border and caption.
//!
//! Layout:
//! ```text
//! +-------------------------------+
//! |            PADDING            |
//! |    +---------------------+    |
//! |    |      QR symbol      |    |
//! |    +---------------------+    |
//! |            PADDING            |
//! |       caption (centred)       |  CAPTION_BAND_HEIGHT
//! +-------------------------------+
//! ```

use std::io::Cursor;
use std::path::PathBuf;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use tracing::{debug, warn};

use crate::background::{Background, FALLBACK_FILL, background_chain};
use crate::error::CardError;
use crate::font::{CaptionFont, font_chain};
use crate::text::{self, CAPTION_COLOR};
use crate::{CAPTION_BAND_HEIGHT, DEFAULT_CAPTION, PADDING};

/// Colour of the stroke around the QR symbol.
pub const BORDER_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// Stroke width around the QR symbol.
pub const BORDER_WIDTH: u32 = 2;

/// Optional assets consulted while composing. Every entry may be missing or
/// unreadable; composition degrades to the next fallback.
#[derive(Debug, Clone, Default)]
pub struct CardAssets {
    /// Background uploaded for this session.
    pub user_background: Option<PathBuf>,
    /// Background shipped with the application.
    pub default_background: Option<PathBuf>,
    /// Brand font file.
    pub brand_font: Option<PathBuf>,
    /// System font file name, e.g. `arial.ttf`.
    pub system_font: Option<String>,
}

/// A finished card. Immutable once composed.
#[derive(Debug, Clone)]
pub struct Card {
    image: RgbImage,
    caption: String,
    background_source: String,
    font_source: String,
}

impl Card {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// Caption actually drawn.
    pub fn caption(&self) -> &str {
        &self.caption
    }

    /// Which background provider was used (`user`, `bundled` or `fill`).
    pub fn background_source(&self) -> &str {
        &self.background_source
    }

    /// Which font provider was used (`brand`, `system` or `builtin`).
    pub fn font_source(&self) -> &str {
        &self.font_source
    }

    /// Encode as PNG.
    pub fn to_png(&self) -> Result<Vec<u8>, CardError> {
        let mut buf = Cursor::new(Vec::new());
        self.image.write_to(&mut buf, ImageFormat::Png)?;
        Ok(buf.into_inner())
    }
}

/// Card dimensions for a QR symbol of the given size.
pub fn card_size(qr_width: u32, qr_height: u32) -> (u32, u32) {
    (
        qr_width + 2 * PADDING,
        qr_height + 2 * PADDING + CAPTION_BAND_HEIGHT,
    )
}

/// Compose a card around `qr`. Never fails: missing or corrupt assets fall
/// back to the next option.
pub fn compose(qr: &DynamicImage, caption: &str, assets: &CardAssets) -> Card {
    let font = font_chain(assets.brand_font.as_deref(), assets.system_font.as_deref())
        .resolve();
    let (font, font_source) = match font {
        Some(r) => (r.value, r.source),
        None => (CaptionFont::Bitmap, "builtin".to_string()),
    };
    compose_with_font(qr, caption, assets, &font, font_source)
}

/// [`compose`] with an already-resolved caption font.
pub fn compose_with_font(
    qr: &DynamicImage,
    caption: &str,
    assets: &CardAssets,
    font: &CaptionFont,
    font_source: impl Into<String>,
) -> Card {
    let (qr_w, qr_h) = (qr.width(), qr.height());
    let (card_w, card_h) = card_size(qr_w, qr_h);

    let background = background_chain(
        assets.user_background.as_deref(),
        assets.default_background.as_deref(),
    )
    .resolve();
    let (background, background_source) = match background {
        Some(r) => (r.value, r.source),
        None => (Background::Fill(FALLBACK_FILL), "fill".to_string()),
    };
    let mut card = background.render(card_w, card_h);

    image::imageops::replace(&mut card, &qr.to_rgb8(), PADDING as i64, PADDING as i64);
    draw_border(&mut card, qr_w, qr_h);

    let caption = if caption.trim().is_empty() {
        DEFAULT_CAPTION
    } else {
        caption
    };
    let band_top = qr_h + 2 * PADDING;
    match text::rasterize(font, caption) {
        Some(mask) => {
            let (x, y) = text::centered_origin(card_w, band_top, CAPTION_BAND_HEIGHT, &mask);
            text::draw_caption(&mut card, font, caption, &mask, (x, y), CAPTION_COLOR);
        }
        None => warn!(caption, "Caption produced no ink, skipping"),
    }

    debug!(
        card_w,
        card_h,
        background = %background_source,
        "Card composed"
    );

    Card {
        image: card,
        caption: caption.to_string(),
        background_source,
        font_source: font_source.into(),
    }
}

/// Stroke [`BORDER_WIDTH`] pixels immediately outside the QR region.
fn draw_border(card: &mut RgbImage, qr_w: u32, qr_h: u32) {
    for i in 1..=BORDER_WIDTH {
        let rect = Rect::at((PADDING - i) as i32, (PADDING - i) as i32)
            .of_size(qr_w + 2 * i, qr_h + 2 * i);
        draw_hollow_rect_mut(card, rect, BORDER_COLOR);
    }
}
