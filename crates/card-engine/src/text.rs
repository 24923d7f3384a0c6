//! Caption rasterisation and placement.
//!
//! Captions are first rendered into a scratch coverage mask and trimmed to
//! their ink bounding box, so placement uses the pixels actually drawn
//! rather than nominal font metrics. This keeps centring exact for every
//! font tier.

use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};

use crate::bitmap_font;
use crate::font::{BITMAP_SCALE, CAPTION_FONT_SIZE, CaptionFont};

/// Caption colour.
pub const CAPTION_COLOR: Rgb<u8> = Rgb([0x1e, 0x3a, 0x8a]);

/// Ink of rendered text, trimmed to its bounding box.
#[derive(Debug, Clone)]
pub struct TextMask {
    pub mask: GrayImage,
    /// Position of the ink box relative to the pen origin.
    pub ink_offset: (i32, i32),
}

impl TextMask {
    pub fn width(&self) -> u32 {
        self.mask.width()
    }

    pub fn height(&self) -> u32 {
        self.mask.height()
    }
}

/// Render `text` with `font`. Returns `None` when nothing would be inked.
pub fn rasterize(font: &CaptionFont, text: &str) -> Option<TextMask> {
    match font {
        CaptionFont::Outline(f) => {
            let (w, h) = text_size(CAPTION_FONT_SIZE, f, text);
            // Room for glyphs whose outline overhangs the advance box.
            let pad = CAPTION_FONT_SIZE.ceil() as u32;
            // Drawn dark on white so any non-zero coverage leaves a mark.
            let mut scratch = GrayImage::from_pixel(w + 2 * pad, h + 2 * pad, Luma([255]));
            draw_text_mut(
                &mut scratch,
                Luma([0]),
                pad as i32,
                pad as i32,
                CAPTION_FONT_SIZE,
                f,
                text,
            );
            image::imageops::invert(&mut scratch);
            let (mask, x0, y0) = trim_to_ink(&scratch)?;
            Some(TextMask {
                mask,
                ink_offset: (x0 as i32 - pad as i32, y0 as i32 - pad as i32),
            })
        }
        CaptionFont::Bitmap => {
            let scratch = bitmap_font::rasterize(text, BITMAP_SCALE);
            let (mask, x0, y0) = trim_to_ink(&scratch)?;
            Some(TextMask {
                mask,
                ink_offset: (x0 as i32, y0 as i32),
            })
        }
    }
}

/// Crop a coverage mask to the bounding box of its non-zero pixels.
///
/// Returns the cropped mask and the top-left corner of the box.
pub fn trim_to_ink(mask: &GrayImage) -> Option<(GrayImage, u32, u32)> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (x, y, p) in mask.enumerate_pixels() {
        if p[0] == 0 {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        });
    }
    let (x0, y0, x1, y1) = bounds?;
    let cropped = image::imageops::crop_imm(mask, x0, y0, x1 - x0 + 1, y1 - y0 + 1).to_image();
    Some((cropped, x0, y0))
}

/// Top-left corner that centres `text` horizontally in `img` and vertically
/// in the band `band_top..band_top + band_height`.
///
/// Text wider than the image is pinned to the left edge.
pub fn centered_origin(img_width: u32, band_top: u32, band_height: u32, text: &TextMask) -> (u32, u32) {
    let x = img_width.saturating_sub(text.width()) / 2;
    let y = band_top + band_height.saturating_sub(text.height()) / 2;
    (x, y)
}

/// Draw `text` so its ink box starts at `(x, y)`. Pixels outside `img` are
/// clipped.
pub fn draw_caption(
    img: &mut RgbImage,
    font: &CaptionFont,
    text: &str,
    ink: &TextMask,
    (x, y): (u32, u32),
    color: Rgb<u8>,
) {
    match font {
        CaptionFont::Outline(f) => {
            let pen_x = x as i32 - ink.ink_offset.0;
            let pen_y = y as i32 - ink.ink_offset.1;
            draw_text_mut(img, color, pen_x, pen_y, CAPTION_FONT_SIZE, f, text);
        }
        CaptionFont::Bitmap => {
            for (dx, dy, lit) in ink.mask.enumerate_pixels() {
                let (tx, ty) = (x + dx, y + dy);
                if lit[0] != 0 && tx < img.width() && ty < img.height() {
                    img.put_pixel(tx, ty, color);
                }
            }
        }
    }
}
