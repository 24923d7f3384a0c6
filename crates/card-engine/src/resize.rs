//! Background resizing.

use image::DynamicImage;
use image::imageops::FilterType;
use tracing::debug;

/// Resize to exactly `width` x `height`, ignoring the source aspect ratio.
///
/// Returns the original image unchanged if it already has the target size.
pub fn stretch_to(img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    let (orig_w, orig_h) = (img.width(), img.height());

    if (orig_w, orig_h) == (width, height) {
        debug!(width, height, "Background already at card size, skipping resize");
        return img.clone();
    }

    let (width, height) = (width.max(1), height.max(1));
    debug!(orig_w, orig_h, width, height, "Stretching background to card size");

    img.resize_exact(width, height, FilterType::Triangle)
}
