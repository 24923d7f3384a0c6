//! Card background sources.

use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageReader, Rgb, RgbImage};

use crate::fallback::{Candidate, CandidateError, RankedFallback};
use crate::resize::stretch_to;

/// Flat fill used when no background image loads.
pub const FALLBACK_FILL: Rgb<u8> = Rgb([0xf3, 0xf4, 0xf6]);

#[derive(Debug, Clone)]
pub enum Background {
    Image(DynamicImage),
    Fill(Rgb<u8>),
}

impl Background {
    /// Render at exactly `width` x `height`. Images are stretched, not cropped.
    pub fn render(&self, width: u32, height: u32) -> RgbImage {
        match self {
            Background::Image(img) => stretch_to(img, width, height).to_rgb8(),
            Background::Fill(color) => RgbImage::from_pixel(width, height, *color),
        }
    }
}

/// Decode an image file, sniffing the format from its contents.
pub fn load_image(path: &Path) -> Result<DynamicImage, CandidateError> {
    if !path.is_file() {
        return Err(CandidateError::Missing(path.to_path_buf()));
    }
    ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| CandidateError::Decode(e.to_string()))
}

/// Background image stored on disk.
pub struct ImageFile {
    label: String,
    path: PathBuf,
}

impl ImageFile {
    pub fn new(label: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
        }
    }
}

impl Candidate<Background> for ImageFile {
    fn label(&self) -> &str {
        &self.label
    }

    fn load(&self) -> Result<Background, CandidateError> {
        load_image(&self.path).map(Background::Image)
    }
}

/// Always-available flat colour.
pub struct Fill(pub Rgb<u8>);

impl Candidate<Background> for Fill {
    fn label(&self) -> &str {
        "fill"
    }

    fn load(&self) -> Result<Background, CandidateError> {
        Ok(Background::Fill(self.0))
    }
}

/// User upload, then bundled default, then flat fill.
pub fn background_chain(
    user: Option<&Path>,
    bundled: Option<&Path>,
) -> RankedFallback<Background> {
    RankedFallback::new()
        .then_some(user.map(|p| ImageFile::new("user", p)))
        .then_some(bundled.map(|p| ImageFile::new("bundled", p)))
        .then(Fill(FALLBACK_FILL))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_files_fall_through_to_fill() {
        let chain = background_chain(
            Some(Path::new("/nonexistent/user_bg.png")),
            Some(Path::new("/nonexistent/back.png")),
        );
        let resolved = chain.resolve().unwrap();
        assert_eq!(resolved.source, "fill");
        assert!(matches!(resolved.value, Background::Fill(c) if c == FALLBACK_FILL));
    }

    #[test]
    fn corrupt_user_file_falls_through_to_bundled() {
        let dir = tempfile::tempdir().unwrap();
        let corrupt = dir.path().join("user_bg.png");
        std::fs::write(&corrupt, b"definitely not a png").unwrap();
        let bundled = dir.path().join("back.png");
        RgbImage::from_pixel(4, 4, Rgb([1, 2, 3])).save(&bundled).unwrap();

        let resolved = background_chain(Some(&corrupt), Some(&bundled))
            .resolve()
            .unwrap();
        assert_eq!(resolved.source, "bundled");
        assert_eq!(resolved.rank, 1);
    }

    #[test]
    fn render_stretches_to_exact_size() {
        let bg = Background::Image(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            3,
            7,
            Rgb([9, 9, 9]),
        )));
        let out = bg.render(50, 20);
        assert_eq!(out.dimensions(), (50, 20));
    }
}
