//! Caption font resolution: brand font file, system font, built-in bitmap.

use std::path::{Path, PathBuf};

use ab_glyph::FontVec;
use tracing::debug;

use crate::fallback::{Candidate, CandidateError, RankedFallback};

/// Caption size in pixels for outline fonts.
pub const CAPTION_FONT_SIZE: f32 = 16.0;

/// Pixel multiplier for the built-in bitmap font (7 rows -> 14 px).
pub const BITMAP_SCALE: u32 = 2;

/// How deep to descend into system font directories.
const MAX_SEARCH_DEPTH: usize = 4;

pub enum CaptionFont {
    Outline(FontVec),
    Bitmap,
}

impl std::fmt::Debug for CaptionFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptionFont::Outline(_) => f.write_str("CaptionFont::Outline"),
            CaptionFont::Bitmap => f.write_str("CaptionFont::Bitmap"),
        }
    }
}

/// Parse a TTF/OTF file into an outline font.
pub fn load_font_file(path: &Path) -> Result<CaptionFont, CandidateError> {
    if !path.is_file() {
        return Err(CandidateError::Missing(path.to_path_buf()));
    }
    let data = std::fs::read(path)?;
    FontVec::try_from_vec(data)
        .map(CaptionFont::Outline)
        .map_err(|e| CandidateError::Decode(e.to_string()))
}

/// Font file at a known path (the bundled brand font).
pub struct FontFile {
    path: PathBuf,
}

impl FontFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Candidate<CaptionFont> for FontFile {
    fn label(&self) -> &str {
        "brand"
    }

    fn load(&self) -> Result<CaptionFont, CandidateError> {
        load_font_file(&self.path)
    }
}

/// Font looked up by file name in the platform font directories.
pub struct SystemFont {
    name: String,
    dirs: Vec<PathBuf>,
}

impl SystemFont {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_dirs(name, system_font_dirs())
    }

    pub fn with_dirs(name: impl Into<String>, dirs: Vec<PathBuf>) -> Self {
        Self {
            name: name.into(),
            dirs,
        }
    }

    /// Locate the font file. Names are matched case-insensitively.
    pub fn find(&self) -> Option<PathBuf> {
        let direct = Path::new(&self.name);
        if direct.is_absolute() && direct.is_file() {
            return Some(direct.to_path_buf());
        }
        let wanted = self.name.to_lowercase();
        self.dirs
            .iter()
            .find_map(|dir| find_file(dir, &wanted, MAX_SEARCH_DEPTH))
    }
}

impl Candidate<CaptionFont> for SystemFont {
    fn label(&self) -> &str {
        "system"
    }

    fn load(&self) -> Result<CaptionFont, CandidateError> {
        let path = self
            .find()
            .ok_or_else(|| CandidateError::Missing(PathBuf::from(&self.name)))?;
        debug!(path = %path.display(), "System font located");
        load_font_file(&path)
    }
}

/// The built-in bitmap font. Never fails.
pub struct Builtin;

impl Candidate<CaptionFont> for Builtin {
    fn label(&self) -> &str {
        "builtin"
    }

    fn load(&self) -> Result<CaptionFont, CandidateError> {
        Ok(CaptionFont::Bitmap)
    }
}

/// Brand font, then system font, then the built-in bitmap font.
pub fn font_chain(brand: Option<&Path>, system: Option<&str>) -> RankedFallback<CaptionFont> {
    RankedFallback::new()
        .then_some(brand.map(FontFile::new))
        .then_some(system.map(SystemFont::new))
        .then(Builtin)
}

/// Platform font directories, most specific first.
pub fn system_font_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    let home = std::env::var_os("HOME").map(PathBuf::from);

    if cfg!(target_os = "windows") {
        let root = std::env::var_os("WINDIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(r"C:\Windows"));
        dirs.push(root.join("Fonts"));
    } else if cfg!(target_os = "macos") {
        if let Some(home) = &home {
            dirs.push(home.join("Library/Fonts"));
        }
        dirs.push(PathBuf::from("/Library/Fonts"));
        dirs.push(PathBuf::from("/System/Library/Fonts"));
    } else {
        if let Some(home) = &home {
            dirs.push(home.join(".local/share/fonts"));
            dirs.push(home.join(".fonts"));
        }
        dirs.push(PathBuf::from("/usr/local/share/fonts"));
        dirs.push(PathBuf::from("/usr/share/fonts"));
    }

    dirs
}

fn find_file(dir: &Path, wanted_lower: &str, depth: usize) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    let mut subdirs = Vec::new();

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            subdirs.push(path);
        } else if path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.to_lowercase() == wanted_lower)
        {
            return Some(path);
        }
    }

    if depth == 0 {
        return None;
    }
    subdirs.sort();
    subdirs
        .iter()
        .find_map(|sub| find_file(sub, wanted_lower, depth - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_without_candidates_uses_builtin() {
        let resolved = font_chain(None, None).resolve().unwrap();
        assert_eq!(resolved.source, "builtin");
        assert!(matches!(resolved.value, CaptionFont::Bitmap));
    }

    #[test]
    fn missing_and_corrupt_fonts_fall_through() {
        let dir = tempfile::tempdir().unwrap();
        let corrupt = dir.path().join("Poppins-Bold.ttf");
        std::fs::write(&corrupt, b"not a font").unwrap();

        let chain = RankedFallback::new()
            .then(FontFile::new(&corrupt))
            .then(SystemFont::with_dirs("no-such-font.ttf", vec![dir.path().to_path_buf()]))
            .then(Builtin);
        let resolved = chain.resolve().unwrap();
        assert_eq!(resolved.rank, 2);
    }

    #[test]
    fn system_font_search_is_recursive_and_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("truetype").join("msttcorefonts");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("Arial.TTF"), b"stub").unwrap();

        let font = SystemFont::with_dirs("arial.ttf", vec![dir.path().to_path_buf()]);
        assert_eq!(font.find(), Some(nested.join("Arial.TTF")));
    }
}
