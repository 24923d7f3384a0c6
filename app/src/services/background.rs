//! User-uploaded card background stored at a single well-known path.
//!
//! Uploads are decoded before anything touches disk, re-encoded as PNG into
//! a temporary sibling file and renamed over the target, so composition
//! only ever sees a complete old or a complete new file.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::ImageFormat;
use serde::Serialize;
use tokio::sync::{OwnedRwLockReadGuard, RwLock};

#[derive(Debug, thiserror::Error)]
pub enum BackgroundError {
    #[error("Uploaded file is not a readable image: {0}")]
    InvalidImage(String),
    #[error("Background image too large (max {max_mb}MB)")]
    FileTooLarge { max_mb: usize },
    #[error("Empty upload")]
    Empty,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BackgroundInfo {
    pub has_background: bool,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub file_size: Option<u64>,
    pub updated_at: Option<String>,
}

#[derive(Clone)]
pub struct BackgroundStore {
    path: PathBuf,
    max_bytes: usize,
    lock: Arc<RwLock<()>>,
}

impl BackgroundStore {
    pub fn new(path: PathBuf, max_bytes: usize) -> Self {
        Self {
            path,
            max_bytes,
            lock: Arc::new(RwLock::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Hold while reading the background so uploads and deletes wait.
    pub async fn read_guard(&self) -> OwnedRwLockReadGuard<()> {
        self.lock.clone().read_owned().await
    }

    /// Validate and store a new background, replacing any existing one.
    ///
    /// On error the current background is left untouched.
    pub async fn save(&self, data: Vec<u8>) -> Result<BackgroundInfo, BackgroundError> {
        if data.is_empty() {
            return Err(BackgroundError::Empty);
        }
        if data.len() > self.max_bytes {
            return Err(BackgroundError::FileTooLarge {
                max_mb: self.max_bytes / (1024 * 1024),
            });
        }

        let png = tokio::task::spawn_blocking(move || reencode_png(&data)).await??;

        let dir = self
            .path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        tokio::fs::create_dir_all(&dir).await?;
        let tmp = dir.join(format!(".upload-{}.tmp", uuid::Uuid::new_v4()));
        if let Err(e) = tokio::fs::write(&tmp, &png).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        let guard = self.lock.write().await;
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        drop(guard);

        tracing::info!(path = %self.path.display(), bytes = png.len(), "Background image saved");
        self.info().await
    }

    /// Remove the background. Returns whether one existed.
    pub async fn delete(&self) -> Result<bool, BackgroundError> {
        let _guard = self.lock.write().await;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                tracing::info!("Background image deleted");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No background image to delete");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn info(&self) -> Result<BackgroundInfo, BackgroundError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || read_info(&path)).await?
    }
}

fn read_info(path: &Path) -> Result<BackgroundInfo, BackgroundError> {
    let meta = match std::fs::metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(BackgroundInfo {
                has_background: false,
                width: None,
                height: None,
                file_size: None,
                updated_at: None,
            });
        }
        Err(e) => return Err(e.into()),
    };

    let dims = image::image_dimensions(path).ok();
    let updated_at = meta.modified().ok().map(|t| {
        let dt: chrono::DateTime<chrono::Utc> = t.into();
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    });
    Ok(BackgroundInfo {
        has_background: true,
        width: dims.map(|d| d.0),
        height: dims.map(|d| d.1),
        file_size: Some(meta.len()),
        updated_at,
    })
}

fn reencode_png(data: &[u8]) -> Result<Vec<u8>, BackgroundError> {
    let img =
        image::load_from_memory(data).map_err(|e| BackgroundError::InvalidImage(e.to_string()))?;
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| BackgroundError::InvalidImage(e.to_string()))?;
    Ok(buf.into_inner())
}
