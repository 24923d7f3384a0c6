//! The "last submission" record shared by compose and download.

use std::sync::Arc;

use card_engine::{EncodedTarget, Field, FieldSet, QrOptions};
use tokio::sync::RwLock;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("No QR generated yet")]
    NothingToDownload,
}

/// Everything needed to reproduce the last card without resubmission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub fields: FieldSet,
    pub options: QrOptions,
    pub caption: String,
    pub target: EncodedTarget,
}

impl Session {
    /// Attachment name: the `name` field with spaces replaced by
    /// underscores, suffixed `_qr.png`.
    pub fn download_filename(&self) -> String {
        let name: String = self
            .fields
            .get(Field::Name)
            .chars()
            .filter(|c| !c.is_control() && !matches!(c, '"' | '\\' | '/'))
            .map(|c| if c == ' ' { '_' } else { c })
            .collect();
        let stem = if name.is_empty() { "qrcode" } else { name.as_str() };
        format!("{stem}_qr.png")
    }
}

/// Process-wide holder of the most recent [`Session`].
///
/// Empty until the first successful compose; every later compose replaces
/// the record wholesale.
#[derive(Clone, Default)]
pub struct SessionStore {
    current: Arc<RwLock<Option<Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn replace(&self, session: Session) {
        *self.current.write().await = Some(session);
    }

    pub async fn current(&self) -> Result<Session, SessionError> {
        self.current
            .read()
            .await
            .clone()
            .ok_or(SessionError::NothingToDownload)
    }
}
