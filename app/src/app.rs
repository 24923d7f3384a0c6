use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::background::BackgroundStore;
use crate::services::session::SessionStore;

/// Application shared state accessible from axum handlers.
#[derive(Clone)]
pub struct SharedState {
    inner: Arc<SharedStateInner>,
}

struct SharedStateInner {
    /// Application configuration
    config: AppConfig,
    /// Last submitted card
    session: SessionStore,
    /// Uploaded background image
    backgrounds: BackgroundStore,
}

impl SharedState {
    pub fn new(config: AppConfig) -> Self {
        let backgrounds =
            BackgroundStore::new(config.user_background_path(), config.max_upload_bytes);

        Self {
            inner: Arc::new(SharedStateInner {
                config,
                session: SessionStore::new(),
                backgrounds,
            }),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    pub fn backgrounds(&self) -> &BackgroundStore {
        &self.inner.backgrounds
    }
}
