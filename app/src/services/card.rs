//! Card rendering glue: form values in, PNG bytes out.

use std::collections::HashMap;

use card_engine::{CardError, FieldSet, QrOptions};

use crate::app::SharedState;

use super::session::Session;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Card(#[from] CardError),
    #[error("Render task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Build a session from submitted form values. Unknown keys are ignored.
pub fn session_from_form(state: &SharedState, form: &HashMap<String, String>) -> Session {
    let value = |key: &str| form.get(key).map(String::as_str).unwrap_or("");
    let config = state.config();

    let fields = FieldSet::from_pairs(form.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    let options = QrOptions::parse(value("box_size"), value("error_level"), config.qr_defaults());
    let target = config.target_builder().encode(&fields);

    Session {
        fields,
        options,
        caption: value("custom_text").to_string(),
        target,
    }
}

/// Render the card for `session` as PNG.
///
/// Holds the background read guard for the whole render so a concurrent
/// upload cannot swap the file mid-read.
pub async fn render_png(state: &SharedState, session: &Session) -> Result<Vec<u8>, RenderError> {
    let assets = state.config().card_assets();
    let target = session.target.clone();
    let options = session.options;
    let caption = session.caption.clone();
    let guard = state.backgrounds().read_guard().await;

    let png = tokio::task::spawn_blocking(move || {
        let _guard = guard;
        let card = card_engine::render_card(&target, &options, &caption, &assets)?;
        tracing::debug!(
            width = card.width(),
            height = card.height(),
            background = card.background_source(),
            font = card.font_source(),
            "Card rendered"
        );
        card.to_png()
    })
    .await??;

    Ok(png)
}
