//! All setting definitions with their default values.

use std::collections::HashMap;
use std::sync::LazyLock;

type DefTuple = (&'static str, &'static str, &'static str);

const DEFS: &[DefTuple] = &[
    ("SERVER_HOST", "127.0.0.1", "Address the HTTP server binds to"),
    ("SERVER_PORT", "5000", "Port the HTTP server binds to"),
    (
        "TARGET_BASE_URL",
        card_engine::target_url::DEFAULT_BASE_URL,
        "Profile page the QR code points at",
    ),
    ("TARGET_KEY_STYLE", "field", "Query key style: 'field' or 'compact'"),
    ("DEFAULT_BOX_SIZE", "6", "Pixels per QR module when the form leaves it empty"),
    ("DEFAULT_ERROR_LEVEL", "L", "Error correction when the form leaves it empty"),
    ("BRAND_FONT_PATH", "", "Caption font file (default: <data dir>/Poppins-Bold.ttf)"),
    ("SYSTEM_FONT_NAME", "arial.ttf", "System font file tried when the brand font is missing"),
    (
        "DEFAULT_BACKGROUND_PATH",
        "",
        "Bundled card background (default: <data dir>/back.png)",
    ),
    ("MAX_UPLOAD_MB", "20", "Largest accepted background upload in megabytes"),
];

/// A single setting definition.
#[derive(Debug, Clone)]
pub struct SettingDef {
    pub key: &'static str,
    pub default: &'static str,
    pub description: &'static str,
}

/// Global setting definitions indexed by key.
pub static DEFAULT_SETTINGS: LazyLock<HashMap<&'static str, SettingDef>> = LazyLock::new(|| {
    DEFS.iter()
        .map(|&(key, default, description)| {
            (
                key,
                SettingDef {
                    key,
                    default,
                    description,
                },
            )
        })
        .collect()
});

/// Get the default value for a setting key, or `None` if not defined.
pub fn get_default(key: &str) -> Option<&'static str> {
    DEFAULT_SETTINGS.get(key).map(|d| d.default)
}

/// Setting definitions in declaration order.
pub fn all_settings() -> impl Iterator<Item = &'static SettingDef> {
    DEFS.iter().filter_map(|(key, _, _)| DEFAULT_SETTINGS.get(key))
}
