//! Runtime application configuration loaded from the environment.

use std::path::{Path, PathBuf};

use card_engine::{CardAssets, ErrorLevel, KeyStyle, QrOptions, TargetUrlBuilder};

use super::defaults::get_default;
use super::validation::validate_setting;

/// File name of the uploaded background inside the data directory.
pub const USER_BACKGROUND_FILE: &str = "user_bg.png";
const BRAND_FONT_FILE: &str = "Poppins-Bold.ttf";
const DEFAULT_BACKGROUND_FILE: &str = "back.png";

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_host: String,
    pub server_port: u16,
    pub data_dir: PathBuf,
    pub target_base_url: String,
    pub target_key_style: KeyStyle,
    pub default_box_size: u32,
    pub default_error_level: ErrorLevel,
    pub brand_font_path: PathBuf,
    pub system_font_name: String,
    pub default_background_path: PathBuf,
    pub max_upload_bytes: usize,
}

impl AppConfig {
    /// Load configuration from process environment variables.
    pub fn load(data_dir: PathBuf) -> Self {
        Self::from_lookup(data_dir, |key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`. Missing or invalid values fall
    /// back to their defaults with a warning.
    pub fn from_lookup(data_dir: PathBuf, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let g = |key: &str| -> String {
            let default = get_default(key).unwrap_or_default();
            match lookup(key) {
                Some(v) if !v.is_empty() => match validate_setting(key, &v) {
                    Ok(()) => v,
                    Err(e) => {
                        tracing::warn!("Invalid {key}={v:?} ({e}), using default {default:?}");
                        default.to_string()
                    }
                },
                _ => default.to_string(),
            }
        };

        let path_or = |key: &str, file: &str| -> PathBuf {
            let v = g(key);
            if v.is_empty() { data_dir.join(file) } else { PathBuf::from(v) }
        };

        let target_key_style = match g("TARGET_KEY_STYLE").as_str() {
            "compact" => KeyStyle::Compact,
            _ => KeyStyle::Field,
        };

        Self {
            server_host: g("SERVER_HOST"),
            server_port: parse_or(&g("SERVER_PORT"), 5000),
            target_base_url: g("TARGET_BASE_URL"),
            target_key_style,
            default_box_size: parse_or(&g("DEFAULT_BOX_SIZE"), card_engine::qr::DEFAULT_BOX_SIZE),
            default_error_level: ErrorLevel::parse(&g("DEFAULT_ERROR_LEVEL")).unwrap_or_default(),
            brand_font_path: path_or("BRAND_FONT_PATH", BRAND_FONT_FILE),
            system_font_name: g("SYSTEM_FONT_NAME"),
            default_background_path: path_or("DEFAULT_BACKGROUND_PATH", DEFAULT_BACKGROUND_FILE),
            max_upload_bytes: parse_or::<usize>(&g("MAX_UPLOAD_MB"), 20) * 1024 * 1024,
            data_dir,
        }
    }

    /// Defaults applied to empty or invalid form values.
    pub fn qr_defaults(&self) -> QrOptions {
        QrOptions {
            box_size: self.default_box_size,
            error_correction: self.default_error_level,
        }
    }

    pub fn target_builder(&self) -> TargetUrlBuilder {
        TargetUrlBuilder::new(&self.target_base_url, self.target_key_style)
    }

    pub fn user_background_path(&self) -> PathBuf {
        self.data_dir.join(USER_BACKGROUND_FILE)
    }

    /// Asset locations handed to the card composer.
    pub fn card_assets(&self) -> CardAssets {
        CardAssets {
            user_background: Some(self.user_background_path()),
            default_background: Some(self.default_background_path.clone()),
            brand_font: Some(self.brand_font_path.clone()),
            system_font: (!self.system_font_name.is_empty()).then(|| self.system_font_name.clone()),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

fn parse_or<T: std::str::FromStr>(s: &str, default: T) -> T {
    if s.is_empty() {
        return default;
    }
    s.parse().unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(vars: &[(&str, &str)]) -> AppConfig {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(PathBuf::from("/data"), |k| map.get(k).cloned())
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let config = config_with(&[]);
        assert_eq!(config.server_host, "127.0.0.1");
        assert_eq!(config.server_port, 5000);
        assert_eq!(config.target_base_url, card_engine::target_url::DEFAULT_BASE_URL);
        assert_eq!(config.target_key_style, KeyStyle::Field);
        assert_eq!(config.qr_defaults(), QrOptions::default());
        assert_eq!(config.brand_font_path, PathBuf::from("/data/Poppins-Bold.ttf"));
        assert_eq!(config.default_background_path, PathBuf::from("/data/back.png"));
        assert_eq!(config.user_background_path(), PathBuf::from("/data/user_bg.png"));
        assert_eq!(config.max_upload_bytes, 20 * 1024 * 1024);
    }

    #[test]
    fn overrides_are_applied() {
        let config = config_with(&[
            ("SERVER_PORT", "8123"),
            ("TARGET_KEY_STYLE", "compact"),
            ("DEFAULT_BOX_SIZE", "10"),
            ("DEFAULT_ERROR_LEVEL", "h"),
            ("BRAND_FONT_PATH", "/fonts/brand.ttf"),
        ]);
        assert_eq!(config.server_port, 8123);
        assert_eq!(config.target_key_style, KeyStyle::Compact);
        assert_eq!(config.default_box_size, 10);
        assert_eq!(config.default_error_level, ErrorLevel::H);
        assert_eq!(config.brand_font_path, PathBuf::from("/fonts/brand.ttf"));
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = config_with(&[
            ("SERVER_PORT", "not-a-port"),
            ("DEFAULT_BOX_SIZE", "999"),
            ("TARGET_BASE_URL", "javascript:alert(1)"),
        ]);
        assert_eq!(config.server_port, 5000);
        assert_eq!(config.default_box_size, 6);
        assert_eq!(config.target_base_url, card_engine::target_url::DEFAULT_BASE_URL);
    }

    #[test]
    fn system_font_defaults_to_arial() {
        let config = config_with(&[]);
        assert_eq!(config.card_assets().system_font.as_deref(), Some("arial.ttf"));
    }
}
