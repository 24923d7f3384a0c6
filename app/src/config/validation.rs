//! Setting value validation.

use regex::Regex;
use std::sync::LazyLock;

static RE_HTTP_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://[^\s?#]+$").unwrap());
static RE_ERROR_LEVEL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[LMQHlmqh]$").unwrap());

/// Validate a setting value. Returns `Ok(())` if valid, or an error message.
pub fn validate_setting(key: &str, value: &str) -> Result<(), String> {
    match key {
        "SERVER_HOST" => {
            if value.trim().is_empty() {
                return Err("must not be empty".into());
            }
        }
        "SERVER_PORT" => validate_int_range(value, 1, 65535)?,
        "TARGET_BASE_URL" => {
            if !RE_HTTP_URL.is_match(value) {
                return Err("must be an http(s) URL without query or fragment".into());
            }
        }
        "TARGET_KEY_STYLE" => {
            if value != "field" && value != "compact" {
                return Err("must be 'field' or 'compact'".into());
            }
        }
        "DEFAULT_BOX_SIZE" => validate_int_range(value, 1, card_engine::qr::MAX_BOX_SIZE as i64)?,
        "DEFAULT_ERROR_LEVEL" => {
            if !RE_ERROR_LEVEL.is_match(value) {
                return Err("must be one of L, M, Q, H".into());
            }
        }
        "MAX_UPLOAD_MB" => validate_int_range(value, 1, 100)?,
        _ => {}
    }
    Ok(())
}

fn validate_int_range(value: &str, min: i64, max: i64) -> Result<(), String> {
    let v: i64 = value.parse().map_err(|_| "must be an integer")?;
    if v < min || v > max {
        return Err(format!("must be between {min} and {max}"));
    }
    Ok(())
}
