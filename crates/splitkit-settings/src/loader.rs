//! Settings loading: compiled defaults, then the settings file, then
//! `SPLITKIT_*` environment overrides.
//!
//! Every [`ClientSettings`] field has a default, so the file only names what
//! it changes. A field that is absent or `null` in the file keeps its
//! default; `splits` and `assignments` are taken from the file as a whole.

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::Result;
use crate::types::ClientSettings;

/// Accepted range for `SPLITKIT_VISITOR_TIMEOUT_MS`.
pub const VISITOR_TIMEOUT_RANGE: RangeInclusive<u64> = 100..=60_000;

/// Accepted range for `SPLITKIT_REQUEST_TIMEOUT_MS`.
pub const REQUEST_TIMEOUT_RANGE: RangeInclusive<u64> = 100..=600_000;

/// Resolve the path to the settings file (`~/.splitkit/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".splitkit").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<ClientSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// A missing file yields defaults; unreadable or invalid JSON is an error.
pub fn load_settings_from_path(path: &Path) -> Result<ClientSettings> {
    let mut settings = match std::fs::read_to_string(path) {
        Ok(content) => {
            debug!(?path, "loading settings file");
            parse_settings(&content)?
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(?path, "no settings file, using defaults");
            ClientSettings::default()
        }
        Err(e) => return Err(e.into()),
    };
    apply_env_overrides(&mut settings, |name| std::env::var(name).ok());
    Ok(settings)
}

/// Parse settings file contents over the defaults.
pub fn parse_settings(content: &str) -> Result<ClientSettings> {
    let mut value: Value = serde_json::from_str(content)?;
    if let Value::Object(fields) = &mut value {
        fields.retain(|_, field| !field.is_null());
    }
    Ok(serde_json::from_value(value)?)
}

/// Apply `SPLITKIT_*` overrides read through `lookup`.
///
/// Empty values are ignored. Out-of-range timeouts are ignored with a
/// warning and the file/default value stays.
pub fn apply_env_overrides(settings: &mut ClientSettings, lookup: impl Fn(&str) -> Option<String>) {
    let read = |name: &str| lookup(name).filter(|v| !v.is_empty());

    if let Some(url) = read("SPLITKIT_URL") {
        settings.url = url;
    }
    if let Some(ms) = read("SPLITKIT_VISITOR_TIMEOUT_MS")
        .and_then(|raw| timeout_ms("SPLITKIT_VISITOR_TIMEOUT_MS", &raw, &VISITOR_TIMEOUT_RANGE))
    {
        settings.visitor_fetch_timeout_ms = ms;
    }
    if let Some(ms) = read("SPLITKIT_REQUEST_TIMEOUT_MS")
        .and_then(|raw| timeout_ms("SPLITKIT_REQUEST_TIMEOUT_MS", &raw, &REQUEST_TIMEOUT_RANGE))
    {
        settings.request_timeout_ms = ms;
    }
    if let Some(path) = read("SPLITKIT_STORAGE_PATH") {
        settings.storage_path = path;
    }
}

fn timeout_ms(name: &str, raw: &str, range: &RangeInclusive<u64>) -> Option<u64> {
    match raw.parse::<u64>() {
        Ok(ms) if range.contains(&ms) => Some(ms),
        _ => {
            warn!(key = name, value = raw, "ignoring invalid timeout override");
            None
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
