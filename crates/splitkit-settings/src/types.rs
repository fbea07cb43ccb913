//! Settings type definitions.
//!
//! Field names are camelCase in JSON. Every field has a default, so a
//! partial file is valid.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use splitkit_core::split::SplitConfig;
use splitkit_core::{Assignment, SplitRegistry};

use crate::errors::{Result, SettingsError};

/// Client configuration.
///
/// # JSON Format
///
/// ```json
/// {
///   "url": "https://testtrack.example.com",
///   "visitorFetchTimeoutMs": 5000,
///   "splits": {
///     "jabba": { "weights": { "cgi": 50, "puppet": 50 } },
///     "dark_mode_enabled": { "weights": { "false": 0, "true": 100 }, "featureGate": true }
///   }
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientSettings {
    /// Base URL of the remote assignment service.
    pub url: String,
    /// Timeout for the initial visitor fetch, in milliseconds.
    pub visitor_fetch_timeout_ms: u64,
    /// Timeout for every other request, in milliseconds.
    pub request_timeout_ms: u64,
    /// File the default storage provider keeps the visitor ID in.
    pub storage_path: String,
    /// Bundled split registry. `None` leaves the registry unloaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub splits: Option<BTreeMap<String, SplitConfig>>,
    /// Bundled assignments. When present the visitor is built from these
    /// without fetching it from the service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignments: Option<Vec<Assignment>>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:3000".to_string(),
            visitor_fetch_timeout_ms: 5000,
            request_timeout_ms: 30_000,
            storage_path: default_storage_path().to_string_lossy().into_owned(),
            splits: None,
            assignments: None,
        }
    }
}

impl ClientSettings {
    /// Build the split registry from the bundled splits.
    pub fn split_registry(&self) -> Result<SplitRegistry> {
        match &self.splits {
            None => Ok(SplitRegistry::Unloaded),
            Some(splits) => SplitRegistry::from_config(splits)
                .map_err(|e| SettingsError::InvalidValue(e.to_string())),
        }
    }

    /// Visitor fetch timeout as a [`Duration`].
    pub fn visitor_fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.visitor_fetch_timeout_ms)
    }

    /// General request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}

fn default_storage_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".splitkit").join("visitor.json")
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = ClientSettings::default();
        assert_eq!(settings.visitor_fetch_timeout_ms, 5000);
        assert!(settings.storage_path.ends_with("visitor.json"));
        assert!(settings.splits.is_none());
    }

    #[test]
    fn no_splits_means_unloaded_registry() {
        let registry = ClientSettings::default().split_registry().unwrap();
        assert!(!registry.is_loaded());
    }

    #[test]
    fn empty_splits_means_loaded_registry() {
        let settings = ClientSettings {
            splits: Some(BTreeMap::new()),
            ..ClientSettings::default()
        };
        let registry = settings.split_registry().unwrap();
        assert!(registry.is_loaded());
        assert!(registry.is_empty());
    }

    #[test]
    fn split_without_variants_is_invalid() {
        let json = serde_json::json!({"splits": {"jabba": {"weights": {}}}});
        let settings: ClientSettings = serde_json::from_value(json).unwrap();
        let err = settings.split_registry().unwrap_err();
        assert!(matches!(err, SettingsError::InvalidValue(_)));
    }

    #[test]
    fn base_url_trims_trailing_slash() {
        let settings = ClientSettings {
            url: "https://tt.example.com/".to_string(),
            ..ClientSettings::default()
        };
        assert_eq!(settings.base_url(), "https://tt.example.com");
    }

    #[test]
    fn camel_case_round_trip_omits_absent_sections() {
        let json = serde_json::to_value(ClientSettings::default()).unwrap();
        assert!(json.get("visitorFetchTimeoutMs").is_some());
        assert!(json.get("splits").is_none());
        assert!(json.get("assignments").is_none());
    }
}
