//! # splitkit-settings
//!
//! Client configuration with layered sources.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults** - [`ClientSettings::default()`]
//! 2. **Settings file** - JSON, fields present replace defaults
//! 3. **Environment variables** - `SPLITKIT_*` overrides (highest priority)
//!
//! There is no process-wide settings instance. Load a [`ClientSettings`]
//! once and hand it to the session that owns it.
//!
//! # Usage
//!
//! ```no_run
//! use splitkit_settings::{load_settings, ClientSettings};
//!
//! let settings = load_settings().unwrap_or_default();
//! println!("service: {}", settings.url);
//! ```

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{apply_env_overrides, load_settings, load_settings_from_path, parse_settings, settings_path};
pub use types::ClientSettings;
