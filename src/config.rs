//! Configuration module.
//!
//! Handles loading, validating, and merging `magic-card.toml`. Stock defaults
//! are the base layer; a user file only needs the keys it wants to override.
//!
//! ## Config File Location
//!
//! `magic-card.toml` is read from the directory given by `--config-dir`
//! (default: the current directory). A missing file means stock defaults.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [api]
//! # base = "https://cards.example.org"   # Document-level API base override
//! # origin = "https://cards.example.org" # Origin the cards are served from
//! local_endpoint = "http://127.0.0.1:5000"
//! # remote_endpoint = "https://api.example.org"
//! endpoint = "/api/magic"
//! # timeout_secs = 30
//! demo = false                # Offline demo content instead of the backend
//! server_side_ids = false     # Backend extracts ids; send a sentinel if empty
//!
//! [style]
//! accent = "#4c6fff"
//! density = "normal"          # normal | compact
//! highlights = "show"         # show | hide
//! layout = "standard"         # standard | quote | minimal
//! themes = ["nebula", "circuit", "prism", "aurora"]
//!
//! [export]
//! width = 640                 # CSS pixel width of exported cards
//! device_pixel_ratio = 1.0    # Clamped to 2..=4 when capturing
//! filename_prefix = "magic-card"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::types::StyleConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up in the config directory.
pub const CONFIG_FILE: &str = "magic-card.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Application configuration loaded from `magic-card.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Backend location and request behaviour.
    pub api: ApiConfig,
    /// Startup card style.
    pub style: StyleConfig,
    /// PNG export settings.
    pub export: ExportConfig,
}

impl AppConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.style
            .validate()
            .map_err(|e| ConfigError::Validation(format!("style: {e}")))?;
        if !self.api.endpoint.starts_with('/') {
            return Err(ConfigError::Validation(
                "api.endpoint must start with '/'".into(),
            ));
        }
        if self.api.timeout_secs == Some(0) {
            return Err(ConfigError::Validation(
                "api.timeout_secs must be positive".into(),
            ));
        }
        if self.export.width == 0 {
            return Err(ConfigError::Validation(
                "export.width must be non-zero".into(),
            ));
        }
        if self.export.filename_prefix.is_empty()
            || self
                .export
                .filename_prefix
                .contains(['/', '\\', '.'])
        {
            return Err(ConfigError::Validation(
                "export.filename_prefix must be a plain non-empty name".into(),
            ));
        }
        Ok(())
    }
}

/// Backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    /// Document-level API base. Wins over the origin-derived default but
    /// loses to an explicit `--api-base`.
    pub base: Option<String>,
    /// Origin the gallery is served from. Absent means a local session.
    pub origin: Option<String>,
    /// Backend used for local, loopback and `file:` origins.
    pub local_endpoint: String,
    /// Backend used for every other origin. Absent means same-origin.
    pub remote_endpoint: Option<String>,
    /// Request path appended to the resolved base.
    pub endpoint: String,
    /// Optional request timeout. Absent means wait for the backend.
    pub timeout_secs: Option<u64>,
    /// Serve fixed demo content instead of calling the backend.
    pub demo: bool,
    /// The backend extracts ids itself; an empty id is sent as a sentinel
    /// instead of being rejected as unsupported.
    pub server_side_ids: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base: None,
            origin: None,
            local_endpoint: "http://127.0.0.1:5000".to_string(),
            remote_endpoint: None,
            endpoint: "/api/magic".to_string(),
            timeout_secs: None,
            demo: false,
            server_side_ids: false,
        }
    }
}

/// PNG export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Fixed CSS pixel width of the captured card, independent of viewport.
    pub width: u32,
    /// Device pixel ratio of the target display; see [`effective_pixel_ratio`].
    pub device_pixel_ratio: f64,
    /// Exported files are named `<prefix>-<unix_ms>.png`.
    pub filename_prefix: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            width: 640,
            device_pixel_ratio: 1.0,
            filename_prefix: "magic-card".to_string(),
        }
    }
}

pub const MIN_PIXEL_RATIO: f64 = 2.0;
pub const MAX_PIXEL_RATIO: f64 = 4.0;

/// Resolve the capture pixel ratio from the device ratio.
///
/// - below 2 (or not a number) → 2, so exports stay sharp on low-DPI screens
/// - above 4 → 4, to bound file size
pub fn effective_pixel_ratio(device: f64) -> f64 {
    if device.is_finite() {
        device.clamp(MIN_PIXEL_RATIO, MAX_PIXEL_RATIO)
    } else {
        MIN_PIXEL_RATIO
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(AppConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `magic-card.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<AppConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: AppConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `magic-card.toml` in the given directory, on top of
/// stock defaults.
pub fn load_config(dir: &Path) -> Result<AppConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(dir)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `magic-card.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Magic Card Configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Backend
# ---------------------------------------------------------------------------
[api]
# API base resolution, first match wins:
#   1. --api-base / MAGIC_CARD_API_BASE
#   2. base (below)
#   3. origin: unset, file:, localhost, 127.0.0.1 -> local_endpoint
#              anything else -> remote_endpoint, or the origin itself
# base = "https://cards.example.org"
# origin = "https://cards.example.org"
local_endpoint = "http://127.0.0.1:5000"
# remote_endpoint = "https://api.example.org"

# Request path appended to the resolved base.
endpoint = "/api/magic"

# Give up on the backend after this many seconds. Unset = no timeout.
# timeout_secs = 30

# Serve fixed demo content instead of calling the backend.
demo = false

# The backend extracts content ids itself: links whose id cannot be read
# client-side are sent with a placeholder id instead of being rejected.
server_side_ids = false

# ---------------------------------------------------------------------------
# Card style (startup values; CLI flags override)
# ---------------------------------------------------------------------------
[style]
accent = "#4c6fff"

# normal | compact
density = "normal"

# show | hide
highlights = "show"

# standard | quote | minimal
layout = "standard"

# Themes rendered side by side, in order: nebula, circuit, prism, aurora
themes = ["nebula", "circuit", "prism", "aurora"]

# ---------------------------------------------------------------------------
# PNG export
# ---------------------------------------------------------------------------
[export]
# Card width in CSS pixels, fixed so exports don't depend on the viewport.
width = 640

# Device pixel ratio of the target display. Captures use it clamped to 2..4.
device_pixel_ratio = 1.0

# Files are written as <prefix>-<unix_ms>.png
filename_prefix = "magic-card"
"##
}

/// Generate CSS custom properties from the style config.
pub fn generate_style_css(style: &StyleConfig) -> String {
    format!(
        r#":root {{
    --accent: {accent};
}}"#,
        accent = style.accent,
    )
}
