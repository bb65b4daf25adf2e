#![forbid(unsafe_code)]

//! JSON bridge configuration supplied by the loader page.
//!
//! [`BridgeConfig::from_json`] accepts the JSON document the page passes to
//! `bridge_init`. Every field has a default, so `{}` (or an empty string)
//! configures a bridge with the stock element ids and no prefetched packs.
//!
//! This parser lives in `brkbridge-core` (not `brkbridge-web`) so loader-side
//! tooling can validate a config without pulling in web-sys/js-sys. It is
//! feature-gated behind `config`.

use serde::Deserialize;

/// Errors from parsing a bridge config document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Malformed JSON.
    Json(String),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Json(msg) => write!(f, "config parse error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Loader-supplied bridge configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BridgeConfig {
    /// DOM id of the multi-select file input to listen on.
    #[serde(default = "default_file_input_id")]
    pub file_input_id: String,
    /// DOM id of the container that receives catalog rows.
    #[serde(default = "default_catalog_id")]
    pub catalog_id: String,
    /// Pack names fetched relative to the page origin at startup.
    #[serde(default)]
    pub default_packs: Vec<String>,
    /// Auto-stage a picked file when it was the only one selected.
    #[serde(default = "default_autoload_single")]
    pub autoload_single: bool,
}

fn default_file_input_id() -> String {
    "fileInput".to_owned()
}

fn default_catalog_id() -> String {
    "levels".to_owned()
}

fn default_autoload_single() -> bool {
    true
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            file_input_id: default_file_input_id(),
            catalog_id: default_catalog_id(),
            default_packs: Vec::new(),
            autoload_single: default_autoload_single(),
        }
    }
}

impl BridgeConfig {
    /// Parse a config document. Blank input means "all defaults".
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(json).map_err(|err| ConfigError::Json(err.to_string()))
    }
}
