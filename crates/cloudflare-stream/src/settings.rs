use std::path::Path;

use config::{Config, ConfigError};
use serde::{Deserialize, Serialize};

use crate::client::DEFAULT_BASE_URL;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// API details for cloudflare
    pub cloudflare: CloudflareSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudflareSettings {
    /// API token with Stream edit permissions
    pub api_token: String,

    /// Account used when a command doesn't name one
    #[serde(default)]
    pub account_id: Option<String>,

    /// API base, override for testing
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Overall request timeout
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Settings {
    /// Load settings from `path` (optional) overlaid with `APP__*` environment variables,
    /// e.g. `APP__CLOUDFLARE__API_TOKEN`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?
            .try_deserialize()
    }
}
