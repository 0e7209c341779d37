use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::registry::normalize_path;

/// Settings of the playground: where it is mounted and what it exposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlaygroundConfig {
    /// Path of the discovery endpoint. This service is left out of its own listing.
    pub mount_path: String,
    /// Path of the HTML landing page; the explorer lives under `<ui_path>/explorer/`.
    pub ui_path: String,
    /// Include each service's schema in the discovery listing.
    pub expose_schemas: bool,
    /// Answer cross-origin requests.
    pub cors: bool,
    pub title: String,
    pub description: String,
    pub version: String,
    /// Base URL the explorer sends requests to; empty means the serving origin.
    pub api_url: String,
    pub authentication: AuthenticationConfig,
}

/// Authentication hints shown in the explorer. Nothing is enforced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthenticationConfig {
    pub enabled: bool,
    pub strategies: Vec<String>,
}

impl Default for PlaygroundConfig {
    fn default() -> Self {
        Self {
            mount_path: "/services".to_string(),
            ui_path: "/playground".to_string(),
            expose_schemas: true,
            cors: true,
            title: "Service Playground".to_string(),
            description: "API Testing Playground".to_string(),
            version: "1.0.0".to_string(),
            api_url: String::new(),
            authentication: AuthenticationConfig::default(),
        }
    }
}

impl PlaygroundConfig {
    /// Reads `PLAYGROUND_*` variables (after loading a `.env` file if present)
    /// on top of the defaults.
    ///
    /// # Errors
    ///
    /// Fails when a variable cannot be parsed or a path is invalid.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`PlaygroundConfig::from_env`] with an explicit variable source.
    ///
    /// # Errors
    ///
    /// Fails when a variable cannot be parsed or a path is invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(path) = lookup("PLAYGROUND_MOUNT_PATH") {
            config.mount_path = path;
        }
        if let Some(path) = lookup("PLAYGROUND_UI_PATH") {
            config.ui_path = path;
        }
        if let Some(value) = lookup("PLAYGROUND_EXPOSE_SCHEMAS") {
            config.expose_schemas = parse_flag("PLAYGROUND_EXPOSE_SCHEMAS", &value)?;
        }
        if let Some(value) = lookup("PLAYGROUND_CORS") {
            config.cors = parse_flag("PLAYGROUND_CORS", &value)?;
        }
        if let Some(title) = lookup("PLAYGROUND_TITLE") {
            config.title = title;
        }
        if let Some(description) = lookup("PLAYGROUND_DESCRIPTION") {
            config.description = description;
        }
        if let Some(version) = lookup("PLAYGROUND_VERSION") {
            config.version = version;
        }
        if let Some(api_url) = lookup("PLAYGROUND_API_URL") {
            config.api_url = api_url;
        }
        if let Some(value) = lookup("PLAYGROUND_AUTH_ENABLED") {
            config.authentication.enabled = parse_flag("PLAYGROUND_AUTH_ENABLED", &value)?;
        }
        if let Some(value) = lookup("PLAYGROUND_AUTH_STRATEGIES") {
            config.authentication.strategies = value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        config.validate()
    }

    /// Normalizes both paths and checks they do not collide.
    ///
    /// # Errors
    ///
    /// Fails on an invalid path or when both paths are the same.
    pub fn validate(mut self) -> Result<Self> {
        self.mount_path = normalize_path(&self.mount_path)?;
        self.ui_path = normalize_path(&self.ui_path)?;
        if self.mount_path == self.ui_path {
            return Err(Error::Config(format!(
                "discovery endpoint and UI are both mounted at `{}`",
                self.mount_path
            )));
        }
        Ok(self)
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "yes" | "on" => Ok(true),
        "0" | "no" | "off" => Ok(false),
        other => bool::from_str(other)
            .map_err(|_| Error::Config(format!("{key}: expected a boolean, got `{value}`"))),
    }
}
