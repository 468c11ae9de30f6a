//! Application configuration management.
//!
//! The configuration names the API host and a couple of protocol details that
//! have changed between server revisions. It is read from
//! `~/.config/xiras/config.json`; the client never writes it.
//!
//! `XIRAS_API_URL` overrides the configured base URL. The interactive client
//! logs to `xiras.log` under the user cache directory.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Application name used for the config directory path
const APP_NAME: &str = "xiras";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable holding the API base URL
pub const API_URL_ENV: &str = "XIRAS_API_URL";

/// HTTP request timeout in seconds.
/// The only timeout in the client; there are no retries.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Field names sent in the token request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialFields {
    /// `{"email": ..., "password": ...}`
    #[default]
    Email,
    /// `{"username": ..., "password": ...}`
    Username,
}

impl CredentialFields {
    pub fn identifier_field(&self) -> &'static str {
        match self {
            CredentialFields::Email => "email",
            CredentialFields::Username => "username",
        }
    }
}

/// How the `success` flag of a response envelope is read.
///
/// `Inverted` reproduces the legacy web client, which used `data` only when
/// `success` was falsy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopePolarity {
    #[default]
    Conventional,
    Inverted,
}

impl EnvelopePolarity {
    /// Whether an envelope with the given `success` flag carries usable data.
    pub fn accepts(&self, success: bool) -> bool {
        match self {
            EnvelopePolarity::Conventional => success,
            EnvelopePolarity::Inverted => !success,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: Option<String>,
    pub last_username: Option<String>,
    pub credential_fields: CredentialFields,
    pub envelope_polarity: EnvelopePolarity,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: None,
            last_username: None,
            credential_fields: CredentialFields::default(),
            envelope_polarity: EnvelopePolarity::default(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load the config file (if any) and apply the environment override.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                config.api_url = Some(url);
            }
        }
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Self::from_json(&contents)
                .with_context(|| format!("Failed to parse {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for the interactive client's log file.
    pub fn log_dir() -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// The API base URL without a trailing slash.
    pub fn base_url(&self) -> Result<String> {
        let url = self
            .api_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "No API URL configured. Set {} or add \"api_url\" to {}",
                    API_URL_ENV,
                    Self::config_path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|_| CONFIG_FILE.to_string())
                )
            })?;
        Ok(url.trim_end_matches('/').to_string())
    }
}
