//! Client configuration.
//!
//! One `ClientConfig` value is built at startup and handed to both the
//! session initiator and the session channel. The channel address is
//! derived from the same base URL by swapping the scheme.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{NegotiationError, Result};
use crate::protocol::SessionId;

pub const DEFAULT_BASE_URL: &str = "http://0.0.0.0:8000";

/// Environment variable that overrides the configured base URL.
pub const BASE_URL_ENV: &str = "NEGOTIATOR_BASE_URL";

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Scheme, host and port of the negotiation backend, no trailing slash.
    pub base_url: String,
    /// TCP connect timeout for both HTTP and the channel handshake.
    pub connect_timeout: Duration,
    /// Whole-request timeout for HTTP calls.
    pub request_timeout: Duration,
}

/// On-disk shape. Every field is optional and falls back to the default.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    base_url: Option<String>,
    connect_timeout_secs: Option<u64>,
    request_timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    /// Default timeouts against the given base URL.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        Ok(Self {
            base_url: normalize_base_url(base_url.as_ref())?,
            ..Self::default()
        })
    }

    /// Parse a TOML document layered over the defaults.
    pub fn from_toml_str(doc: &str) -> Result<Self> {
        let file: ConfigFile =
            toml::from_str(doc).map_err(|e| NegotiationError::Config(e.to_string()))?;
        let mut config = Self::default();
        if let Some(url) = file.base_url {
            config.base_url = normalize_base_url(&url)?;
        }
        if let Some(secs) = file.connect_timeout_secs {
            config.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = file.request_timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let doc = std::fs::read_to_string(path).map_err(|e| {
            NegotiationError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&doc)
    }

    /// Resolve the final config: defaults, then the optional file, then the
    /// environment override, then an explicit flag.
    pub fn resolve(
        file: Option<&Path>,
        env_base_url: Option<String>,
        flag_base_url: Option<&str>,
    ) -> Result<Self> {
        let mut config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        if let Some(url) = env_base_url.filter(|u| !u.trim().is_empty()) {
            config.base_url = normalize_base_url(&url)?;
        }
        if let Some(url) = flag_base_url {
            config.base_url = normalize_base_url(url)?;
        }
        Ok(config)
    }

    pub fn start_negotiation_url(&self) -> String {
        format!("{}/api/start-negotiation", self.base_url)
    }

    pub fn session_url(&self, session_id: &SessionId) -> String {
        format!("{}/api/session/{}", self.base_url, session_id)
    }

    /// `ws://` (or `wss://`) address of the chat channel for a session.
    pub fn channel_url(&self, session_id: &SessionId) -> String {
        let ws_base = if let Some(rest) = self.base_url.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = self.base_url.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            self.base_url.clone()
        };
        format!("{ws_base}/ws/negotiation/{session_id}")
    }
}

fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let host = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"))
        .ok_or_else(|| {
            NegotiationError::Config(format!("base URL must start with http:// or https://, got {raw:?}"))
        })?;
    if host.is_empty() {
        return Err(NegotiationError::Config(format!("base URL {raw:?} has no host")));
    }
    Ok(trimmed.to_string())
}
