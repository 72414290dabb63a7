//! HTTP client configuration (plex.tv endpoint, timeouts, client identity).
//!
//! Uses env vars when set, otherwise built-in defaults.

use std::time::Duration;

pub const PLEX_TV_URL_ENV: &str = "PLEXCONF_PLEX_TV_URL";
pub const CONNECT_TIMEOUT_ENV: &str = "PLEXCONF_CONNECT_TIMEOUT_SECS";
pub const TIMEOUT_ENV: &str = "PLEXCONF_TIMEOUT_SECS";
pub const CLIENT_ID_ENV: &str = "PLEXCONF_CLIENT_ID";

const DEFAULT_PLEX_TV_URL: &str = "https://plex.tv";
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 15;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub plex_tv_url: String,
    pub connect_timeout: Duration,
    pub timeout: Duration,
    pub user_agent: String,
    /// Sent as `X-Plex-Client-Identifier`.
    pub client_identifier: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            plex_tv_url: DEFAULT_PLEX_TV_URL.to_string(),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: format!("plexconf/{}", env!("CARGO_PKG_VERSION")),
            client_identifier: "plexconf".to_string(),
        }
    }
}

impl ClientConfig {
    /// Resolve from environment. Unparsable timeouts fall back to defaults.
    pub fn resolve() -> Self {
        let defaults = Self::default();

        let plex_tv_url = env_value(PLEX_TV_URL_ENV)
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.plex_tv_url);

        Self {
            plex_tv_url,
            connect_timeout: env_secs(CONNECT_TIMEOUT_ENV).unwrap_or(defaults.connect_timeout),
            timeout: env_secs(TIMEOUT_ENV).unwrap_or(defaults.timeout),
            user_agent: defaults.user_agent,
            client_identifier: env_value(CLIENT_ID_ENV).unwrap_or(defaults.client_identifier),
        }
    }
}

/// Trimmed, non-empty value of an env var.
pub(crate) fn env_value(name: &str) -> Option<String> {
    let val = std::env::var(name).ok()?;
    let trimmed = val.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn env_secs(name: &str) -> Option<Duration> {
    let raw = env_value(name)?;
    match raw.parse::<u64>() {
        Ok(secs) => Some(Duration::from_secs(secs)),
        Err(e) => {
            tracing::warn!(var = name, value = %raw, error = %e, "ignoring invalid timeout");
            None
        }
    }
}
