use std::env;
use std::fmt;
use std::time::Duration;

use url::Url;

pub const DEFAULT_HOST: &str = "http://localhost:7700";

const HOST_VAR: &str = "MEILISEARCH_HOST";
const API_KEY_VAR: &str = "MEILISEARCH_API_KEY";
const TIMEOUT_VAR: &str = "MEILISEARCH_TIMEOUT_SECS";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid search host '{host}': {source}")]
    InvalidHost {
        host: String,
        source: url::ParseError,
    },

    #[error("search host must use http or https, got '{0}'")]
    UnsupportedScheme(String),

    #[error("invalid MEILISEARCH_TIMEOUT_SECS '{0}': expected a positive number of seconds")]
    InvalidTimeout(String),
}

#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Connection settings for the search service.
///
/// Environment variables:
/// - `MEILISEARCH_HOST`: base URL (default `http://localhost:7700`)
/// - `MEILISEARCH_API_KEY`: sent as a bearer token when set (optional)
/// - `MEILISEARCH_TIMEOUT_SECS`: per-request timeout (default: none)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: Url,
    pub api_key: Option<ApiKey>,
    pub timeout: Option<Duration>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |var: &str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let host = parse_host(non_empty(HOST_VAR).as_deref().unwrap_or(DEFAULT_HOST))?;
        let api_key = non_empty(API_KEY_VAR).map(ApiKey);
        let timeout = non_empty(TIMEOUT_VAR)
            .map(|raw| parse_timeout(&raw))
            .transpose()?;

        Ok(Self {
            host,
            api_key,
            timeout,
        })
    }

    /// Apply command-line overrides on top of the environment.
    pub fn with_overrides(
        mut self,
        host: Option<&str>,
        api_key: Option<&str>,
    ) -> Result<Self, ConfigError> {
        if let Some(host) = host {
            self.host = parse_host(host)?;
        }
        if let Some(key) = api_key.map(str::trim).filter(|k| !k.is_empty()) {
            self.api_key = Some(ApiKey(key.to_string()));
        }
        Ok(self)
    }

    /// `<host>/multi-search`, preserving any path prefix on the host.
    pub fn multi_search_url(&self) -> Url {
        let mut url = self.host.clone();
        let path = format!("{}/multi-search", url.path().trim_end_matches('/'));
        url.set_path(&path);
        url
    }
}

fn parse_host(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidHost {
        host: raw.to_string(),
        source,
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ConfigError::UnsupportedScheme(raw.to_string())),
    }
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    raw.parse::<u64>()
        .ok()
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .ok_or_else(|| ConfigError::InvalidTimeout(raw.to_string()))
}
