#[cfg(test)]
pub(crate) mod scripted;
pub mod types;

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::config::{ApiKey, Config};
use crate::records::Index;
use types::{
    ApiError, FederatedResponse, Federation, MultiSearchRequest, MultiSearchResponse, SearchQuery,
};

/// Per-index hit cap in separated mode.
pub const PER_INDEX_LIMIT: usize = 5;
/// Total hit cap for a federated search.
pub const FEDERATION_LIMIT: usize = 15;

/// Errors returned by the multi-search endpoint.
#[derive(Debug, thiserror::Error)]
pub enum MeiliError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Search service rejected credentials ({code}): {message}")]
    Unauthorized { code: u16, message: String },

    #[error("Search API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Malformed search response: {0}")]
    Malformed(String),
}

/// Abstraction over the multi-search endpoint.
/// Implemented by `MeiliClient` for production; scripted implementations used in tests.
pub trait MultiSearch {
    /// One sub-query per index, each capped at [`PER_INDEX_LIMIT`].
    async fn search_per_index(&self, query: &str) -> Result<MultiSearchResponse, MeiliError>;

    /// One federated query over all indices, capped at [`FEDERATION_LIMIT`].
    async fn search_federated(&self, query: &str) -> Result<FederatedResponse, MeiliError>;
}

pub fn per_index_request(query: &str) -> MultiSearchRequest {
    MultiSearchRequest {
        federation: None,
        queries: sub_queries(query, Some(PER_INDEX_LIMIT)),
    }
}

pub fn federated_request(query: &str) -> MultiSearchRequest {
    MultiSearchRequest {
        federation: Some(Federation {
            limit: FEDERATION_LIMIT,
        }),
        queries: sub_queries(query, None),
    }
}

fn sub_queries(query: &str, limit: Option<usize>) -> Vec<SearchQuery> {
    Index::ALL
        .into_iter()
        .map(|index| SearchQuery {
            index_uid: index.uid().to_string(),
            q: query.to_string(),
            limit,
        })
        .collect()
}

/// HTTP client for `POST /multi-search`.
#[derive(Clone)]
pub struct MeiliClient {
    http: Client,
    endpoint: Url,
    api_key: Option<ApiKey>,
    timeout: Option<Duration>,
}

impl MeiliClient {
    pub fn new(http: Client, config: &Config) -> Self {
        if config.api_key.is_none() {
            debug!("no search API key configured, sending unauthenticated requests");
        }
        Self {
            http,
            endpoint: config.multi_search_url(),
            api_key: config.api_key.clone(),
            timeout: config.timeout,
        }
    }

    async fn post<T: DeserializeOwned>(&self, body: &MultiSearchRequest) -> Result<T, MeiliError> {
        let mut req = self
            .http
            .post(self.endpoint.clone())
            .header("User-Agent", crate::USER_AGENT)
            .json(body);
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key.expose());
        }
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }

        let response = req.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!(status = %status, "search service rejected credentials");
            return Err(MeiliError::Unauthorized {
                code: status.as_u16(),
                message: extract_error_message(&text),
            });
        }
        if !status.is_success() {
            warn!(status = %status, "search API error");
            return Err(MeiliError::Api {
                code: status.as_u16(),
                message: extract_error_message(&text),
            });
        }

        serde_json::from_str(&text).map_err(|e| MeiliError::Malformed(e.to_string()))
    }
}

impl MultiSearch for MeiliClient {
    async fn search_per_index(&self, query: &str) -> Result<MultiSearchResponse, MeiliError> {
        debug!(query, "multi-search (per index)");
        self.post(&per_index_request(query)).await
    }

    async fn search_federated(&self, query: &str) -> Result<FederatedResponse, MeiliError> {
        debug!(query, "multi-search (federated)");
        self.post(&federated_request(query)).await
    }
}

fn extract_error_message(body: &str) -> String {
    match serde_json::from_str::<ApiError>(body) {
        Ok(ApiError {
            message: Some(message),
            code: Some(code),
        }) => format!("{message} ({code})"),
        Ok(ApiError {
            message: Some(message),
            code: None,
        }) => message,
        _ => body.chars().take(200).collect(),
    }
}
