use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::records::FederatedHit;

/// Body of `POST /multi-search`.
#[derive(Debug, Serialize)]
pub struct MultiSearchRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub federation: Option<Federation>,
    pub queries: Vec<SearchQuery>,
}

#[derive(Debug, Serialize)]
pub struct Federation {
    pub limit: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub index_uid: String,
    pub q: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

/// Response to a non-federated multi-search: one result set per query.
#[derive(Debug, Deserialize)]
pub struct MultiSearchResponse {
    pub results: Vec<IndexResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexResult {
    pub index_uid: Option<String>,
    pub hits: Vec<Value>,
}

/// Response to a federated multi-search: one merged, ranked hit list.
#[derive(Debug, Deserialize)]
pub struct FederatedResponse {
    pub hits: Vec<FederatedHit>,
}

/// Error body returned by Meilisearch for non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub message: Option<String>,
    pub code: Option<String>,
}
