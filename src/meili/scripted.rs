use std::collections::VecDeque;
use std::sync::Mutex;

use serde_json::Value;

use super::types::{FederatedResponse, MultiSearchResponse};
use super::{MeiliError, MultiSearch};

/// Replays queued responses in order and records every query it receives.
pub(crate) struct ScriptedSearch {
    per_index: Mutex<VecDeque<Result<MultiSearchResponse, MeiliError>>>,
    federated: Mutex<VecDeque<Result<FederatedResponse, MeiliError>>>,
    queries: Mutex<Vec<String>>,
}

fn decode<T: serde::de::DeserializeOwned>(body: Value) -> Result<T, MeiliError> {
    serde_json::from_value(body).map_err(|e| MeiliError::Malformed(e.to_string()))
}

impl ScriptedSearch {
    pub(crate) fn new() -> Self {
        Self {
            per_index: Mutex::new(VecDeque::new()),
            federated: Mutex::new(VecDeque::new()),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Queue a per-index response body, decoded the way the HTTP client would.
    pub(crate) fn per_index(self, body: Value) -> Self {
        self.per_index.lock().unwrap().push_back(decode(body));
        self
    }

    pub(crate) fn per_index_err(self, err: MeiliError) -> Self {
        self.per_index.lock().unwrap().push_back(Err(err));
        self
    }

    pub(crate) fn federated(self, body: Value) -> Self {
        self.federated.lock().unwrap().push_back(decode(body));
        self
    }

    pub(crate) fn federated_err(self, err: MeiliError) -> Self {
        self.federated.lock().unwrap().push_back(Err(err));
        self
    }

    pub(crate) fn captured_queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    fn exhausted() -> MeiliError {
        MeiliError::Malformed("no scripted response left".into())
    }
}

impl MultiSearch for ScriptedSearch {
    async fn search_per_index(&self, query: &str) -> Result<MultiSearchResponse, MeiliError> {
        self.queries.lock().unwrap().push(query.to_string());
        self.per_index
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Self::exhausted()))
    }

    async fn search_federated(&self, query: &str) -> Result<FederatedResponse, MeiliError> {
        self.queries.lock().unwrap().push(query.to_string());
        self.federated
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Self::exhausted()))
    }
}
