//! Search components: per-index and federated views over the multi-search endpoint.
//!
//! Both components share [`QueryState`], which owns the query string and the
//! displayed results and decides which responses are allowed to replace them.

pub mod federated;
pub mod indexed;
pub mod lang;

pub use federated::FederatedSearch;
pub use indexed::IndexedSearch;
pub use lang::Lang;

use tracing::{debug, warn};

use crate::meili::MeiliError;

/// Monotonic request sequence number, issued by the owner of the components.
pub type Seq = u64;

/// What happened to a response handed to [`QueryState::settle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    /// Results replaced the displayed state.
    Applied,
    /// Response was older than what is displayed (or predates the component).
    Stale,
    /// Request failed; displayed state unchanged.
    Failed,
}

#[derive(Debug)]
pub struct QueryState<T> {
    query: String,
    results: T,
    mounted_at: Seq,
    shown: Option<Seq>,
}

impl<T: Default> QueryState<T> {
    pub fn new(mounted_at: Seq) -> Self {
        Self {
            query: String::new(),
            results: T::default(),
            mounted_at,
            shown: None,
        }
    }
}

impl<T> QueryState<T> {
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &T {
        &self.results
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
    }

    /// Apply the outcome of request `seq`.
    ///
    /// Responses older than the displayed one are dropped regardless of
    /// completion order. Failures are logged and leave the display untouched.
    pub fn settle(&mut self, seq: Seq, outcome: Result<T, MeiliError>) -> Settled {
        if seq < self.mounted_at || self.shown.is_some_and(|shown| seq < shown) {
            debug!(seq, shown = ?self.shown, "discarding stale response");
            return Settled::Stale;
        }
        match outcome {
            Ok(results) => {
                self.results = results;
                self.shown = Some(seq);
                Settled::Applied
            }
            Err(e) => {
                warn!(seq, error = %e, "search request failed, keeping previous results");
                Settled::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure() -> MeiliError {
        MeiliError::Malformed("missing hits".into())
    }

    #[test]
    fn starts_idle_with_empty_results() {
        let state: QueryState<Vec<u32>> = QueryState::new(0);
        assert_eq!(state.query(), "");
        assert!(state.results().is_empty());
    }

    #[test]
    fn newer_response_replaces_results() {
        let mut state = QueryState::new(0);
        assert_eq!(state.settle(0, Ok(vec![1])), Settled::Applied);
        assert_eq!(state.settle(1, Ok(vec![2, 3])), Settled::Applied);
        assert_eq!(state.results(), &vec![2, 3]);
    }

    #[test]
    fn late_older_response_is_discarded() {
        let mut state = QueryState::new(0);
        assert_eq!(state.settle(2, Ok(vec![2])), Settled::Applied);
        assert_eq!(state.settle(1, Ok(vec![1])), Settled::Stale);
        assert_eq!(state.results(), &vec![2]);
    }

    #[test]
    fn failure_keeps_previous_results() {
        let mut state = QueryState::new(0);
        state.settle(0, Ok(vec![7]));
        assert_eq!(state.settle(1, Err(failure())), Settled::Failed);
        assert_eq!(state.results(), &vec![7]);
    }

    #[test]
    fn failure_does_not_block_older_success_still_newer_than_display() {
        let mut state = QueryState::new(0);
        state.settle(0, Ok(vec![0]));
        state.settle(2, Err(failure()));
        assert_eq!(state.settle(1, Ok(vec![1])), Settled::Applied);
        assert_eq!(state.results(), &vec![1]);
    }

    #[test]
    fn responses_from_before_mount_are_discarded() {
        let mut state: QueryState<Vec<u32>> = QueryState::new(5);
        assert_eq!(state.settle(4, Ok(vec![4])), Settled::Stale);
        assert!(state.results().is_empty());
    }

    #[test]
    fn first_failure_leaves_empty_display() {
        let mut state: QueryState<Vec<u32>> = QueryState::new(0);
        assert_eq!(state.settle(0, Err(failure())), Settled::Failed);
        assert!(state.results().is_empty());
    }
}
