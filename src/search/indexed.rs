use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::{Lang, QueryState, Seq, Settled};
use crate::meili::types::MultiSearchResponse;
use crate::meili::{MeiliError, MultiSearch, PER_INDEX_LIMIT};
use crate::records::{Event, Index, Market, Selection};
use crate::render::{self, Card};

/// One result list per index, each capped at [`PER_INDEX_LIMIT`].
#[derive(Debug, Default)]
pub struct IndexedResults {
    pub events: Vec<Event>,
    pub markets: Vec<Market>,
    pub selections: Vec<Selection>,
}

impl IndexedResults {
    /// Bucket result sets by their `indexUid`.
    ///
    /// Result sets without an `indexUid` are matched to the index queried at
    /// the same position. Every index must receive a result set.
    pub fn from_response(response: MultiSearchResponse) -> Result<Self, MeiliError> {
        let mut events = None;
        let mut markets = None;
        let mut selections = None;
        for (position, result) in response.results.into_iter().enumerate() {
            let index = match result.index_uid.as_deref() {
                Some(uid) => Index::from_uid(uid),
                None => Index::ALL.get(position).copied(),
            };
            let Some(index) = index else {
                warn!(position, uid = ?result.index_uid, "ignoring result set for unknown index");
                continue;
            };
            match index {
                Index::Events => events = Some(decode_hits(result.hits, index)),
                Index::Markets => markets = Some(decode_hits(result.hits, index)),
                Index::Selections => selections = Some(decode_hits(result.hits, index)),
            }
        }

        match (events, markets, selections) {
            (Some(events), Some(markets), Some(selections)) => Ok(Self {
                events,
                markets,
                selections,
            }),
            (events, markets, _) => {
                let missing = if events.is_none() {
                    Index::Events
                } else if markets.is_none() {
                    Index::Markets
                } else {
                    Index::Selections
                };
                Err(MeiliError::Malformed(format!("no result set for index '{missing}'")))
            }
        }
    }
}

fn decode_hits<T: DeserializeOwned>(hits: Vec<Value>, index: Index) -> Vec<T> {
    hits.into_iter()
        .take(PER_INDEX_LIMIT)
        .filter_map(|hit| {
            serde_json::from_value(hit)
                .inspect_err(|e| debug!(%index, error = %e, "skipping undecodable hit"))
                .ok()
        })
        .collect()
}

/// Separated view: three independent lists, one per index.
#[derive(Debug)]
pub struct IndexedSearch {
    state: QueryState<IndexedResults>,
}

impl IndexedSearch {
    pub fn new(mounted_at: Seq) -> Self {
        Self {
            state: QueryState::new(mounted_at),
        }
    }

    pub fn query(&self) -> &str {
        self.state.query()
    }

    pub fn set_query(&mut self, query: &str) {
        self.state.set_query(query);
    }

    pub fn results(&self) -> &IndexedResults {
        self.state.results()
    }

    pub async fn fetch(
        client: &impl MultiSearch,
        query: &str,
    ) -> Result<IndexedResults, MeiliError> {
        client
            .search_per_index(query)
            .await
            .and_then(IndexedResults::from_response)
    }

    pub fn settle(&mut self, seq: Seq, outcome: Result<IndexedResults, MeiliError>) -> Settled {
        self.state.settle(seq, outcome)
    }

    /// Set the query, issue request `seq`, and apply its outcome.
    #[cfg(test)]
    pub async fn search(&mut self, client: &impl MultiSearch, seq: Seq, query: &str) -> Settled {
        self.set_query(query);
        let outcome = Self::fetch(client, query).await;
        self.settle(seq, outcome)
    }

    pub fn render(&self, lang: Lang) -> String {
        let results = self.results();
        let mut out = String::new();

        let cards = results.events.iter().map(|event| {
            let mut card = Card::default();
            render::event_card(&mut card, event, lang);
            card
        });
        render::section(
            &mut out,
            lang.events_title(),
            &cards.collect::<Vec<_>>(),
            lang.no_events(),
        );

        let cards = results.markets.iter().map(|market| {
            let mut card = Card::default();
            render::market_card(&mut card, market, lang);
            card
        });
        render::section(
            &mut out,
            lang.markets_title(),
            &cards.collect::<Vec<_>>(),
            lang.no_markets(),
        );

        let cards = results.selections.iter().map(|selection| {
            let mut card = Card::default();
            render::selection_card(&mut card, selection, lang);
            card
        });
        render::section(
            &mut out,
            lang.selections_title(),
            &cards.collect::<Vec<_>>(),
            lang.no_selections(),
        );

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meili::scripted::ScriptedSearch;
    use serde_json::json;

    fn lakers_event() -> Value {
        json!({
            "team1_name": "Lakers",
            "team2_name": "Celtics",
            "league_name": "NBA",
            "sport_id": 4,
            "league_id": 12,
            "is_live": false,
            "is_streamable": true,
            "main_markets": ["m-1"],
            "main_market_details": [{"market_id": "m-1", "name": "Moneyline", "selections": []}]
        })
    }

    #[tokio::test]
    async fn lakers_shows_one_event_and_empty_sections() {
        let client = ScriptedSearch::new().per_index(json!({
            "results": [{"hits": [lakers_event()]}, {"hits": []}, {"hits": []}]
        }));
        let mut view = IndexedSearch::new(0);

        assert_eq!(view.search(&client, 0, "Lakers").await, Settled::Applied);

        let text = view.render(Lang::En);
        assert_eq!(view.results().events.len(), 1);
        assert!(text.contains("## Events\n\n- Lakers vs Celtics\n"), "got: {text}");
        assert!(text.contains("## Markets\n\nNo markets found\n"));
        assert!(text.contains("## Selections\n\nNo selections found\n"));
        assert!(!text.contains("No events found"));
    }

    #[tokio::test]
    async fn event_cards_show_market_ids_but_not_breakdown() {
        let client = ScriptedSearch::new().per_index(json!({
            "results": [{"hits": [lakers_event()]}, {"hits": []}, {"hits": []}]
        }));
        let mut view = IndexedSearch::new(0);
        view.search(&client, 0, "Lakers").await;

        let text = view.render(Lang::En);
        assert!(text.contains("(m-1)"), "got: {text}");
        assert!(!text.contains("Moneyline"));
    }

    #[tokio::test]
    async fn empty_response_shows_localized_empty_states() {
        let client = ScriptedSearch::new().per_index(json!({
            "results": [{"hits": []}, {"hits": []}, {"hits": []}]
        }));
        let mut view = IndexedSearch::new(0);
        view.search(&client, 0, "zzz").await;

        let text = view.render(Lang::Es);
        assert!(text.contains("## Eventos\n\nNo se encontraron eventos\n"), "got: {text}");
        assert!(text.contains("## Mercados\n\nNo se encontraron mercados\n"));
        assert!(text.contains("## Selecciones\n\nNo se encontraron selecciones\n"));
        assert!(!text.contains("- "));
    }

    #[tokio::test]
    async fn empty_query_is_still_issued() {
        let client = ScriptedSearch::new().per_index(json!({
            "results": [{"hits": [lakers_event()]}, {"hits": []}, {"hits": []}]
        }));
        let mut view = IndexedSearch::new(0);

        assert_eq!(view.search(&client, 0, "").await, Settled::Applied);
        assert_eq!(client.captured_queries(), [""]);
        assert_eq!(view.results().events.len(), 1);
    }

    #[tokio::test]
    async fn network_failure_keeps_previous_results() {
        let client = ScriptedSearch::new()
            .per_index(json!({
                "results": [{"hits": [lakers_event()]}, {"hits": []}, {"hits": []}]
            }))
            .per_index_err(MeiliError::Api {
                code: 502,
                message: "bad gateway".into(),
            });
        let mut view = IndexedSearch::new(0);
        view.search(&client, 0, "Lakers").await;
        let before = view.render(Lang::En);

        assert_eq!(view.search(&client, 1, "Lakers Cel").await, Settled::Failed);
        assert_eq!(view.render(Lang::En), before);
        assert_eq!(view.query(), "Lakers Cel");
    }

    #[tokio::test]
    async fn missing_results_array_keeps_previous_results() {
        let client = ScriptedSearch::new()
            .per_index(json!({
                "results": [{"hits": [lakers_event()]}, {"hits": []}, {"hits": []}]
            }))
            .per_index(json!({"hits": []}));
        let mut view = IndexedSearch::new(0);
        view.search(&client, 0, "Lakers").await;

        assert_eq!(view.search(&client, 1, "x").await, Settled::Failed);
        assert_eq!(view.results().events.len(), 1);
    }

    #[test]
    fn buckets_by_index_uid_when_backend_reorders() {
        let response: MultiSearchResponse = serde_json::from_value(json!({
            "results": [
                {"indexUid": "selections", "hits": [{"name": "Over 2.5", "selection_uid": "abc"}]},
                {"indexUid": "events", "hits": [lakers_event()]},
                {"indexUid": "markets", "hits": [{"name": "Moneyline"}, {"name": "Spread"}]}
            ]
        }))
        .unwrap();

        let bundle = IndexedResults::from_response(response).unwrap();

        assert_eq!(bundle.events.len(), 1);
        assert_eq!(bundle.markets.len(), 2);
        assert_eq!(bundle.selections.len(), 1);
        assert_eq!(bundle.selections[0].text("name", Lang::En), "Over 2.5");
    }

    #[test]
    fn ignores_result_sets_for_unknown_indices() {
        let response: MultiSearchResponse = serde_json::from_value(json!({
            "results": [
                {"indexUid": "events", "hits": []},
                {"indexUid": "teams", "hits": [{"name": "Lakers"}]},
                {"indexUid": "markets", "hits": [{"name": "Moneyline"}]},
                {"indexUid": "selections", "hits": []}
            ]
        }))
        .unwrap();

        let bundle = IndexedResults::from_response(response).unwrap();

        assert!(bundle.events.is_empty());
        assert_eq!(bundle.markets.len(), 1);
        assert!(bundle.selections.is_empty());
    }

    #[test]
    fn missing_result_set_is_malformed() {
        let response: MultiSearchResponse =
            serde_json::from_value(json!({"results": [{"hits": []}]})).unwrap();

        let err = IndexedResults::from_response(response).unwrap_err();
        assert!(
            matches!(&err, MeiliError::Malformed(m) if m.contains("markets")),
            "got: {err:?}"
        );
    }

    #[tokio::test]
    async fn truncated_responses_keep_previous_results() {
        let client = ScriptedSearch::new()
            .per_index(json!({
                "results": [{"hits": []}, {"hits": [{"name": "Moneyline"}]}, {"hits": []}]
            }))
            .per_index(json!({"results": [{"hits": []}]}))
            .per_index(json!({"results": [{}, {}, {}]}));
        let mut view = IndexedSearch::new(0);
        view.search(&client, 0, "money").await;

        assert_eq!(view.search(&client, 1, "moneyl").await, Settled::Failed);
        assert_eq!(view.search(&client, 2, "moneyli").await, Settled::Failed);
        assert_eq!(view.results().markets.len(), 1);
        assert!(view.render(Lang::En).contains("- Moneyline\n"));
    }

    #[test]
    fn caps_each_index_at_five_hits() {
        let hits: Vec<_> = (0..8).map(|i| json!({"name": format!("m{i}")})).collect();
        let response: MultiSearchResponse = serde_json::from_value(json!({
            "results": [{"hits": []}, {"hits": hits}, {"hits": []}]
        }))
        .unwrap();

        let bundle = IndexedResults::from_response(response).unwrap();

        assert_eq!(bundle.markets.len(), 5);
        assert_eq!(bundle.markets[4].text("name", Lang::En), "m4");
    }

    #[test]
    fn skips_undecodable_hits() {
        let response: MultiSearchResponse = serde_json::from_value(json!({
            "results": [{"hits": [{"is_live": "yes"}, lakers_event()]}, {"hits": []}, {"hits": []}]
        }))
        .unwrap();

        let bundle = IndexedResults::from_response(response).unwrap();

        assert_eq!(bundle.events.len(), 1);
    }
}
