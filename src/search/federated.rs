use tracing::debug;

use super::{Lang, QueryState, Seq, Settled};
use crate::meili::{MeiliError, MultiSearch};
use crate::records::{FederatedHit, HitBody};
use crate::render::{self, Card};

/// Federated view: one merged, server-ranked list of hits from all indices.
#[derive(Debug)]
pub struct FederatedSearch {
    state: QueryState<Vec<FederatedHit>>,
}

impl FederatedSearch {
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

    pub fn hits(&self) -> &[FederatedHit] {
        self.state.results()
    }

    pub async fn fetch(
        client: &impl MultiSearch,
        query: &str,
    ) -> Result<Vec<FederatedHit>, MeiliError> {
        client.search_federated(query).await.map(|resp| resp.hits)
    }

    pub fn settle(&mut self, seq: Seq, outcome: Result<Vec<FederatedHit>, MeiliError>) -> Settled {
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
        let hits = self.hits();
        if hits.is_empty() {
            return format!("{}\n", lang.no_results());
        }
        let mut out = String::new();
        for hit in hits {
            hit_card(hit, lang).render_into(&mut out);
        }
        out
    }
}

fn hit_card(hit: &FederatedHit, lang: Lang) -> Card {
    let mut card = Card::default();
    let origin = match hit.federation.index_uid.as_str() {
        "" => "unknown",
        uid => uid,
    };
    card.line(&format!("[{origin}]"));

    match hit.body() {
        Ok(Some(HitBody::Event(event))) => {
            render::event_card(&mut card, &event, lang);
            if let Some(details) = &event.main_market_details {
                render::market_breakdown(&mut card, details, lang);
            }
        }
        Ok(Some(HitBody::Market(market))) => render::market_card(&mut card, &market, lang),
        Ok(Some(HitBody::Selection(selection))) => {
            render::selection_card(&mut card, &selection, lang)
        }
        Ok(None) => {}
        Err(e) => debug!(origin, error = %e, "hit does not match its index schema"),
    }
    card
}
