//! Record shapes returned by the search service.
//!
//! Localized strings are not declared as struct fields: they stay in the
//! flattened `fields` map so both `<field>` and `<field>_<lang>` remain
//! reachable by [`resolve`](crate::search::lang::resolve).

use std::borrow::Cow;
use std::fmt;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::search::lang::{Lang, resolve};

/// One of the three indices queried on every search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Index {
    Events,
    Markets,
    Selections,
}

impl Index {
    /// Query order for multi-search requests.
    pub const ALL: [Index; 3] = [Index::Events, Index::Markets, Index::Selections];

    pub fn uid(self) -> &'static str {
        match self {
            Index::Events => "events",
            Index::Markets => "markets",
            Index::Selections => "selections",
        }
    }

    pub fn from_uid(uid: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|index| index.uid() == uid)
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.uid())
    }
}

/// An identifier, score, or odds value displayed verbatim.
///
/// Strings render without quotes, `null` renders empty, anything else in its
/// JSON form.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(transparent)]
pub struct Scalar(Value);

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Value::String(s) => f.write_str(s),
            Value::Null => Ok(()),
            other => write!(f, "{other}"),
        }
    }
}

/// Display an optional scalar, rendering absence as an empty string.
pub fn display_opt(value: Option<&Scalar>) -> String {
    value.map(Scalar::to_string).unwrap_or_default()
}

fn text<'a>(fields: &'a Map<String, Value>, field: &str, lang: Lang) -> Cow<'a, str> {
    resolve(fields, field, lang).unwrap_or_default()
}

#[derive(Deserialize, Debug, Clone)]
pub struct Event {
    pub sport_id: Option<Scalar>,
    pub league_id: Option<Scalar>,
    pub is_live: Option<bool>,
    pub is_streamable: Option<bool>,
    pub event_state: Option<EventState>,
    pub main_markets: Option<Vec<Scalar>>,
    pub main_market_details: Option<Vec<MarketDetail>>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Event {
    pub fn text(&self, field: &str, lang: Lang) -> Cow<'_, str> {
        text(&self.fields, field, lang)
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct EventState {
    #[serde(rename = "type")]
    pub kind: Option<Scalar>,
    pub match_status: Option<Scalar>,
    /// `Some` whenever the key is present, including an explicit `null`.
    #[serde(default, deserialize_with = "present")]
    pub home_score: Option<Scalar>,
    pub away_score: Option<Scalar>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Scalar>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Scalar::deserialize(deserializer).map(Some)
}

/// Expanded market attached to an event, with its selections and prices.
#[derive(Deserialize, Debug, Clone)]
pub struct MarketDetail {
    pub market_id: Option<Scalar>,
    pub selections: Option<Vec<SelectionDetail>>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl MarketDetail {
    pub fn text(&self, field: &str, lang: Lang) -> Cow<'_, str> {
        text(&self.fields, field, lang)
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct SelectionDetail {
    pub odds_formats: Option<OddsFormats>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl SelectionDetail {
    pub fn text(&self, field: &str, lang: Lang) -> Cow<'_, str> {
        text(&self.fields, field, lang)
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct Market {
    pub enabled_for_early_payout: Option<bool>,
    pub is_valid_for_sgp: Option<bool>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Market {
    pub fn text(&self, field: &str, lang: Lang) -> Cow<'_, str> {
        text(&self.fields, field, lang)
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct Selection {
    pub selection_uid: Option<Scalar>,
    pub odds_formats: Option<OddsFormats>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Selection {
    pub fn text(&self, field: &str, lang: Lang) -> Cow<'_, str> {
        text(&self.fields, field, lang)
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct OddsFormats {
    pub decimal: Option<Scalar>,
    pub american: Option<Scalar>,
    pub fractional: Option<Scalar>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct FederationMeta {
    #[serde(rename = "indexUid", default)]
    pub index_uid: String,
}

/// A hit from a federated search, tagged with the index that produced it.
#[derive(Deserialize, Debug, Clone)]
pub struct FederatedHit {
    #[serde(rename = "_federation", default)]
    pub federation: FederationMeta,
    #[serde(flatten)]
    pub record: Map<String, Value>,
}

/// Typed body of a federated hit, chosen by its origin index.
#[derive(Debug)]
pub enum HitBody {
    Event(Event),
    Market(Market),
    Selection(Selection),
}

impl FederatedHit {
    pub fn origin(&self) -> Option<Index> {
        Index::from_uid(&self.federation.index_uid)
    }

    /// Decode the hit into the record type of its origin index.
    ///
    /// Returns `Ok(None)` for unrecognized origins.
    pub fn body(&self) -> Result<Option<HitBody>, serde_json::Error> {
        let Some(index) = self.origin() else {
            return Ok(None);
        };
        let value = Value::Object(self.record.clone());
        let body = match index {
            Index::Events => HitBody::Event(serde_json::from_value(value)?),
            Index::Markets => HitBody::Market(serde_json::from_value(value)?),
            Index::Selections => HitBody::Selection(serde_json::from_value(value)?),
        };
        Ok(Some(body))
    }
}
