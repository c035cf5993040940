//! Plain-text result cards.
//!
//! A card is a bullet whose continuation lines are indented under it:
//!
//! ```text
//! - Lakers vs Celtics
//!   NBA
//!   [Sport ID: 4] [League ID: 12] [📺 Streamable] [🔴 Live]
//!   (m-1) (m-2)
//! ```

use crate::records::{Event, Market, MarketDetail, Scalar, Selection, display_opt};
use crate::search::Lang;

/// Replace newlines so record text cannot break card layout.
fn one_line(s: &str) -> String {
    s.chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}

#[derive(Debug, Default)]
pub struct Card {
    lines: Vec<(usize, String)>,
}

impl Card {
    pub fn line(&mut self, text: &str) {
        self.nested(0, text);
    }

    pub fn nested(&mut self, depth: usize, text: &str) {
        self.lines.push((depth, one_line(text)));
    }

    /// Inline badges, `[a] [b]`. Skipped when empty.
    pub fn badges(&mut self, badges: &[String]) {
        if !badges.is_empty() {
            let row: Vec<_> = badges.iter().map(|b| format!("[{b}]")).collect();
            self.line(&row.join(" "));
        }
    }

    /// Identifier chips, `(a) (b)`. Skipped when empty.
    pub fn chips(&mut self, chips: &[String]) {
        if !chips.is_empty() {
            let row: Vec<_> = chips.iter().map(|c| format!("({c})")).collect();
            self.line(&row.join(" "));
        }
    }

    pub fn render_into(&self, out: &mut String) {
        for (i, (depth, text)) in self.lines.iter().enumerate() {
            let lead = if i == 0 { "- " } else { "  " };
            out.push_str(lead);
            out.push_str(&"  ".repeat(*depth));
            out.push_str(text);
            out.push('\n');
        }
    }
}

fn flag(value: Option<bool>, on: &str, off: &str) -> String {
    let text = if value.unwrap_or(false) { on } else { off };
    text.to_string()
}

fn matchup(team1: &str, team2: &str) -> String {
    format!("{team1} vs {team2}")
}

fn matchup_with_league(team1: &str, team2: &str, league: &str) -> String {
    format!("{team1} vs {team2} • {league}")
}

pub fn event_card(card: &mut Card, event: &Event, lang: Lang) {
    card.line(&matchup(
        &event.text("team1_name", lang),
        &event.text("team2_name", lang),
    ));
    card.line(&event.text("league_name", lang));

    let mut badges = vec![
        format!("Sport ID: {}", display_opt(event.sport_id.as_ref())),
        format!("League ID: {}", display_opt(event.league_id.as_ref())),
        flag(event.is_streamable, "📺 Streamable", "❌ Not Streamable"),
        flag(event.is_live, "🔴 Live", "⏰ Not Live"),
    ];
    if let Some(state) = &event.event_state {
        badges.push(format!("Type: {}", display_opt(state.kind.as_ref())));
        badges.push(format!(
            "Match Status: {}",
            display_opt(state.match_status.as_ref())
        ));
        if let Some(home) = &state.home_score {
            badges.push(format!(
                "Score: {home} - {}",
                display_opt(state.away_score.as_ref())
            ));
        }
    }
    card.badges(&badges);

    let markets: Vec<_> = event
        .main_markets
        .iter()
        .flatten()
        .map(Scalar::to_string)
        .collect();
    card.chips(&markets);
}

/// Per-market breakdown: market name and id, then each selection with
/// decimal and American odds.
pub fn market_breakdown(card: &mut Card, details: &[MarketDetail], lang: Lang) {
    for market in details {
        let id = display_opt(market.market_id.as_ref());
        card.nested(1, &format!("{} (#{id})", market.text("name", lang)));
        for selection in market.selections.iter().flatten() {
            let odds = selection.odds_formats.as_ref();
            card.nested(
                2,
                &format!(
                    "{}  [Decimal: {}] [American: {}]",
                    selection.text("name", lang),
                    display_opt(odds.and_then(|o| o.decimal.as_ref())),
                    display_opt(odds.and_then(|o| o.american.as_ref())),
                ),
            );
        }
    }
}

pub fn market_card(card: &mut Card, market: &Market, lang: Lang) {
    card.line(&market.text("name", lang));
    card.line(&matchup_with_league(
        &market.text("team1_name", lang),
        &market.text("team2_name", lang),
        &market.text("league_name", lang),
    ));
    card.badges(&[
        flag(
            market.enabled_for_early_payout,
            "💰 Early Payout Enabled",
            "❌ No Early Payout",
        ),
        flag(market.is_valid_for_sgp, "✅ Valid for SGP", "❌ Not Valid for SGP"),
    ]);
}

pub fn selection_card(card: &mut Card, selection: &Selection, lang: Lang) {
    card.line(&format!(
        "{} - {}",
        selection.text("name", lang),
        selection.text("market_name", lang)
    ));
    card.line(&matchup_with_league(
        &selection.text("team1_name", lang),
        &selection.text("team2_name", lang),
        &selection.text("league_name", lang),
    ));

    let mut badges = vec![format!(
        "🔑 UID: {}",
        display_opt(selection.selection_uid.as_ref())
    )];
    if let Some(odds) = &selection.odds_formats {
        badges.push(format!("Decimal: {}", display_opt(odds.decimal.as_ref())));
        badges.push(format!("American: {}", display_opt(odds.american.as_ref())));
        badges.push(format!(
            "Fractional: {}",
            display_opt(odds.fractional.as_ref())
        ));
    }
    card.badges(&badges);
}

/// Titled section of cards, or the empty-state message when there are none.
pub fn section(out: &mut String, title: &str, cards: &[Card], empty: &str) {
    out.push_str(&format!("## {title}\n\n"));
    if cards.is_empty() {
        out.push_str(empty);
        out.push('\n');
    }
    for card in cards {
        card.render_into(out);
    }
    out.push('\n');
}
