use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

/// Display language. English is the base language of every record; other
/// languages are served from `<field>_<code>` overrides when present.
#[derive(clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Lang {
    #[default]
    En,
    Es,
}

impl Lang {
    pub fn code(self) -> &'static str {
        match self {
            Lang::En => "en",
            Lang::Es => "es",
        }
    }

    /// Field suffix for language overrides. `None` for the base language.
    fn override_suffix(self) -> Option<&'static str> {
        match self {
            Lang::En => None,
            Lang::Es => Some("es"),
        }
    }

    pub fn events_title(self) -> &'static str {
        match self {
            Lang::En => "Events",
            Lang::Es => "Eventos",
        }
    }

    pub fn markets_title(self) -> &'static str {
        match self {
            Lang::En => "Markets",
            Lang::Es => "Mercados",
        }
    }

    pub fn selections_title(self) -> &'static str {
        match self {
            Lang::En => "Selections",
            Lang::Es => "Selecciones",
        }
    }

    pub fn no_events(self) -> &'static str {
        match self {
            Lang::En => "No events found",
            Lang::Es => "No se encontraron eventos",
        }
    }

    pub fn no_markets(self) -> &'static str {
        match self {
            Lang::En => "No markets found",
            Lang::Es => "No se encontraron mercados",
        }
    }

    pub fn no_selections(self) -> &'static str {
        match self {
            Lang::En => "No selections found",
            Lang::Es => "No se encontraron selecciones",
        }
    }

    pub fn no_results(self) -> &'static str {
        match self {
            Lang::En => "No results found",
            Lang::Es => "No se encontraron resultados",
        }
    }

    pub fn indexed_placeholder(self) -> &'static str {
        match self {
            Lang::En => "Search events, markets, and selections...",
            Lang::Es => "Buscar eventos, mercados y selecciones...",
        }
    }

    pub fn federated_placeholder(self) -> &'static str {
        match self {
            Lang::En => "Search everything...",
            Lang::Es => "Buscar en todo...",
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown language '{0}': expected 'en' or 'es'")]
pub struct UnknownLang(String);

impl FromStr for Lang {
    type Err = UnknownLang;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Lang::En),
            "es" => Ok(Lang::Es),
            _ => Err(UnknownLang(s.to_string())),
        }
    }
}

/// Look up a localized display field on a raw record.
///
/// Returns `<field>_<lang>` when `lang` is not the base language and the
/// override holds a non-empty string or non-zero number, otherwise the base
/// `<field>` value. Numbers are shown in their JSON form. A missing base
/// field, or one that is not a string or number, yields `None`.
pub fn resolve<'a>(record: &'a Map<String, Value>, field: &str, lang: Lang) -> Option<Cow<'a, str>> {
    let localized = lang.override_suffix().and_then(|suffix| {
        record
            .get(&format!("{field}_{suffix}"))
            .filter(|v| is_set(v))
            .and_then(display_text)
    });
    localized.or_else(|| record.get(field).and_then(display_text))
}

fn is_set(value: &Value) -> bool {
    match value {
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64() != Some(0.0),
        _ => false,
    }
}

fn display_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        _ => None,
    }
}
