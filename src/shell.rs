//! Mode and language toggle around the two search views, plus the
//! line-oriented interactive loop.
//!
//! Every query change issues a request immediately. Requests are never
//! cancelled; they complete in any order and [`QueryState`](crate::search::QueryState)
//! drops the ones that arrive after a newer response is already displayed.

use std::borrow::Cow;
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

use crate::meili::{MeiliError, MultiSearch};
use crate::records::FederatedHit;
use crate::search::indexed::IndexedResults;
use crate::search::{FederatedSearch, IndexedSearch, Lang, Seq, Settled};

#[derive(clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// One list per index
    #[default]
    Separated,
    /// One merged, server-ranked list
    Federated,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Separated => "separated",
            Mode::Federated => "federated",
        })
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown mode '{0}': expected 'separated' or 'federated'")]
pub struct UnknownMode(String);

impl FromStr for Mode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "separated" => Ok(Mode::Separated),
            "federated" => Ok(Mode::Federated),
            _ => Err(UnknownMode(s.to_string())),
        }
    }
}

/// One line of interactive input.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Query(String),
    Lang(Lang),
    Mode(Mode),
    Quit,
    Invalid(String),
}

const HELP: &str = "commands: :lang en|es, :mode separated|federated, :quit";

pub fn parse_command(line: &str) -> Command {
    let line = line.trim_end_matches(['\r', '\n']);
    let Some(rest) = line.strip_prefix(':') else {
        return Command::Query(line.to_string());
    };
    let mut parts = rest.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("lang"), Some(arg)) => arg
            .parse()
            .map(Command::Lang)
            .unwrap_or_else(|e: crate::search::lang::UnknownLang| Command::Invalid(e.to_string())),
        (Some("mode"), Some(arg)) => arg
            .parse()
            .map(Command::Mode)
            .unwrap_or_else(|e: UnknownMode| Command::Invalid(e.to_string())),
        (Some("quit" | "q"), None) => Command::Quit,
        _ => Command::Invalid(HELP.to_string()),
    }
}

/// A search to issue on behalf of the active view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub seq: Seq,
    pub mode: Mode,
    pub query: String,
}

#[derive(Debug)]
pub enum Outcome {
    Indexed(Result<IndexedResults, MeiliError>),
    Federated(Result<Vec<FederatedHit>, MeiliError>),
}

/// Run a request against the search service.
pub async fn execute(client: &impl MultiSearch, request: Request) -> (Seq, Outcome) {
    debug!(seq = request.seq, mode = %request.mode, query = %request.query, "issuing search");
    let outcome = match request.mode {
        Mode::Separated => Outcome::Indexed(IndexedSearch::fetch(client, &request.query).await),
        Mode::Federated => {
            Outcome::Federated(FederatedSearch::fetch(client, &request.query).await)
        }
    };
    (request.seq, outcome)
}

#[derive(Debug)]
enum View {
    Separated(IndexedSearch),
    Federated(FederatedSearch),
}

/// Owns the active view and the display language.
#[derive(Debug)]
pub struct Shell {
    lang: Lang,
    view: View,
    next_seq: Seq,
}

impl Shell {
    /// Mount a view for `mode` and return the request for its initial query.
    pub fn new(lang: Lang, mode: Mode, query: &str) -> (Self, Request) {
        let mut shell = Self {
            lang,
            view: View::Separated(IndexedSearch::new(0)),
            next_seq: 0,
        };
        let request = shell.mount(mode, query);
        (shell, request)
    }

    pub fn mode(&self) -> Mode {
        match self.view {
            View::Separated(_) => Mode::Separated,
            View::Federated(_) => Mode::Federated,
        }
    }

    pub fn query(&self) -> &str {
        match &self.view {
            View::Separated(v) => v.query(),
            View::Federated(v) => v.query(),
        }
    }

    pub fn set_lang(&mut self, lang: Lang) {
        self.lang = lang;
    }

    /// Switch views. The new view starts empty and searches for the empty
    /// query; switching to the active mode is a no-op.
    pub fn set_mode(&mut self, mode: Mode) -> Option<Request> {
        if mode == self.mode() {
            return None;
        }
        info!(%mode, "switching mode");
        Some(self.mount(mode, ""))
    }

    pub fn set_query(&mut self, query: &str) -> Request {
        match &mut self.view {
            View::Separated(v) => v.set_query(query),
            View::Federated(v) => v.set_query(query),
        }
        self.issue()
    }

    pub fn settle(&mut self, seq: Seq, outcome: Outcome) -> Settled {
        match (&mut self.view, outcome) {
            (View::Separated(v), Outcome::Indexed(result)) => v.settle(seq, result),
            (View::Federated(v), Outcome::Federated(result)) => v.settle(seq, result),
            _ => {
                debug!(seq, "discarding response for an unmounted view");
                Settled::Stale
            }
        }
    }

    pub fn render(&self) -> String {
        match &self.view {
            View::Separated(v) => v.render(self.lang),
            View::Federated(v) => v.render(self.lang),
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self.view {
            View::Separated(_) => self.lang.indexed_placeholder(),
            View::Federated(_) => self.lang.federated_placeholder(),
        }
    }

    pub fn status_line(&self) -> String {
        format!("== {} | {} | {:?}", self.mode(), self.lang, self.query())
    }

    fn mount(&mut self, mode: Mode, query: &str) -> Request {
        let seq = self.next_seq;
        self.view = match mode {
            Mode::Separated => View::Separated(IndexedSearch::new(seq)),
            Mode::Federated => View::Federated(FederatedSearch::new(seq)),
        };
        self.set_query(query)
    }

    fn issue(&mut self) -> Request {
        let seq = self.next_seq;
        self.next_seq += 1;
        Request {
            seq,
            mode: self.mode(),
            query: self.query().to_string(),
        }
    }
}

/// Issue a single search and render whatever the view displays afterwards.
pub async fn run_once(client: &impl MultiSearch, lang: Lang, mode: Mode, query: &str) -> String {
    let (mut shell, request) = Shell::new(lang, mode, query);
    let (seq, outcome) = execute(client, request).await;
    shell.settle(seq, outcome);
    shell.render()
}

fn show(out: &mut impl Write, shell: &Shell) -> io::Result<()> {
    writeln!(out, "{}", shell.status_line())?;
    write!(out, "{}", shell.render())?;
    out.flush()
}

fn prompt(out: &mut impl Write, shell: &Shell) -> io::Result<()> {
    writeln!(out, "> {}", shell.placeholder())?;
    out.flush()
}

/// Read queries and commands line by line until `:quit` or end of input,
/// re-rendering whenever the display changes.
pub async fn run_interactive<R>(
    client: &impl MultiSearch,
    lang: Lang,
    mode: Mode,
    input: R,
    out: &mut impl Write,
) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let (mut shell, first) = Shell::new(lang, mode, "");
    let mut pending = FuturesUnordered::new();
    pending.push(execute(client, first));
    let mut lines = input.split(b'\n');
    let mut input_open = true;

    writeln!(out, "{HELP}")?;
    prompt(out, &shell)?;

    loop {
        tokio::select! {
            line = lines.next_segment(), if input_open => {
                let Some(bytes) = line? else {
                    input_open = false;
                    continue;
                };
                let line = String::from_utf8_lossy(&bytes);
                if let Cow::Owned(_) = line {
                    warn!("input line is not valid UTF-8, replacing invalid bytes");
                }
                match parse_command(&line) {
                    Command::Quit => break,
                    Command::Query(query) => pending.push(execute(client, shell.set_query(&query))),
                    Command::Lang(lang) => {
                        shell.set_lang(lang);
                        prompt(out, &shell)?;
                        show(out, &shell)?;
                    }
                    Command::Mode(mode) => {
                        if let Some(request) = shell.set_mode(mode) {
                            pending.push(execute(client, request));
                            prompt(out, &shell)?;
                            show(out, &shell)?;
                        }
                    }
                    Command::Invalid(message) => writeln!(out, "{message}")?,
                }
            }
            Some((seq, outcome)) = pending.next(), if !pending.is_empty() => {
                if shell.settle(seq, outcome) == Settled::Applied {
                    show(out, &shell)?;
                }
            }
            else => break,
        }
    }
    Ok(())
}
