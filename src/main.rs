mod config;
mod meili;
mod records;
mod render;
mod search;
mod shell;

pub const USER_AGENT: &str = concat!("fedsearch/", env!("CARGO_PKG_VERSION"));

use clap::{Args, Parser, Subcommand};
use reqwest::Client;
use tokio::io::BufReader;
use tracing::info;

use config::Config;
use meili::MeiliClient;
use search::Lang;
use shell::Mode;

#[derive(Parser)]
#[command(version, about = "Search sports events, markets, and selections in Meilisearch")]
struct Cli {
    /// Search service base URL (overrides MEILISEARCH_HOST)
    #[arg(long, global = true)]
    host: Option<String>,

    /// API key sent as a bearer token (overrides MEILISEARCH_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run one search and print the results
    Search {
        /// Free-text query (may be empty)
        #[arg(default_value = "")]
        query: String,

        #[command(flatten)]
        view: ViewArgs,
    },
    /// Read queries from stdin, one per line, re-rendering as results arrive
    Interactive {
        #[command(flatten)]
        view: ViewArgs,
    },
}

#[derive(Args, Default)]
struct ViewArgs {
    /// Display language
    #[arg(long, value_enum, default_value_t = Lang::En)]
    lang: Lang,

    /// Result layout
    #[arg(long, value_enum, default_value_t = Mode::Separated)]
    mode: Mode,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fedsearch=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?.with_overrides(cli.host.as_deref(), cli.api_key.as_deref())?;
    info!(host = %config.host, "using search service");

    let client = MeiliClient::new(Client::builder().build()?, &config);

    match cli.command {
        Some(Command::Search { query, view }) => {
            let output = shell::run_once(&client, view.lang, view.mode, &query).await;
            print!("{output}");
        }
        Some(Command::Interactive { view }) => interactive(&client, view).await?,
        None => interactive(&client, ViewArgs::default()).await?,
    }
    Ok(())
}

async fn interactive(client: &MeiliClient, view: ViewArgs) -> std::io::Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout().lock();
    shell::run_interactive(client, view.lang, view.mode, stdin, &mut stdout).await
}
