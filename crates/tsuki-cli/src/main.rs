mod commands;
mod format;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tsuki_api::CatalogClient;
use tsuki_core::AppConfig;

#[derive(Debug, Parser)]
#[command(name = "tsuki", version, about = "Search the anime catalog and resolve episode links")]
struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Search series by title.
    Search {
        #[arg(required = true)]
        query: Vec<String>,
    },
    /// List a series' episodes.
    Series {
        /// Series session token from a search result.
        session: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Jump to the page holding this episode number.
        #[arg(long)]
        jump: Option<String>,
    },
    /// Resolve the download links of one episode.
    Links {
        session: String,
        /// Episode session token.
        episode: String,
        /// Show the dub group instead of the subtitle group.
        #[arg(long)]
        dub: bool,
    },
    /// Browse recently aired episodes.
    Airing {
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Open the series behind the entry at this position (1-based).
        #[arg(long)]
        open: Option<usize>,
    },
}

fn init_tracing(config: &AppConfig, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("tsuki=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.filter))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    init_tracing(&config, cli.verbose);

    let client = CatalogClient::new(config.endpoints())?;

    match cli.command {
        Command::Search { query } => commands::search(&client, &query.join(" ")).await,
        Command::Series {
            session,
            page,
            jump,
        } => commands::series(&client, &config, &session, page, jump.as_deref()).await,
        Command::Links {
            session,
            episode,
            dub,
        } => commands::links(&client, &session, &episode, dub).await,
        Command::Airing { page, open } => commands::airing(&client, &config, page, open).await,
    }

    Ok(())
}
