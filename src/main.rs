//! Ferret: a search dispatcher for pluggable search providers
//!
//! This is the main entry point for the command-line tool.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ferret::{
    config::{parse_goto, parse_page, parse_timeout, Settings},
    network::HttpClient,
    output,
    providers::ProviderLoader,
    search::{CommandOpener, Outcome, Query, Search},
    web::{create_router, AppState},
};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "ferret", version, about = "Search dispatcher for pluggable search providers")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, env = "FERRET_SETTINGS_PATH")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Search a provider
    Search {
        /// Provider name
        provider: String,
        /// Search keyword
        keyword: String,
        /// Page number
        #[arg(short, long, default_value = "1")]
        page: String,
        /// Open the result with this number instead of listing results
        #[arg(short, long, default_value = "")]
        goto: String,
        /// Search timeout, e.g. 5000ms or 5s
        #[arg(short, long, default_value = "")]
        timeout: String,
    },
    /// List the registered providers
    Providers,
    /// Serve the HTTP API
    Listen {
        /// Address to listen on, e.g. 127.0.0.1:3030
        #[arg(short, long)]
        addr: Option<SocketAddr>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    // Load configuration
    let settings = load_settings(cli.config.as_deref())?;

    // Initialize HTTP client and providers
    let client = HttpClient::with_settings(&settings.outgoing)?;
    let registry = Arc::new(ProviderLoader::load(&settings, &client)?);
    let search = Search::new(registry.clone())
        .with_opener(Arc::new(CommandOpener::new(settings.search.goto_command())));

    match cli.command {
        Command::Search {
            provider,
            keyword,
            page,
            goto,
            timeout,
        } => {
            let mut query = Query::new(provider, keyword)
                .with_page(parse_page(&page))
                .with_goto(parse_goto(&goto))
                .with_timeout(parse_timeout(&timeout, settings.search.default_timeout()));

            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    on_interrupt.cancel();
                }
            });

            match search.run_with_cancel(&mut query, &cancel).await? {
                Outcome::Results => print!("{}", output::render_results(&query)),
                Outcome::Opened { link } => info!("Opened {}", link),
            }
        }
        Command::Providers => {
            print!("{}", output::render_providers(&registry.providers()));
        }
        Command::Listen { addr } => {
            let addr = match addr {
                Some(addr) => addr,
                None => SocketAddr::new(
                    settings.server.bind_address.parse()?,
                    settings.server.port,
                ),
            };

            let app = create_router(AppState::new(&settings, search));

            info!("Starting server on http://{}", addr);
            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}

/// Load settings from file or use defaults, then apply the environment
fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    let mut settings = match explicit {
        Some(path) => {
            info!("Loading settings from: {}", path.display());
            Settings::from_file(path)
                .with_context(|| format!("failed to load settings from {}", path.display()))?
        }
        None => match default_paths().into_iter().find(|p| p.exists()) {
            Some(path) => {
                info!("Loading settings from: {}", path.display());
                Settings::from_file(&path)?
            }
            None => {
                info!("No settings file found, using defaults");
                Settings::default()
            }
        },
    };

    settings.merge_env();
    Ok(settings)
}

fn default_paths() -> Vec<PathBuf> {
    let mut paths = vec![
        PathBuf::from("ferret.yml"),
        PathBuf::from("config/ferret.yml"),
    ];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("ferret/ferret.yml"));
    }
    paths
}
