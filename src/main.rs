//! Domain Discovery server entry point

use anyhow::Result;
use domain_discovery::{
    config::{self, Settings},
    lexicon::Lexicon,
    metrics::Metrics,
    network::HttpClient,
    oracle::Oracle,
    search::{Search, SearchEngine},
    storage::{DomainStore, JsonFileStore},
    web::{create_router, AppState},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let mut config_path = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_usage();
                return Ok(());
            }
            "-V" | "--version" => {
                println!("domain-discovery {}", domain_discovery::VERSION);
                return Ok(());
            }
            "-c" | "--config" => config_path = args.next(),
            other => anyhow::bail!("Unknown argument: {}", other),
        }
    }

    // Load configuration
    let settings = match config_path {
        Some(path) => {
            let mut settings = Settings::from_file(&path)?;
            settings.merge_env();
            settings
        }
        None => config::load()?,
    };

    // Initialize logging
    let default_level = if settings.general.debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("Starting Domain Discovery v{}", domain_discovery::VERSION);
    info!("Loaded configuration for instance: {}", settings.general.instance_name);

    // Initialize HTTP client
    let client = HttpClient::with_settings(&settings.outgoing)?;

    let lexicon = match &settings.search.lexicon_path {
        Some(path) => {
            info!("Loading lexicon from: {}", path.display());
            Lexicon::from_file(path)?
        }
        None => Lexicon::builtin().clone(),
    };

    let store: Arc<dyn DomainStore> = Arc::new(JsonFileStore::new(&settings.storage.path));
    info!("Domain store at: {}", settings.storage.path.display());

    let metrics = Arc::new(Metrics::new());

    let mut oracle = match Oracle::from_settings(&settings.oracle, &settings.search, &client) {
        Ok(oracle) => oracle,
        Err(e) => {
            warn!("Oracle unavailable, searching locally only: {}", e);
            Oracle::disabled()
        }
    };
    if settings.general.enable_metrics {
        oracle = oracle.with_metrics(metrics.clone());
    }
    info!("Oracle backend: {}", oracle.backend_name());

    let engine = SearchEngine::new(Arc::new(lexicon)).with_settings(&settings.search);
    let mut search = Search::new(engine, oracle).with_settings(settings.search.clone());
    if settings.general.enable_metrics {
        search = search.with_metrics(metrics.clone());
    }

    // Create application state
    let state = AppState::new(settings.clone(), store, search, metrics);
    let app = create_router(state);

    // Bind address
    let addr = SocketAddr::new(
        settings.server.bind_address.parse()?,
        settings.server.port,
    );

    info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Print usage information
fn print_usage() {
    println!(
        r#"
Domain Discovery v{}
A private catalog of web domains with natural-language search

USAGE:
    domain-discovery [OPTIONS]

OPTIONS:
    -c, --config <FILE>    Path to configuration file
    -h, --help             Print help information
    -V, --version          Print version information

ENVIRONMENT VARIABLES:
    DOMAIN_DISCOVERY_SETTINGS_PATH    Path to settings.yml
    DOMAIN_DISCOVERY_DEBUG            Enable debug logging (true/false)
    DOMAIN_DISCOVERY_PORT             Server port
    DOMAIN_DISCOVERY_BIND_ADDRESS     Bind address
    DOMAIN_DISCOVERY_STORAGE_PATH     Path of the domains JSON file
    DOMAIN_DISCOVERY_ORACLE_BACKEND   Oracle backend (none, http, openai)
    DOMAIN_DISCOVERY_ORACLE_ENDPOINT  Oracle endpoint URL
    DOMAIN_DISCOVERY_ORACLE_API_KEY   Oracle API key (or OPENAI_API_KEY)
"#,
        domain_discovery::VERSION
    );
}
