//! # Citation Resolver Main Driver
//!
//! ## Purpose
//! Main entry point for the citation resolution server. Builds the immutable
//! citation-type registry, provider clients and resolution engine, then
//! serves the web API until shutdown.
//!
//! ## Architecture Flow
//! 1. Parse command line arguments and load configuration
//! 2. Initialize logging and tracing
//! 3. Register citation types (built-ins plus extension types)
//! 4. Construct provider clients and the resolution engine
//! 5. Start the web API server
//! 6. Handle shutdown signals gracefully

use clap::{Arg, Command};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use citation_resolver::{
    api::ApiServer,
    config::Config,
    engine::ResolutionEngine,
    errors::{ResolveError, Result},
    finder::CitationFinder,
    providers::ProviderClients,
    registry::{CitationRegistry, LinkBases},
    AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("citation-server")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Legal Search Team")
        .about("Legal citation enrichment service")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config.toml"),
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("Server port")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("check-health")
                .long("check-health")
                .help("Run start-up checks and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let config_path = matches.get_one::<String>("config").map(String::as_str);
    let mut config = Config::from_file(config_path.unwrap_or("config.toml"))?;

    if let Some(port) = matches.get_one::<u16>("port") {
        config.server.port = *port;
    }

    let config = Arc::new(config);
    init_logging(&config)?;

    info!(
        "starting citation resolver v{}",
        env!("CARGO_PKG_VERSION")
    );

    let app_state = initialize_components(config.clone())?;

    if matches.get_flag("check-health") {
        return run_health_checks(&app_state);
    }

    let server = ApiServer::new(app_state);
    let server_future = async move {
        if let Err(e) = server.run().await {
            error!("server error: {}", e);
        }
    };

    info!(
        "citation resolver listening on {}:{}",
        config.server.host, config.server.port
    );

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("received SIGINT, shutting down");
        }
        _ = server_future => {
            warn!("server stopped unexpectedly");
        }
    }

    Ok(())
}

/// Initialize logging and tracing
fn init_logging(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .map_err(|e| ResolveError::Config {
            message: format!("invalid log level '{}': {}", config.logging.level, e),
        })?;

    if config.logging.json_format {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    Ok(())
}

/// Initialize all application components
fn initialize_components(config: Arc<Config>) -> Result<AppState> {
    info!("registering citation types");
    let registry = Arc::new(CitationRegistry::with_bases(LinkBases::from(
        &config.providers,
    )));

    info!("constructing provider clients");
    let providers = Arc::new(ProviderClients::new(&config.providers)?);

    let finder = Arc::new(CitationFinder::new(registry.clone())?);
    let engine = Arc::new(ResolutionEngine::new(
        registry.clone(),
        providers.clone(),
        config.resolution.clone(),
    ));

    Ok(AppState {
        config,
        registry,
        providers,
        finder,
        engine,
        started_at: chrono::Utc::now(),
    })
}

/// Run start-up checks
fn run_health_checks(app_state: &AppState) -> Result<()> {
    info!("running start-up checks");

    if app_state.providers.legisworks.dataset_present() {
        info!("historical statute datasets present");
    } else {
        warn!(
            "historical statute datasets not found at {:?}; statute explosion will find no matches",
            app_state.config.providers.legisworks.data_dir
        );
    }

    if app_state.providers.courtlistener.enabled() {
        info!("case-law search enabled");
    } else {
        info!("case-law search disabled (no credentials configured)");
    }

    info!("start-up checks passed");
    Ok(())
}
