use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use showcase_server::auth::load_api_keys;
use showcase_server::catalog::{AudioCatalog, MemoryCatalog};
use showcase_server::cli::{self, CliArgs, Command};
use showcase_server::client::{ApiClient, SilentOutput, TtsPanel};
use showcase_server::config::constants::{DEFAULT_API_URL, RATE_LIMIT_PRUNE_INTERVAL_SECS};
use showcase_server::config::{load_rate_limit_config, ServerConfig};
use showcase_server::logging::{self, LogConfig};
use showcase_server::server::{create_router, AppState};

type BoxError = Box<dyn std::error::Error>;

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env is fine; everything has a default
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().collect();
    let CliArgs { command, api_url } = match cli::parse_args(&args) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("Run with --help for usage.");
            return ExitCode::from(2);
        }
    };

    let result = match command {
        Command::Help => {
            cli::print_help();
            Ok(())
        }
        Command::Version => {
            cli::print_version();
            Ok(())
        }
        Command::Serve { port } => run_server(port).await,
        client_command => run_client(client_command, api_url).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Exiting with error");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_server(port_override: Option<u16>) -> Result<(), BoxError> {
    let log_config = LogConfig::from_env();
    let _log_guards = logging::init_logging(&log_config)?;
    logging::log_platform_info();

    let mut config = ServerConfig::from_env();
    if let Some(port) = port_override {
        config.port = port;
    }

    let catalog: Arc<dyn AudioCatalog> = match &config.catalog_file {
        Some(path) => Arc::new(MemoryCatalog::open(path).await?),
        None => Arc::new(MemoryCatalog::seeded()),
    };

    let api_keys = load_api_keys();
    let rate_limiter = load_rate_limit_config(api_keys.is_enabled());

    tracing::info!(
        backend = catalog.backend_name(),
        catalog_file = ?config.catalog_file,
        static_dir = ?config.static_dir,
        "Catalog ready"
    );
    tracing::info!(
        auth = api_keys.is_enabled(),
        keys = api_keys.count(),
        "Write endpoints {}",
        if api_keys.is_enabled() { "require an API key" } else { "are open" }
    );
    match &rate_limiter {
        Some(limiter) => {
            tracing::info!(
                mode = limiter.mode_description(),
                per_second = limiter.config().per_second,
                burst_size = limiter.config().burst_size,
                "Rate limiting enabled"
            );
            limiter
                .limiter()
                .spawn_pruning(std::time::Duration::from_secs(RATE_LIMIT_PRUNE_INTERVAL_SECS));
        }
        None => tracing::warn!("Rate limiting disabled - server is unprotected from abuse"),
    }

    let state = AppState {
        catalog,
        api_keys,
        rate_limiter,
        request_timeout: config.request_timeout,
        slow_request_threshold: std::time::Duration::from_millis(
            log_config.slow_request_threshold_ms,
        ),
        static_dir: config.static_dir.clone(),
        started_at: chrono::Utc::now(),
    };

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        timeout_secs = config.request_timeout.as_secs(),
        "Server listening"
    );

    let app = create_router(state);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

async fn run_client(command: Command, api_url: Option<String>) -> Result<(), BoxError> {
    let _log_guards = logging::init_logging(&LogConfig::console_only())?;

    let base_url = api_url
        .or_else(|| std::env::var("SHOWCASE_API_URL").ok())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());
    let client = ApiClient::new(&base_url)?;
    let mut panel = TtsPanel::new(client, SilentOutput::new());

    match command {
        Command::Languages => {
            panel.refresh_languages().await?;
            for language in panel.languages() {
                let marker = if Some(language.as_str()) == panel.default_language() {
                    " (default)"
                } else {
                    ""
                };
                println!("{}{}", language, marker);
            }
        }
        Command::Show { language } => {
            load_language(&mut panel, language.as_deref()).await?;
            if let Some(entry) = panel.current() {
                println!("Language: {}", entry.language);
                println!("Audio:    {}", entry.audio_url);
                println!();
                println!("{}", entry.text_content);
            }
        }
        Command::Download { language, out_dir } => {
            load_language(&mut panel, language.as_deref()).await?;
            let saved = panel.download(&out_dir).await?;
            match saved.duration_ms {
                Some(ms) => println!(
                    "Saved {} ({} bytes, {:.1}s)",
                    saved.path.display(),
                    saved.bytes,
                    ms / 1000.0
                ),
                None => println!("Saved {} ({} bytes)", saved.path.display(), saved.bytes),
            }
        }
        Command::Serve { .. } | Command::Help | Command::Version => {}
    }

    Ok(())
}

/// Select `language`, or let the panel pick its default
async fn load_language(
    panel: &mut TtsPanel<SilentOutput>,
    language: Option<&str>,
) -> Result<(), BoxError> {
    match language {
        Some(language) => {
            panel.select_language(language).await?;
        }
        None => {
            panel.refresh_languages().await?;
            if panel.current().is_none() {
                return Err("the catalog has no audio entries".into());
            }
        }
    }
    Ok(())
}
