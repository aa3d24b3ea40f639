//! PromptGate Server
//!
//! Classifies prompts before they leave the organization:
//! - Blocks prompts matching secret or confidential patterns
//! - Warns on source code and on PII found by the analyzer service
//! - Blocks prompts where the token classification model finds entities
//! - Returns the prompt with the offending spans redacted
//!
//! Usage:
//! ```bash
//! # With config file
//! promptgate-server --config promptgate.yaml
//!
//! # Enable the entity stages from the environment (or a .env file)
//! PROMPTGATE_ANALYZER_URL=http://localhost:5002 promptgate-server
//!
//! # Classify a single prompt and print the outcome as JSON
//! echo "my api_key: 12345" | promptgate-server classify
//! ```
//!
//! Test with:
//! ```bash
//! curl http://localhost:8000/v1/classify \
//!   -H "Content-Type: application/json" \
//!   -d '{"prompt": "my api_key: 12345"}'
//! ```

mod api;
mod config;
mod detectors;

use clap::{Parser, Subcommand};
use config::ServerConfig;
use detectors::Detectors;
use promptgate_classifier::Classifier;
use promptgate_observability::{DetectorReadiness, HealthState, Metrics, health_router};
use std::io::Read;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// PromptGate Server - prompt classification and redaction
#[derive(Parser)]
#[command(name = "promptgate-server")]
#[command(about = "Classifies prompts and redacts sensitive spans", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to configuration file (YAML or TOML)
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "PROMPTGATE_CONFIG",
        global = true
    )]
    config: Option<String>,

    /// Port to listen on (overrides config and environment)
    #[arg(short, long, global = true)]
    port: Option<u16>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default if no command specified)
    Serve,
    /// Classify one prompt and print the outcome as JSON
    Classify {
        /// Prompt text (read from stdin when omitted)
        text: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env before parsing so PROMPTGATE_CONFIG can come from it
    let env_file = config::load_env_file(None);

    let cli = Cli::parse();

    let mut config = if let Some(config_path) = &cli.config {
        ServerConfig::from_file(config_path)?
    } else {
        ServerConfig::default()
    };

    // Merge environment variables (they override config file)
    config.merge_env();

    // CLI flags have the highest precedence
    if let Some(port) = cli.port {
        config.port = port;
    }

    init_tracing(&config.logging.level)?;
    if let Some(env_file) = &env_file {
        info!("Loaded environment from {}", env_file.display());
    }
    if let Some(config_path) = &cli.config {
        info!("Loaded configuration from {}", config_path);
    }

    match cli.command {
        Some(Commands::Classify { text }) => classify_once(config, text).await,
        Some(Commands::Serve) | None => serve(config).await,
    }
}

fn init_tracing(level: &str) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Logs go to stderr so `classify` output stays machine-readable
    let filter = EnvFilter::new(format!("{}", log_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

/// Build detectors and the classifier
///
/// Detector construction creates blocking HTTP clients, so it runs on the
/// blocking pool.
async fn build_classifier(
    config: &ServerConfig,
) -> Result<(Arc<Classifier>, Detectors), Box<dyn std::error::Error>> {
    let detectors_config = config.detectors.clone();
    let classifier_config = config.classifier.clone();

    let (classifier, detectors) = tokio::task::spawn_blocking(move || {
        let detectors = Detectors::init(&detectors_config)?;
        let classifier = Classifier::from_config(
            &classifier_config,
            detectors.analyzer.clone(),
            detectors.token_model.clone(),
        )?;
        Ok::<_, promptgate_core::Error>((classifier, detectors))
    })
    .await??;

    info!(
        "Cascade stages: {}",
        classifier.cascade().stage_names().join(" -> ")
    );

    Ok((Arc::new(classifier), detectors))
}

async fn classify_once(
    config: ServerConfig,
    text: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = match text {
        Some(text) => text,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            // Drop the newline a shell pipe appends
            buffer.trim_end_matches(['\r', '\n']).to_string()
        }
    };

    let (classifier, _detectors) = build_classifier(&config).await?;
    let outcome = tokio::task::spawn_blocking(move || classifier.classify(&text)).await??;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

async fn serve(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!("Initializing PromptGate");

    let (classifier, detectors) = build_classifier(&config).await?;

    let metrics = Arc::new(Metrics::new()?);
    info!("Prometheus metrics initialized");

    let api_state = api::AppState::new(classifier, metrics.clone())
        .with_request_logging(config.logging.log_requests);
    let api_router = api::router(api_state);

    let readiness = Arc::new(DetectorReadiness::new(detectors.all()));
    let health_state = HealthState::with_readiness_checker(metrics, readiness);
    let app = api_router.merge(health_router(health_state));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = TcpListener::bind(addr).await?;

    info!("");
    info!("PromptGate listening on http://{}", addr);
    info!("   Classification:");
    info!("   - JSON API:           http://{}/v1/classify", addr);
    info!("   - Form API:           http://{}/classify", addr);
    info!("   Observability:");
    info!("   - Health check:       http://{}/healthz", addr);
    info!("   - Readiness check:    http://{}/readyz", addr);
    info!("   - Prometheus metrics: http://{}/metrics", addr);
    info!("");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Wait for shutdown signal (SIGINT or SIGTERM)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
