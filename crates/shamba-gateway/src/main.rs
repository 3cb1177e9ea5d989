//! shamba-gateway: ShambaBot Main Binary
//!
//! Main entry point for the ShambaBot farmer assistant.
//!
//! Usage:
//!   shamba-gateway                  - Start the WhatsApp webhook server
//!   shamba-gateway --chat [phone]   - Interactive chat REPL (direct channel)
//!   shamba-gateway --help           - Show help

mod chat;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use shamba_core::{Config, Engine, FarmerDirectory, IntelClient, PointsLedger};
use shamba_core::points::LedgerStore;
use shamba_whatsapp::WebhookServer;
use tracing_subscriber::EnvFilter;

/// Run mode
enum RunMode {
    /// Webhook server mode
    Server,
    /// Interactive chat REPL
    Chat { phone: String },
    /// Show help
    Help,
    /// Show version
    Version,
}

/// Demo farmer the chat REPL impersonates by default
const DEFAULT_CHAT_PHONE: &str = "+254115568694";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mode = parse_args();

    match mode {
        RunMode::Help => {
            print_help();
            return Ok(());
        }
        RunMode::Version => {
            println!("shamba-gateway {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        _ => {}
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load().map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    tracing::info!("Starting shamba-gateway...");
    tracing::info!("Farm-Intelligence API: {}", config.intel.base_url);

    let engine = Arc::new(build_engine(&config)?);

    match mode {
        RunMode::Chat { phone } => {
            tracing::info!("Running in chat mode as {}", phone);
            chat::run_chat(engine, &phone).await
        }
        RunMode::Server => run_server(config, engine).await,
        _ => Ok(()),
    }
}

/// Wire the engine from config.
fn build_engine(config: &Config) -> anyhow::Result<Engine> {
    let directory = Arc::new(FarmerDirectory::new(&config.farmer_service));
    let intel = Arc::new(IntelClient::new(&config.intel));
    let store = LedgerStore::new(&config.ledger.db_path)
        .map_err(|e| anyhow::anyhow!("Failed to open ledger database: {}", e))?;
    let ledger = Arc::new(PointsLedger::new(store, config.ledger.daily_cap));

    Ok(Engine::new(directory, intel, ledger))
}

/// Run the webhook server plus the idle-session sweeper.
async fn run_server(config: Config, engine: Arc<Engine>) -> anyhow::Result<()> {
    // periodic idle-session eviction
    let sweeper_engine = Arc::clone(&engine);
    let ttl_hours = config.session.ttl_hours;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(3600));
        loop {
            interval.tick().await;
            let evicted = sweeper_engine.evict_idle_sessions(ttl_hours).await;
            if evicted > 0 {
                tracing::info!("Evicted {} idle sessions", evicted);
            }
        }
    });

    let addr: SocketAddr = ([0, 0, 0, 0], config.webhook.port).into();
    let webhook_url = std::env::var("WEBHOOK_URL").ok();

    let server = WebhookServer::new(
        addr,
        engine,
        config.twilio.auth_token.clone(),
        webhook_url,
        config.webhook.admin_numbers.clone(),
    );

    tracing::info!("Webhook listening on {}", addr);
    server
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("Webhook server error: {}", e))
}

fn parse_args() -> RunMode {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        Some("--help") | Some("-h") => RunMode::Help,
        Some("--version") | Some("-V") => RunMode::Version,
        Some("--chat") => RunMode::Chat {
            phone: args
                .get(1)
                .cloned()
                .unwrap_or_else(|| DEFAULT_CHAT_PHONE.to_string()),
        },
        _ => RunMode::Server,
    }
}

fn print_help() {
    println!(
        r#"shamba-gateway - ShambaBot farmer assistant

USAGE:
    shamba-gateway                  Start the WhatsApp webhook server
    shamba-gateway --chat [phone]   Interactive chat REPL (defaults to a demo farmer)
    shamba-gateway --help           Show this help
    shamba-gateway --version        Show version

CONFIGURATION:
    Reads ./shamba.toml if present; environment variables always win.
    Key variables: API_BASE_URL, FARMER_SERVICE_URL, TWILIO_ACCOUNT_SID,
    TWILIO_AUTH_TOKEN, TWILIO_PHONE_NUMBER, PORT, ADMIN_NUMBERS,
    LEDGER_DB_PATH, WEBHOOK_URL"#
    );
}
