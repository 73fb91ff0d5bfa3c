use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use {
    anyhow::Context,
    clap::Parser,
    tracing::{info, warn},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use {
    parley_gateway::{
        broadcast::WsEventSink,
        config,
        inbound::Ingestor,
        server,
        state::GatewayState,
    },
    parley_provider::{EventSink, MessagingProvider, ScriptedProvider},
    parley_store::{MessageLog, SnapshotLog},
};

#[derive(Parser)]
#[command(
    name = "parley",
    about = "Parley — bridges a messaging-provider session to HTTP and WebSocket clients"
)]
struct Cli {
    /// Address to bind to (overrides config value).
    #[arg(long, env = "PARLEY_BIND")]
    bind: Option<String>,

    /// Port to listen on (overrides config value).
    #[arg(long, env = "PARLEY_PORT")]
    port: Option<u16>,

    /// Explicit config file (overrides discovery).
    #[arg(long, env = "PARLEY_CONFIG")]
    config: Option<PathBuf>,

    /// Directory for the message log snapshot (overrides config value).
    #[arg(long, env = "PARLEY_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, default_value_t = false)]
    json_logs: bool,
}

fn init_tracing(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(&cli);

    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => config::discover_and_load(),
    };
    if let Some(bind) = cli.bind {
        config.bind = bind;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = Some(data_dir);
    }

    let data_dir = config.data_dir();
    let log = Arc::new(
        SnapshotLog::open(data_dir.join("messages.json"))
            .await
            .context("failed to open message log")?,
    );
    info!(path = %log.path().display(), "message log ready");

    // The live network session is an external collaborator; until one is
    // wired in here, the scripted provider keeps the HTTP/WS surface
    // usable for development.
    let (provider, events) = ScriptedProvider::new();
    warn!("no live provider session configured; running with the scripted provider");

    let state = Arc::new(GatewayState::new(
        Arc::clone(&provider) as Arc<dyn MessagingProvider>,
        Arc::clone(&log) as Arc<dyn MessageLog>,
    ));
    let sink = Arc::new(WsEventSink::new(Arc::clone(&state))) as Arc<dyn EventSink>;
    Ingestor::new(
        Arc::clone(&provider) as Arc<dyn MessagingProvider>,
        Arc::clone(&log) as Arc<dyn MessageLog>,
        sink,
        config.auto_reply.clone(),
    )
    .spawn(events);

    let addr: SocketAddr = format!("{}:{}", config.bind, config.port)
        .parse()
        .context("invalid bind address")?;
    server::run(state, addr).await
}
