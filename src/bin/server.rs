//! PLM BOM extraction HTTP server
//!
//! Serves `POST /api/plm-automation` and `GET /health`.

use anyhow::Context;
use clap::Parser;
use plm_bom::browser::{ConnectionOptions, Credentials, LaunchOptions};
use plm_bom::config::EngineConfig;
use plm_bom::host::HostConfig;
use plm_bom::server::{AppState, router};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "plm-bom-server")]
#[command(version)]
#[command(about = "HTTP endpoint for PLM BOM extraction", long_about = None)]
struct Cli {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:3000")]
    bind: String,

    /// Entry page of the PLM application
    #[arg(long, env = "PLM_URL")]
    url: String,

    /// HTTP basic auth user
    #[arg(long, env = "PLM_USERNAME")]
    username: Option<String>,

    /// HTTP basic auth password
    #[arg(long, env = "PLM_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Launch browser in headed mode (default: headless)
    #[arg(long, short = 'H')]
    headed: bool,

    /// Path to custom browser executable
    #[arg(long, value_name = "PATH")]
    chrome_path: Option<PathBuf>,

    /// WebSocket endpoint URL for remote browser connection
    #[arg(long, value_name = "URL")]
    ws_endpoint: Option<String>,

    /// Engine configuration overrides (JSON)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let engine = match &cli.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };

    let mut host = HostConfig::new(&cli.url);
    host = match cli.ws_endpoint {
        Some(ws_url) => host.connect(ConnectionOptions::new(ws_url)),
        None => {
            let mut options = LaunchOptions::new().headless(!cli.headed);
            if let Some(path) = cli.chrome_path {
                options = options.chrome_path(path);
            }
            host.launch(options)
        }
    };
    if let (Some(username), Some(password)) = (cli.username, cli.password) {
        host = host.credentials(Credentials::new(username, password));
    }

    let listener = tokio::net::TcpListener::bind(&cli.bind)
        .await
        .with_context(|| format!("Failed to bind {}", cli.bind))?;
    log::info!("PLM BOM server v{} listening on http://{}", env!("CARGO_PKG_VERSION"), cli.bind);

    axum::serve(listener, router(AppState::new(host, engine)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutting down");
}
