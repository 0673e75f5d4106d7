//! PLM BOM extraction command line
//!
//! ```bash
//! # Extract BOMs for two styles
//! plm-bom run 1K123456AA 1K654321BB --url plm.example.com/Windchill/rfa/jsp/main/Main.jsp
//!
//! # Check a saved BOM page against the table detector
//! plm-bom extract-html saved_bom.html
//! ```

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use plm_bom::browser::{ConnectionOptions, Credentials, LaunchOptions};
use plm_bom::config::EngineConfig;
use plm_bom::extract::BomExtractor;
use plm_bom::host::{self, HostConfig};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "plm-bom")]
#[command(version)]
#[command(about = "Extract bill-of-materials data from a frame-based PLM web application", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search each style in the PLM application and extract its BOM
    Run {
        /// Style identifiers, processed in order
        style_ids: Vec<String>,

        /// File with one style identifier per line
        #[arg(long, value_name = "FILE")]
        styles_file: Option<PathBuf>,

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

        /// Override the browser user agent
        #[arg(long)]
        user_agent: Option<String>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Run the BOM table extractor on a saved HTML page
    ExtractHtml {
        file: PathBuf,

        /// Engine configuration overrides (JSON)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Print the default engine configuration
    DefaultConfig,
}

fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    Ok(match path {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    })
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let json = if pretty { serde_json::to_string_pretty(value)? } else { serde_json::to_string(value)? };
    println!("{}", json);
    Ok(())
}

fn read_style_ids(mut style_ids: Vec<String>, styles_file: Option<&Path>) -> anyhow::Result<Vec<String>> {
    if let Some(path) = styles_file {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        style_ids.extend(content.lines().map(str::trim).filter(|line| !line.is_empty()).map(str::to_string));
    }
    if style_ids.is_empty() {
        bail!("Style IDs array is required");
    }
    Ok(style_ids)
}

fn main() -> anyhow::Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            style_ids,
            styles_file,
            url,
            username,
            password,
            headed,
            chrome_path,
            ws_endpoint,
            config,
            user_agent,
            pretty,
        } => {
            let engine = load_config(config.as_deref())?;
            let style_ids = read_style_ids(style_ids, styles_file.as_deref())?;

            let mut host = HostConfig::new(url);
            host = match ws_endpoint {
                Some(ws_url) => host.connect(ConnectionOptions::new(ws_url)),
                None => {
                    let mut options = LaunchOptions::new().headless(!headed);
                    if let Some(path) = chrome_path {
                        options = options.chrome_path(path);
                    }
                    host.launch(options)
                }
            };
            if let (Some(username), Some(password)) = (username, password) {
                host = host.credentials(Credentials::new(username, password));
            }
            if let Some(user_agent) = user_agent {
                host = host.user_agent(user_agent);
            }

            match host::run(&host, &engine, &style_ids) {
                Ok(report) => {
                    print_json(&report, pretty)?;
                    Ok(ExitCode::SUCCESS)
                }
                Err(failure) => {
                    print_json(&failure, pretty)?;
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::ExtractHtml { file, config } => {
            let engine = load_config(config.as_deref())?;
            let html =
                std::fs::read_to_string(&file).with_context(|| format!("Failed to read {}", file.display()))?;

            let result = BomExtractor::new(&engine.extraction).extract_html(&html);
            print_json(&result, true)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::DefaultConfig => {
            println!("{}", EngineConfig::default().to_json_pretty()?);
            Ok(ExitCode::SUCCESS)
        }
    }
}
