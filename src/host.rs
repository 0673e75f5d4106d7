//! Automation host: owns the browser session for the whole batch.
//!
//! Launches (or connects to) Chrome, answers the application's HTTP auth
//! challenge, opens the entry page and hands the active tab to the
//! [`BatchProcessor`]. Failures before the batch starts are session-level
//! and come back as a [`FailureReport`].

use crate::batch::{BatchProcessor, BatchReport, FailureReport};
use crate::browser::{BrowserSession, ConnectionOptions, Credentials, LaunchOptions};
use crate::config::EngineConfig;
use crate::error::Result;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                                      (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Where the browser comes from
#[derive(Debug, Clone)]
pub enum BrowserSource {
    Launch(LaunchOptions),
    Connect(ConnectionOptions),
}

#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Entry page of the application
    pub url: String,
    pub credentials: Option<Credentials>,
    pub user_agent: String,
    pub browser: BrowserSource,
    /// Bound on loading the entry page
    pub navigation_timeout: Duration,
    /// Delay after the entry page loads, for its scripts to build the frames
    pub initial_settle: Duration,
}

impl HostConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            credentials: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            browser: BrowserSource::Launch(LaunchOptions::default()),
            navigation_timeout: Duration::from_secs(30),
            initial_settle: Duration::from_secs(8),
        }
    }

    /// Builder method: set HTTP basic credentials
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Builder method: set the user agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Builder method: launch a browser with `options`
    pub fn launch(mut self, options: LaunchOptions) -> Self {
        self.browser = BrowserSource::Launch(options);
        self
    }

    /// Builder method: connect to a running browser
    pub fn connect(mut self, options: ConnectionOptions) -> Self {
        self.browser = BrowserSource::Connect(options);
        self
    }

    /// Builder method: set the initial settle delay
    pub fn initial_settle(mut self, delay: Duration) -> Self {
        self.initial_settle = delay;
        self
    }
}

/// Normalize an incomplete URL by adding the missing scheme
pub fn normalize_url(url: &str) -> String {
    let trimmed = url.trim();

    if trimmed.starts_with("http://")
        || trimmed.starts_with("https://")
        || trimmed.starts_with("file://")
        || trimmed.starts_with("data:")
        || trimmed.starts_with("about:")
    {
        return trimmed.to_string();
    }

    // localhost special case - use http by default
    if trimmed.starts_with("localhost") || trimmed.starts_with("127.0.0.1") {
        return format!("http://{}", trimmed);
    }

    format!("https://{}", trimmed)
}

/// Start the browser and leave it on the application's entry page
pub fn open_session(host: &HostConfig) -> Result<BrowserSession> {
    let session = match &host.browser {
        BrowserSource::Launch(options) => {
            log::info!("Launching browser (headless: {})", options.headless);
            BrowserSession::launch(options.clone())?
        }
        BrowserSource::Connect(options) => {
            log::info!("Connecting to browser at {}", options.ws_url);
            BrowserSession::connect(options.clone())?
        }
    };

    if let Some(credentials) = &host.credentials {
        session.authenticate(credentials)?;
    }
    session.set_user_agent(&host.user_agent)?;

    let url = normalize_url(&host.url);
    log::info!("Navigating to {}", url);
    session.open(&url, host.navigation_timeout)?;

    std::thread::sleep(host.initial_settle);

    match session.location() {
        Ok((title, current)) => log::info!("Page title: {}, current URL: {}", title, current),
        Err(e) => log::debug!("Could not read page location: {}", e),
    }

    Ok(session)
}

/// Open the application and run the batch for `style_ids`
pub fn run<S: AsRef<str>>(
    host: &HostConfig,
    engine: &EngineConfig,
    style_ids: &[S],
) -> std::result::Result<BatchReport, FailureReport> {
    log::info!("Starting PLM automation for {} style IDs", style_ids.len());

    let session = open_session(host).map_err(|e| {
        log::error!("PLM automation error: {}", e);
        FailureReport::from(&e)
    })?;
    let page = session.page().map_err(|e| FailureReport::from(&e))?;

    let report = BatchProcessor::new(&page, engine).process(style_ids);

    if let BrowserSource::Launch(_) = host.browser {
        if let Err(e) = session.close() {
            log::warn!("Failed to close browser: {}", e);
        }
    }

    Ok(report)
}
