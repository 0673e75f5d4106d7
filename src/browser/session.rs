use crate::browser::chrome::ChromePage;
use crate::browser::config::{ConnectionOptions, LaunchOptions};
use crate::error::{BrowserError, Result};
use headless_chrome::{Browser, Tab};
use std::{ffi::OsStr, fmt, sync::Arc, time::Duration};

/// HTTP basic credentials answered to the application's auth challenge
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username: username.into(), password: password.into() }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Browser session that manages a Chrome/Chromium instance
pub struct BrowserSession {
    /// The underlying headless_chrome Browser instance
    browser: Browser,
}

impl BrowserSession {
    /// Launch a new browser instance with the given options
    pub fn launch(options: LaunchOptions) -> Result<Self> {
        let mut launch_opts = headless_chrome::LaunchOptions::default();

        // Ignore default arguments to prevent detection by anti-bot services
        launch_opts.ignore_default_args.push(OsStr::new("--enable-automation"));
        launch_opts.args.push(OsStr::new("--disable-blink-features=AutomationControlled"));
        launch_opts.args.push(OsStr::new("--disable-dev-shm-usage"));
        launch_opts.args.push(OsStr::new("--disable-gpu"));
        launch_opts.args.push(OsStr::new("--no-first-run"));

        launch_opts.idle_browser_timeout = Duration::from_secs(options.idle_timeout_secs);
        launch_opts.headless = options.headless;
        launch_opts.window_size = Some((options.window_width, options.window_height));
        launch_opts.ignore_certificate_errors = options.ignore_certificate_errors;
        launch_opts.sandbox = options.sandbox;

        if let Some(path) = options.chrome_path {
            launch_opts.path = Some(path);
        }

        if let Some(dir) = options.user_data_dir {
            launch_opts.user_data_dir = Some(dir);
        }

        let browser = Browser::new(launch_opts).map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        browser.new_tab().map_err(|e| BrowserError::LaunchFailed(format!("Failed to create tab: {}", e)))?;

        Ok(Self { browser })
    }

    /// Connect to an existing browser instance via WebSocket
    pub fn connect(options: ConnectionOptions) -> Result<Self> {
        let browser = Browser::connect_with_timeout(options.ws_url, Duration::from_millis(options.timeout))
            .map_err(|e| BrowserError::ConnectionFailed(e.to_string()))?;

        Ok(Self { browser })
    }

    /// Get the active tab
    pub fn tab(&self) -> Result<Arc<Tab>> {
        self.get_active_tab()
    }

    /// Get all tabs
    pub fn get_tabs(&self) -> Result<Vec<Arc<Tab>>> {
        let tabs = self
            .browser
            .get_tabs()
            .lock()
            .map_err(|e| BrowserError::TabOperationFailed(format!("Failed to get tabs: {}", e)))?
            .clone();

        Ok(tabs)
    }

    /// Get the currently active tab by checking the document visibility state,
    /// falling back to the first tab
    pub fn get_active_tab(&self) -> Result<Arc<Tab>> {
        let tabs = self.get_tabs()?;

        for tab in &tabs {
            match tab.evaluate("document.visibilityState === 'visible'", false) {
                Ok(remote_object) => {
                    if remote_object.value.and_then(|v| v.as_bool()).unwrap_or(false) {
                        return Ok(tab.clone());
                    }
                }
                Err(e) => {
                    log::debug!("Failed to check tab status: {}", e);
                    continue;
                }
            }
        }

        tabs.into_iter()
            .next()
            .ok_or_else(|| BrowserError::TabOperationFailed("No active tab found".to_string()))
    }

    /// Get the underlying Browser instance
    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    /// Answer HTTP authentication challenges on the active tab with `credentials`
    pub fn authenticate(&self, credentials: &Credentials) -> Result<()> {
        let tab = self.tab()?;

        tab.enable_fetch(None, Some(true))
            .map_err(|e| BrowserError::AuthenticationFailed(format!("Failed to enable request interception: {}", e)))?;

        tab.authenticate(Some(credentials.username.clone()), Some(credentials.password.clone()))
            .map_err(|e| BrowserError::AuthenticationFailed(e.to_string()))?;

        log::debug!("HTTP authentication configured for user {}", credentials.username);
        Ok(())
    }

    /// Override the user agent of the active tab
    pub fn set_user_agent(&self, user_agent: &str) -> Result<()> {
        self.tab()?
            .set_user_agent(user_agent, None, None)
            .map_err(|e| BrowserError::TabOperationFailed(format!("Failed to set user agent: {}", e)))?;
        Ok(())
    }

    /// Navigate the active tab to `url` and wait for the load, bounded by `timeout`
    pub fn open(&self, url: &str, timeout: Duration) -> Result<()> {
        let tab = self.tab()?;
        tab.set_default_timeout(timeout);

        tab.navigate_to(url)
            .map_err(|e| BrowserError::NavigationFailed(format!("Failed to navigate to {}: {}", url, e)))?;

        tab.wait_until_navigated()
            .map_err(|e| navigation_error(url, timeout, e.is::<headless_chrome::util::Timeout>(), e))?;

        Ok(())
    }

    /// Title and URL of the active tab, for diagnostics
    pub fn location(&self) -> Result<(String, String)> {
        let tab = self.tab()?;
        let title = tab
            .get_title()
            .map_err(|e| BrowserError::TabOperationFailed(format!("Failed to read title: {}", e)))?;
        Ok((title, tab.get_url()))
    }

    /// [`Page`](crate::browser::Page) over the active tab
    pub fn page(&self) -> Result<ChromePage> {
        Ok(ChromePage::new(self.tab()?))
    }

    /// Close the browser
    pub fn close(&self) -> Result<()> {
        // headless_chrome closes the process when Browser is dropped; closing
        // the tabs releases the session on a shared (connected) browser
        let tabs = self.get_tabs()?;
        for tab in tabs {
            if let Err(e) = tab.close(false) {
                log::debug!("Failed to close tab: {}", e);
            }
        }
        Ok(())
    }
}

/// Error for a navigation whose load did not complete; an expired wait is a
/// [`BrowserError::Timeout`]
fn navigation_error(url: &str, timeout: Duration, timed_out: bool, cause: impl fmt::Display) -> BrowserError {
    if timed_out {
        BrowserError::Timeout { what: format!("navigation to {}", url), millis: timeout.as_millis() }
    } else {
        BrowserError::NavigationFailed(format!("Navigation to {} did not complete: {}", url, cause))
    }
}
