use thiserror::Error;

/// Errors raised while driving the browser or extracting data
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    #[error("Failed to connect to browser: {0}")]
    ConnectionFailed(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Tab operation failed: {0}")]
    TabOperationFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Frame not found: {0}")]
    FrameNotFound(String),

    #[error("{stage} failed: {reason}")]
    RequiredStepFailed { stage: String, reason: String },

    #[error("No locator strategy matched {target}")]
    SelectorsExhausted { target: String },

    #[error("JavaScript evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("Failed to parse DOM: {0}")]
    DomParseFailed(String),

    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Timed out after {millis}ms waiting for {what}")]
    Timeout { what: String, millis: u128 },

    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, BrowserError>;
