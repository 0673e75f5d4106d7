use crate::batch::processor::StyleOutcome;
use crate::error::BrowserError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Result of a batch that reached the application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub success: bool,
    /// One outcome per requested style, in request order
    pub results: Vec<StyleOutcome>,
    pub message: String,
    pub summary: BatchSummary,
}

impl BatchReport {
    pub fn new(results: Vec<StyleOutcome>) -> Self {
        let succeeded = results.iter().filter(|outcome| outcome.success).count();
        let summary = BatchSummary { total: results.len(), succeeded, failed: results.len() - succeeded };

        Self { success: true, message: format!("Processed {} style IDs", results.len()), results, summary }
    }
}

/// Category of a session-level failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Auth,
    Network,
    Timeout,
    Unknown,
}

impl FailureKind {
    /// Classify by substrings of the underlying failure message
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        if message.contains("ERR_INVALID_AUTH_CREDENTIALS") {
            FailureKind::Auth
        } else if message.contains("ERR_NAME_NOT_RESOLVED") {
            FailureKind::Network
        } else if lower.contains("timeout") || lower.contains("timed out") {
            FailureKind::Timeout
        } else {
            FailureKind::Unknown
        }
    }
}

/// Result of a batch that could not start: the browser or the entry page
/// was unreachable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureReport {
    pub error: String,
    pub details: String,
    pub suggestion: String,
    pub kind: FailureKind,
}

impl FailureReport {
    pub fn from_message(message: &str) -> Self {
        let kind = FailureKind::classify(message);
        let (error, details) = match kind {
            FailureKind::Auth => (
                "Authentication error - URL may require different credentials or VPN access".to_string(),
                "The PLM system returned an authentication error. This could mean:\n\
                 1. The URL requires VPN access\n\
                 2. The credentials are incorrect\n\
                 3. The system uses different authentication method\n\
                 4. The URL has changed or is not accessible"
                    .to_string(),
            ),
            FailureKind::Network => (
                "Network error - Cannot resolve domain".to_string(),
                "Cannot access the PLM host. Check internet connection or VPN access.".to_string(),
            ),
            FailureKind::Timeout => (
                "Timeout error - Page took too long to load".to_string(),
                "The PLM page took too long to respond. Try again or check network connection.".to_string(),
            ),
            FailureKind::Unknown => ("Failed to perform PLM automation".to_string(), message.to_string()),
        };

        Self {
            error,
            details,
            suggestion: "Try accessing the PLM URL manually in a browser first to verify it works".to_string(),
            kind,
        }
    }
}

impl From<&BrowserError> for FailureReport {
    fn from(err: &BrowserError) -> Self {
        Self::from_message(&err.to_string())
    }
}
