//! Result and error types for snipeprobe.

use thiserror::Error;

/// Result type for snipeprobe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors that can occur while driving the Snipe-IT workflow
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Page or CDP session error
    #[error("Page error: {message}")]
    Page {
        /// Error message
        message: String,
    },

    /// Navigation error (unreachable URL or load timeout)
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Expected element did not reach the requested state in time
    #[error("Element {selector} not {state} within {timeout_ms}ms")]
    ElementNotFound {
        /// Selector description
        selector: String,
        /// State that was awaited
        state: String,
        /// Timeout in milliseconds
        timeout_ms: u64,
    },

    /// Dropdown option with the requested text did not render
    #[error("Option {option:?} not found in {field} within {timeout_ms}ms")]
    OptionNotFound {
        /// Field name
        field: String,
        /// Option text or value
        option: String,
        /// Timeout in milliseconds
        timeout_ms: u64,
    },

    /// A selection step found zero candidates
    #[error("No options rendered for {field}")]
    NoOptions {
        /// Field name
        field: String,
    },

    /// Post-condition not observed
    #[error("Verification failed: {what}: {message}")]
    Verification {
        /// What was being verified
        what: String,
        /// Underlying failure
        message: String,
    },

    /// Input simulation error
    #[error("Input simulation failed: {message}")]
    Input {
        /// Error message
        message: String,
    },

    /// In-page script evaluation error
    #[error("Script evaluation failed: {message}")]
    Script {
        /// Error message
        message: String,
    },

    /// Screenshot error
    #[error("Screenshot failed: {message}")]
    Screenshot {
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl ProbeError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a verification error
    #[must_use]
    pub fn verification(what: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Verification {
            what: what.into(),
            message: message.into(),
        }
    }

    /// Whether this error is an element or option lookup timing out
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ElementNotFound { .. } | Self::OptionNotFound { .. }
        )
    }
}
