//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Scenario or configuration failure from the library
    #[error(transparent)]
    Probe(#[from] snipeprobe::ProbeError),

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Command cannot run in this build
    #[error("{message}")]
    Unsupported {
        /// Error message
        message: String,
    },
}

impl CliError {
    /// Create an unsupported-command error
    #[must_use]
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_error_is_transparent() {
        let err = CliError::from(snipeprobe::ProbeError::NoOptions {
            field: "company".to_string(),
        });
        assert_eq!(err.to_string(), "No options rendered for company");
    }

    #[test]
    fn test_unsupported() {
        let err = CliError::unsupported("browser feature disabled");
        assert_eq!(err.to_string(), "browser feature disabled");
    }
}
