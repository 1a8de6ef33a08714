//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Invalid argument
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message
        message: String,
    },

    /// One or more scenarios failed; the report has already been written
    #[error("{failed} of {total} scenario(s) failed")]
    ScenariosFailed {
        /// Failed scenarios
        failed: usize,
        /// Scenarios run
        total: usize,
    },

    /// Report generation error
    #[error("Report generation failed: {message}")]
    ReportGeneration {
        /// Error message
        message: String,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Harness library error
    #[error(transparent)]
    Probe(#[from] pwprobe::ProbeError),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a report generation error
    #[must_use]
    pub fn report_generation(message: impl Into<String>) -> Self {
        Self::ReportGeneration {
            message: message.into(),
        }
    }

    /// Process exit code: 1 for failing scenarios, 2 for everything else
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::ScenariosFailed { .. } => 1,
            _ => 2,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let err = CliError::config("bad yaml");
        assert!(err.to_string().contains("bad yaml"));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_scenarios_failed() {
        let err = CliError::ScenariosFailed { failed: 2, total: 4 };
        assert_eq!(err.to_string(), "2 of 4 scenario(s) failed");
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_from_probe_error() {
        let err: CliError = pwprobe::ProbeError::fixture("missing file").into();
        assert!(matches!(err, CliError::Probe(_)));
        assert!(err.to_string().contains("missing file"));
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: CliError = io.into();
        assert!(err.to_string().contains("gone"));
    }
}
