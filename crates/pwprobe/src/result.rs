//! Result and error types for pwprobe.

use crate::flag::FlagSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for pwprobe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors that can occur while driving or verifying the panel
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunchError {
        /// Error message
        message: String,
    },

    /// Page error
    #[error("Page error: {message}")]
    PageError {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    NavigationError {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Input simulation error
    #[error("Input simulation failed: {message}")]
    InputError {
        /// Error message
        message: String,
    },

    /// Screenshot error
    #[error("Screenshot failed: {message}")]
    ScreenshotError {
        /// Error message
        message: String,
    },

    /// No element matched a selector (yet)
    #[error("No element matches {selector}")]
    ElementNotFound {
        /// Selector that matched nothing
        selector: String,
    },

    /// An expected UI state never materialized
    #[error("Timed out after {ms}ms waiting for {waited_for}")]
    Timeout {
        /// What was being waited for
        waited_for: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Toggle widget style matched neither known state
    #[error("Ambiguous state for widget '{widget}': {property} is {observed:?}, expected {checked:?} (checked) or {unchecked:?} (unchecked)")]
    AmbiguousWidgetState {
        /// Widget label
        widget: String,
        /// Style property that was read
        property: String,
        /// Observed value
        observed: String,
        /// Value meaning checked
        checked: String,
        /// Value meaning unchecked
        unchecked: String,
    },

    /// A generated value failed the oracle for the active configuration
    #[error("Oracle mismatch for {configuration}: {value:?} ({reason})")]
    OracleMismatch {
        /// Active configuration
        configuration: FlagSet,
        /// Offending generated value
        value: String,
        /// Which rule rejected it
        reason: String,
    },

    /// The walk reached a configuration the oracle table has no entry for
    #[error("No oracle entry for configuration {configuration}")]
    MissingOracleEntry {
        /// Configuration lacking an entry
        configuration: FlagSet,
    },

    /// Generated or displayed length disagrees with the test case
    #[error("Length mismatch for input {input:?}: {message}")]
    LengthMismatch {
        /// Length input that was typed
        input: String,
        /// Error message
        message: String,
    },

    /// Regenerating did not produce a new value
    #[error("Regeneration produced the same value {value:?} after {attempts} attempt(s)")]
    RegenerationStalled {
        /// Value that kept repeating
        value: String,
        /// Regenerate clicks performed
        attempts: u32,
    },

    /// Classes enabled at all-true never showed up across the sample
    #[error("Classes {missing} never appeared in {samples} generated value(s)")]
    MissingClasses {
        /// Enabled classes that were never observed
        missing: FlagSet,
        /// Values sampled
        samples: usize,
    },

    /// A widget read back a state other than the tracked configuration says
    #[error("Widget '{widget}' reads {observed}, expected {expected}")]
    WidgetStateMismatch {
        /// Widget label
        widget: String,
        /// State the harness tracks
        expected: bool,
        /// State read from the page
        observed: bool,
    },

    /// Assertion failed
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// Locator name missing from the registry
    #[error("Unknown locator '{name}'")]
    UnknownLocator {
        /// Logical locator name
        name: String,
    },

    /// Walk plan violates a structural rule
    #[error("Invalid walk plan: {message}")]
    InvalidPlan {
        /// Error message
        message: String,
    },

    /// Fixture error (load or validation failed)
    #[error("Fixture error: {message}")]
    FixtureError {
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
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

/// Failure classification used by reports.
///
/// Separates SUT defects from harness defects and hangs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    /// Widget style matched neither known constant
    AmbiguousWidgetState,
    /// Generated value violates the oracle
    OracleMismatch,
    /// UI state never materialized
    Timeout,
    /// Oracle table incomplete for the walk
    MissingOracleEntry,
    /// Length field or generated length wrong
    LengthMismatch,
    /// Regenerate did not change the value
    RegenerationStalled,
    /// Enabled classes absent from a whole sample
    ClassDistribution,
    /// Widget state disagrees with tracked configuration
    WidgetState,
    /// Anything else: browser, fixtures, I/O
    Harness,
}

impl FailureKind {
    /// Whether the failure points at the system under test rather than the harness
    #[must_use]
    pub const fn is_sut_defect(self) -> bool {
        matches!(
            self,
            Self::OracleMismatch
                | Self::LengthMismatch
                | Self::RegenerationStalled
                | Self::ClassDistribution
                | Self::WidgetState
        )
    }

    /// Short label for reports
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::AmbiguousWidgetState => "ambiguous-widget-state",
            Self::OracleMismatch => "oracle-mismatch",
            Self::Timeout => "timeout",
            Self::MissingOracleEntry => "missing-oracle-entry",
            Self::LengthMismatch => "length-mismatch",
            Self::RegenerationStalled => "regeneration-stalled",
            Self::ClassDistribution => "class-distribution",
            Self::WidgetState => "widget-state",
            Self::Harness => "harness",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl ProbeError {
    /// Classify this error
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::AmbiguousWidgetState { .. } => FailureKind::AmbiguousWidgetState,
            Self::OracleMismatch { .. } => FailureKind::OracleMismatch,
            Self::Timeout { .. } | Self::ElementNotFound { .. } => FailureKind::Timeout,
            Self::MissingOracleEntry { .. } => FailureKind::MissingOracleEntry,
            Self::LengthMismatch { .. } => FailureKind::LengthMismatch,
            Self::RegenerationStalled { .. } => FailureKind::RegenerationStalled,
            Self::MissingClasses { .. } => FailureKind::ClassDistribution,
            Self::WidgetStateMismatch { .. } => FailureKind::WidgetState,
            _ => FailureKind::Harness,
        }
    }

    /// Whether polling again may clear this error.
    ///
    /// Content checks and missing elements can settle; driver, fixture and
    /// harness errors cannot.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ElementNotFound { .. }
                | Self::AmbiguousWidgetState { .. }
                | Self::OracleMismatch { .. }
                | Self::LengthMismatch { .. }
                | Self::RegenerationStalled { .. }
                | Self::WidgetStateMismatch { .. }
                | Self::AssertionFailed { .. }
        )
    }

    /// Create an element-not-found error
    #[must_use]
    pub fn not_found(selector: impl std::fmt::Display) -> Self {
        Self::ElementNotFound {
            selector: selector.to_string(),
        }
    }

    /// Create a fixture error
    #[must_use]
    pub fn fixture(message: impl Into<String>) -> Self {
        Self::FixtureError {
            message: message.into(),
        }
    }

    /// Create a page error
    #[must_use]
    pub fn page(message: impl Into<String>) -> Self {
        Self::PageError {
            message: message.into(),
        }
    }

    /// Create an input error
    #[must_use]
    pub fn input(message: impl Into<String>) -> Self {
        Self::InputError {
            message: message.into(),
        }
    }

    /// Create an assertion error
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flag::Flag;

    #[test]
    fn test_oracle_mismatch_names_configuration_and_value() {
        let err = ProbeError::OracleMismatch {
            configuration: FlagSet::from_flags(&[Flag::Lowercase, Flag::Numbers]),
            value: "abc1!".to_string(),
            reason: "'!' is a symbol".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("{Lowercase, Numbers}"));
        assert!(text.contains("abc1!"));
        assert_eq!(err.kind(), FailureKind::OracleMismatch);
    }

    #[test]
    fn test_timeout_is_distinct_from_mismatch() {
        let err = ProbeError::Timeout {
            waited_for: "generated value".to_string(),
            ms: 4000,
        };
        assert_eq!(err.kind(), FailureKind::Timeout);
        assert!(!err.kind().is_sut_defect());
    }

    #[test]
    fn test_missing_entry_is_harness_side() {
        let err = ProbeError::MissingOracleEntry {
            configuration: FlagSet::ALL,
        };
        assert!(!err.kind().is_sut_defect());
        assert_eq!(err.kind().label(), "missing-oracle-entry");
    }

    #[test]
    fn test_retryable_split() {
        assert!(ProbeError::not_found("#pw").is_retryable());
        assert!(ProbeError::assertion("x").is_retryable());
        assert!(!ProbeError::fixture("x").is_retryable());
        assert!(!ProbeError::MissingOracleEntry {
            configuration: FlagSet::ALL
        }
        .is_retryable());
    }

    #[test]
    fn test_missing_classes_is_sut_defect() {
        let err = ProbeError::MissingClasses {
            missing: FlagSet::from_flags(&[Flag::Symbols]),
            samples: 20,
        };
        assert_eq!(err.kind(), FailureKind::ClassDistribution);
        assert!(err.kind().is_sut_defect());
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("{Symbols}"));
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ProbeError = io_err.into();
        assert_eq!(err.kind(), FailureKind::Harness);
        assert!(err.to_string().contains("I/O"));
    }
}
