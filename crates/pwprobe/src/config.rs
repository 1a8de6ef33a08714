//! Harness configuration, loaded from YAML.
//!
//! ```yaml
//! wait:
//!   timeout_ms: 4000
//!   poll_interval_ms: 50
//! regeneration_attempts: 3
//! distribution_samples: 20
//! fixture_dir: fixtures
//! widget:
//!   kind: pseudo-element
//!   probe:
//!     checked: "rgb(221, 34, 34)"
//!     unchecked: "rgb(255, 255, 255)"
//! browser:
//!   headless: true
//!   sandbox: false
//! ```

use crate::browser::BrowserConfig;
use crate::distribution::DEFAULT_SAMPLES;
use crate::regeneration::DEFAULT_MAX_ATTEMPTS;
use crate::result::{ProbeError, ProbeResult};
use crate::wait::WaitOptions;
use crate::widget::{StyleProbe, WidgetKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How toggles are built and read
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// Widget technology
    pub kind: WidgetKind,
    /// Style probe for pseudo-element toggles
    pub probe: StyleProbe,
}

/// Everything that tunes a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Polling budget for every expectation
    pub wait: WaitOptions,
    /// Clicks allowed before a repeated value fails regeneration
    pub regeneration_attempts: u32,
    /// Values sampled by the class distribution check
    pub distribution_samples: usize,
    /// Fixture directory; the bundled set when absent
    pub fixture_dir: Option<PathBuf>,
    /// Toggle widgets
    pub widget: WidgetConfig,
    /// Browser launch options
    pub browser: BrowserConfig,
    /// Stop after the first failing scenario
    pub fail_fast: bool,
    /// Where to write failure screenshots
    pub artifacts_dir: Option<PathBuf>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            wait: WaitOptions::default(),
            regeneration_attempts: DEFAULT_MAX_ATTEMPTS,
            distribution_samples: DEFAULT_SAMPLES,
            fixture_dir: None,
            widget: WidgetConfig::default(),
            browser: BrowserConfig::default(),
            fail_fast: false,
            artifacts_dir: None,
        }
    }
}

impl HarnessConfig {
    /// Create config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and validate a YAML file
    pub fn load(path: &Path) -> ProbeResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| ProbeError::ConfigError {
            message: format!("cannot read {}: {e}", path.display()),
        })?;
        Self::from_yaml(&text)
    }

    /// Parse and validate YAML
    pub fn from_yaml(text: &str) -> ProbeResult<Self> {
        let config: Self = serde_yaml_ng::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Render as YAML
    pub fn to_yaml(&self) -> ProbeResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Reject settings that cannot produce a meaningful run
    pub fn validate(&self) -> ProbeResult<()> {
        let fail = |message: &str| {
            Err(ProbeError::ConfigError {
                message: message.to_string(),
            })
        };
        if self.wait.timeout_ms == 0 {
            return fail("wait.timeout_ms must be positive");
        }
        if self.wait.poll_interval_ms == 0 || self.wait.poll_interval_ms > self.wait.timeout_ms {
            return fail("wait.poll_interval_ms must be positive and at most wait.timeout_ms");
        }
        if self.regeneration_attempts == 0 {
            return fail("regeneration_attempts must be at least 1");
        }
        if self.distribution_samples == 0 {
            return fail("distribution_samples must be at least 1");
        }
        self.widget.probe.validate()
    }

    /// Set the wait budget
    #[must_use]
    pub const fn with_wait(mut self, wait: WaitOptions) -> Self {
        self.wait = wait;
        self
    }

    /// Set the fixture directory
    #[must_use]
    pub fn with_fixture_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fixture_dir = Some(dir.into());
        self
    }

    /// Set the class distribution sample size
    #[must_use]
    pub const fn with_distribution_samples(mut self, samples: usize) -> Self {
        self.distribution_samples = samples;
        self
    }

    /// Set regeneration attempts
    #[must_use]
    pub const fn with_regeneration_attempts(mut self, attempts: u32) -> Self {
        self.regeneration_attempts = attempts;
        self
    }

    /// Enable fail-fast mode
    #[must_use]
    pub const fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Write failure screenshots to `dir`
    #[must_use]
    pub fn with_artifacts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifacts_dir = Some(dir.into());
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = HarnessConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.wait.timeout_ms, 4000);
        assert_eq!(config.regeneration_attempts, 3);
        assert_eq!(config.widget.kind, WidgetKind::PseudoElement);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = HarnessConfig::from_yaml(
            "wait:\n  timeout_ms: 1500\nwidget:\n  kind: native\nbrowser:\n  sandbox: false\n",
        )
        .unwrap();
        assert_eq!(config.wait.timeout_ms, 1500);
        assert_eq!(config.wait.poll_interval_ms, 50);
        assert_eq!(config.widget.kind, WidgetKind::Native);
        assert_eq!(config.widget.probe.checked, "rgb(221, 34, 34)");
        assert!(!config.browser.sandbox);
        assert!(config.browser.headless);
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = HarnessConfig::new()
            .with_fixture_dir("fx")
            .with_distribution_samples(7)
            .with_fail_fast(true);
        let yaml = config.to_yaml().unwrap();
        assert_eq!(HarnessConfig::from_yaml(&yaml).unwrap(), config);
    }

    #[test]
    fn test_validation_errors() {
        let cases = [
            "wait:\n  timeout_ms: 0\n",
            "wait:\n  timeout_ms: 100\n  poll_interval_ms: 200\n",
            "regeneration_attempts: 0\n",
            "distribution_samples: 0\n",
            "widget:\n  probe:\n    unchecked: \"#dd2222\"\n",
        ];
        for yaml in cases {
            let err = HarnessConfig::from_yaml(yaml).unwrap_err();
            assert!(matches!(err, ProbeError::ConfigError { .. }), "{yaml}");
        }
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pwprobe.yaml");
        std::fs::write(&path, "distribution_samples: 5\n").unwrap();
        assert_eq!(HarnessConfig::load(&path).unwrap().distribution_samples, 5);
        assert!(HarnessConfig::load(&dir.path().join("absent.yaml")).is_err());
    }

    #[test]
    fn test_unparseable_yaml() {
        let err = HarnessConfig::from_yaml("wait: [1, 2").unwrap_err();
        assert!(matches!(err, ProbeError::Yaml(_)));
    }
}
