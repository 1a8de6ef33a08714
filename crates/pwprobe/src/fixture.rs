//! Fixture files: page model, oracle patterns, length cases, environment.
//!
//! A fixture directory holds four JSON documents. They are loaded once per
//! run and validated before any scenario starts: every required locator must
//! be named, every pattern must compile and agree with its character
//! classes, every configuration the walk visits must have a pattern, and the
//! environment must name a URL.

use crate::length::{LengthCaseClass, LengthTestCase, LengthValue};
use crate::locator::{names, LocatorRegistry};
use crate::oracle::OracleTable;
use crate::result::{ProbeError, ProbeResult};
use crate::walker::WalkPlan;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Page model file name
pub const PAGE_MODEL_FILE: &str = "PasswordGeneratorPage.json";
/// Oracle pattern file name
pub const PATTERNS_FILE: &str = "CheckboxRegexPatterns.json";
/// Length cases file name
pub const LENGTH_CASES_FILE: &str = "PasswordLengthTestCases.json";
/// Environment file name
pub const ENVIRONMENT_FILE: &str = "TestEnvironment.json";

const BUNDLED_PAGE_MODEL: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/PasswordGeneratorPage.json"));
const BUNDLED_PATTERNS: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/CheckboxRegexPatterns.json"));
const BUNDLED_LENGTH_CASES: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/fixtures/PasswordLengthTestCases.json"
));
const BUNDLED_ENVIRONMENT: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/TestEnvironment.json"));

/// `PasswordGeneratorPage.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageModel {
    /// Logical name to selector
    pub selectors: BTreeMap<String, String>,
}

/// `CheckboxRegexPatterns.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternFile {
    /// Configuration key (`all`, `noUppercase`, ...) to regex
    pub regex_patterns: BTreeMap<String, String>,
}

/// One entry of the length cases file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLengthCase {
    /// Typed into the length field
    pub value: LengthValue,
    /// Length both outputs must show
    pub expected_result: LengthValue,
}

/// `PasswordLengthTestCases.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LengthCaseFile {
    /// Requests echoed back unchanged
    #[serde(default)]
    pub positive_cases: Vec<RawLengthCase>,
    /// Requests clamped or replaced by a fallback
    #[serde(default)]
    pub negative_cases: Vec<RawLengthCase>,
}

/// Where the system under test lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestEnvironment {
    /// Entry URL
    pub url: String,
}

/// `TestEnvironment.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentFile {
    /// The environment descriptor
    pub test_environment: TestEnvironment,
}

/// Everything loaded from one fixture directory
#[derive(Debug, Clone)]
pub struct FixtureSet {
    /// Logical locator names
    pub registry: LocatorRegistry,
    /// Oracle built from the patterns
    pub oracle: OracleTable,
    /// Length cases, positive first, then negative, then the empty case
    pub length_cases: Vec<LengthTestCase>,
    /// SUT entry point
    pub environment: TestEnvironment,
    /// Directory the set came from; `None` for the bundled set
    pub source: Option<PathBuf>,
}

impl FixtureSet {
    /// Load and validate the four files in `dir`
    pub fn load_dir(dir: &Path) -> ProbeResult<Self> {
        tracing::debug!(dir = %dir.display(), "loading fixtures");
        let read = |file: &str| {
            let path = dir.join(file);
            std::fs::read_to_string(&path).map_err(|e| {
                ProbeError::fixture(format!("cannot read {}: {e}", path.display()))
            })
        };
        let mut set = Self::from_sources(
            &read(PAGE_MODEL_FILE)?,
            &read(PATTERNS_FILE)?,
            &read(LENGTH_CASES_FILE)?,
            &read(ENVIRONMENT_FILE)?,
        )?;
        set.source = Some(dir.to_path_buf());
        Ok(set)
    }

    /// The fixture set shipped with the crate
    pub fn bundled() -> ProbeResult<Self> {
        Self::from_sources(
            BUNDLED_PAGE_MODEL,
            BUNDLED_PATTERNS,
            BUNDLED_LENGTH_CASES,
            BUNDLED_ENVIRONMENT,
        )
    }

    /// Parse and validate the four documents
    pub fn from_sources(
        page_model: &str,
        patterns: &str,
        length_cases: &str,
        environment: &str,
    ) -> ProbeResult<Self> {
        let page_model: PageModel = parse(PAGE_MODEL_FILE, page_model)?;
        let patterns: PatternFile = parse(PATTERNS_FILE, patterns)?;
        let length_file: LengthCaseFile = parse(LENGTH_CASES_FILE, length_cases)?;
        let environment: EnvironmentFile = parse(ENVIRONMENT_FILE, environment)?;

        let registry = LocatorRegistry::from_raw(&page_model.selectors);
        registry.require(&names::REQUIRED)?;

        let oracle = OracleTable::from_patterns(&patterns.regex_patterns)?;
        oracle
            .ensure_covers(WalkPlan::standard().vertices())
            .map_err(|e| ProbeError::fixture(format!("{PATTERNS_FILE}: {e}")))?;

        let url = environment.test_environment.url.trim();
        if url.is_empty() {
            return Err(ProbeError::fixture(format!("{ENVIRONMENT_FILE}: url is empty")));
        }

        let length_cases = length_file
            .positive_cases
            .into_iter()
            .map(|raw| (raw, LengthCaseClass::Positive))
            .chain(
                length_file
                    .negative_cases
                    .into_iter()
                    .map(|raw| (raw, LengthCaseClass::Negative)),
            )
            .map(|(raw, class)| LengthTestCase::new(raw.value, raw.expected_result, class))
            .chain(std::iter::once(LengthTestCase::empty()))
            .collect::<Vec<_>>();
        for case in &length_cases {
            let _ = case
                .expected_len()
                .map_err(|e| ProbeError::fixture(format!("{LENGTH_CASES_FILE}: {e}")))?;
        }

        Ok(Self {
            registry,
            oracle,
            length_cases,
            environment: TestEnvironment {
                url: url.to_string(),
            },
            source: None,
        })
    }

    /// Short description for logs and `check-fixtures`
    #[must_use]
    pub fn describe(&self) -> String {
        let origin = self
            .source
            .as_ref()
            .map_or_else(|| "bundled".to_string(), |p| p.display().to_string());
        format!(
            "{origin}: {} locators, {} oracle entries, {} length cases, url {}",
            self.registry.len(),
            self.oracle.len(),
            self.length_cases.len(),
            self.environment.url
        )
    }
}

fn parse<T: serde::de::DeserializeOwned>(file: &str, source: &str) -> ProbeResult<T> {
    serde_json::from_str(source).map_err(|e| ProbeError::fixture(format!("{file}: {e}")))
}
