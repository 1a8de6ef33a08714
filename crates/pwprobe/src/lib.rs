//! pwprobe: conformance harness for password-generator panels.
//!
//! Drives a generator UI (a real page over CDP, or the in-process
//! [`SimulatedPanel`]) and checks it against fixture-defined expectations:
//!
//! - every enabled/disabled combination of the four character-class toggles
//!   produces values the oracle admits ([`ConfigurationWalker`]),
//! - the length field clamps and the value follows it ([`LengthBoundaryTester`]),
//! - "generate" produces a new value ([`RegenerationChecker`]),
//! - all enabled classes show up across a sample ([`ClassDistributionCheck`]).
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌─────────────┐   ┌──────────────────┐
//! │ FixtureSet   │──►│ SuiteRunner │──►│ SessionFactory   │
//! │ (JSON files) │   │ (scenarios) │   │ chromium | sim   │
//! └──────────────┘   └──────┬──────┘   └────────┬─────────┘
//!                           │                   ▼
//!                           │           ┌──────────────────┐
//!                           └──────────►│ Session          │
//!                                       │ PageDriver +     │
//!                                       │ WidgetSet        │
//!                                       └──────────────────┘
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod browser;
mod config;
mod distribution;
#[allow(clippy::missing_errors_doc)]
mod driver;
mod fixture;
mod flag;
mod length;
mod locator;
mod oracle;
mod regeneration;
mod reporter;
mod result;
mod session;
#[allow(clippy::missing_errors_doc, clippy::cast_possible_truncation)]
mod simulated;
mod suite;
mod wait;
mod walker;
#[allow(clippy::missing_errors_doc)]
mod widget;

pub use browser::{Browser, BrowserConfig};
#[cfg(feature = "browser")]
pub use browser::ChromiumPage;
pub use config::{HarnessConfig, WidgetConfig};
pub use distribution::{ClassDistributionCheck, DistributionReport, DEFAULT_SAMPLES};
pub use driver::{clear_when_ready, click_when_ready, scripts, PageDriver};
pub use fixture::{
    EnvironmentFile, FixtureSet, LengthCaseFile, PageModel, PatternFile, RawLengthCase,
    TestEnvironment, ENVIRONMENT_FILE, LENGTH_CASES_FILE, PAGE_MODEL_FILE, PATTERNS_FILE,
};
pub use flag::{Flag, FlagSet};
pub use length::{
    LengthBoundaryTester, LengthCaseClass, LengthOutcome, LengthTestCase, LengthValue,
};
pub use locator::{names, Locator, LocatorOptions, LocatorRegistry, Selector};
pub use oracle::{observed_classes, OracleEntry, OracleTable};
pub use regeneration::{RegenerationChecker, RegenerationOutcome, DEFAULT_MAX_ATTEMPTS};
pub use reporter::{headline, ReportFormat, Reporter};
pub use result::{FailureKind, ProbeError, ProbeResult};
pub use session::Session;
pub use simulated::{Fault, SimulatedPanel, DEFAULT_LENGTH, MAX_LENGTH, MIN_LENGTH};
pub use suite::{
    Failure, Scenario, ScenarioDetail, ScenarioResult, SessionFactory, SimulatedFactory,
    SuiteResults, SuiteRunner,
};
pub use wait::{Poller, WaitOptions, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS};
pub use walker::{
    ConfigurationWalker, Visit, WalkPlan, WalkReport, WalkStep, STANDARD_TOGGLES,
};
pub use widget::{
    CssColor, NativeCheckbox, PseudoElementToggle, StyleProbe, ToggleWidgetAdapter, WidgetKind,
    WidgetSet,
};
