//! Locator abstraction and the logical-name registry.
//!
//! Selectors render to JavaScript query expressions for the CDP driver and
//! are matched structurally by the simulated panel. The registry maps the
//! page model's logical names (`buttonGeneratePassword`, ...) to selectors.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::result::{ProbeError, ProbeResult};
use crate::wait::WaitOptions;

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Selector {
    /// CSS selector (e.g., "button.primary")
    Css(String),
    /// XPath selector
    XPath(String),
    /// Text content selector
    Text(String),
    /// Test ID selector (data-testid attribute)
    TestId(String),
    /// Deepest descendant of a CSS match whose text contains `text`
    CssWithText {
        /// Base CSS selector
        css: String,
        /// Text content to match
        text: String,
    },
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create a text selector
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Parse a page-model entry.
    ///
    /// `xpath=`, `text=` and `testid=` prefixes select the other kinds,
    /// anything else is CSS.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if let Some(rest) = raw.strip_prefix("xpath=") {
            Self::XPath(rest.to_string())
        } else if let Some(rest) = raw.strip_prefix("text=") {
            Self::Text(rest.to_string())
        } else if let Some(rest) = raw.strip_prefix("testid=") {
            Self::TestId(rest.to_string())
        } else {
            Self::Css(raw.to_string())
        }
    }

    /// Narrow to the descendant containing `text`.
    ///
    /// Only CSS selectors can be narrowed; other kinds are returned unchanged.
    #[must_use]
    pub fn within_text(self, text: impl Into<String>) -> Self {
        match self {
            Self::Css(css) => Self::CssWithText {
                css,
                text: text.into(),
            },
            other => other,
        }
    }

    /// CSS part of the selector, if it has one
    #[must_use]
    pub fn css_base(&self) -> Option<&str> {
        match self {
            Self::Css(css) | Self::CssWithText { css, .. } => Some(css),
            _ => None,
        }
    }

    /// Convert to a JavaScript expression yielding the element or null
    #[must_use]
    pub fn to_query(&self) -> String {
        match self {
            Self::Css(s) => format!("document.querySelector({s:?})"),
            Self::XPath(s) => {
                format!("document.evaluate({s:?}, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue")
            }
            Self::Text(t) => {
                format!("Array.from(document.querySelectorAll('body *')).reverse().find(el => el.textContent.includes({t:?}))")
            }
            Self::TestId(id) => format!("document.querySelector('[data-testid={id:?}]')"),
            Self::CssWithText { css, text } => {
                format!("(() => {{ const root = document.querySelector({css:?}); if (!root) return null; return [root, ...root.querySelectorAll('*')].reverse().find(el => el.textContent.includes({text:?})) || null; }})()")
            }
        }
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Css(s) => write!(f, "{s}"),
            Self::XPath(s) => write!(f, "xpath={s}"),
            Self::Text(t) => write!(f, "text={t}"),
            Self::TestId(id) => write!(f, "testid={id}"),
            Self::CssWithText { css, text } => write!(f, "{css} >> text={text}"),
        }
    }
}

impl From<Selector> for String {
    fn from(selector: Selector) -> Self {
        selector.to_string()
    }
}

impl From<String> for Selector {
    fn from(raw: String) -> Self {
        match raw.split_once(" >> text=") {
            Some((css, text)) => Self::css(css).within_text(text),
            None => Self::parse(&raw),
        }
    }
}

/// Locator options for customizing behavior
#[derive(Debug, Clone)]
pub struct LocatorOptions {
    /// Timeout for auto-waiting
    pub timeout: Duration,
    /// Polling interval for auto-waiting
    pub poll_interval: Duration,
    /// Scroll the element to the viewport centre before interacting
    pub scroll_center: bool,
}

impl Default for LocatorOptions {
    fn default() -> Self {
        let wait = WaitOptions::default();
        Self {
            timeout: wait.timeout(),
            poll_interval: wait.poll_interval(),
            scroll_center: true,
        }
    }
}

/// A named selector plus interaction options
#[derive(Debug, Clone)]
pub struct Locator {
    name: String,
    selector: Selector,
    options: LocatorOptions,
}

impl Locator {
    /// Create a locator from a selector
    #[must_use]
    pub fn new(name: impl Into<String>, selector: Selector) -> Self {
        Self {
            name: name.into(),
            selector,
            options: LocatorOptions::default(),
        }
    }

    /// Set a custom timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = timeout;
        self
    }

    /// Take timeout and polling interval from a wait budget
    #[must_use]
    pub const fn with_wait(mut self, wait: WaitOptions) -> Self {
        self.options.timeout = wait.timeout();
        self.options.poll_interval = wait.poll_interval();
        self
    }

    /// Wait budget for auto-waiting on this locator
    #[must_use]
    pub fn wait(&self) -> WaitOptions {
        let millis = |d: Duration| u64::try_from(d.as_millis()).unwrap_or(u64::MAX);
        WaitOptions::new()
            .with_timeout(millis(self.options.timeout))
            .with_poll_interval(millis(self.options.poll_interval))
    }

    /// Logical name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Get the options
    #[must_use]
    pub const fn options(&self) -> &LocatorOptions {
        &self.options
    }
}

/// Logical names the password-generator page model must define
pub mod names {
    /// Entry button that opens the generator panel
    pub const USE_PASSWORD_GENERATOR: &str = "buttonUsePasswordGenerator";
    /// Regenerate button
    pub const GENERATE_PASSWORD: &str = "buttonGeneratePassword";
    /// Output field holding the generated value
    pub const PASSWORD_VALUE: &str = "textFieldPasswordValue";
    /// Length input
    pub const PASSWORD_LENGTH: &str = "textFieldPasswordLength";
    /// Uppercase toggle
    pub const CHECKBOX_UPPERCASE: &str = "checkboxUppercase";
    /// Lowercase toggle
    pub const CHECKBOX_LOWERCASE: &str = "checkboxLowercase";
    /// Numbers toggle
    pub const CHECKBOX_NUMBERS: &str = "checkboxNumbers";
    /// Symbols toggle
    pub const CHECKBOX_SYMBOLS: &str = "checkboxSymbols";

    /// Every required name
    pub const REQUIRED: [&str; 8] = [
        USE_PASSWORD_GENERATOR,
        GENERATE_PASSWORD,
        PASSWORD_VALUE,
        PASSWORD_LENGTH,
        CHECKBOX_UPPERCASE,
        CHECKBOX_LOWERCASE,
        CHECKBOX_NUMBERS,
        CHECKBOX_SYMBOLS,
    ];
}

/// Registry of logical locator names
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatorRegistry {
    selectors: BTreeMap<String, Selector>,
}

impl LocatorRegistry {
    /// Empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a selector under `name`
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, selector: Selector) -> Self {
        let _ = self.selectors.insert(name.into(), selector);
        self
    }

    /// Build from raw page-model strings
    #[must_use]
    pub fn from_raw(raw: &BTreeMap<String, String>) -> Self {
        let selectors = raw
            .iter()
            .map(|(name, value)| (name.clone(), Selector::from(value.clone())))
            .collect();
        Self { selectors }
    }

    /// Selector registered as `name`
    pub fn selector(&self, name: &str) -> ProbeResult<&Selector> {
        self.selectors
            .get(name)
            .ok_or_else(|| ProbeError::UnknownLocator {
                name: name.to_string(),
            })
    }

    /// Locator for `name` with default options
    pub fn locator(&self, name: &str) -> ProbeResult<Locator> {
        Ok(Locator::new(name, self.selector(name)?.clone()))
    }

    /// Fail unless every name in `required` is registered
    pub fn require(&self, required: &[&str]) -> ProbeResult<()> {
        let missing: Vec<&str> = required
            .iter()
            .copied()
            .filter(|name| !self.selectors.contains_key(*name))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ProbeError::fixture(format!(
                "page model is missing locators: {}",
                missing.join(", ")
            )))
        }
    }

    /// Number of registered names
    #[must_use]
    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    /// Whether the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    /// Names and selectors in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Selector)> {
        self.selectors.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod selector_tests {
        use super::*;

        #[test]
        fn test_css_selector() {
            let query = Selector::css("button.primary").to_query();
            assert!(query.contains("querySelector"));
            assert!(query.contains("button.primary"));
        }

        #[test]
        fn test_test_id_selector() {
            let query = Selector::parse("testid=score").to_query();
            assert!(query.contains("data-testid"));
            assert!(query.contains("score"));
        }

        #[test]
        fn test_css_with_text_searches_descendants() {
            let selector = Selector::css("#upper").within_text("Uppercase");
            let query = selector.to_query();
            assert!(query.contains("#upper"));
            assert!(query.contains("querySelectorAll('*')"));
            assert!(query.contains("Uppercase"));
            assert_eq!(selector.css_base(), Some("#upper"));
        }

        #[test]
        fn test_within_text_leaves_xpath_alone() {
            let selector = Selector::XPath("//label".into()).within_text("x");
            assert!(matches!(selector, Selector::XPath(_)));
            assert_eq!(selector.css_base(), None);
        }

        #[test]
        fn test_parse_prefixes() {
            assert_eq!(Selector::parse("xpath=//a"), Selector::XPath("//a".into()));
            assert_eq!(Selector::parse("text=Go"), Selector::Text("Go".into()));
            assert_eq!(Selector::parse("testid=pw"), Selector::TestId("pw".into()));
            assert_eq!(Selector::parse(" #pw "), Selector::Css("#pw".into()));
        }

        #[test]
        fn test_string_round_trip_keeps_text_filter() {
            let selector = Selector::css("label.chk").within_text("Numbers");
            let raw: String = selector.clone().into();
            assert_eq!(Selector::from(raw), selector);
        }
    }

    mod registry_tests {
        use super::*;

        fn raw(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect()
        }

        #[test]
        fn test_lookup() {
            let registry = LocatorRegistry::from_raw(&raw(&[("buttonGeneratePassword", "#gen")]));
            assert_eq!(
                registry.selector("buttonGeneratePassword").unwrap(),
                &Selector::css("#gen")
            );
            let locator = registry.locator("buttonGeneratePassword").unwrap();
            assert_eq!(locator.name(), "buttonGeneratePassword");
        }

        #[test]
        fn test_unknown_name() {
            let err = LocatorRegistry::new().selector("nope").unwrap_err();
            assert!(matches!(err, ProbeError::UnknownLocator { .. }));
        }

        #[test]
        fn test_require_lists_missing() {
            let registry = LocatorRegistry::new().with(names::PASSWORD_VALUE, Selector::css("#pw"));
            let err = registry.require(&names::REQUIRED).unwrap_err();
            let text = err.to_string();
            assert!(text.contains(names::GENERATE_PASSWORD));
            assert!(!text.contains(names::PASSWORD_VALUE));
        }
    }

    mod locator_tests {
        use super::*;

        #[test]
        fn test_locator_timeout() {
            let locator =
                Locator::new("x", Selector::css("button")).with_timeout(Duration::from_secs(10));
            assert_eq!(locator.options().timeout, Duration::from_secs(10));
            assert!(locator.options().scroll_center);
        }

        #[test]
        fn test_locator_wait_round_trip() {
            let wait = WaitOptions::new().with_timeout(250).with_poll_interval(10);
            let locator = Locator::new("x", Selector::css("#x")).with_wait(wait);
            assert_eq!(locator.wait(), wait);
        }
    }
}
