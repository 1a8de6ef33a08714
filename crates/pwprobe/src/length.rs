//! Length boundary checks.
//!
//! Each case types a value into the length field, asks for a new value and
//! expects both the generated value's length and the length field to show
//! the expected result. Positive cases echo the request, negative cases
//! assert the clamp or fallback, and the empty field must come back as "1".

use crate::driver::{clear_when_ready, click_when_ready, PageDriver};
use crate::locator::{names, Locator, LocatorRegistry, Selector};
use crate::result::{ProbeError, ProbeResult};
use crate::wait::{Poller, WaitOptions};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A length as written in fixtures: number or string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LengthValue {
    /// Numeric form, e.g. `12`
    Number(i64),
    /// Textual form, e.g. `"12"` or `""`
    Text(String),
}

impl LengthValue {
    /// As typed into, or shown by, the length field
    #[must_use]
    pub fn as_text(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

impl fmt::Display for LengthValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_text())
    }
}

impl From<&str> for LengthValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<i64> for LengthValue {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

/// Boundary class of a case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthCaseClass {
    /// In range, echoed unchanged
    Positive,
    /// Out of range or invalid, replaced by a fallback
    Negative,
    /// Field cleared
    Empty,
}

impl fmt::Display for LengthCaseClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Empty => "empty",
        })
    }
}

/// One length request and what the panel must show for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthTestCase {
    /// Typed into the length field
    pub input: LengthValue,
    /// Expected generated length and field contents
    pub expected: LengthValue,
    /// Boundary class
    pub class: LengthCaseClass,
}

impl LengthTestCase {
    /// Create a case
    #[must_use]
    pub const fn new(input: LengthValue, expected: LengthValue, class: LengthCaseClass) -> Self {
        Self {
            input,
            expected,
            class,
        }
    }

    /// Cleared field; both outputs must read "1"
    #[must_use]
    pub fn empty() -> Self {
        Self::new(LengthValue::from(""), LengthValue::from("1"), LengthCaseClass::Empty)
    }

    /// Expected length as a number
    pub fn expected_len(&self) -> ProbeResult<usize> {
        self.expected
            .as_text()
            .trim()
            .parse()
            .map_err(|_| ProbeError::fixture(format!("expected result {} is not a length", self.expected)))
    }

    /// Name used in logs and reports
    #[must_use]
    pub fn name(&self) -> String {
        format!("{} {}", self.class, self.input)
    }
}

/// What the panel showed for a passing case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthOutcome {
    /// The case
    pub case: LengthTestCase,
    /// Generated value
    pub value: String,
    /// Length field contents
    pub displayed: String,
}

/// Drives the length field and checks both outputs
#[derive(Debug, Clone)]
pub struct LengthBoundaryTester {
    length_field: Locator,
    generate: Locator,
    value: Selector,
    wait: WaitOptions,
}

impl LengthBoundaryTester {
    /// Tester over explicit locators
    #[must_use]
    pub const fn new(
        length_field: Locator,
        generate: Locator,
        value: Selector,
        wait: WaitOptions,
    ) -> Self {
        Self {
            length_field,
            generate,
            value,
            wait,
        }
    }

    /// Tester over the standard page-model names
    pub fn from_registry(registry: &LocatorRegistry, wait: WaitOptions) -> ProbeResult<Self> {
        Ok(Self::new(
            registry.locator(names::PASSWORD_LENGTH)?.with_wait(wait),
            registry.locator(names::GENERATE_PASSWORD)?.with_wait(wait),
            registry.selector(names::PASSWORD_VALUE)?.clone(),
            wait,
        ))
    }

    /// Set the length, regenerate, and check generated and displayed length
    pub async fn verify_length(
        &self,
        page: &mut dyn PageDriver,
        case: &LengthTestCase,
    ) -> ProbeResult<LengthOutcome> {
        let expected_len = case.expected_len()?;
        let expected_text = case.expected.as_text();
        let input = case.input.as_text();
        tracing::debug!(case = %case.name(), expected = expected_len, "checking length");

        clear_when_ready(page, &self.length_field).await?;
        if !input.is_empty() {
            page.type_text(&self.length_field, &input).await?;
        }
        click_when_ready(page, &self.generate).await?;

        let mut poller = Poller::new(self.wait, format!("length {expected_len}"));
        loop {
            match self.observe(page, &input, expected_len, &expected_text).await {
                Ok((value, displayed)) => {
                    return Ok(LengthOutcome {
                        case: case.clone(),
                        value,
                        displayed,
                    })
                }
                Err(e) => poller.retry(e).await?,
            }
        }
    }

    async fn observe(
        &self,
        page: &dyn PageDriver,
        input: &str,
        expected_len: usize,
        expected_text: &str,
    ) -> ProbeResult<(String, String)> {
        let value = page.input_value(&self.value).await?;
        let displayed = page.input_value(self.length_field.selector()).await?;
        let generated_len = value.chars().count();
        if generated_len != expected_len {
            return Err(ProbeError::LengthMismatch {
                input: input.to_string(),
                message: format!("generated {value:?} has length {generated_len}, expected {expected_len}"),
            });
        }
        if displayed.trim() != expected_text.trim() {
            return Err(ProbeError::LengthMismatch {
                input: input.to_string(),
                message: format!("length field shows {displayed:?}, expected {expected_text:?}"),
            });
        }
        Ok((value, displayed))
    }

    /// Run `cases` in order, stopping at the first failure
    pub async fn verify_all(
        &self,
        page: &mut dyn PageDriver,
        cases: &[LengthTestCase],
    ) -> ProbeResult<Vec<LengthOutcome>> {
        let mut outcomes = Vec::with_capacity(cases.len());
        for case in cases {
            outcomes.push(self.verify_length(page, case).await?);
        }
        Ok(outcomes)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::fixture::FixtureSet;
    use crate::simulated::{Fault, SimulatedPanel};

    fn fast() -> WaitOptions {
        WaitOptions::new().with_timeout(60).with_poll_interval(5)
    }

    async fn panel(faults: Vec<Fault>) -> (SimulatedPanel, LengthBoundaryTester, FixtureSet) {
        let fixtures = FixtureSet::bundled().unwrap();
        let mut panel = SimulatedPanel::new(fixtures.registry.clone()).with_faults(faults);
        panel.navigate(&fixtures.environment.url).await.unwrap();
        panel
            .click(&fixtures.registry.locator(names::USE_PASSWORD_GENERATOR).unwrap())
            .await
            .unwrap();
        let tester = LengthBoundaryTester::from_registry(&fixtures.registry, fast()).unwrap();
        (panel, tester, fixtures)
    }

    mod case_tests {
        use super::*;

        #[test]
        fn test_untagged_values() {
            let case: crate::fixture::RawLengthCase =
                serde_json::from_str(r#"{"value": 8, "expectedResult": "8"}"#).unwrap();
            assert_eq!(case.value, LengthValue::Number(8));
            assert_eq!(case.expected_result, LengthValue::from("8"));
        }

        #[test]
        fn test_empty_case() {
            let case = LengthTestCase::empty();
            assert_eq!(case.input.as_text(), "");
            assert_eq!(case.expected_len().unwrap(), 1);
            assert_eq!(case.name(), "empty \"\"");
        }

        #[test]
        fn test_expected_len_rejects_text() {
            let case = LengthTestCase::new(LengthValue::Number(5), "five".into(), LengthCaseClass::Positive);
            assert!(case.expected_len().is_err());
        }
    }

    mod tester_tests {
        use super::*;

        #[tokio::test]
        async fn test_bundled_cases_pass() {
            let (mut panel, tester, fixtures) = panel(vec![]).await;
            let outcomes = tester.verify_all(&mut panel, &fixtures.length_cases).await.unwrap();
            assert_eq!(outcomes.len(), fixtures.length_cases.len());
            let last = outcomes.last().unwrap();
            assert_eq!(last.value.len(), 1);
            assert_eq!(last.displayed, "1");
        }

        #[tokio::test]
        async fn test_missing_clamp_is_length_mismatch() {
            let (mut panel, tester, _) = panel(vec![Fault::NoClamp]).await;
            let case = LengthTestCase::new("150".into(), "99".into(), LengthCaseClass::Negative);
            let err = tester.verify_length(&mut panel, &case).await.unwrap_err();
            assert!(matches!(err, ProbeError::LengthMismatch { .. }));
            assert!(err.to_string().contains("150"));
        }

        #[tokio::test]
        async fn test_non_numeric_input_falls_back_to_one() {
            let (mut panel, tester, fixtures) = panel(vec![]).await;
            let case = LengthTestCase::new("abc".into(), "1".into(), LengthCaseClass::Negative);
            let outcome = tester.verify_length(&mut panel, &case).await.unwrap();
            assert_eq!(outcome.value.chars().count(), 1);
            assert_eq!(outcome.displayed, "1");
            assert!(fixtures
                .length_cases
                .iter()
                .any(|c| c.class == LengthCaseClass::Negative && c.input.as_text() == "abc"));
        }

        #[tokio::test]
        async fn test_empty_field_fallback_checked() {
            let (mut panel, tester, _) = panel(vec![Fault::KeepLengthOnEmpty]).await;
            let err = tester
                .verify_length(&mut panel, &LengthTestCase::empty())
                .await
                .unwrap_err();
            assert!(matches!(err, ProbeError::LengthMismatch { .. }));
        }

        #[tokio::test]
        async fn test_missing_field_times_out() {
            let (mut panel, tester, _) =
                panel(vec![Fault::Missing(names::PASSWORD_LENGTH.to_string())]).await;
            let case = LengthTestCase::new(LengthValue::Number(10), LengthValue::Number(10), LengthCaseClass::Positive);
            let err = tester.verify_length(&mut panel, &case).await.unwrap_err();
            assert!(matches!(err, ProbeError::Timeout { .. }));
        }

        #[tokio::test]
        async fn test_lagging_value_is_polled() {
            let (mut panel, tester, _) = panel(vec![Fault::Lag(3)]).await;
            let case = LengthTestCase::new(LengthValue::Number(20), LengthValue::Number(20), LengthCaseClass::Positive);
            let outcome = tester.verify_length(&mut panel, &case).await.unwrap();
            assert_eq!(outcome.value.len(), 20);
        }
    }
}
