//! Regeneration liveness: pressing "generate" must change the value.

use crate::driver::{click_when_ready, PageDriver};
use crate::locator::{names, Locator, LocatorRegistry, Selector};
use crate::result::{ProbeError, ProbeResult};
use crate::wait::{Poller, WaitOptions};
use serde::{Deserialize, Serialize};

/// Default number of "generate" clicks before a repeat counts as a failure
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// A successful regeneration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegenerationOutcome {
    /// Value before clicking
    pub before: String,
    /// First differing value
    pub after: String,
    /// Clicks needed
    pub attempts: u32,
}

/// Clicks "generate" and waits for a different value.
///
/// A generator may legitimately repeat itself, so up to `max_attempts`
/// clicks are allowed before [`ProbeError::RegenerationStalled`].
#[derive(Debug, Clone)]
pub struct RegenerationChecker {
    generate: Locator,
    value: Selector,
    wait: WaitOptions,
    max_attempts: u32,
}

impl RegenerationChecker {
    /// Checker over explicit locators
    #[must_use]
    pub const fn new(generate: Locator, value: Selector, wait: WaitOptions) -> Self {
        Self {
            generate,
            value,
            wait,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Checker over the standard page-model names
    pub fn from_registry(registry: &LocatorRegistry, wait: WaitOptions) -> ProbeResult<Self> {
        Ok(Self::new(
            registry.locator(names::GENERATE_PASSWORD)?.with_wait(wait),
            registry.selector(names::PASSWORD_VALUE)?.clone(),
            wait,
        ))
    }

    /// Allow this many clicks (at least one)
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Wait for a non-empty value
    pub async fn await_value(&self, page: &dyn PageDriver) -> ProbeResult<String> {
        let mut poller = Poller::new(self.wait, "a generated value");
        loop {
            let observed = match page.input_value(&self.value).await {
                Ok(value) if value.is_empty() => Err(ProbeError::assertion("generated value is empty")),
                other => other,
            };
            match observed {
                Ok(value) => return Ok(value),
                Err(e) => poller.retry(e).await?,
            }
        }
    }

    /// Read, regenerate, read again; the two must differ
    pub async fn verify_regeneration(
        &self,
        page: &mut dyn PageDriver,
    ) -> ProbeResult<RegenerationOutcome> {
        let before = self.await_value(page).await?;
        let (after, attempts) = self.regenerate_from(page, &before).await?;
        tracing::debug!(%before, %after, attempts, "value regenerated");
        Ok(RegenerationOutcome {
            before,
            after,
            attempts,
        })
    }

    /// Click until the value differs from `previous`
    pub async fn regenerate_from(
        &self,
        page: &mut dyn PageDriver,
        previous: &str,
    ) -> ProbeResult<(String, u32)> {
        for attempt in 1..=self.max_attempts {
            click_when_ready(page, &self.generate).await?;
            match self.await_change(page, previous, attempt).await {
                Ok(value) => return Ok((value, attempt)),
                Err(ProbeError::RegenerationStalled { .. }) => {
                    tracing::debug!(attempt, value = previous, "value repeated");
                }
                Err(e) => return Err(e),
            }
        }
        Err(ProbeError::RegenerationStalled {
            value: previous.to_string(),
            attempts: self.max_attempts,
        })
    }

    async fn await_change(
        &self,
        page: &dyn PageDriver,
        previous: &str,
        attempt: u32,
    ) -> ProbeResult<String> {
        let mut poller = Poller::new(self.wait, "a new value");
        loop {
            let observed = match page.input_value(&self.value).await {
                Ok(value) if value.is_empty() || value == previous => {
                    Err(ProbeError::RegenerationStalled { value, attempts: attempt })
                }
                other => other,
            };
            match observed {
                Ok(value) => return Ok(value),
                Err(e) => poller.retry(e).await?,
            }
        }
    }
}
