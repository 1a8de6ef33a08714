//! One scenario's connection to the panel.
//!
//! A [`Session`] owns its page for the duration of a scenario. Opening one
//! navigates to the environment URL and clicks the entry button that brings
//! up the generator; nothing is shared between sessions.

use crate::config::HarnessConfig;
use crate::driver::{click_when_ready, PageDriver};
use crate::fixture::FixtureSet;
use crate::locator::{names, Locator, LocatorRegistry, Selector};
use crate::result::ProbeResult;
use crate::wait::WaitOptions;
use crate::widget::WidgetSet;
use std::fmt;

/// Explicit per-scenario context: page, locators, toggles, wait budget
pub struct Session {
    page: Box<dyn PageDriver>,
    registry: LocatorRegistry,
    widgets: WidgetSet,
    wait: WaitOptions,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("registry", &self.registry)
            .field("widgets", &self.widgets)
            .field("wait", &self.wait)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Bootstrap a fresh page: navigate, then open the generator panel
    pub async fn open(
        page: Box<dyn PageDriver>,
        fixtures: &FixtureSet,
        config: &HarnessConfig,
    ) -> ProbeResult<Self> {
        let widgets = WidgetSet::from_registry(
            &fixtures.registry,
            config.widget.kind,
            &config.widget.probe,
            config.wait,
        )?;
        let mut session = Self {
            page,
            registry: fixtures.registry.clone(),
            widgets,
            wait: config.wait,
        };

        let url = &fixtures.environment.url;
        tracing::debug!(%url, "opening session");
        session.page.navigate(url).await?;
        let entry = session.locator(names::USE_PASSWORD_GENERATOR)?;
        click_when_ready(session.page.as_mut(), &entry).await?;
        Ok(session)
    }

    /// Locator for `name` carrying this session's wait budget
    pub fn locator(&self, name: &str) -> ProbeResult<Locator> {
        Ok(self.registry.locator(name)?.with_wait(self.wait))
    }

    /// Selector for `name`
    pub fn selector(&self, name: &str) -> ProbeResult<Selector> {
        self.registry.selector(name).cloned()
    }

    /// Page driver
    #[must_use]
    pub fn page(&self) -> &dyn PageDriver {
        self.page.as_ref()
    }

    /// Page driver, mutably
    pub fn page_mut(&mut self) -> &mut dyn PageDriver {
        self.page.as_mut()
    }

    /// Toggle adapters
    #[must_use]
    pub const fn widgets(&self) -> &WidgetSet {
        &self.widgets
    }

    /// Locator registry
    #[must_use]
    pub const fn registry(&self) -> &LocatorRegistry {
        &self.registry
    }

    /// Wait budget
    #[must_use]
    pub const fn wait(&self) -> WaitOptions {
        self.wait
    }

    /// Widgets and page together, for walks that read one and click the other
    pub fn parts_mut(&mut self) -> (&WidgetSet, &mut dyn PageDriver) {
        (&self.widgets, self.page.as_mut())
    }

    /// Release the page
    pub async fn close(mut self) -> ProbeResult<()> {
        self.page.close().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::result::ProbeError;
    use crate::simulated::{Fault, SimulatedPanel};

    fn fixtures() -> FixtureSet {
        FixtureSet::bundled().unwrap()
    }

    fn fast() -> HarnessConfig {
        HarnessConfig::default().with_wait(WaitOptions::new().with_timeout(50).with_poll_interval(5))
    }

    #[tokio::test]
    async fn test_open_navigates_then_opens_generator() {
        let fixtures = fixtures();
        let panel = SimulatedPanel::new(fixtures.registry.clone());
        let session = Session::open(Box::new(panel), &fixtures, &fast()).await.unwrap();
        assert_eq!(
            session.page().current_url().await.unwrap(),
            fixtures.environment.url
        );
        let value = session.selector(names::PASSWORD_VALUE).unwrap();
        assert_eq!(session.page().input_value(&value).await.unwrap().len(), 12);
    }

    #[tokio::test]
    async fn test_missing_entry_button_times_out() {
        let fixtures = fixtures();
        let panel = SimulatedPanel::new(fixtures.registry.clone())
            .with_fault(Fault::Missing(names::USE_PASSWORD_GENERATOR.to_string()));
        let err = Session::open(Box::new(panel), &fixtures, &fast()).await.unwrap_err();
        match err {
            ProbeError::Timeout { waited_for, ms } => {
                assert_eq!(waited_for, names::USE_PASSWORD_GENERATOR);
                assert_eq!(ms, 50);
            }
            other => panic!("expected timeout, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_locator_carries_wait_budget() {
        let fixtures = fixtures();
        let panel = SimulatedPanel::new(fixtures.registry.clone());
        let session = Session::open(Box::new(panel), &fixtures, &fast()).await.unwrap();
        let locator = session.locator(names::GENERATE_PASSWORD).unwrap();
        assert_eq!(locator.wait().timeout_ms, 50);
        assert!(session.locator("nope").is_err());
        session.close().await.unwrap();
    }
}
