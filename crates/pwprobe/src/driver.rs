//! PageDriver - the UI contract the harness drives.
//!
//! The harness never reaches into the SUT; everything goes through this
//! trait. Implementations:
//!
//! - `ChromiumPage` (`browser` feature) - real page over CDP via chromiumoxide
//! - [`SimulatedPanel`](crate::simulated::SimulatedPanel) - in-memory panel for
//!   tests and dry runs

use crate::locator::{Locator, Selector};
use crate::result::ProbeResult;
use crate::wait::Poller;
use async_trait::async_trait;

/// Abstract page driver.
///
/// Reads return [`ProbeError::ElementNotFound`](crate::ProbeError::ElementNotFound)
/// when the selector matches nothing, so callers can poll.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate to URL
    async fn navigate(&mut self, url: &str) -> ProbeResult<()>;

    /// Click the located element
    async fn click(&mut self, locator: &Locator) -> ProbeResult<()>;

    /// Empty a text input the way a user would (select all, delete)
    async fn clear(&mut self, locator: &Locator) -> ProbeResult<()>;

    /// Type text into the located element
    async fn type_text(&mut self, locator: &Locator, text: &str) -> ProbeResult<()>;

    /// Current `value` of an input element
    async fn input_value(&self, selector: &Selector) -> ProbeResult<String>;

    /// Computed style `property` of the element or one of its pseudo-elements
    /// (`pseudo` is e.g. `"::before"`)
    async fn computed_style(
        &self,
        selector: &Selector,
        pseudo: Option<&str>,
        property: &str,
    ) -> ProbeResult<String>;

    /// Native `checked` property; `None` if the element has none
    async fn checked_property(&self, selector: &Selector) -> ProbeResult<Option<bool>>;

    /// PNG screenshot of the viewport
    async fn screenshot(&self) -> ProbeResult<Vec<u8>>;

    /// Get current URL
    async fn current_url(&self) -> ProbeResult<String>;

    /// Release the page
    async fn close(&mut self) -> ProbeResult<()>;
}

#[async_trait]
impl<D: PageDriver + ?Sized> PageDriver for Box<D> {
    async fn navigate(&mut self, url: &str) -> ProbeResult<()> {
        (**self).navigate(url).await
    }

    async fn click(&mut self, locator: &Locator) -> ProbeResult<()> {
        (**self).click(locator).await
    }

    async fn clear(&mut self, locator: &Locator) -> ProbeResult<()> {
        (**self).clear(locator).await
    }

    async fn type_text(&mut self, locator: &Locator, text: &str) -> ProbeResult<()> {
        (**self).type_text(locator, text).await
    }

    async fn input_value(&self, selector: &Selector) -> ProbeResult<String> {
        (**self).input_value(selector).await
    }

    async fn computed_style(
        &self,
        selector: &Selector,
        pseudo: Option<&str>,
        property: &str,
    ) -> ProbeResult<String> {
        (**self).computed_style(selector, pseudo, property).await
    }

    async fn checked_property(&self, selector: &Selector) -> ProbeResult<Option<bool>> {
        (**self).checked_property(selector).await
    }

    async fn screenshot(&self) -> ProbeResult<Vec<u8>> {
        (**self).screenshot().await
    }

    async fn current_url(&self) -> ProbeResult<String> {
        (**self).current_url().await
    }

    async fn close(&mut self) -> ProbeResult<()> {
        (**self).close().await
    }
}

/// Click once the element exists, polling within the locator's wait budget
pub async fn click_when_ready(page: &mut dyn PageDriver, locator: &Locator) -> ProbeResult<()> {
    let mut poller = Poller::new(locator.wait(), locator.name());
    loop {
        match page.click(locator).await {
            Ok(()) => return Ok(()),
            Err(e) => poller.retry(e).await?,
        }
    }
}

/// Clear the input once it exists
pub async fn clear_when_ready(page: &mut dyn PageDriver, locator: &Locator) -> ProbeResult<()> {
    let mut poller = Poller::new(locator.wait(), locator.name());
    loop {
        match page.clear(locator).await {
            Ok(()) => return Ok(()),
            Err(e) => poller.retry(e).await?,
        }
    }
}

/// JavaScript helpers shared by CDP-backed drivers
pub mod scripts {
    use crate::locator::Selector;

    /// Yields the element's `value` as a string, or null when absent
    #[must_use]
    pub fn input_value(selector: &Selector) -> String {
        format!(
            "(() => {{ const el = {}; return el ? String(el.value ?? '') : null; }})()",
            selector.to_query()
        )
    }

    /// Yields a computed style property, or null when the element is absent
    #[must_use]
    pub fn computed_style(selector: &Selector, pseudo: Option<&str>, property: &str) -> String {
        let pseudo = pseudo.map_or_else(|| "null".to_string(), |p| format!("{p:?}"));
        format!(
            "(() => {{ const el = {}; if (!el) return null; return window.getComputedStyle(el, {pseudo}).getPropertyValue({property:?}); }})()",
            selector.to_query()
        )
    }

    /// Yields `{found, checked}` where `checked` is null for non-checkable elements
    #[must_use]
    pub fn checked_property(selector: &Selector) -> String {
        format!(
            "(() => {{ const el = {}; if (!el) return {{ found: false, checked: null }}; return {{ found: true, checked: typeof el.checked === 'boolean' ? el.checked : null }}; }})()",
            selector.to_query()
        )
    }

    /// Marks the element with `attribute` and scrolls it; yields whether it exists
    #[must_use]
    pub fn mark(selector: &Selector, attribute: &str, scroll_center: bool) -> String {
        let scroll = if scroll_center {
            "el.scrollIntoView({ block: 'center', inline: 'center' });"
        } else {
            ""
        };
        format!(
            "(() => {{ const el = {}; if (!el) return false; document.querySelectorAll('[{attribute}]').forEach(e => e.removeAttribute('{attribute}')); el.setAttribute('{attribute}', ''); {scroll} return true; }})()",
            selector.to_query()
        )
    }

    /// Selects the full contents of the marked input
    #[must_use]
    pub fn select_all(attribute: &str) -> String {
        format!(
            "(() => {{ const el = document.querySelector('[{attribute}]'); if (el && el.select) {{ el.focus(); el.select(); }} return true; }})()"
        )
    }
}
