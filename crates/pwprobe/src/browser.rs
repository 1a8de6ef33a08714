//! Browser control for the real panel.
//!
//! With the `browser` feature this drives Chromium over the `DevTools`
//! protocol via chromiumoxide, one [`ChromiumPage`] per session against a
//! shared [`Browser`]. Without the feature, launching fails with a clear
//! message and only the simulated panel is available.

use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};

/// Browser configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// User agent string
    pub user_agent: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 800,
            chromium_path: None,
            user_agent: None,
            sandbox: true,
        }
    }
}

impl BrowserConfig {
    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

/// Attribute used to hand an element found by script over to CDP input
#[cfg(feature = "browser")]
const TARGET_ATTRIBUTE: &str = "data-pwprobe-target";

// ============================================================================
// Real CDP Implementation (when `browser` feature is enabled)
// ============================================================================

#[cfg(feature = "browser")]
#[allow(clippy::missing_errors_doc, clippy::significant_drop_tightening)]
mod cdp {
    use super::{BrowserConfig, ProbeError, ProbeResult, TARGET_ATTRIBUTE};
    use crate::driver::{scripts, PageDriver};
    use crate::locator::{Locator, Selector};
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::cdp::browser_protocol::page::{
        CaptureScreenshotFormat, CaptureScreenshotParams,
    };
    use chromiumoxide::element::Element;
    use chromiumoxide::page::Page as CdpPage;
    use futures::StreamExt;
    use serde::Deserialize;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    /// Browser instance with real CDP connection
    #[derive(Debug)]
    pub struct Browser {
        config: BrowserConfig,
        inner: Arc<Mutex<CdpBrowser>>,
        handle: tokio::task::JoinHandle<()>,
    }

    impl Browser {
        /// Launch a new browser instance with real CDP
        pub async fn launch(config: BrowserConfig) -> ProbeResult<Self> {
            let mut builder = CdpConfig::builder()
                .window_size(config.viewport_width, config.viewport_height);

            if !config.headless {
                builder = builder.with_head();
            }

            if !config.sandbox {
                builder = builder.no_sandbox();
            }

            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }

            if let Some(ref ua) = config.user_agent {
                builder = builder.arg(format!("--user-agent={ua}"));
            }

            let cdp_config = builder
                .build()
                .map_err(|message| ProbeError::BrowserLaunchError { message })?;

            let (browser, mut handler) = CdpBrowser::launch(cdp_config).await.map_err(|e| {
                ProbeError::BrowserLaunchError {
                    message: e.to_string(),
                }
            })?;

            // Spawn handler task
            let handle = tokio::spawn(async move {
                while let Some(h) = handler.next().await {
                    if h.is_err() {
                        break;
                    }
                }
            });

            tracing::info!(headless = config.headless, "browser launched");
            Ok(Self {
                config,
                inner: Arc::new(Mutex::new(browser)),
                handle,
            })
        }

        /// Open a blank page
        pub async fn new_page(&self) -> ProbeResult<Box<dyn PageDriver>> {
            let browser = self.inner.lock().await;
            let page = browser
                .new_page("about:blank")
                .await
                .map_err(|e| ProbeError::page(e.to_string()))?;
            Ok(Box::new(ChromiumPage {
                inner: page,
                url: String::from("about:blank"),
            }))
        }

        /// Get the browser configuration
        #[must_use]
        pub const fn config(&self) -> &BrowserConfig {
            &self.config
        }

        /// Close the browser
        pub async fn close(self) -> ProbeResult<()> {
            let mut browser = self.inner.lock().await;
            browser
                .close()
                .await
                .map_err(|e| ProbeError::BrowserLaunchError {
                    message: e.to_string(),
                })?;
            self.handle.abort();
            Ok(())
        }
    }

    #[derive(Deserialize)]
    struct CheckedProbe {
        found: bool,
        checked: Option<bool>,
    }

    /// One browser tab driven over CDP
    #[derive(Debug)]
    pub struct ChromiumPage {
        inner: CdpPage,
        url: String,
    }

    impl ChromiumPage {
        async fn eval<T: serde::de::DeserializeOwned>(&self, script: String) -> ProbeResult<T> {
            let result = self
                .inner
                .evaluate(script)
                .await
                .map_err(|e| ProbeError::page(e.to_string()))?;
            result
                .into_value()
                .map_err(|e| ProbeError::page(e.to_string()))
        }

        /// Resolve `locator` to a CDP element, scrolling it into place first
        async fn target(&self, locator: &Locator) -> ProbeResult<Element> {
            let script = scripts::mark(
                locator.selector(),
                TARGET_ATTRIBUTE,
                locator.options().scroll_center,
            );
            let found: bool = self.eval(script).await?;
            if !found {
                return Err(ProbeError::not_found(locator.selector()));
            }
            self.inner
                .find_element(format!("[{TARGET_ATTRIBUTE}]"))
                .await
                .map_err(|_| ProbeError::not_found(locator.selector()))
        }
    }

    #[async_trait]
    impl PageDriver for ChromiumPage {
        async fn navigate(&mut self, url: &str) -> ProbeResult<()> {
            let _ = self
                .inner
                .goto(url)
                .await
                .map_err(|e| ProbeError::NavigationError {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
            self.url = url.to_string();
            Ok(())
        }

        async fn click(&mut self, locator: &Locator) -> ProbeResult<()> {
            let element = self.target(locator).await?;
            let _ = element
                .click()
                .await
                .map_err(|e| ProbeError::input(format!("click {}: {e}", locator.name())))?;
            Ok(())
        }

        async fn clear(&mut self, locator: &Locator) -> ProbeResult<()> {
            let element = self.target(locator).await?;
            let _ = element
                .click()
                .await
                .map_err(|e| ProbeError::input(e.to_string()))?;
            let _: bool = self.eval(scripts::select_all(TARGET_ATTRIBUTE)).await?;
            let _ = element
                .press_key("Backspace")
                .await
                .map_err(|e| ProbeError::input(e.to_string()))?;
            Ok(())
        }

        async fn type_text(&mut self, locator: &Locator, text: &str) -> ProbeResult<()> {
            let element = self.target(locator).await?;
            let _ = element
                .click()
                .await
                .map_err(|e| ProbeError::input(e.to_string()))?;
            let _ = element
                .type_str(text)
                .await
                .map_err(|e| ProbeError::input(e.to_string()))?;
            Ok(())
        }

        async fn input_value(&self, selector: &Selector) -> ProbeResult<String> {
            let value: Option<String> = self.eval(scripts::input_value(selector)).await?;
            value.ok_or_else(|| ProbeError::not_found(selector))
        }

        async fn computed_style(
            &self,
            selector: &Selector,
            pseudo: Option<&str>,
            property: &str,
        ) -> ProbeResult<String> {
            let value: Option<String> = self
                .eval(scripts::computed_style(selector, pseudo, property))
                .await?;
            value.ok_or_else(|| ProbeError::not_found(selector))
        }

        async fn checked_property(&self, selector: &Selector) -> ProbeResult<Option<bool>> {
            let probe: CheckedProbe = self.eval(scripts::checked_property(selector)).await?;
            if probe.found {
                Ok(probe.checked)
            } else {
                Err(ProbeError::not_found(selector))
            }
        }

        async fn screenshot(&self) -> ProbeResult<Vec<u8>> {
            let params = CaptureScreenshotParams::builder()
                .format(CaptureScreenshotFormat::Png)
                .build();

            let screenshot =
                self.inner
                    .execute(params)
                    .await
                    .map_err(|e| ProbeError::ScreenshotError {
                        message: e.to_string(),
                    })?;

            use base64::Engine;
            base64::engine::general_purpose::STANDARD
                .decode(&screenshot.data)
                .map_err(|e| ProbeError::ScreenshotError {
                    message: e.to_string(),
                })
        }

        async fn current_url(&self) -> ProbeResult<String> {
            let url = self
                .inner
                .url()
                .await
                .map_err(|e| ProbeError::page(e.to_string()))?;
            Ok(url.unwrap_or_else(|| self.url.clone()))
        }

        async fn close(&mut self) -> ProbeResult<()> {
            self.inner
                .clone()
                .close()
                .await
                .map_err(|e| ProbeError::page(e.to_string()))
        }
    }
}

// ============================================================================
// Stand-in when the `browser` feature is NOT enabled
// ============================================================================

#[cfg(not(feature = "browser"))]
#[allow(clippy::missing_const_for_fn, clippy::unused_async)]
mod unsupported {
    use super::{BrowserConfig, ProbeError, ProbeResult};
    use crate::driver::PageDriver;

    const MESSAGE: &str =
        "pwprobe was built without the 'browser' feature; rebuild with --features browser or use the simulated panel";

    /// Browser handle; cannot be launched in this build
    #[derive(Debug)]
    pub struct Browser {
        config: BrowserConfig,
    }

    impl Browser {
        /// Always fails: no CDP support compiled in
        ///
        /// # Errors
        ///
        /// Always returns [`ProbeError::BrowserLaunchError`]
        pub async fn launch(config: BrowserConfig) -> ProbeResult<Self> {
            let _ = config;
            Err(ProbeError::BrowserLaunchError {
                message: MESSAGE.to_string(),
            })
        }

        /// Never reached: no browser can exist
        ///
        /// # Errors
        ///
        /// Always returns [`ProbeError::BrowserLaunchError`]
        pub async fn new_page(&self) -> ProbeResult<Box<dyn PageDriver>> {
            Err(ProbeError::BrowserLaunchError {
                message: MESSAGE.to_string(),
            })
        }

        /// Get the browser configuration
        #[must_use]
        pub const fn config(&self) -> &BrowserConfig {
            &self.config
        }

        /// Close the browser
        ///
        /// # Errors
        ///
        /// Never fails
        pub async fn close(self) -> ProbeResult<()> {
            Ok(())
        }
    }
}

// Re-export based on feature
#[cfg(feature = "browser")]
pub use cdp::{Browser, ChromiumPage};

#[cfg(not(feature = "browser"))]
pub use unsupported::Browser;
