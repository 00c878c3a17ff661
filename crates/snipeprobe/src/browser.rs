//! Chromium control over the Chrome `DevTools` Protocol.
//!
//! Compiled with the `browser` feature. [`BrowserSession`] owns the Chromium
//! process and its CDP handler task; [`ChromiumPage`] implements
//! [`PageDriver`](crate::driver::PageDriver) for one tab.
//!
//! Queries, option selection and checkbox toggling run as page scripts.
//! Clicks and typing go through real CDP input events: select2 ignores
//! synthetic `el.click()` on its containers.

pub use crate::config::BrowserConfig;

#[cfg(feature = "browser")]
#[allow(
    clippy::significant_drop_tightening,
    clippy::missing_errors_doc,
    clippy::cast_possible_truncation
)]
mod cdp {
    use super::BrowserConfig;
    use crate::driver::{ElementSnapshot, PageDriver};
    use crate::locator::{js_string, Selector};
    use crate::result::{ProbeError, ProbeResult};
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::cdp::browser_protocol::page::{
        CaptureScreenshotFormat, CaptureScreenshotParams,
    };
    use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
    use chromiumoxide::handler::viewport::Viewport;
    use chromiumoxide::page::Page as CdpPage;
    use futures::StreamExt;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Mutex;

    /// Attribute used to hand a script-resolved element over to CDP input
    const TARGET_ATTR: &str = "data-snipeprobe-target";

    /// Errors Chromium reports when a script races a navigation
    const CONTEXT_GONE: [&str; 2] = ["Execution context was destroyed", "Cannot find context"];

    /// A running Chromium process with its CDP event loop
    #[derive(Debug)]
    pub struct BrowserSession {
        navigation_timeout: Duration,
        inner: Arc<Mutex<CdpBrowser>>,
        handle: tokio::task::JoinHandle<()>,
    }

    impl BrowserSession {
        /// Launch Chromium
        ///
        /// # Errors
        ///
        /// Returns error if browser cannot be launched
        pub async fn launch(
            config: BrowserConfig,
            navigation_timeout: Duration,
        ) -> ProbeResult<Self> {
            let mut builder = CdpConfig::builder()
                .window_size(config.viewport_width, config.viewport_height)
                .viewport(Viewport {
                    width: config.viewport_width,
                    height: config.viewport_height,
                    ..Viewport::default()
                })
                .request_timeout(navigation_timeout);

            if !config.headless {
                builder = builder.with_head();
            }

            if !config.sandbox {
                builder = builder.no_sandbox();
            }

            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }

            let cdp_config = builder
                .build()
                .map_err(|message| ProbeError::BrowserLaunch { message })?;

            let (browser, mut handler) =
                CdpBrowser::launch(cdp_config)
                    .await
                    .map_err(|e| ProbeError::BrowserLaunch {
                        message: e.to_string(),
                    })?;

            let handle = tokio::spawn(async move {
                while let Some(h) = handler.next().await {
                    if h.is_err() {
                        break;
                    }
                }
            });

            tracing::info!(
                headless = config.headless,
                width = config.viewport_width,
                height = config.viewport_height,
                "browser launched"
            );

            Ok(Self {
                navigation_timeout,
                inner: Arc::new(Mutex::new(browser)),
                handle,
            })
        }

        /// Open a blank tab
        pub async fn new_page(&self) -> ProbeResult<ChromiumPage> {
            let browser = self.inner.lock().await;
            let page = browser
                .new_page("about:blank")
                .await
                .map_err(|e| ProbeError::Page {
                    message: e.to_string(),
                })?;
            Ok(ChromiumPage {
                page,
                navigation_timeout: self.navigation_timeout,
            })
        }

        /// Close the browser and stop the handler task
        pub async fn close(self) -> ProbeResult<()> {
            let result = {
                let mut browser = self.inner.lock().await;
                browser.close().await
            };
            self.handle.abort();
            result.map_err(|e| ProbeError::BrowserLaunch {
                message: e.to_string(),
            })?;
            tracing::info!("browser closed");
            Ok(())
        }
    }

    impl Drop for BrowserSession {
        fn drop(&mut self) {
            self.handle.abort();
        }
    }

    /// One Chromium tab
    #[derive(Debug, Clone)]
    pub struct ChromiumPage {
        page: CdpPage,
        navigation_timeout: Duration,
    }

    impl ChromiumPage {
        async fn eval(&self, script: &str) -> ProbeResult<serde_json::Value> {
            let params = EvaluateParams::builder()
                .expression(script)
                .return_by_value(true)
                .await_promise(true)
                .build()
                .map_err(|message| ProbeError::Script { message })?;
            let result = self
                .page
                .evaluate_expression(params)
                .await
                .map_err(|e| ProbeError::Script {
                    message: e.to_string(),
                })?;
            Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
        }

        /// Tag the `index`-th match so CDP can address it by attribute
        async fn mark(&self, selector: &Selector, index: usize) -> ProbeResult<String> {
            let token = uuid::Uuid::new_v4().simple().to_string();
            let script = format!(
                "(() => {{ const el = ({query})[{index}]; if (!el) return false; \
                 el.setAttribute({attr}, {tok}); el.scrollIntoView({{block: 'center'}}); \
                 return true; }})()",
                query = selector.to_query(),
                attr = js_string(TARGET_ATTR),
                tok = js_string(&token),
            );
            if self.eval(&script).await? == serde_json::Value::Bool(true) {
                Ok(format!("[{TARGET_ATTR}=\"{token}\"]"))
            } else {
                Err(ProbeError::ElementNotFound {
                    selector: selector.to_string(),
                    state: "attached".to_string(),
                    timeout_ms: 0,
                })
            }
        }

        /// Remove a mark; the element may already be gone after a click
        async fn unmark(&self, css: &str) {
            let script = format!(
                "(() => {{ const el = document.querySelector({}); \
                 if (el) el.removeAttribute({}); return true; }})()",
                js_string(css),
                js_string(TARGET_ATTR)
            );
            if let Err(e) = self.eval(&script).await {
                tracing::debug!(error = %e, "unmark skipped");
            }
        }

        async fn find_marked(&self, css: &str) -> ProbeResult<chromiumoxide::element::Element> {
            self.page
                .find_element(css)
                .await
                .map_err(|e| ProbeError::Input {
                    message: e.to_string(),
                })
        }
    }

    #[async_trait]
    impl PageDriver for ChromiumPage {
        async fn goto(&self, url: &str) -> ProbeResult<()> {
            tracing::debug!(url, "goto");
            let navigation = tokio::time::timeout(self.navigation_timeout, self.page.goto(url))
                .await
                .map_err(|_| ProbeError::Navigation {
                    url: url.to_string(),
                    message: format!(
                        "load did not finish within {}ms",
                        self.navigation_timeout.as_millis()
                    ),
                })?;
            navigation.map_err(|e| ProbeError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
            Ok(())
        }

        async fn current_url(&self) -> ProbeResult<String> {
            let url = self.page.url().await.map_err(|e| ProbeError::Page {
                message: e.to_string(),
            })?;
            Ok(url.unwrap_or_default())
        }

        async fn query(&self, selector: &Selector) -> ProbeResult<Vec<ElementSnapshot>> {
            let script = format!(
                "(() => ({query}).map(el => {{ \
                   const style = window.getComputedStyle(el); \
                   const rect = el.getBoundingClientRect(); \
                   const isControl = el instanceof HTMLInputElement \
                     || el instanceof HTMLSelectElement || el instanceof HTMLTextAreaElement; \
                   return {{ \
                     text: (el.innerText || el.textContent || '').trim(), \
                     visible: style.display !== 'none' && style.visibility !== 'hidden' \
                       && rect.width > 0 && rect.height > 0, \
                     enabled: !el.disabled, \
                     value: isControl ? String(el.value) : null, \
                     checked: !!el.checked \
                   }}; }}))()",
                query = selector.to_query()
            );
            match self.eval(&script).await {
                Ok(value) => Ok(serde_json::from_value(value)?),
                Err(ProbeError::Script { message })
                    if CONTEXT_GONE.iter().any(|m| message.contains(m)) =>
                {
                    tracing::trace!(%selector, "query raced a navigation");
                    Ok(Vec::new())
                }
                Err(e) => Err(e),
            }
        }

        async fn click(&self, selector: &Selector, index: usize) -> ProbeResult<()> {
            let css = self.mark(selector, index).await?;
            let element = self.find_marked(&css).await?;
            element.click().await.map_err(|e| ProbeError::Input {
                message: format!("click {selector}: {e}"),
            })?;
            self.unmark(&css).await;
            Ok(())
        }

        async fn fill(&self, selector: &Selector, value: &str) -> ProbeResult<()> {
            let css = self.mark(selector, 0).await?;
            let element = self.find_marked(&css).await?;
            element.focus().await.map_err(|e| ProbeError::Input {
                message: format!("focus {selector}: {e}"),
            })?;
            let clear = format!(
                "(() => {{ const el = document.querySelector({}); el.value = ''; \
                 el.dispatchEvent(new Event('input', {{bubbles: true}})); return true; }})()",
                js_string(&css)
            );
            self.eval(&clear).await?;
            if !value.is_empty() {
                element.type_str(value).await.map_err(|e| ProbeError::Input {
                    message: format!("type into {selector}: {e}"),
                })?;
            }
            self.unmark(&css).await;
            Ok(())
        }

        async fn select_option(&self, selector: &Selector, value: &str) -> ProbeResult<()> {
            let script = format!(
                "(() => {{ const el = ({query})[0]; if (!el) return 'missing'; \
                 const opt = Array.from(el.options || []).find(o => o.value === {value}); \
                 if (!opt) return 'no-option'; \
                 el.value = opt.value; \
                 el.dispatchEvent(new Event('input', {{bubbles: true}})); \
                 el.dispatchEvent(new Event('change', {{bubbles: true}})); \
                 return 'ok'; }})()",
                query = selector.to_query(),
                value = js_string(value)
            );
            match self.eval(&script).await?.as_str() {
                Some("ok") => Ok(()),
                Some("no-option") => Err(ProbeError::OptionNotFound {
                    field: selector.to_string(),
                    option: value.to_string(),
                    timeout_ms: 0,
                }),
                _ => Err(ProbeError::ElementNotFound {
                    selector: selector.to_string(),
                    state: "attached".to_string(),
                    timeout_ms: 0,
                }),
            }
        }

        async fn check(&self, selector: &Selector) -> ProbeResult<()> {
            let script = format!(
                "(() => {{ const el = ({query})[0]; if (!el) return false; \
                 if (!el.checked) el.click(); \
                 if (!el.checked) {{ el.checked = true; \
                   el.dispatchEvent(new Event('change', {{bubbles: true}})); }} \
                 return el.checked; }})()",
                query = selector.to_query()
            );
            if self.eval(&script).await? == serde_json::Value::Bool(true) {
                Ok(())
            } else {
                Err(ProbeError::Input {
                    message: format!("{selector} did not become checked"),
                })
            }
        }

        async fn evaluate(&self, script: &str) -> ProbeResult<serde_json::Value> {
            self.eval(script).await
        }

        async fn screenshot(&self) -> ProbeResult<Vec<u8>> {
            let params = CaptureScreenshotParams::builder()
                .format(CaptureScreenshotFormat::Png)
                .build();

            let screenshot =
                self.page
                    .execute(params)
                    .await
                    .map_err(|e| ProbeError::Screenshot {
                        message: e.to_string(),
                    })?;

            use base64::Engine;
            base64::engine::general_purpose::STANDARD
                .decode(&screenshot.data)
                .map_err(|e| ProbeError::Screenshot {
                    message: e.to_string(),
                })
        }
    }
}

#[cfg(feature = "browser")]
pub use cdp::{BrowserSession, ChromiumPage};
