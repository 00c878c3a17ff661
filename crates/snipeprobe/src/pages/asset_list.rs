//! Hardware list and asset detail view.

use crate::config::ProbeConfig;
use crate::driver::PageDriver;
use crate::locator::{js_string, Locator, TextMatch};
use crate::page_object::{url_path, PageObject, UrlMatcher};
use crate::result::{ProbeError, ProbeResult};
use crate::wait::{self, ElementState, Settled, WaitOptions};

const SEARCH_INPUT: &str = "input.search-input";
const ROW_LINK: &str = "a";
const HISTORY_TAB: &str = "a[data-toggle='tab'][href='#history']";
const HISTORY_TAB_ACTIVE: &str = "li.active a[href='#history']";
const HISTORY_PANE: &str = "div.tab-pane#history";

/// Page script reading the result table as one string
pub const RESULT_SIGNATURE_SCRIPT: &str = "(() => Array.from(document.querySelectorAll('table tbody tr')) \
     .map(r => (r.innerText || '').trim()).join('\\n'))()";

/// Detail view path, `id` being the asset's database id
pub const ASSET_DETAIL_PATTERN: &str = "/hardware/:id";

/// Whether every row of a table signature shows `tag`
fn rows_filtered_to(rows: &str, tag: &str) -> bool {
    !rows.is_empty() && rows.lines().all(|row| row.contains(tag))
}

/// Script that types `tag` into the search box the way the bootstrap-table
/// widget listens for it: value write plus `input`, `keydown`, `keyup`.
#[must_use]
pub fn search_injection_script(tag: &str) -> String {
    format!(
        "(() => {{ const input = document.querySelector({input}); \
         if (!input) return false; \
         input.focus(); \
         input.value = {tag}; \
         input.dispatchEvent(new Event('input', {{ bubbles: true }})); \
         input.dispatchEvent(new KeyboardEvent('keydown', {{ key: 'Enter', bubbles: true }})); \
         input.dispatchEvent(new KeyboardEvent('keyup', {{ key: 'Enter', bubbles: true }})); \
         return true; }})()",
        input = js_string(SEARCH_INPUT),
        tag = js_string(tag),
    )
}

/// `/hardware`
#[derive(Debug)]
pub struct AssetListPage<'a, D: PageDriver + ?Sized> {
    driver: &'a D,
    url: String,
    options: WaitOptions,
    settle: WaitOptions,
}

impl<D: PageDriver + ?Sized> PageObject for AssetListPage<'_, D> {
    fn url_pattern(&self) -> &str {
        "/hardware"
    }

    fn page_name(&self) -> &str {
        "asset-list"
    }
}

impl<'a, D: PageDriver + ?Sized> AssetListPage<'a, D> {
    /// Hardware list of the configured instance
    #[must_use]
    pub fn new(driver: &'a D, config: &ProbeConfig) -> Self {
        Self {
            driver,
            url: config.url("/hardware"),
            options: config.timeouts.element(),
            settle: config.timeouts.settle(),
        }
    }

    async fn result_signature(&self) -> ProbeResult<String> {
        let value = self.driver.evaluate(RESULT_SIGNATURE_SCRIPT).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    /// Filter the list by `tag` and wait for the table to settle.
    ///
    /// The settle wait ends once two consecutive reads of the table agree and
    /// the table either differs from the unfiltered one or holds only rows
    /// showing the tag. Hitting the ceiling is logged and returned with
    /// `stable == false`.
    pub async fn search_asset(&self, tag: &str) -> ProbeResult<Settled<String>> {
        self.driver.goto(&self.url).await?;
        Locator::new(SEARCH_INPUT)
            .with_options(self.options)
            .wait_for(self.driver, ElementState::Visible)
            .await?;

        let before = self.result_signature().await?;
        let injected = self.driver.evaluate(&search_injection_script(tag)).await?;
        if injected != serde_json::Value::Bool(true) {
            return Err(ProbeError::ElementNotFound {
                selector: SEARCH_INPUT.to_string(),
                state: ElementState::Attached.to_string(),
                timeout_ms: self.options.timeout_ms,
            });
        }

        let settled = wait::poll_until_stable(
            move || self.result_signature(),
            |rows| *rows != before || rows_filtered_to(rows, tag),
            &self.settle,
        )
        .await?;

        if settled.stable {
            tracing::info!(
                page = self.page_name(),
                tag,
                elapsed = ?settled.elapsed,
                "search results settled"
            );
        } else {
            tracing::warn!(
                page = self.page_name(),
                tag,
                ceiling_ms = self.settle.timeout_ms,
                "search results did not settle before the ceiling"
            );
        }
        Ok(settled)
    }

    /// Open the row linked by exactly `tag`, switch to History, and check
    /// that the tab is active and its pane visible.
    ///
    /// Returns the asset id when the detail URL carries one.
    pub async fn open_asset_and_verify_history(&self, tag: &str) -> ProbeResult<Option<String>> {
        Locator::new(ROW_LINK)
            .with_options(self.options)
            .with_text(tag, TextMatch::Exact)
            .click(self.driver)
            .await?;
        Locator::new(HISTORY_TAB)
            .with_options(self.options)
            .click(self.driver)
            .await?;

        Locator::new(HISTORY_TAB_ACTIVE)
            .with_options(self.options)
            .wait_for(self.driver, ElementState::Attached)
            .await
            .map_err(|e| ProbeError::verification("history tab active", e.to_string()))?;
        Locator::new(HISTORY_PANE)
            .with_options(self.options)
            .wait_for(self.driver, ElementState::Visible)
            .await
            .map_err(|e| ProbeError::verification("history pane visible", e.to_string()))?;

        let url = self.driver.current_url().await?;
        let id = UrlMatcher::new(ASSET_DETAIL_PATTERN)
            .extract_params(url_path(&url))
            .remove("id");
        tracing::info!(tag, asset_id = ?id, "history tab verified");
        Ok(id)
    }
}
