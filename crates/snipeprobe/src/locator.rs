//! Locator abstraction for element selection and interaction.
//!
//! A [`Locator`] pairs a [`Selector`] with wait options. Every action waits for
//! its precondition before touching the page:
//!
//! - `click` / `fill` wait for [`ElementState::Ready`]
//! - `select_option` / `check` / `input_value` wait for [`ElementState::Attached`]
//!   (the native controls behind select2 and iCheck are hidden)

use serde::{Deserialize, Serialize};

use crate::driver::PageDriver;
use crate::result::ProbeResult;
use crate::wait::{self, ElementState, WaitOptions, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS};

/// How a text filter compares against an element's trimmed text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextMatch {
    /// Text must be identical
    #[default]
    Exact,
    /// Text must contain the filter
    Contains,
}

impl TextMatch {
    /// Compare an element text against the filter
    #[must_use]
    pub fn is_match(self, element_text: &str, filter: &str) -> bool {
        let text = element_text.trim();
        match self {
            Self::Exact => text == filter,
            Self::Contains => text.contains(filter),
        }
    }
}

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// CSS selector (e.g., "button.primary")
    Css(String),
    /// CSS selector narrowed by visible text
    CssWithText {
        /// Base CSS selector
        css: String,
        /// Text content to match
        text: String,
        /// Comparison mode
        matching: TextMatch,
    },
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create a CSS selector filtered by text
    #[must_use]
    pub fn css_with_text(css: impl Into<String>, text: impl Into<String>, matching: TextMatch) -> Self {
        Self::CssWithText {
            css: css.into(),
            text: text.into(),
            matching,
        }
    }

    /// The CSS part of the selector
    #[must_use]
    pub fn base_css(&self) -> &str {
        match self {
            Self::Css(css) | Self::CssWithText { css, .. } => css,
        }
    }

    /// Whether an element with this text passes the selector's text filter
    #[must_use]
    pub fn accepts_text(&self, element_text: &str) -> bool {
        match self {
            Self::Css(_) => true,
            Self::CssWithText { text, matching, .. } => matching.is_match(element_text, text),
        }
    }

    /// JavaScript expression evaluating to the array of matching elements
    #[must_use]
    pub fn to_query(&self) -> String {
        match self {
            Self::Css(css) => format!("Array.from(document.querySelectorAll({}))", js_string(css)),
            Self::CssWithText {
                css,
                text,
                matching,
            } => {
                let compare = match matching {
                    TextMatch::Exact => format!("t === {}", js_string(text)),
                    TextMatch::Contains => format!("t.includes({})", js_string(text)),
                };
                format!(
                    "Array.from(document.querySelectorAll({})).filter(el => {{ \
                     const t = (el.innerText || el.textContent || '').trim(); return {compare}; }})",
                    js_string(css)
                )
            }
        }
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Css(css) => f.write_str(css),
            Self::CssWithText {
                css,
                text,
                matching: TextMatch::Exact,
            } => write!(f, "{css}:text-is({text:?})"),
            Self::CssWithText {
                css,
                text,
                matching: TextMatch::Contains,
            } => write!(f, "{css}:has-text({text:?})"),
        }
    }
}

/// Encode a string as a JavaScript string literal
#[must_use]
pub fn js_string(s: &str) -> String {
    serde_json::Value::String(s.to_owned()).to_string()
}

/// A locator for finding and interacting with elements.
#[derive(Debug, Clone)]
pub struct Locator {
    selector: Selector,
    options: WaitOptions,
}

impl Locator {
    /// Create a new locator with a CSS selector
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self::from_selector(Selector::Css(selector.into()))
    }

    /// Create a locator from a selector
    #[must_use]
    pub fn from_selector(selector: Selector) -> Self {
        Self {
            selector,
            options: WaitOptions {
                timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
                poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            },
        }
    }

    /// Filter by text content
    #[must_use]
    pub fn with_text(self, text: impl Into<String>, matching: TextMatch) -> Self {
        let css = self.selector.base_css().to_string();
        Self {
            selector: Selector::css_with_text(css, text, matching),
            options: self.options,
        }
    }

    /// Use the given wait options
    #[must_use]
    pub const fn with_options(mut self, options: WaitOptions) -> Self {
        self.options = options;
        self
    }

    /// Get the selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Get the wait options
    #[must_use]
    pub const fn options(&self) -> &WaitOptions {
        &self.options
    }

    /// Wait for the first match to reach `state`
    pub async fn wait_for<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
        state: ElementState,
    ) -> ProbeResult<()> {
        wait::wait_for_selector(driver, &self.selector, state, &self.options).await?;
        Ok(())
    }

    /// Click the first match once it is ready
    pub async fn click<D: PageDriver + ?Sized>(&self, driver: &D) -> ProbeResult<()> {
        self.click_nth(driver, 0).await
    }

    /// Click the `index`-th match once it is ready
    pub async fn click_nth<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
        index: usize,
    ) -> ProbeResult<()> {
        wait::wait_for_nth(driver, &self.selector, index, ElementState::Ready, &self.options)
            .await?;
        tracing::debug!(selector = %self.selector, index, "click");
        driver.click(&self.selector, index).await
    }

    /// Fill the first match once it is ready
    pub async fn fill<D: PageDriver + ?Sized>(&self, driver: &D, value: &str) -> ProbeResult<()> {
        self.wait_for(driver, ElementState::Ready).await?;
        tracing::debug!(selector = %self.selector, len = value.len(), "fill");
        driver.fill(&self.selector, value).await
    }

    /// Select an option by value on the first match
    pub async fn select_option<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
        value: &str,
    ) -> ProbeResult<()> {
        self.wait_for(driver, ElementState::Attached).await?;
        tracing::debug!(selector = %self.selector, value, "select option");
        driver.select_option(&self.selector, value).await
    }

    /// Check the first match
    pub async fn check<D: PageDriver + ?Sized>(&self, driver: &D) -> ProbeResult<()> {
        self.wait_for(driver, ElementState::Attached).await?;
        tracing::debug!(selector = %self.selector, "check");
        driver.check(&self.selector).await
    }

    /// Read the first match's form value (empty when it has none)
    pub async fn input_value<D: PageDriver + ?Sized>(&self, driver: &D) -> ProbeResult<String> {
        let elements =
            wait::wait_for_selector(driver, &self.selector, ElementState::Attached, &self.options)
                .await?;
        Ok(elements
            .into_iter()
            .next()
            .and_then(|e| e.value)
            .unwrap_or_default())
    }

    /// Count matches right now, without waiting
    pub async fn count<D: PageDriver + ?Sized>(&self, driver: &D) -> ProbeResult<usize> {
        Ok(driver.query(&self.selector).await?.len())
    }

    /// Visible texts of all matches right now, without waiting
    pub async fn texts<D: PageDriver + ?Sized>(&self, driver: &D) -> ProbeResult<Vec<String>> {
        Ok(driver
            .query(&self.selector)
            .await?
            .into_iter()
            .map(|e| e.text)
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod text_match_tests {
        use super::*;

        #[test]
        fn test_exact_trims_element_text() {
            assert!(TextMatch::Exact.is_match("  Asset \n", "Asset"));
            assert!(!TextMatch::Exact.is_match("Asset Model", "Asset"));
        }

        #[test]
        fn test_contains() {
            assert!(TextMatch::Contains.is_match("Create New", "New"));
            assert!(!TextMatch::Contains.is_match("Create", "New"));
        }

        #[test]
        fn test_default_is_exact() {
            assert_eq!(TextMatch::default(), TextMatch::Exact);
        }

        #[test]
        fn test_deserialize_lowercase() {
            let m: TextMatch = serde_json::from_str("\"contains\"").unwrap();
            assert_eq!(m, TextMatch::Contains);
        }
    }

    mod selector_tests {
        use super::*;

        #[test]
        fn test_css_query() {
            let sel = Selector::css("#asset_tag");
            assert_eq!(
                sel.to_query(),
                "Array.from(document.querySelectorAll(\"#asset_tag\"))"
            );
            assert!(sel.accepts_text("anything"));
        }

        #[test]
        fn test_text_query_escapes_quotes() {
            let sel = Selector::css_with_text("a", "it's \"T\"", TextMatch::Exact);
            let query = sel.to_query();
            assert!(query.contains(r#"t === "it's \"T\"""#));
            assert!(query.contains("querySelectorAll(\"a\")"));
        }

        #[test]
        fn test_contains_query() {
            let sel = Selector::css_with_text("a.dropdown-toggle", "Create New", TextMatch::Contains);
            assert!(sel.to_query().contains("t.includes(\"Create New\")"));
        }

        #[test]
        fn test_display() {
            assert_eq!(Selector::css("li").to_string(), "li");
            assert_eq!(
                Selector::css_with_text("a", "T1", TextMatch::Exact).to_string(),
                "a:text-is(\"T1\")"
            );
            assert_eq!(
                Selector::css_with_text("a", "New", TextMatch::Contains).to_string(),
                "a:has-text(\"New\")"
            );
        }

        #[test]
        fn test_base_css() {
            let sel = Selector::css_with_text("ul.dropdown-menu a", "Asset", TextMatch::Exact);
            assert_eq!(sel.base_css(), "ul.dropdown-menu a");
        }
    }

    mod locator_tests {
        use super::*;

        #[test]
        fn test_locator_defaults() {
            let loc = Locator::new("#username");
            assert_eq!(loc.selector(), &Selector::css("#username"));
            assert_eq!(loc.options().timeout_ms, DEFAULT_WAIT_TIMEOUT_MS);
        }

        #[test]
        fn test_with_text_keeps_options() {
            let loc = Locator::new("a")
                .with_options(WaitOptions::new().with_timeout(250))
                .with_text("T1", TextMatch::Exact);
            assert_eq!(loc.options().timeout_ms, 250);
            assert!(matches!(loc.selector(), Selector::CssWithText { .. }));
        }

        #[test]
        fn test_with_text_replaces_previous_filter() {
            let loc = Locator::new("a")
                .with_text("old", TextMatch::Contains)
                .with_text("new", TextMatch::Exact);
            assert_eq!(loc.selector(), &Selector::css_with_text("a", "new", TextMatch::Exact));
        }
    }
}
