//! select2 dropdowns.
//!
//! Snipe-IT renders every lookup field as a select2 widget: a clickable
//! container that opens a floating panel with a search box and an option
//! list. Only one panel is open at a time, so the search box and options are
//! addressed through `.select2-container--open`.

use crate::driver::PageDriver;
use crate::locator::{Locator, TextMatch};
use crate::result::{ProbeError, ProbeResult};
use crate::selection::{OptionPicker, SelectionPolicy};
use crate::wait::{self, ElementState, WaitOptions};

/// Search box of the open panel
pub const SEARCH_FIELD: &str = ".select2-container--open .select2-search__field";

/// Selectable options of the open panel
pub const OPTIONS: &str = ".select2-container--open .select2-results__option\
                           :not(.select2-results__message):not(.loading-results)";

/// Spinner row shown while an ajax lookup is in flight
pub const LOADING: &str = ".select2-container--open .select2-results__option.loading-results";

/// "No results found" row
pub const MESSAGE: &str = ".select2-container--open .select2-results__message";

/// What the option list looked like on one read
#[derive(Debug, Clone, PartialEq, Eq)]
struct OptionList {
    loading: bool,
    message: bool,
    texts: Vec<String>,
}

/// One select2 field
#[derive(Debug, Clone)]
pub struct Select2Field {
    name: &'static str,
    container: Locator,
    options: WaitOptions,
}

impl Select2Field {
    /// Field addressed by its `#select2-…-container` selector
    #[must_use]
    pub fn new(name: &'static str, container_css: &str, options: WaitOptions) -> Self {
        Self {
            name,
            container: Locator::new(container_css).with_options(options),
            options,
        }
    }

    /// Field name used in logs and errors
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    fn search_field(&self) -> Locator {
        Locator::new(SEARCH_FIELD).with_options(self.options)
    }

    /// Open the panel and wait for its search box
    pub async fn open<D: PageDriver + ?Sized>(&self, driver: &D) -> ProbeResult<()> {
        self.container.click(driver).await?;
        self.search_field().wait_for(driver, ElementState::Ready).await
    }

    /// Replace the search text
    pub async fn search<D: PageDriver + ?Sized>(&self, driver: &D, text: &str) -> ProbeResult<()> {
        self.search_field().fill(driver, text).await
    }

    /// Texts of the options once the list stops changing
    pub async fn settled_options<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
    ) -> ProbeResult<Vec<String>> {
        let (options, loading, message) = (
            &Locator::new(OPTIONS),
            &Locator::new(LOADING),
            &Locator::new(MESSAGE),
        );
        let settled = wait::poll_until_stable(
            || async move {
                Ok(OptionList {
                    loading: loading.count(driver).await? > 0,
                    message: message.count(driver).await? > 0,
                    texts: options.texts(driver).await?,
                })
            },
            |list| !list.loading && (list.message || !list.texts.is_empty()),
            &self.options,
        )
        .await?;
        if !settled.stable {
            tracing::warn!(field = self.name, elapsed = ?settled.elapsed, "option list never settled");
        }
        Ok(settled.value.texts)
    }

    /// Open, clear the search, and click the option `policy` picks
    pub async fn choose<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
        picker: &mut OptionPicker,
        policy: SelectionPolicy,
    ) -> ProbeResult<String> {
        self.open(driver).await?;
        self.search(driver, "").await?;
        let texts = self.settled_options(driver).await?;
        let index = picker.pick(policy, texts.len(), self.name)?;
        Locator::new(OPTIONS)
            .with_options(self.options)
            .click_nth(driver, index)
            .await?;
        let chosen = texts.into_iter().nth(index).unwrap_or_default();
        tracing::info!(field = self.name, %policy, index, option = %chosen, "selected");
        Ok(chosen)
    }

    /// Open, type `text`, and click the option whose text matches it
    pub async fn choose_text<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
        text: &str,
        matching: TextMatch,
    ) -> ProbeResult<String> {
        self.open(driver).await?;
        self.search(driver, text).await?;
        Locator::new(OPTIONS)
            .with_options(self.options)
            .with_text(text, matching)
            .click(driver)
            .await
            .map_err(|e| match e {
                ProbeError::ElementNotFound { timeout_ms, .. } => ProbeError::OptionNotFound {
                    field: self.name.to_string(),
                    option: text.to_string(),
                    timeout_ms,
                },
                other => other,
            })?;
        tracing::info!(field = self.name, option = text, "selected");
        Ok(text.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::driver::ElementSnapshot;
    use crate::mock::{ClickEffect, MockCall, MockPage};
    use crate::selection::Seed;

    const CONTAINER: &str = "#select2-company_select-container";

    fn fast() -> WaitOptions {
        WaitOptions::new().with_timeout(60).with_poll_interval(1)
    }

    fn page_with_options(options: &[&str]) -> MockPage {
        let page = MockPage::new();
        page.add_element(CONTAINER, "Select a Company");
        page.on_click(
            CONTAINER,
            ClickEffect::Replace(SEARCH_FIELD.to_string(), vec![ElementSnapshot::new("")]),
        );
        page.on_click(
            CONTAINER,
            ClickEffect::Replace(
                OPTIONS.to_string(),
                options.iter().map(|t| ElementSnapshot::new(*t)).collect(),
            ),
        );
        page
    }

    #[tokio::test]
    async fn test_choose_first() {
        let page = page_with_options(&["Acme", "Globex"]);
        let field = Select2Field::new("company", CONTAINER, fast());
        let mut picker = OptionPicker::new(Seed::from_u64(3));
        let chosen = field
            .choose(&page, &mut picker, SelectionPolicy::First)
            .await
            .unwrap();
        assert_eq!(chosen, "Acme");
        assert!(page.was_called(&MockCall::Fill(SEARCH_FIELD.into(), String::new())));
        assert!(page.was_called(&MockCall::Click(OPTIONS.into(), 0)));
    }

    #[tokio::test]
    async fn test_choose_random_clicks_picked_index() {
        let page = page_with_options(&["A", "B", "C", "D", "E"]);
        let field = Select2Field::new("company", CONTAINER, fast());
        let mut picker = OptionPicker::new(Seed::from_u64(99));
        let mut replay = OptionPicker::new(Seed::from_u64(99));
        let expected = replay.pick(SelectionPolicy::Random, 5, "company").unwrap();

        let chosen = field
            .choose(&page, &mut picker, SelectionPolicy::Random)
            .await
            .unwrap();
        assert_eq!(chosen, ["A", "B", "C", "D", "E"][expected]);
        assert!(page.was_called(&MockCall::Click(OPTIONS.into(), expected)));
    }

    #[tokio::test]
    async fn test_no_options_is_typed_error() {
        let page = page_with_options(&[]);
        page.add_element(MESSAGE, "No results found");
        let field = Select2Field::new("company", CONTAINER, fast());
        let mut picker = OptionPicker::new(Seed::from_u64(1));
        let err = field
            .choose(&page, &mut picker, SelectionPolicy::Random)
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::NoOptions { ref field } if field == "company"));
        assert_eq!(page.clicks_on(OPTIONS), 0);
    }

    #[tokio::test]
    async fn test_closed_panel_is_element_not_found() {
        let page = MockPage::new();
        page.add_element(CONTAINER, "Select a Company");
        let field = Select2Field::new("company", CONTAINER, fast());
        let err = field.open(&page).await.unwrap_err();
        assert!(matches!(err, ProbeError::ElementNotFound { ref selector, .. } if selector == SEARCH_FIELD));
    }

    #[tokio::test]
    async fn test_choose_text_exact() {
        let page = page_with_options(&["Macbook Pro 13\"", "Macbook Pro"]);
        let field = Select2Field::new("model", CONTAINER, fast());
        field
            .choose_text(&page, "Macbook Pro", TextMatch::Exact)
            .await
            .unwrap();
        assert!(page.was_called(&MockCall::Fill(SEARCH_FIELD.into(), "Macbook Pro".into())));
        assert!(page.was_called(&MockCall::Click(OPTIONS.into(), 0)));
    }

    #[tokio::test]
    async fn test_choose_text_missing_is_option_not_found() {
        let page = page_with_options(&["Dell XPS"]);
        let field = Select2Field::new("model", CONTAINER, fast());
        let err = field
            .choose_text(&page, "Macbook Pro", TextMatch::Exact)
            .await
            .unwrap_err();
        match err {
            ProbeError::OptionNotFound {
                field,
                option,
                timeout_ms,
            } => {
                assert_eq!(field, "model");
                assert_eq!(option, "Macbook Pro");
                assert_eq!(timeout_ms, 60);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
