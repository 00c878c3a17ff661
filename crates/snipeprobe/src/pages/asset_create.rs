//! New-asset form.
//!
//! The form is cascading: the model list depends on the company, and the
//! assignee controls stay hidden until a checkout target is chosen. Every
//! step waits for its control to be ready before touching it.

use crate::config::{ProbeConfig, SelectionConfig};
use crate::driver::PageDriver;
use crate::locator::{js_string, Locator, TextMatch};
use crate::page_object::PageObject;
use crate::pages::select2::Select2Field;
use crate::result::{ProbeError, ProbeResult};
use crate::selection::OptionPicker;
use crate::wait::{ElementState, WaitOptions};

/// `<option value>` of the "Ready to Deploy" status label
pub const STATUS_READY_TO_DEPLOY: &str = "1";

const CREATE_NEW: &str = "a.dropdown-toggle";
const CREATE_NEW_TEXT: &str = "Create New";
const MENU_ENTRY: &str = "ul.dropdown-menu a";
const MENU_ENTRY_TEXT: &str = "Asset";

const COMPANY: &str = "#select2-company_select-container";
const MODEL: &str = "#select2-model_select_id-container";
const STATUS: &str = "#status_select_id";
const ASSIGNEE: &str = "#select2-assigned_user_select-container";
const LOCATION: &str = "#select2-rtd_location_id_location_select-container";
const CHECKOUT_TO_USER: &str = "input[name='checkout_to_type'][value='user']";
const ASSIGNMENT_CONTROLS: [&str; 2] = ["assignto_selector", "assigned_user"];

const ASSET_TAG: &str = "#asset_tag";
const SUBMIT: &str = "button[id='submit_button']";

/// Options chosen while filling the form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetChoices {
    /// Company option text
    pub company: String,
    /// Model option text
    pub model: String,
    /// Assignee option text
    pub assignee: String,
    /// Default location option text
    pub location: String,
}

/// `/hardware/create`
#[derive(Debug)]
pub struct AssetCreationPage<'a, D: PageDriver + ?Sized> {
    driver: &'a D,
    options: WaitOptions,
    model_match: TextMatch,
    selection: SelectionConfig,
}

impl<D: PageDriver + ?Sized> PageObject for AssetCreationPage<'_, D> {
    fn url_pattern(&self) -> &str {
        "/hardware/create"
    }

    fn page_name(&self) -> &str {
        "asset-create"
    }
}

impl<'a, D: PageDriver + ?Sized> AssetCreationPage<'a, D> {
    /// Create form of the configured instance
    #[must_use]
    pub const fn new(driver: &'a D, config: &ProbeConfig) -> Self {
        Self {
            driver,
            options: config.timeouts.element(),
            model_match: config.model_match,
            selection: config.selection,
        }
    }

    fn locator(&self, css: &str) -> Locator {
        Locator::new(css).with_options(self.options)
    }

    fn field(&self, name: &'static str, container: &str) -> Select2Field {
        Select2Field::new(name, container, self.options)
    }

    /// Open "Create New" → "Asset"
    pub async fn open_create_form(&self) -> ProbeResult<()> {
        self.locator(CREATE_NEW)
            .with_text(CREATE_NEW_TEXT, TextMatch::Contains)
            .click(self.driver)
            .await?;
        self.locator(MENU_ENTRY)
            .with_text(MENU_ENTRY_TEXT, TextMatch::Exact)
            .click(self.driver)
            .await?;
        tracing::info!("create form opened");
        Ok(())
    }

    /// Fill company, model, status, assignee and location, in that order
    pub async fn fill_details(
        &self,
        model_name: &str,
        picker: &mut OptionPicker,
    ) -> ProbeResult<AssetChoices> {
        let company = self
            .field("company", COMPANY)
            .choose(self.driver, picker, self.selection.company)
            .await?;

        let model = self
            .field("model", MODEL)
            .choose_text(self.driver, model_name, self.model_match)
            .await?;

        self.locator(STATUS)
            .select_option(self.driver, STATUS_READY_TO_DEPLOY)
            .await?;
        tracing::info!(status = STATUS_READY_TO_DEPLOY, "status set");

        self.reveal_assignment_controls().await?;
        self.locator(CHECKOUT_TO_USER).check(self.driver).await?;
        let assignee = self
            .field("assignee", ASSIGNEE)
            .choose(self.driver, picker, self.selection.assignee)
            .await?;

        let location = self
            .field("location", LOCATION)
            .choose(self.driver, picker, self.selection.location)
            .await?;

        Ok(AssetChoices {
            company,
            model,
            assignee,
            location,
        })
    }

    /// Force the hidden checkout controls visible
    async fn reveal_assignment_controls(&self) -> ProbeResult<()> {
        for id in ASSIGNMENT_CONTROLS {
            let css = format!("#{id}");
            self.locator(&css)
                .wait_for(self.driver, ElementState::Attached)
                .await?;
            let script = format!(
                "(() => {{ const el = document.getElementById({}); \
                 if (!el) return false; el.style.display = 'block'; return true; }})()",
                js_string(id)
            );
            if self.driver.evaluate(&script).await? != serde_json::Value::Bool(true) {
                return Err(ProbeError::ElementNotFound {
                    selector: css,
                    state: ElementState::Attached.to_string(),
                    timeout_ms: self.options.timeout_ms,
                });
            }
        }
        Ok(())
    }

    /// Current value of the asset tag input
    pub async fn get_asset_tag(&self) -> ProbeResult<String> {
        self.locator(ASSET_TAG).input_value(self.driver).await
    }

    /// Click save. Does not wait for the resulting navigation.
    pub async fn submit(&self) -> ProbeResult<()> {
        self.locator(SUBMIT).click(self.driver).await?;
        tracing::info!("asset form submitted");
        Ok(())
    }
}
