//! Login screen.

use crate::config::ProbeConfig;
use crate::driver::PageDriver;
use crate::locator::Locator;
use crate::page_object::{self, PageObject};
use crate::result::{ProbeError, ProbeResult};
use crate::wait::{self, WaitOptions};

const USERNAME: &str = "#username";
const PASSWORD: &str = "#password";
const SUBMIT: &str = "button[type='submit']";

/// `/login`
#[derive(Debug)]
pub struct LoginPage<'a, D: PageDriver + ?Sized> {
    driver: &'a D,
    url: String,
    options: WaitOptions,
}

impl<D: PageDriver + ?Sized> PageObject for LoginPage<'_, D> {
    fn url_pattern(&self) -> &str {
        "/login"
    }

    fn page_name(&self) -> &str {
        "login"
    }
}

impl<'a, D: PageDriver + ?Sized> LoginPage<'a, D> {
    /// Login page of the configured instance
    #[must_use]
    pub fn new(driver: &'a D, config: &ProbeConfig) -> Self {
        Self {
            driver,
            url: config.url("/login"),
            options: config.timeouts.element(),
        }
    }

    /// Load the login form
    pub async fn navigate(&self) -> ProbeResult<()> {
        tracing::info!(url = %self.url, "opening login page");
        self.driver.goto(&self.url).await
    }

    /// Fill the credentials and submit. Does not wait for the result.
    pub async fn login(&self, username: &str, password: &str) -> ProbeResult<()> {
        Locator::new(USERNAME)
            .with_options(self.options)
            .fill(self.driver, username)
            .await?;
        Locator::new(PASSWORD)
            .with_options(self.options)
            .fill(self.driver, password)
            .await?;
        Locator::new(SUBMIT)
            .with_options(self.options)
            .click(self.driver)
            .await?;
        tracing::info!(username, "credentials submitted");
        Ok(())
    }

    /// Wait until the browser has left `/login` and the form is gone
    pub async fn verify_logged_in(&self) -> ProbeResult<()> {
        let username = &Locator::new(USERNAME);
        let driver = self.driver;
        let left = wait::poll_for(
            || async move {
                let on_login = page_object::is_current(self, driver).await?;
                let form_gone = username.count(driver).await? == 0;
                Ok::<_, ProbeError>((!on_login && form_gone).then_some(()))
            },
            &self.options,
        )
        .await?;

        if left.is_none() {
            let url = self.driver.current_url().await?;
            return Err(ProbeError::verification(
                "login",
                format!(
                    "still on the {} page after {}ms (url: {url})",
                    self.page_name(),
                    self.options.timeout_ms
                ),
            ));
        }
        tracing::info!("logged in");
        Ok(())
    }
}
