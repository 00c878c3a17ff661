//! The create-and-verify scenario.
//!
//! ```text
//! launch ─► login ─► create form ─► fill ─► read tag ─► submit
//!        ─► search tag ─► open row ─► history tab ─► close
//! ```
//!
//! [`create_and_verify_asset`] runs the steps against any [`PageDriver`].
//! [`run_in_browser`] wraps it with a Chromium session that is closed on
//! every exit path.

use crate::config::ProbeConfig;
use crate::driver::PageDriver;
use crate::page_object::{self, PageObject};
use crate::pages::{AssetChoices, AssetCreationPage, AssetListPage, LoginPage};
use crate::result::{ProbeError, ProbeResult};
use crate::selection::{OptionPicker, Seed};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Wall time of one scenario step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepTiming {
    /// Step name
    pub name: &'static str,
    /// Time spent
    pub elapsed: Duration,
}

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct ScenarioReport {
    /// Tag the server assigned
    pub asset_tag: String,
    /// Generated display name (logged only)
    pub display_name: String,
    /// Database id parsed from the detail URL
    pub asset_id: Option<String>,
    /// Options picked on the form
    pub choices: AssetChoices,
    /// Seed the picker started from
    pub seed: Seed,
    /// Whether the search results settled before the ceiling
    pub search_settled: bool,
    /// Per-step timings, in order
    pub steps: Vec<StepTiming>,
    /// Total wall time
    pub duration: Duration,
}

impl ScenarioReport {
    /// The two console lines
    #[must_use]
    pub fn summary_lines(&self) -> [String; 2] {
        [
            format!("Asset Tag: {}", self.asset_tag),
            format!(
                "Asset '{}' created and verified successfully.",
                self.display_name
            ),
        ]
    }
}

/// `template` followed by a random suffix, cut to `len` characters
#[must_use]
pub fn display_name(template: &str, len: usize) -> String {
    display_name_with(template, &uuid::Uuid::new_v4().simple().to_string(), len)
}

fn display_name_with(template: &str, suffix: &str, len: usize) -> String {
    template.chars().chain(suffix.chars()).take(len).collect()
}

#[derive(Debug)]
struct StepClock {
    steps: Vec<StepTiming>,
    mark: Instant,
}

impl StepClock {
    fn start() -> Self {
        Self {
            steps: Vec::new(),
            mark: Instant::now(),
        }
    }

    fn lap(&mut self, name: &'static str) {
        let elapsed = self.mark.elapsed();
        tracing::debug!(step = name, ?elapsed, "step done");
        self.steps.push(StepTiming { name, elapsed });
        self.mark = Instant::now();
    }
}

/// Log in, create an asset, find it by tag and verify its history tab.
///
/// Every failure aborts the remaining steps.
pub async fn create_and_verify_asset<D>(
    driver: &D,
    config: &ProbeConfig,
    picker: &mut OptionPicker,
) -> ProbeResult<ScenarioReport>
where
    D: PageDriver + ?Sized,
{
    config.validate()?;
    let started = Instant::now();
    let mut clock = StepClock::start();
    let display_name = display_name(&config.display_name_template, config.display_name_len);
    tracing::info!(seed = %picker.seed(), %display_name, base_url = %config.base_url, "scenario started");

    let login = LoginPage::new(driver, config);
    login.navigate().await?;
    login
        .login(&config.credentials.username, &config.credentials.password)
        .await?;
    if config.verify_login {
        login.verify_logged_in().await?;
    }
    clock.lap("login");

    let form = AssetCreationPage::new(driver, config);
    form.open_create_form().await?;
    let choices = form.fill_details(&config.model_name, picker).await?;
    let asset_tag = form.get_asset_tag().await?;
    if asset_tag.trim().is_empty() {
        return Err(ProbeError::verification(
            "asset tag",
            "#asset_tag was empty before submit",
        ));
    }
    tracing::info!(%asset_tag, "asset tag read");
    form.submit().await?;
    if !page_object::wait_until_left(&form, driver, &config.timeouts.element()).await? {
        return Err(ProbeError::verification(
            "asset saved",
            format!(
                "still on the {} page after {}ms",
                form.page_name(),
                config.timeouts.element_ms
            ),
        ));
    }
    clock.lap("create");

    let list = AssetListPage::new(driver, config);
    let settled = list.search_asset(&asset_tag).await?;
    clock.lap("search");
    let asset_id = list.open_asset_and_verify_history(&asset_tag).await?;
    clock.lap("verify");

    let report = ScenarioReport {
        asset_tag,
        display_name,
        asset_id,
        choices,
        seed: picker.seed(),
        search_settled: settled.stable,
        steps: clock.steps,
        duration: started.elapsed(),
    };
    tracing::info!(asset_tag = %report.asset_tag, duration = ?report.duration, "scenario passed");
    Ok(report)
}

/// Write a PNG of the current page into `config.artifacts_dir`.
///
/// Returns `None` when no artifacts directory is configured.
pub async fn save_failure_screenshot<D>(
    driver: &D,
    config: &ProbeConfig,
) -> ProbeResult<Option<PathBuf>>
where
    D: PageDriver + ?Sized,
{
    let Some(dir) = config.artifacts_dir.as_ref() else {
        return Ok(None);
    };
    tokio::fs::create_dir_all(dir).await?;
    let png = driver.screenshot().await?;
    let stamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| d.as_millis());
    let path = dir.join(format!("failure-{stamp}.png"));
    tokio::fs::write(&path, png).await?;
    Ok(Some(path))
}

/// [`create_and_verify_asset`], plus a screenshot when it fails
pub async fn run_scenario<D>(
    driver: &D,
    config: &ProbeConfig,
    picker: &mut OptionPicker,
) -> ProbeResult<ScenarioReport>
where
    D: PageDriver + ?Sized,
{
    match create_and_verify_asset(driver, config, picker).await {
        Ok(report) => Ok(report),
        Err(err) => {
            tracing::error!(error = %err, "scenario failed");
            match save_failure_screenshot(driver, config).await {
                Ok(Some(path)) => tracing::info!(path = %path.display(), "failure screenshot saved"),
                Ok(None) => {}
                Err(e) => tracing::warn!(error = %e, "failure screenshot not saved"),
            }
            Err(err)
        }
    }
}

/// Seed from the config, or from the clock when none is pinned
#[must_use]
pub fn resolve_seed(config: &ProbeConfig) -> Seed {
    config.seed.map_or_else(Seed::from_clock, Seed::from_u64)
}

/// Launch Chromium, run the scenario in one tab, and close the browser
#[cfg(feature = "browser")]
pub async fn run_in_browser(config: &ProbeConfig) -> ProbeResult<ScenarioReport> {
    use crate::browser::BrowserSession;

    config.validate()?;
    let mut picker = OptionPicker::new(resolve_seed(config));
    let session = BrowserSession::launch(
        config.browser.clone(),
        Duration::from_millis(config.timeouts.navigation_ms),
    )
    .await?;

    let outcome = match session.new_page().await {
        Ok(page) => run_scenario(&page, config, &mut picker).await,
        Err(e) => Err(e),
    };

    if let Err(e) = session.close().await {
        tracing::warn!(error = %e, "browser did not close cleanly");
    }
    outcome
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mock::{MockCall, MockPage};
    use proptest::prelude::*;

    mod display_name_tests {
        use super::*;

        #[test]
        fn test_default_template() {
            let name = display_name("Macbook Pro 13 - ", 20);
            assert_eq!(name.chars().count(), 20);
            assert!(name.starts_with("Macbook Pro 13 - "));
        }

        #[test]
        fn test_names_differ() {
            assert_ne!(display_name("x-", 20), display_name("x-", 20));
        }

        #[test]
        fn test_short_length_truncates_template() {
            assert_eq!(display_name_with("Macbook", "abc", 3), "Mac");
        }
    }

    mod report_tests {
        use super::*;

        #[test]
        fn test_summary_lines() {
            let report = ScenarioReport {
                asset_tag: "1637283".to_string(),
                display_name: "Macbook Pro 13 - 4f2".to_string(),
                asset_id: None,
                choices: AssetChoices::default(),
                seed: Seed::from_u64(1),
                search_settled: true,
                steps: Vec::new(),
                duration: Duration::ZERO,
            };
            assert_eq!(
                report.summary_lines(),
                [
                    "Asset Tag: 1637283".to_string(),
                    "Asset 'Macbook Pro 13 - 4f2' created and verified successfully.".to_string(),
                ]
            );
        }

        #[test]
        fn test_resolve_seed_pinned() {
            let config = ProbeConfig {
                seed: Some(42),
                ..ProbeConfig::default()
            };
            assert_eq!(resolve_seed(&config).value(), 42);
        }
    }

    mod screenshot_tests {
        use super::*;

        #[tokio::test]
        async fn test_no_artifacts_dir() {
            let page = MockPage::new();
            let config = ProbeConfig::default();
            assert!(save_failure_screenshot(&page, &config).await.unwrap().is_none());
            assert!(!page.was_called(&MockCall::Screenshot));
        }

        #[tokio::test]
        async fn test_writes_png() {
            let dir = tempfile::tempdir().unwrap();
            let page = MockPage::new();
            let config = ProbeConfig {
                artifacts_dir: Some(dir.path().join("shots")),
                ..ProbeConfig::default()
            };
            let path = save_failure_screenshot(&page, &config)
                .await
                .unwrap()
                .unwrap();
            let bytes = std::fs::read(&path).unwrap();
            assert!(bytes.starts_with(b"\x89PNG"));
            assert!(path.starts_with(dir.path()));
        }

        #[tokio::test]
        async fn test_failed_run_captures_screenshot() {
            let dir = tempfile::tempdir().unwrap();
            let page = MockPage::new();
            let mut config = ProbeConfig {
                base_url: "https://down.test".to_string(),
                artifacts_dir: Some(dir.path().to_path_buf()),
                ..ProbeConfig::default()
            };
            config.timeouts.element_ms = 20;
            page.fail_navigation("https://down.test/login");
            let mut picker = OptionPicker::new(Seed::from_u64(1));

            let err = run_scenario(&page, &config, &mut picker).await.unwrap_err();
            assert!(matches!(err, ProbeError::Navigation { .. }));
            assert!(page.was_called(&MockCall::Screenshot));
            assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
        }

        #[tokio::test]
        async fn test_invalid_config_fails_before_navigation() {
            let page = MockPage::new();
            let config = ProbeConfig {
                base_url: String::new(),
                ..ProbeConfig::default()
            };
            let mut picker = OptionPicker::new(Seed::from_u64(1));
            let err = create_and_verify_asset(&page, &config, &mut picker)
                .await
                .unwrap_err();
            assert!(matches!(err, ProbeError::Config { .. }));
            assert!(page.calls().is_empty());
        }
    }

    proptest! {
        #[test]
        fn prop_display_name_length(template in "[a-zA-Z0-9 -]{0,30}", len in 1usize..64) {
            let name = display_name(&template, len);
            prop_assert_eq!(name.chars().count(), len.min(template.chars().count() + 32));
            let prefix: String = template.chars().take(len).collect();
            prop_assert!(name.starts_with(&prefix));
        }
    }
}
