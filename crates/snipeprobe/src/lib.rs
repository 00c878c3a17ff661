//! snipeprobe: page-object end-to-end test for the Snipe-IT asset workflow
//!
//! Logs in to a Snipe-IT instance, creates a hardware asset through the
//! cascading select2 form, finds it again by tag in the hardware list and
//! checks that its history tab opens.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  scenario::run_in_browser                                       │
//! │    BrowserSession (chromiumoxide) ──► ChromiumPage              │
//! │                                            │ PageDriver         │
//! │    LoginPage ─► AssetCreationPage ─► AssetListPage              │
//! │        └──── Locator (auto-wait) ──── Select2Field ─────┘       │
//! │                          OptionPicker (seeded)                  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use snipeprobe::prelude::*;
//!
//! let config = ProbeConfig::default().apply_env()?;
//! let report = run_in_browser(&config).await?;
//! for line in report.summary_lines() {
//!     println!("{line}");
//! }
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

#[allow(clippy::missing_errors_doc)]
pub mod browser;
pub mod config;
#[allow(clippy::missing_errors_doc)]
pub mod driver;
pub mod locator;
pub mod logging;
#[allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]
pub mod mock;
#[allow(clippy::missing_errors_doc)]
pub mod page_object;
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
pub mod pages;
mod result;
#[allow(clippy::missing_errors_doc)]
pub mod scenario;
pub mod selection;
#[allow(clippy::missing_errors_doc)]
pub mod wait;

pub use browser::BrowserConfig;
#[cfg(feature = "browser")]
pub use browser::{BrowserSession, ChromiumPage};
pub use config::{Credentials, ProbeConfig, SelectionConfig, Timeouts, DEFAULT_BASE_URL};
pub use driver::{ElementSnapshot, PageDriver};
pub use locator::{Locator, Selector, TextMatch};
pub use mock::{ClickEffect, MockCall, MockPage};
pub use page_object::{PageObject, UrlMatcher};
pub use pages::{AssetChoices, AssetCreationPage, AssetListPage, LoginPage, Select2Field};
pub use result::{ProbeError, ProbeResult};
#[cfg(feature = "browser")]
pub use scenario::run_in_browser;
pub use scenario::{create_and_verify_asset, run_scenario, ScenarioReport, StepTiming};
pub use selection::{OptionPicker, SelectionPolicy, Seed};
pub use wait::{ElementState, Settled, WaitOptions};

/// Prelude for convenient imports
pub mod prelude {
    #[cfg(feature = "browser")]
    pub use super::{run_in_browser, BrowserSession, ChromiumPage};
    pub use super::{
        create_and_verify_asset, run_scenario, AssetCreationPage, AssetListPage, ElementState,
        Locator, LoginPage, MockPage, OptionPicker, PageDriver, ProbeConfig, ProbeError,
        ProbeResult, ScenarioReport, Seed, SelectionPolicy, Selector, TextMatch,
    };
}
