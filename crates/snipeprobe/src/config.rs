//! Scenario configuration.
//!
//! Layering, lowest to highest: [`ProbeConfig::default`] → YAML file →
//! environment ([`ProbeConfig::apply_env`]) → CLI flags (applied by the caller).

use crate::locator::TextMatch;
use crate::result::{ProbeError, ProbeResult};
use crate::selection::SelectionPolicy;
use crate::wait::{
    WaitOptions, DEFAULT_POLL_INTERVAL_MS, DEFAULT_SETTLE_CEILING_MS, DEFAULT_WAIT_TIMEOUT_MS,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Public Snipe-IT demo instance
pub const DEFAULT_BASE_URL: &str = "https://demo.snipeitapp.com";

/// Login credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    /// Username
    pub username: String,
    /// Password
    pub password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "password".to_string(),
        }
    }
}

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
    pub chromium_path: Option<PathBuf>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 900,
            chromium_path: None,
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
    pub fn with_chromium_path(mut self, path: impl Into<PathBuf>) -> Self {
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

/// Timeouts, all in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Page load
    pub navigation_ms: u64,
    /// Element and option waits
    pub element_ms: u64,
    /// Polling interval for every wait
    pub poll_interval_ms: u64,
    /// Ceiling for search results to settle
    pub settle_ceiling_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            navigation_ms: DEFAULT_WAIT_TIMEOUT_MS,
            element_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            settle_ceiling_ms: DEFAULT_SETTLE_CEILING_MS,
        }
    }
}

impl Timeouts {
    /// Wait options for element waits
    #[must_use]
    pub const fn element(&self) -> WaitOptions {
        WaitOptions {
            timeout_ms: self.element_ms,
            poll_interval_ms: self.poll_interval_ms,
        }
    }

    /// Wait options for the post-search settle poll
    #[must_use]
    pub const fn settle(&self) -> WaitOptions {
        WaitOptions {
            timeout_ms: self.settle_ceiling_ms,
            poll_interval_ms: self.poll_interval_ms,
        }
    }
}

/// Per-field option selection policies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Company picker
    pub company: SelectionPolicy,
    /// Assignee picker
    pub assignee: SelectionPolicy,
    /// Location picker
    pub location: SelectionPolicy,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            company: SelectionPolicy::Random,
            assignee: SelectionPolicy::First,
            location: SelectionPolicy::First,
        }
    }
}

/// Complete scenario configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Base URL of the Snipe-IT instance, without trailing slash
    pub base_url: String,
    /// Login credentials
    pub credentials: Credentials,
    /// Asset model to select
    pub model_name: String,
    /// How the model option text is compared
    pub model_match: TextMatch,
    /// Prefix of the generated display name
    pub display_name_template: String,
    /// Display name length after truncation
    pub display_name_len: usize,
    /// Check that login left the login page
    pub verify_login: bool,
    /// Seed for random picks (None = seeded from the clock)
    pub seed: Option<u64>,
    /// Where failure screenshots go (None = not captured)
    pub artifacts_dir: Option<PathBuf>,
    /// Browser settings
    pub browser: BrowserConfig,
    /// Timeouts
    pub timeouts: Timeouts,
    /// Option selection policies
    pub selection: SelectionConfig,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            credentials: Credentials::default(),
            model_name: "Macbook Pro".to_string(),
            model_match: TextMatch::Exact,
            display_name_template: "Macbook Pro 13 - ".to_string(),
            display_name_len: 20,
            verify_login: true,
            seed: None,
            artifacts_dir: None,
            browser: BrowserConfig::default(),
            timeouts: Timeouts::default(),
            selection: SelectionConfig::default(),
        }
    }
}

impl ProbeConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from YAML; missing keys keep their defaults
    pub fn from_yaml_str(yaml: &str) -> ProbeResult<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Load from a YAML file
    pub fn from_file(path: &Path) -> ProbeResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> ProbeResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Apply `SNIPEPROBE_*` and `CHROMIUM_PATH` environment overrides
    pub fn apply_env(self) -> ProbeResult<Self> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable source
    pub fn apply_vars<F>(mut self, var: F) -> ProbeResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = var("SNIPEPROBE_BASE_URL") {
            self.base_url = url;
        }
        if let Some(user) = var("SNIPEPROBE_USERNAME") {
            self.credentials.username = user;
        }
        if let Some(pass) = var("SNIPEPROBE_PASSWORD") {
            self.credentials.password = pass;
        }
        if let Some(model) = var("SNIPEPROBE_MODEL") {
            self.model_name = model;
        }
        if let Some(seed) = var("SNIPEPROBE_SEED") {
            let parsed = seed
                .parse()
                .map_err(|_| ProbeError::config(format!("SNIPEPROBE_SEED is not a u64: {seed}")))?;
            self.seed = Some(parsed);
        }
        if let Some(headless) = var("SNIPEPROBE_HEADLESS") {
            self.browser.headless = parse_bool(&headless).ok_or_else(|| {
                ProbeError::config(format!("SNIPEPROBE_HEADLESS is not a boolean: {headless}"))
            })?;
        }
        if let Some(path) = var("CHROMIUM_PATH") {
            self.browser = self.browser.with_chromium_path(path);
        }
        Ok(self)
    }

    /// Reject settings the scenario cannot run with
    pub fn validate(&self) -> ProbeResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(ProbeError::config("base_url is empty"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ProbeError::config(format!(
                "base_url must be http(s): {}",
                self.base_url
            )));
        }
        if self.model_name.trim().is_empty() {
            return Err(ProbeError::config("model_name is empty"));
        }
        if self.display_name_len == 0 {
            return Err(ProbeError::config("display_name_len must be positive"));
        }
        let t = &self.timeouts;
        if t.navigation_ms == 0 || t.element_ms == 0 || t.poll_interval_ms == 0 {
            return Err(ProbeError::config("timeouts must be positive"));
        }
        Ok(())
    }

    /// Absolute URL for a path on the target instance
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    mod default_tests {
        use super::*;

        #[test]
        fn test_defaults_match_demo_scenario() {
            let config = ProbeConfig::default();
            assert_eq!(config.base_url, DEFAULT_BASE_URL);
            assert_eq!(config.credentials.username, "admin");
            assert_eq!(config.credentials.password, "password");
            assert_eq!(config.model_name, "Macbook Pro");
            assert_eq!(config.timeouts.settle_ceiling_ms, 1_500);
            assert_eq!(config.selection.company, SelectionPolicy::Random);
            assert_eq!(config.selection.assignee, SelectionPolicy::First);
            assert_eq!(config.selection.location, SelectionPolicy::First);
            config.validate().unwrap();
        }

        #[test]
        fn test_url_joins_cleanly() {
            let config = ProbeConfig {
                base_url: "https://example.test/".to_string(),
                ..ProbeConfig::default()
            };
            assert_eq!(config.url("/login"), "https://example.test/login");
            assert_eq!(config.url("hardware"), "https://example.test/hardware");
        }

        #[test]
        fn test_timeouts_to_wait_options() {
            let t = Timeouts {
                element_ms: 700,
                poll_interval_ms: 20,
                settle_ceiling_ms: 90,
                ..Timeouts::default()
            };
            assert_eq!(t.element().timeout_ms, 700);
            assert_eq!(t.settle().timeout_ms, 90);
            assert_eq!(t.settle().poll_interval_ms, 20);
        }
    }

    mod yaml_tests {
        use super::*;

        #[test]
        fn test_partial_yaml_keeps_defaults() {
            let config = ProbeConfig::from_yaml_str(
                "base_url: http://localhost:8000\nselection:\n  company: first\n",
            )
            .unwrap();
            assert_eq!(config.base_url, "http://localhost:8000");
            assert_eq!(config.selection.company, SelectionPolicy::First);
            assert_eq!(config.selection.location, SelectionPolicy::First);
            assert_eq!(config.model_name, "Macbook Pro");
        }

        #[test]
        fn test_yaml_round_trip_of_defaults() {
            let config = ProbeConfig::default();
            let back = ProbeConfig::from_yaml_str(&config.to_yaml().unwrap()).unwrap();
            assert_eq!(back, config);
        }

        #[test]
        fn test_invalid_yaml_is_an_error() {
            let err = ProbeConfig::from_yaml_str("timeouts: [1, 2").unwrap_err();
            assert!(matches!(err, ProbeError::Yaml(_)));
        }

        #[test]
        fn test_from_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("probe.yaml");
            std::fs::write(&path, "model_name: Dell XPS\nmodel_match: contains\n").unwrap();
            let config = ProbeConfig::from_file(&path).unwrap();
            assert_eq!(config.model_name, "Dell XPS");
            assert_eq!(config.model_match, TextMatch::Contains);
        }

        #[test]
        fn test_missing_file_is_io_error() {
            let err = ProbeConfig::from_file(Path::new("/nonexistent/probe.yaml")).unwrap_err();
            assert!(matches!(err, ProbeError::Io(_)));
        }
    }

    mod env_tests {
        use super::*;

        #[test]
        fn test_env_overrides() {
            let config = ProbeConfig::default()
                .apply_vars(vars(&[
                    ("SNIPEPROBE_BASE_URL", "http://snipe.local"),
                    ("SNIPEPROBE_USERNAME", "qa"),
                    ("SNIPEPROBE_SEED", "42"),
                    ("SNIPEPROBE_HEADLESS", "no"),
                    ("CHROMIUM_PATH", "/usr/bin/chromium"),
                ]))
                .unwrap();
            assert_eq!(config.base_url, "http://snipe.local");
            assert_eq!(config.credentials.username, "qa");
            assert_eq!(config.credentials.password, "password");
            assert_eq!(config.seed, Some(42));
            assert!(!config.browser.headless);
            assert_eq!(
                config.browser.chromium_path,
                Some(PathBuf::from("/usr/bin/chromium"))
            );
        }

        #[test]
        fn test_bad_seed_rejected() {
            let err = ProbeConfig::default()
                .apply_vars(vars(&[("SNIPEPROBE_SEED", "abc")]))
                .unwrap_err();
            assert!(err.to_string().contains("SNIPEPROBE_SEED"));
        }

        #[test]
        fn test_bad_bool_rejected() {
            assert!(ProbeConfig::default()
                .apply_vars(vars(&[("SNIPEPROBE_HEADLESS", "maybe")]))
                .is_err());
        }
    }

    mod validate_tests {
        use super::*;

        #[test]
        fn test_empty_base_url() {
            let config = ProbeConfig {
                base_url: " ".to_string(),
                ..ProbeConfig::default()
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn test_non_http_base_url() {
            let config = ProbeConfig {
                base_url: "ftp://demo".to_string(),
                ..ProbeConfig::default()
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn test_zero_timeout() {
            let mut config = ProbeConfig::default();
            config.timeouts.element_ms = 0;
            assert!(config.validate().is_err());
        }

        #[test]
        fn test_zero_display_len() {
            let config = ProbeConfig {
                display_name_len: 0,
                ..ProbeConfig::default()
            };
            assert!(config.validate().is_err());
        }
    }
}
