//! PageDriver - the browser automation surface consumed by page objects.
//!
//! Page objects never talk to CDP directly. They go through this trait so the
//! same interaction sequence runs against a real Chromium tab
//! ([`crate::browser::ChromiumPage`]) or the in-memory [`crate::mock::MockPage`].
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  LoginPage / AssetCreationPage / AssetListPage               │
//! │        │  Locator (auto-wait: attached/visible/ready)        │
//! │        ▼                                                     │
//! │  PageDriver ──┬── ChromiumPage (chromiumoxide, CDP)          │
//! │               └── MockPage     (scripted DOM, unit tests)    │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use crate::locator::Selector;
use crate::result::ProbeResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Point-in-time view of one element matched by a selector
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementSnapshot {
    /// Trimmed visible text
    pub text: String,
    /// Rendered with a non-empty box and not hidden by style
    pub visible: bool,
    /// Not disabled
    pub enabled: bool,
    /// Current `value` for form controls
    pub value: Option<String>,
    /// Checked state for radios and checkboxes
    pub checked: bool,
}

impl ElementSnapshot {
    /// A visible, enabled element with the given text
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            visible: true,
            enabled: true,
            value: None,
            checked: false,
        }
    }

    /// Set the form value
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Mark as hidden
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Mark as disabled
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Visible and enabled, i.e. safe to click or type into
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.visible && self.enabled
    }
}

/// Browser automation primitives.
///
/// Every method is one suspend point; none of them retries.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate to URL and wait for the load to finish
    async fn goto(&self, url: &str) -> ProbeResult<()>;

    /// Get current URL
    async fn current_url(&self) -> ProbeResult<String>;

    /// Snapshot every element matching the selector, in document order
    async fn query(&self, selector: &Selector) -> ProbeResult<Vec<ElementSnapshot>>;

    /// Click the `index`-th match
    async fn click(&self, selector: &Selector, index: usize) -> ProbeResult<()>;

    /// Replace the first match's value, typing `value` as keystrokes
    async fn fill(&self, selector: &Selector, value: &str) -> ProbeResult<()>;

    /// Select an `<option>` by value on the first match
    async fn select_option(&self, selector: &Selector, value: &str) -> ProbeResult<()>;

    /// Check a radio or checkbox
    async fn check(&self, selector: &Selector) -> ProbeResult<()>;

    /// Evaluate a JavaScript expression in page context
    async fn evaluate(&self, script: &str) -> ProbeResult<serde_json::Value>;

    /// Take a PNG screenshot
    async fn screenshot(&self) -> ProbeResult<Vec<u8>>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_new_is_ready() {
        let elem = ElementSnapshot::new("Save");
        assert_eq!(elem.text, "Save");
        assert!(elem.is_ready());
        assert!(elem.value.is_none());
    }

    #[test]
    fn test_snapshot_hidden_and_disabled() {
        assert!(!ElementSnapshot::new("x").hidden().is_ready());
        assert!(!ElementSnapshot::new("x").disabled().is_ready());
    }

    #[test]
    fn test_snapshot_deserializes_partial_json() {
        let elem: ElementSnapshot =
            serde_json::from_value(serde_json::json!({"text": "A", "visible": true})).unwrap();
        assert_eq!(elem.text, "A");
        assert!(elem.visible);
        assert!(!elem.enabled);
        assert!(!elem.checked);
    }
}
