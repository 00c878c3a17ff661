//! In-memory [`PageDriver`] for tests.
//!
//! A `MockPage` is a scripted DOM: elements are registered per CSS selector,
//! clicks can rewrite that DOM, and page scripts answer from a rule table.
//! Every call is recorded so tests can assert on the interaction sequence.
//!
//! ```ignore
//! let page = MockPage::new();
//! page.set_elements("#asset_tag", vec![ElementSnapshot::new("").with_value("T1")]);
//! page.on_click("button[id='submit_button']", ClickEffect::SetUrl("https://x/hardware/1".into()));
//! ```

use crate::driver::{ElementSnapshot, PageDriver};
use crate::locator::Selector;
use crate::result::{ProbeError, ProbeResult};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

/// What a click on a selector does to the mock DOM
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickEffect {
    /// Replace the elements registered under a selector
    Replace(String, Vec<ElementSnapshot>),
    /// Remove every element registered under a selector
    Clear(String),
    /// Change the current URL
    SetUrl(String),
}

/// One recorded driver call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    /// `goto`
    Goto(String),
    /// `click` on the n-th match
    Click(String, usize),
    /// `fill`
    Fill(String, String),
    /// `select_option`
    Select(String, String),
    /// `check`
    Check(String),
    /// `evaluate`
    Evaluate(String),
    /// `screenshot`
    Screenshot,
}

#[derive(Debug, Default)]
struct MockState {
    url: String,
    elements: HashMap<String, Vec<ElementSnapshot>>,
    click_effects: HashMap<String, Vec<ClickEffect>>,
    scripts: Vec<(String, Vec<serde_json::Value>)>,
    failing_urls: HashSet<String>,
    calls: Vec<MockCall>,
}

/// Scripted page used by unit and scenario tests
#[derive(Debug, Default)]
pub struct MockPage {
    state: Mutex<MockState>,
}

impl MockPage {
    /// Empty page at `about:blank`
    #[must_use]
    pub fn new() -> Self {
        let page = Self::default();
        page.lock().url = "about:blank".to_string();
        page
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        // A panicking test thread cannot leave the state half-written
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Register the elements a CSS selector matches
    pub fn set_elements(&self, css: &str, elements: Vec<ElementSnapshot>) {
        self.lock().elements.insert(css.to_string(), elements);
    }

    /// Register a single visible element with the given text
    pub fn add_element(&self, css: &str, text: &str) {
        self.lock()
            .elements
            .entry(css.to_string())
            .or_default()
            .push(ElementSnapshot::new(text));
    }

    /// Current elements for a selector
    #[must_use]
    pub fn elements(&self, css: &str) -> Vec<ElementSnapshot> {
        self.lock().elements.get(css).cloned().unwrap_or_default()
    }

    /// Apply `effect` whenever an element matching `css` is clicked
    pub fn on_click(&self, css: &str, effect: ClickEffect) {
        self.lock()
            .click_effects
            .entry(css.to_string())
            .or_default()
            .push(effect);
    }

    /// Answer scripts containing `needle` with `results` in order.
    ///
    /// The last result repeats once the queue is down to one entry.
    /// Replaces an earlier rule for the same needle. Scripts matching no
    /// rule evaluate to `true`.
    pub fn on_script(&self, needle: &str, results: Vec<serde_json::Value>) {
        let mut state = self.lock();
        state.scripts.retain(|(existing, _)| existing != needle);
        state.scripts.push((needle.to_string(), results));
    }

    /// Make navigation to `url` fail
    pub fn fail_navigation(&self, url: &str) {
        self.lock().failing_urls.insert(url.to_string());
    }

    /// Set the current URL without recording a call
    pub fn set_url(&self, url: &str) {
        self.lock().url = url.to_string();
    }

    /// Every call made so far
    #[must_use]
    pub fn calls(&self) -> Vec<MockCall> {
        self.lock().calls.clone()
    }

    /// Whether `call` was made
    #[must_use]
    pub fn was_called(&self, call: &MockCall) -> bool {
        self.lock().calls.contains(call)
    }

    /// Clicks made on a base CSS selector
    #[must_use]
    pub fn clicks_on(&self, css: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| matches!(c, MockCall::Click(s, _) if s == css))
            .count()
    }

    fn matching(state: &MockState, selector: &Selector) -> Vec<(usize, ElementSnapshot)> {
        state
            .elements
            .get(selector.base_css())
            .map(|all| {
                all.iter()
                    .enumerate()
                    .filter(|(_, e)| selector.accepts_text(&e.text))
                    .map(|(i, e)| (i, e.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn not_found(selector: &Selector) -> ProbeError {
        ProbeError::ElementNotFound {
            selector: selector.to_string(),
            state: "attached".to_string(),
            timeout_ms: 0,
        }
    }
}

#[async_trait]
impl PageDriver for MockPage {
    async fn goto(&self, url: &str) -> ProbeResult<()> {
        let mut state = self.lock();
        state.calls.push(MockCall::Goto(url.to_string()));
        if state.failing_urls.contains(url) {
            return Err(ProbeError::Navigation {
                url: url.to_string(),
                message: "net::ERR_CONNECTION_REFUSED".to_string(),
            });
        }
        state.url = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> ProbeResult<String> {
        Ok(self.lock().url.clone())
    }

    async fn query(&self, selector: &Selector) -> ProbeResult<Vec<ElementSnapshot>> {
        let state = self.lock();
        Ok(Self::matching(&state, selector)
            .into_iter()
            .map(|(_, e)| e)
            .collect())
    }

    async fn click(&self, selector: &Selector, index: usize) -> ProbeResult<()> {
        let mut state = self.lock();
        if Self::matching(&state, selector).get(index).is_none() {
            return Err(Self::not_found(selector));
        }
        state
            .calls
            .push(MockCall::Click(selector.base_css().to_string(), index));
        let effects = state
            .click_effects
            .get(selector.base_css())
            .cloned()
            .unwrap_or_default();
        for effect in effects {
            match effect {
                ClickEffect::Replace(css, elements) => {
                    state.elements.insert(css, elements);
                }
                ClickEffect::Clear(css) => {
                    state.elements.remove(&css);
                }
                ClickEffect::SetUrl(url) => state.url = url,
            }
        }
        Ok(())
    }

    async fn fill(&self, selector: &Selector, value: &str) -> ProbeResult<()> {
        let mut state = self.lock();
        let Some((position, _)) = Self::matching(&state, selector).into_iter().next() else {
            return Err(Self::not_found(selector));
        };
        state.calls.push(MockCall::Fill(
            selector.base_css().to_string(),
            value.to_string(),
        ));
        if let Some(element) = state
            .elements
            .get_mut(selector.base_css())
            .and_then(|all| all.get_mut(position))
        {
            element.value = Some(value.to_string());
        }
        Ok(())
    }

    async fn select_option(&self, selector: &Selector, value: &str) -> ProbeResult<()> {
        let mut state = self.lock();
        let Some((position, _)) = Self::matching(&state, selector).into_iter().next() else {
            return Err(Self::not_found(selector));
        };
        state.calls.push(MockCall::Select(
            selector.base_css().to_string(),
            value.to_string(),
        ));
        if let Some(element) = state
            .elements
            .get_mut(selector.base_css())
            .and_then(|all| all.get_mut(position))
        {
            element.value = Some(value.to_string());
        }
        Ok(())
    }

    async fn check(&self, selector: &Selector) -> ProbeResult<()> {
        let mut state = self.lock();
        let Some((position, _)) = Self::matching(&state, selector).into_iter().next() else {
            return Err(Self::not_found(selector));
        };
        state
            .calls
            .push(MockCall::Check(selector.base_css().to_string()));
        if let Some(element) = state
            .elements
            .get_mut(selector.base_css())
            .and_then(|all| all.get_mut(position))
        {
            element.checked = true;
        }
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> ProbeResult<serde_json::Value> {
        let mut state = self.lock();
        state.calls.push(MockCall::Evaluate(script.to_string()));
        let rule = state
            .scripts
            .iter_mut()
            .find(|(needle, _)| script.contains(needle.as_str()));
        let value = match rule {
            Some((_, results)) if results.len() > 1 => results.remove(0),
            Some((_, results)) => results.first().cloned().unwrap_or(serde_json::Value::Null),
            None => serde_json::Value::Bool(true),
        };
        Ok(value)
    }

    async fn screenshot(&self) -> ProbeResult<Vec<u8>> {
        self.lock().calls.push(MockCall::Screenshot);
        Ok(b"\x89PNG\r\n\x1a\n".to_vec())
    }
}
