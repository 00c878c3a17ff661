//! Wait mechanisms for synchronizing with the page.
//!
//! Two strategies are used by the page objects:
//!
//! - **Element state waits**: poll [`PageDriver::query`] until a selector's
//!   first (or n-th) match reaches an [`ElementState`], failing with
//!   [`ProbeError::ElementNotFound`] at the timeout.
//! - **Poll until stable**: read a value repeatedly until two consecutive reads
//!   agree, bounded by a ceiling. Reaching the ceiling is reported, not raised.

use crate::driver::{ElementSnapshot, PageDriver};
use crate::locator::Selector;
use crate::result::{ProbeError, ProbeResult};
use std::future::Future;
use std::time::{Duration, Instant};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for element waits (30 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 30_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Default ceiling for client-side filtering to settle after a search
pub const DEFAULT_SETTLE_CEILING_MS: u64 = 1_500;

// =============================================================================
// ELEMENT STATE
// =============================================================================

/// State an element must reach before a wait completes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementState {
    /// Present in the DOM
    Attached,
    /// Present and rendered
    Visible,
    /// Visible and enabled: the precondition for every fill and click
    Ready,
}

impl ElementState {
    /// Check the state against one (possibly missing) element
    #[must_use]
    pub const fn matches(self, element: Option<&ElementSnapshot>) -> bool {
        match (self, element) {
            (Self::Attached, Some(_)) => true,
            (_, None) => false,
            (Self::Visible, Some(e)) => e.visible,
            (Self::Ready, Some(e)) => e.is_ready(),
        }
    }

    /// Name used in error messages
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Attached => "attached",
            Self::Visible => "visible",
            Self::Ready => "ready",
        }
    }
}

impl std::fmt::Display for ElementState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// =============================================================================
// POLLING
// =============================================================================

/// Poll `probe` until it yields `Some`, or return `None` at the timeout.
///
/// The probe is always run at least once. Errors from the probe abort the wait.
pub async fn poll_for<T, F, Fut>(mut probe: F, options: &WaitOptions) -> ProbeResult<Option<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ProbeResult<Option<T>>>,
{
    let start = Instant::now();
    loop {
        if let Some(found) = probe().await? {
            return Ok(Some(found));
        }
        if start.elapsed() >= options.timeout() {
            return Ok(None);
        }
        tokio::time::sleep(options.poll_interval()).await;
    }
}

/// Outcome of [`poll_until_stable`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settled<T> {
    /// Last value read
    pub value: T,
    /// Whether two consecutive accepted reads matched before the ceiling
    pub stable: bool,
    /// Time spent polling
    pub elapsed: Duration,
}

/// Read a value until two consecutive reads match and `accept` approves it.
///
/// `options.timeout_ms` is the ceiling: when it passes, the last read is
/// returned with `stable == false` instead of an error.
pub async fn poll_until_stable<T, F, Fut, A>(
    mut read: F,
    accept: A,
    options: &WaitOptions,
) -> ProbeResult<Settled<T>>
where
    T: PartialEq,
    F: FnMut() -> Fut,
    Fut: Future<Output = ProbeResult<T>>,
    A: Fn(&T) -> bool,
{
    let start = Instant::now();
    let mut previous: Option<T> = None;
    loop {
        let current = read().await?;
        if previous.as_ref() == Some(&current) && accept(&current) {
            return Ok(Settled {
                value: current,
                stable: true,
                elapsed: start.elapsed(),
            });
        }
        if start.elapsed() >= options.timeout() {
            return Ok(Settled {
                value: current,
                stable: false,
                elapsed: start.elapsed(),
            });
        }
        previous = Some(current);
        tokio::time::sleep(options.poll_interval()).await;
    }
}

// =============================================================================
// ELEMENT WAITS
// =============================================================================

/// Wait for the first match of `selector` to reach `state`.
///
/// Returns the snapshot list observed when the state was reached.
pub async fn wait_for_selector<D>(
    driver: &D,
    selector: &Selector,
    state: ElementState,
    options: &WaitOptions,
) -> ProbeResult<Vec<ElementSnapshot>>
where
    D: PageDriver + ?Sized,
{
    wait_for_nth(driver, selector, 0, state, options).await
}

/// Wait for the `index`-th match of `selector` to reach `state`.
pub async fn wait_for_nth<D>(
    driver: &D,
    selector: &Selector,
    index: usize,
    state: ElementState,
    options: &WaitOptions,
) -> ProbeResult<Vec<ElementSnapshot>>
where
    D: PageDriver + ?Sized,
{
    let found = poll_for(
        || async move {
            let elements = driver.query(selector).await?;
            Ok::<_, ProbeError>(state.matches(elements.get(index)).then_some(elements))
        },
        options,
    )
    .await?;

    found.ok_or_else(|| {
        tracing::debug!(%selector, index, %state, "wait timed out");
        ProbeError::ElementNotFound {
            selector: if index == 0 {
                selector.to_string()
            } else {
                format!("{selector} >> nth={index}")
            },
            state: state.to_string(),
            timeout_ms: options.timeout_ms,
        }
    })
}
