//! Page Object Model support.
//!
//! Each Snipe-IT screen is a page object that borrows the [`PageDriver`] and
//! owns its locators. [`UrlMatcher`] decides which screen a URL belongs to.

use crate::driver::PageDriver;
use crate::result::{ProbeError, ProbeResult};
use crate::wait::{self, WaitOptions};
use std::collections::HashMap;

/// A page or component of the target application.
///
/// # Example
///
/// ```ignore
/// impl PageObject for LoginPage<'_, D> {
///     fn url_pattern(&self) -> &str {
///         "/login"
///     }
///
///     fn page_name(&self) -> &str {
///         "login"
///     }
/// }
/// ```
pub trait PageObject {
    /// URL path pattern that matches this page (e.g., "/login", "/hardware/:id")
    fn url_pattern(&self) -> &str;

    /// Short name used in logs and verification messages
    fn page_name(&self) -> &str;

    /// Matcher for [`Self::url_pattern`]
    fn url_matcher(&self) -> UrlMatcher {
        UrlMatcher::new(self.url_pattern())
    }
}

/// Whether the driver's current URL belongs to `page`
pub async fn is_current<P, D>(page: &P, driver: &D) -> ProbeResult<bool>
where
    P: PageObject + ?Sized,
    D: PageDriver + ?Sized,
{
    let url = driver.current_url().await?;
    Ok(page.url_matcher().matches(url_path(&url)))
}

/// Wait until the driver's URL no longer belongs to `page`.
///
/// Returns `false` if it still does when `options.timeout_ms` passes.
pub async fn wait_until_left<P, D>(page: &P, driver: &D, options: &WaitOptions) -> ProbeResult<bool>
where
    P: PageObject + ?Sized,
    D: PageDriver + ?Sized,
{
    let left = wait::poll_for(
        || async move { Ok::<_, ProbeError>((!is_current(page, driver).await?).then_some(())) },
        options,
    )
    .await?;
    Ok(left.is_some())
}

/// Path component of an absolute or relative URL, without query or fragment
#[must_use]
pub fn url_path(url: &str) -> &str {
    let without_scheme = url.find("://").map_or(url, |i| &url[i + 3..]);
    let path = if url.contains("://") {
        without_scheme
            .find('/')
            .map_or("/", |i| &without_scheme[i..])
    } else {
        without_scheme
    };
    let end = path.find(['?', '#']).unwrap_or(path.len());
    &path[..end]
}

/// URL pattern matcher for page objects
#[derive(Debug, Clone)]
pub struct UrlMatcher {
    segments: Vec<UrlSegment>,
}

#[derive(Debug, Clone)]
enum UrlSegment {
    Literal(String),
    Wildcard,
    Parameter(String),
}

impl UrlMatcher {
    /// Create a new URL matcher from a pattern
    ///
    /// Patterns support:
    /// - Literal segments: `/login`
    /// - Wildcards: `/hardware/*`
    /// - Named parameters: `/hardware/:id`
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        let segments = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| {
                if s == "*" {
                    UrlSegment::Wildcard
                } else if let Some(name) = s.strip_prefix(':') {
                    UrlSegment::Parameter(name.to_string())
                } else {
                    UrlSegment::Literal(s.to_string())
                }
            })
            .collect();

        Self { segments }
    }

    /// Check if a path matches the pattern
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        parts.len() == self.segments.len()
            && self
                .segments
                .iter()
                .zip(&parts)
                .all(|(segment, part)| match segment {
                    UrlSegment::Literal(lit) => lit == part,
                    UrlSegment::Wildcard | UrlSegment::Parameter(_) => true,
                })
    }

    /// Named parameters of a matching path (empty when it does not match)
    #[must_use]
    pub fn extract_params(&self, path: &str) -> HashMap<String, String> {
        if !self.matches(path) {
            return HashMap::new();
        }
        self.segments
            .iter()
            .zip(path.split('/').filter(|s| !s.is_empty()))
            .filter_map(|(segment, part)| match segment {
                UrlSegment::Parameter(name) => Some((name.clone(), part.to_string())),
                _ => None,
            })
            .collect()
    }
}
