//! Locations, navigation intents, and the navigator that executes them.
//!
//! SYSTEM CONTEXT
//! ==============
//! Session-changing calls (login, logout, provider linking) return a
//! [`NavigationIntent`] instead of moving the user themselves. The
//! [`Navigator`] is the one place that turns intents into location changes,
//! and every change it makes goes through the [`NavigationGuard`].

#[cfg(test)]
#[path = "navigation_test.rs"]
mod tests;

use std::fmt;

use tracing::{debug, warn};
use url::form_urlencoded;

use crate::guard::{Decision, GuardRefusal, LANDING_PATH, NavigationGuard, REDIRECT_PARAM};

/// Upper bound on guard redirects followed for a single push.
const MAX_REDIRECTS: usize = 5;

// =============================================================================
// LOCATION
// =============================================================================

/// An in-app destination: a normalized path plus ordered query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    path: String,
    query: Vec<(String, String)>,
}

impl Location {
    pub fn new(path: &str) -> Self {
        Self { path: normalize_path(path), query: Vec::new() }
    }

    /// Parse `/path?key=value#fragment`. The fragment is dropped.
    pub fn parse(full_path: &str) -> Self {
        let without_fragment = full_path.split_once('#').map_or(full_path, |(head, _)| head);
        let (path, query) = without_fragment.split_once('?').unwrap_or((without_fragment, ""));
        let query = form_urlencoded::parse(query.as_bytes()).into_owned().collect();
        Self { path: normalize_path(path), query }
    }

    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// First value for `key`, if present.
    pub fn query(&self, key: &str) -> Option<&str> {
        self.query.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Path plus encoded query string.
    pub fn full_path(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query.iter())
            .finish();
        format!("{}?{query}", self.path)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_path())
    }
}

fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}

/// Where the session layer wants the user to go next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationIntent {
    /// An in-app route; still subject to the guard.
    Route(Location),
    /// An absolute URL outside the app (e.g. a provider's consent page).
    External(String),
}

// =============================================================================
// NAVIGATOR
// =============================================================================

/// Result of asking the [`Navigator`] to move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavOutcome {
    /// The navigator now sits at this location (possibly after redirects).
    Arrived(Location),
    /// The guard refused entry; the location did not change.
    Cancelled(GuardRefusal),
    /// The caller should leave the app for this URL.
    External(String),
    /// Redirects did not settle; the location did not change.
    RedirectLoop(Location),
}

pub struct Navigator {
    guard: NavigationGuard,
    current: Location,
}

impl Navigator {
    /// Start at `/` without evaluating the guard.
    pub fn new(guard: NavigationGuard) -> Self {
        Self { guard, current: Location::new("/") }
    }

    pub fn current(&self) -> &Location {
        &self.current
    }

    pub fn guard(&self) -> &NavigationGuard {
        &self.guard
    }

    /// Navigate to `to`, following guard redirects.
    pub fn push(&mut self, to: Location) -> NavOutcome {
        let mut target = to;
        for _ in 0..=MAX_REDIRECTS {
            match self.guard.evaluate(&target) {
                Decision::Allow => {
                    debug!(to = %target, "navigation allowed");
                    self.current = target.clone();
                    return NavOutcome::Arrived(target);
                }
                Decision::Redirect(next) => {
                    debug!(from = %target, to = %next, "navigation redirected");
                    target = next;
                }
                Decision::Cancel(refusal) => return NavOutcome::Cancelled(refusal),
            }
        }
        warn!(last = %target, "navigation redirect loop");
        NavOutcome::RedirectLoop(target)
    }

    pub fn execute(&mut self, intent: NavigationIntent) -> NavOutcome {
        match intent {
            NavigationIntent::Route(location) => self.push(location),
            NavigationIntent::External(url) => NavOutcome::External(url),
        }
    }

    /// After a successful login, go where the user was originally headed.
    pub fn resume_after_login(&mut self) -> NavOutcome {
        let next = post_login_destination(&self.current);
        self.push(next)
    }
}

/// The destination carried in `redirect`, or the landing route.
///
/// Only local absolute paths are replayed, so a crafted link cannot bounce
/// the user off-site after login.
pub fn post_login_destination(login: &Location) -> Location {
    match login.query(REDIRECT_PARAM) {
        Some(target) if target.starts_with('/') && !target.starts_with("//") => Location::parse(target),
        _ => Location::new(LANDING_PATH),
    }
}
