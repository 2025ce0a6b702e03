//! Route guard: gate navigations on access-token presence.
//!
//! SYSTEM CONTEXT
//! ==============
//! Runs before any protected content is produced: in the edge router for
//! full page loads and in-process for CLI and in-page navigation. Routes
//! agree on redirects by sharing one decision table.
//!
//! The guard checks presence only. An expired token passes here and is
//! caught by the HTTP client's refresh protocol on first use.

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;

use super::nav::{DASHBOARD_PATH, LOGIN_PATH};
use crate::state::tokens::{TokenKind, TokenStore};

pub const PROTECTED_PREFIXES: &[&str] = &["/dashboard", "/meetings", "/search", "/analytics", "/settings"];
pub const AUTH_ENTRY_PREFIX: &str = "/auth/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathCategory {
    Protected,
    AuthEntry,
    Public,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(&'static str),
}

#[derive(Debug, Clone)]
pub struct Guard {
    protected: Vec<String>,
}

impl Default for Guard {
    fn default() -> Self {
        Self::new(PROTECTED_PREFIXES.iter().copied())
    }
}

impl Guard {
    /// Guard over a custom protected set. Trailing slashes are ignored.
    #[must_use]
    pub fn new<I, S>(protected: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let protected = protected
            .into_iter()
            .map(|p| p.as_ref().trim_end_matches('/').to_owned())
            .filter(|p| !p.is_empty())
            .collect();
        Self { protected }
    }

    #[must_use]
    pub fn classify(&self, path: &str) -> PathCategory {
        if path.starts_with(AUTH_ENTRY_PREFIX) {
            return PathCategory::AuthEntry;
        }
        if self.protected.iter().any(|prefix| under_prefix(path, prefix)) {
            return PathCategory::Protected;
        }
        PathCategory::Public
    }

    #[must_use]
    pub fn decide(&self, path: &str, token_present: bool) -> GuardDecision {
        match (self.classify(path), token_present) {
            (PathCategory::AuthEntry, true) => GuardDecision::Redirect(DASHBOARD_PATH),
            (PathCategory::Protected, false) => GuardDecision::Redirect(LOGIN_PATH),
            _ => GuardDecision::Allow,
        }
    }

    #[must_use]
    pub fn check(&self, path: &str, tokens: &dyn TokenStore) -> GuardDecision {
        let decision = self.decide(path, tokens.has(TokenKind::Access));
        if let GuardDecision::Redirect(to) = decision {
            tracing::debug!(%path, %to, "route guard redirect");
        }
        decision
    }
}

/// `/meetings` covers `/meetings`, `/meetings/42` and `/meetings?x=1` but not
/// `/meetingsroom`.
fn under_prefix(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(['/', '?', '#']))
}
