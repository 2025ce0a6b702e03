//! Auth-session state for the current process.
//!
//! SYSTEM CONTEXT
//! ==============
//! Observed by route guards and identity-aware views; written only by the
//! session context operations and the HTTP client's forced logout.
//!
//! DESIGN
//! ======
//! A single owned `watch` channel holds the session. Observers subscribe and
//! re-render on change. `Session` is an enum so "authenticated" and "has a
//! user" cannot disagree.

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;

use std::sync::Arc;

use tokio::sync::watch;

use crate::net::types::User;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    Loading,
    Authenticated,
    Anonymous,
}

/// The authenticated identity for this process, or the lack of one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Session {
    /// Startup profile check has not resolved yet.
    #[default]
    Loading,
    Authenticated(User),
    Anonymous,
}

impl Session {
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        match self {
            Self::Loading => SessionStatus::Loading,
            Self::Authenticated(_) => SessionStatus::Authenticated,
            Self::Anonymous => SessionStatus::Anonymous,
        }
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

/// Shared handle to the session channel.
#[derive(Clone, Debug)]
pub struct SessionState {
    tx: Arc<watch::Sender<Session>>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    #[must_use]
    pub fn new() -> Self {
        Self { tx: Arc::new(watch::Sender::new(Session::Loading)) }
    }

    #[must_use]
    pub fn current(&self) -> Session {
        self.tx.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }

    pub(crate) fn set_authenticated(&self, user: User) {
        self.tx.send_replace(Session::Authenticated(user));
    }

    /// Returns `true` if the session changed.
    pub(crate) fn set_anonymous(&self) -> bool {
        self.tx.send_if_modified(|session| {
            if matches!(session, Session::Anonymous) {
                return false;
            }
            *session = Session::Anonymous;
            true
        })
    }

    /// Resolve a `Loading` session. `on_apply` runs only when the resolution
    /// is applied; a session that already moved on is left alone.
    pub(crate) fn settle(&self, resolved: Session, on_apply: impl FnOnce()) -> bool {
        self.tx.send_if_modified(|session| {
            if !session.is_loading() {
                return false;
            }
            on_apply();
            *session = resolved;
            true
        })
    }

    /// Swap in a freshly fetched identity, only while still authenticated.
    pub(crate) fn replace_user(&self, user: User) -> bool {
        self.tx.send_if_modified(|session| {
            if !session.is_authenticated() {
                return false;
            }
            *session = Session::Authenticated(user);
            true
        })
    }
}
