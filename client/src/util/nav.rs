//! Navigation and notification seams.
//!
//! SYSTEM CONTEXT
//! ==============
//! The HTTP client core and the session context decide *when* to redirect or
//! notify; the embedding front-end decides *how*. Both effects are injected
//! as trait objects so the decision logic runs without a router or toaster.

pub const LOGIN_PATH: &str = "/auth/login";
pub const REGISTER_PATH: &str = "/auth/register";
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Performs a client-side navigation.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A user-facing notification (a toast in the browser front-end).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, message: message.into() }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }
}

/// Notification side-channel.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Navigator that only records the redirect in the trace log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, path: &str) {
        tracing::info!(%path, "navigate");
    }
}

/// Notifier that writes notices to the trace log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => tracing::info!(message = %notice.message, "notice"),
            NoticeLevel::Error => tracing::warn!(message = %notice.message, "notice"),
        }
    }
}
