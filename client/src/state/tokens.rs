//! Token store: access/refresh tokens persisted as cookies.
//!
//! DESIGN
//! ======
//! Cookies are the one persistence medium. The edge router reads the same
//! `accessToken` cookie before any page content loads, so in-process logic
//! and edge interception agree on token presence. Expiry is whatever a cookie
//! jar does natively: an expired cookie is simply not returned. Validity is
//! the server's call.
//!
//! Writers are limited to login/register/refresh success (set) and
//! logout/refresh failure/startup failure (clear).

#[cfg(test)]
#[path = "tokens_test.rs"]
mod tests;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use axum_extra::extract::cookie::{Cookie, SameSite};
use time::OffsetDateTime;

use crate::config::TokenLifetimes;

pub const ACCESS_COOKIE: &str = "accessToken";
pub const REFRESH_COOKIE: &str = "refreshToken";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    #[must_use]
    pub const fn cookie_name(self) -> &'static str {
        match self {
            Self::Access => ACCESS_COOKIE,
            Self::Refresh => REFRESH_COOKIE,
        }
    }

    fn from_cookie_name(name: &str) -> Option<Self> {
        match name {
            ACCESS_COOKIE => Some(Self::Access),
            REFRESH_COOKIE => Some(Self::Refresh),
            _ => None,
        }
    }
}

// =============================================================================
// TRAIT
// =============================================================================

/// Key-value storage for the token pair. No logic beyond the medium's own
/// expiry.
pub trait TokenStore: Send + Sync {
    fn get(&self, kind: TokenKind) -> Option<String>;

    fn set(&self, kind: TokenKind, value: &str, ttl: time::Duration);

    fn clear(&self, kind: TokenKind);

    /// Write both tokens together.
    fn set_pair(&self, access: &str, refresh: &str, lifetimes: TokenLifetimes) {
        self.set(TokenKind::Access, access, lifetimes.access);
        self.set(TokenKind::Refresh, refresh, lifetimes.refresh);
    }

    /// Clear both tokens together.
    fn clear_all(&self) {
        self.clear(TokenKind::Access);
        self.clear(TokenKind::Refresh);
    }

    /// Presence only; an empty value counts as absent.
    fn has(&self, kind: TokenKind) -> bool {
        self.get(kind).is_some_and(|token| !token.is_empty())
    }
}

// =============================================================================
// COOKIE JAR
// =============================================================================

/// In-memory cookie jar holding the two token cookies.
#[derive(Debug, Default)]
pub struct CookieTokenStore {
    jar: Mutex<HashMap<TokenKind, Cookie<'static>>>,
}

impl CookieTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<TokenKind, Cookie<'static>>> {
        self.jar.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Read a token as of `now`, dropping it if its cookie has expired.
    fn get_at(&self, kind: TokenKind, now: OffsetDateTime) -> Option<String> {
        let mut jar = self.lock();
        let expired = jar.get(&kind).is_some_and(|cookie| is_expired(cookie, now));
        if expired {
            jar.remove(&kind);
            return None;
        }
        jar.get(&kind).map(|cookie| cookie.value().to_owned())
    }

    fn set_at(&self, kind: TokenKind, value: &str, ttl: time::Duration, now: OffsetDateTime) {
        let cookie = Cookie::build((kind.cookie_name(), value.to_owned()))
            .path("/")
            .secure(true)
            .same_site(SameSite::Strict)
            .expires(now + ttl)
            .build();
        self.lock().insert(kind, cookie);
    }

    /// Live cookies rendered as a `Cookie:` request header value, the form the
    /// edge router receives them in.
    #[must_use]
    pub fn cookie_header(&self) -> Option<String> {
        let now = OffsetDateTime::now_utc();
        let pairs: Vec<String> = [TokenKind::Access, TokenKind::Refresh]
            .into_iter()
            .filter_map(|kind| self.get_at(kind, now).map(|value| format!("{}={value}", kind.cookie_name())))
            .collect();
        (!pairs.is_empty()).then(|| pairs.join("; "))
    }

    /// Live cookies rendered as `Set-Cookie` lines (attributes included).
    fn set_cookie_lines(&self) -> Vec<String> {
        let now = OffsetDateTime::now_utc();
        let jar = self.lock();
        [TokenKind::Access, TokenKind::Refresh]
            .into_iter()
            .filter_map(|kind| jar.get(&kind))
            .filter(|cookie| !is_expired(cookie, now))
            .map(ToString::to_string)
            .collect()
    }

    /// Load one `Set-Cookie` line. Unknown cookie names are ignored.
    fn insert_set_cookie(&self, line: &str) -> bool {
        let Ok(cookie) = Cookie::parse(line.to_owned()) else {
            return false;
        };
        let Some(kind) = TokenKind::from_cookie_name(cookie.name()) else {
            return false;
        };
        self.lock().insert(kind, cookie);
        true
    }
}

fn is_expired(cookie: &Cookie<'_>, now: OffsetDateTime) -> bool {
    cookie.expires_datetime().is_some_and(|at| at <= now)
}

impl TokenStore for CookieTokenStore {
    fn get(&self, kind: TokenKind) -> Option<String> {
        self.get_at(kind, OffsetDateTime::now_utc())
    }

    fn set(&self, kind: TokenKind, value: &str, ttl: time::Duration) {
        self.set_at(kind, value, ttl, OffsetDateTime::now_utc());
    }

    fn clear(&self, kind: TokenKind) {
        self.lock().remove(&kind);
    }
}

// =============================================================================
// FILE-BACKED JAR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("token file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Cookie jar persisted to disk, one `Set-Cookie` line per token, so a
/// session survives between CLI invocations.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    jar: CookieTokenStore,
}

impl FileTokenStore {
    /// Open (or lazily create) the token file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if an existing file cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let jar = CookieTokenStore::new();
        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                for line in contents.lines().map(str::trim).filter(|l| !l.is_empty()) {
                    if !jar.insert_set_cookie(line) {
                        tracing::warn!(path = %path.display(), "skipping unreadable token cookie");
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => return Err(StoreError::Io { path, source }),
        }
        Ok(Self { path, jar })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn cookie_header(&self) -> Option<String> {
        self.jar.cookie_header()
    }

    /// Write the live cookies to disk now. Trait writes persist on their own
    /// but can only log a failure; callers that must not lose a session call
    /// this once they are done mutating.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file or its directory cannot be written.
    pub fn save(&self) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io { path: self.path.clone(), source };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let mut contents = self.jar.set_cookie_lines().join("\n");
        contents.push('\n');
        std::fs::write(&self.path, contents).map_err(io_err)?;
        restrict_permissions(&self.path).map_err(io_err)
    }

    fn persist_or_warn(&self) {
        if let Err(e) = self.save() {
            tracing::warn!(error = %e, "token file not updated");
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

impl TokenStore for FileTokenStore {
    fn get(&self, kind: TokenKind) -> Option<String> {
        self.jar.get(kind)
    }

    fn set(&self, kind: TokenKind, value: &str, ttl: time::Duration) {
        self.jar.set(kind, value, ttl);
        self.persist_or_warn();
    }

    fn clear(&self, kind: TokenKind) {
        self.jar.clear(kind);
        self.persist_or_warn();
    }

    fn set_pair(&self, access: &str, refresh: &str, lifetimes: TokenLifetimes) {
        self.jar.set_pair(access, refresh, lifetimes);
        self.persist_or_warn();
    }

    fn clear_all(&self) {
        self.jar.clear_all();
        self.persist_or_warn();
    }
}
