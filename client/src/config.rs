//! API client configuration parsed from environment variables.
//!
//! The remote auth endpoints have drifted between two spellings
//! (`login/register/logout` and `signin/signup/signout`). Exactly one is
//! selected here and every caller goes through [`AuthEndpoints`].

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::time::Duration;

use crate::error::ApiError;

pub const DEFAULT_API_URL: &str = "http://localhost:3001/api/v1";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_ACCESS_TTL_DAYS: i64 = 7;
pub const DEFAULT_REFRESH_TTL_DAYS: i64 = 30;

/// Which spelling of the sign-in/sign-up/sign-out endpoints the API uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndpointNaming {
    /// `auth/login`, `auth/register`, `auth/logout`
    #[default]
    Login,
    /// `auth/signin`, `auth/signup`, `auth/signout`
    Signin,
}

/// Paths of the auth endpoints, relative to the API base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthEndpoints {
    pub sign_in: String,
    pub sign_up: String,
    pub sign_out: String,
    pub refresh: String,
    pub profile: String,
}

impl AuthEndpoints {
    #[must_use]
    pub fn for_naming(naming: EndpointNaming) -> Self {
        let (sign_in, sign_up, sign_out) = match naming {
            EndpointNaming::Login => ("/auth/login", "/auth/register", "/auth/logout"),
            EndpointNaming::Signin => ("/auth/signin", "/auth/signup", "/auth/signout"),
        };
        Self {
            sign_in: sign_in.to_owned(),
            sign_up: sign_up.to_owned(),
            sign_out: sign_out.to_owned(),
            refresh: "/auth/refresh".to_owned(),
            profile: "/users/me".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Timeouts {
    #[must_use]
    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    #[must_use]
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }
}

/// Token lifetimes handed to the token store when tokens are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLifetimes {
    pub access: time::Duration,
    pub refresh: time::Duration,
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            access: time::Duration::days(DEFAULT_ACCESS_TTL_DAYS),
            refresh: time::Duration::days(DEFAULT_REFRESH_TTL_DAYS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Origin plus API prefix, without a trailing slash.
    pub base_url: String,
    pub naming: EndpointNaming,
    pub endpoints: AuthEndpoints,
    pub timeouts: Timeouts,
    pub lifetimes: TokenLifetimes,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL, EndpointNaming::default())
    }
}

impl ApiConfig {
    #[must_use]
    pub fn new(base_url: &str, naming: EndpointNaming) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            naming,
            endpoints: AuthEndpoints::for_naming(naming),
            timeouts: Timeouts {
                request_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
                connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            },
            lifetimes: TokenLifetimes::default(),
        }
    }

    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `MEETSCRIBE_API_URL`: default `http://localhost:3001/api/v1`
    /// - `MEETSCRIBE_AUTH_NAMING`: `login` (default) or `signin`
    /// - `MEETSCRIBE_REQUEST_TIMEOUT_SECS`: default 30
    /// - `MEETSCRIBE_CONNECT_TIMEOUT_SECS`: default 10
    /// - `MEETSCRIBE_ACCESS_TTL_DAYS`: default 7
    /// - `MEETSCRIBE_REFRESH_TTL_DAYS`: default 30
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] for an unknown endpoint naming.
    pub fn from_env() -> Result<Self, ApiError> {
        let base_url = std::env::var("MEETSCRIBE_API_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_owned());
        let naming = parse_naming(std::env::var("MEETSCRIBE_AUTH_NAMING").ok().as_deref())?;

        let mut config = Self::new(&base_url, naming);
        config.timeouts = Timeouts {
            request_secs: env_parse("MEETSCRIBE_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse("MEETSCRIBE_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        config.lifetimes = TokenLifetimes {
            access: time::Duration::days(env_parse("MEETSCRIBE_ACCESS_TTL_DAYS", DEFAULT_ACCESS_TTL_DAYS)),
            refresh: time::Duration::days(env_parse("MEETSCRIBE_REFRESH_TTL_DAYS", DEFAULT_REFRESH_TTL_DAYS)),
        };
        Ok(config)
    }

    /// Absolute URL for an API path such as `/meetings/42`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

pub(crate) fn parse_naming(raw: Option<&str>) -> Result<EndpointNaming, ApiError> {
    match raw.map(str::trim).filter(|v| !v.is_empty()).unwrap_or("login") {
        "login" => Ok(EndpointNaming::Login),
        "signin" => Ok(EndpointNaming::Signin),
        other => Err(ApiError::Config(format!(
            "unknown MEETSCRIBE_AUTH_NAMING '{other}' (expected 'login' or 'signin')"
        ))),
    }
}
