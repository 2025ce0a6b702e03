use super::*;

/// # Safety
/// Env-mutating tests share process state; each one clears before and after.
unsafe fn clear_meetscribe_env() {
    unsafe {
        std::env::remove_var("MEETSCRIBE_API_URL");
        std::env::remove_var("MEETSCRIBE_AUTH_NAMING");
        std::env::remove_var("MEETSCRIBE_REQUEST_TIMEOUT_SECS");
        std::env::remove_var("MEETSCRIBE_CONNECT_TIMEOUT_SECS");
        std::env::remove_var("MEETSCRIBE_ACCESS_TTL_DAYS");
        std::env::remove_var("MEETSCRIBE_REFRESH_TTL_DAYS");
    }
}

static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[test]
fn from_env_defaults() {
    let _lock = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe { clear_meetscribe_env() };

    let cfg = ApiConfig::from_env().unwrap();
    assert_eq!(cfg.base_url, DEFAULT_API_URL);
    assert_eq!(cfg.naming, EndpointNaming::Login);
    assert_eq!(cfg.endpoints.sign_in, "/auth/login");
    assert_eq!(cfg.endpoints.refresh, "/auth/refresh");
    assert_eq!(cfg.endpoints.profile, "/users/me");
    assert_eq!(
        cfg.timeouts,
        Timeouts { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    );
    assert_eq!(cfg.lifetimes, TokenLifetimes::default());
}

#[test]
fn from_env_parses_overrides() {
    let _lock = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_meetscribe_env();
        std::env::set_var("MEETSCRIBE_API_URL", "https://api.example.test/v2/");
        std::env::set_var("MEETSCRIBE_AUTH_NAMING", "signin");
        std::env::set_var("MEETSCRIBE_REQUEST_TIMEOUT_SECS", "5");
        std::env::set_var("MEETSCRIBE_CONNECT_TIMEOUT_SECS", "2");
        std::env::set_var("MEETSCRIBE_ACCESS_TTL_DAYS", "1");
        std::env::set_var("MEETSCRIBE_REFRESH_TTL_DAYS", "14");
    }

    let cfg = ApiConfig::from_env().unwrap();
    assert_eq!(cfg.base_url, "https://api.example.test/v2");
    assert_eq!(cfg.endpoints.sign_in, "/auth/signin");
    assert_eq!(cfg.endpoints.sign_up, "/auth/signup");
    assert_eq!(cfg.endpoints.sign_out, "/auth/signout");
    assert_eq!(cfg.timeouts, Timeouts { request_secs: 5, connect_secs: 2 });
    assert_eq!(cfg.lifetimes.access, time::Duration::days(1));
    assert_eq!(cfg.lifetimes.refresh, time::Duration::days(14));

    unsafe { clear_meetscribe_env() };
}

#[test]
fn from_env_rejects_unknown_naming() {
    let _lock = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_meetscribe_env();
        std::env::set_var("MEETSCRIBE_AUTH_NAMING", "sso");
    }

    let err = ApiConfig::from_env().unwrap_err();
    assert!(matches!(err, ApiError::Config(_)));
    assert!(err.to_string().contains("unknown MEETSCRIBE_AUTH_NAMING"));

    unsafe { clear_meetscribe_env() };
}

#[test]
fn unparsable_numbers_fall_back_to_defaults() {
    let _lock = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_meetscribe_env();
        std::env::set_var("MEETSCRIBE_REQUEST_TIMEOUT_SECS", "soon");
    }

    let cfg = ApiConfig::from_env().unwrap();
    assert_eq!(cfg.timeouts.request_secs, DEFAULT_REQUEST_TIMEOUT_SECS);

    unsafe { clear_meetscribe_env() };
}

#[test]
fn parse_naming_defaults_to_login() {
    assert_eq!(parse_naming(None).unwrap(), EndpointNaming::Login);
    assert_eq!(parse_naming(Some("  ")).unwrap(), EndpointNaming::Login);
    assert_eq!(parse_naming(Some("signin")).unwrap(), EndpointNaming::Signin);
}

#[test]
fn url_joins_paths_with_single_slash() {
    let cfg = ApiConfig::new("http://localhost:3001/api/v1/", EndpointNaming::Login);
    assert_eq!(cfg.url("/meetings"), "http://localhost:3001/api/v1/meetings");
    assert_eq!(cfg.url("users/me"), "http://localhost:3001/api/v1/users/me");
}
