use super::*;

// =============================================================================
// from_status
// =============================================================================

#[test]
fn from_status_reads_message_field() {
    let err = ApiError::from_status(400, r#"{"message":"Email already registered","error":"Bad Request"}"#);
    assert_eq!(
        err,
        ApiError::Status {
            status: 400,
            message: Some("Email already registered".to_owned()),
            error: Some("Bad Request".to_owned()),
        }
    );
}

#[test]
fn from_status_joins_validation_messages() {
    let err = ApiError::from_status(400, r#"{"message":["email must be an email","password too short"]}"#);
    assert_eq!(err.user_message(), "email must be an email, password too short");
}

#[test]
fn from_status_tolerates_non_json_body() {
    let err = ApiError::from_status(502, "<html>Bad Gateway</html>");
    assert_eq!(err, ApiError::Status { status: 502, message: None, error: None });
}

// =============================================================================
// user_message precedence
// =============================================================================

#[test]
fn user_message_prefers_server_message() {
    let err = ApiError::from_status(409, r#"{"message":"Meeting already started","error":"Conflict"}"#);
    assert_eq!(err.user_message(), "Meeting already started");
}

#[test]
fn user_message_falls_back_to_error_field() {
    let err = ApiError::from_status(403, r#"{"error":"Forbidden"}"#);
    assert_eq!(err.user_message(), "Forbidden");
}

#[test]
fn user_message_falls_back_to_generic_status_text() {
    let err = ApiError::from_status(500, "");
    assert_eq!(err.user_message(), "Request failed with status code 500");
}

#[test]
fn user_message_uses_transport_text() {
    let err = ApiError::Transport("connection refused".to_owned());
    assert_eq!(err.user_message(), "connection refused");
}

#[test]
fn user_message_uses_fallback_when_nothing_else() {
    assert_eq!(ApiError::Transport("   ".to_owned()).user_message(), FALLBACK_MESSAGE);
    assert_eq!(ApiError::Decode("eof".to_owned()).user_message_or("Login failed"), "Login failed");
}

#[test]
fn refresh_failure_reports_inner_message() {
    let inner = ApiError::from_status(401, r#"{"message":"Refresh token revoked"}"#);
    let err = ApiError::RefreshFailed(Box::new(inner));
    assert_eq!(err.user_message(), "Refresh token revoked");
    assert!(err.to_string().starts_with("token refresh failed"));
}

// =============================================================================
// classification
// =============================================================================

#[test]
fn unauthorized_is_not_surfaced() {
    let err = ApiError::from_status(401, "");
    assert!(err.is_unauthorized());
    assert!(!err.surfaced());
}

#[test]
fn other_statuses_and_transport_are_surfaced() {
    assert!(ApiError::from_status(422, "").surfaced());
    assert!(ApiError::Transport("timeout".to_owned()).surfaced());
    assert!(!ApiError::InvalidResponse(INVALID_RESPONSE_MESSAGE).surfaced());
}

#[test]
fn display_uses_server_message() {
    let err = ApiError::from_status(404, r#"{"message":"Meeting not found"}"#);
    assert_eq!(err.to_string(), "Meeting not found");
}
