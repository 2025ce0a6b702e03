use super::*;

fn user_json() -> serde_json::Value {
    serde_json::json!({
        "id": "1",
        "email": "a@b.com",
        "name": "Ada",
        "role": "member",
        "organizationId": "org-9"
    })
}

#[test]
fn user_deserializes_camel_case_and_optional_fields() {
    let user: User = serde_json::from_value(user_json()).unwrap();
    assert_eq!(user.id, "1");
    assert_eq!(user.organization_id.as_deref(), Some("org-9"));
    assert_eq!(user.avatar, None);
}

#[test]
fn register_data_omits_missing_organization() {
    let data = RegisterData {
        email: "a@b.com".to_owned(),
        password: "pw".to_owned(),
        name: "Ada".to_owned(),
        organization_name: None,
    };
    let json = serde_json::to_value(&data).unwrap();
    assert_eq!(json, serde_json::json!({ "email": "a@b.com", "password": "pw", "name": "Ada" }));
}

#[test]
fn register_data_serializes_organization_name() {
    let data = RegisterData {
        email: "a@b.com".to_owned(),
        password: "pw".to_owned(),
        name: "Ada".to_owned(),
        organization_name: Some("Acme".to_owned()),
    };
    let json = serde_json::to_value(&data).unwrap();
    assert_eq!(json["organizationName"], "Acme");
}

#[test]
fn auth_response_with_tokens_yields_credentials() {
    let body = serde_json::json!({
        "message": "ok",
        "user": user_json(),
        "accessToken": "AT1",
        "refreshToken": "RT1"
    });
    let resp: AuthResponse = serde_json::from_value(body).unwrap();
    let creds = resp.into_credentials().unwrap();
    assert_eq!(creds.access_token, "AT1");
    assert_eq!(creds.refresh_token, "RT1");
    assert_eq!(creds.user.email, "a@b.com");
}

#[test]
fn auth_response_missing_refresh_token_is_rejected() {
    let body = serde_json::json!({ "user": user_json(), "accessToken": "AT1" });
    let resp: AuthResponse = serde_json::from_value(body).unwrap();
    assert!(resp.into_credentials().is_none());
}

#[test]
fn auth_response_empty_token_is_rejected() {
    let body = serde_json::json!({ "user": user_json(), "accessToken": "", "refreshToken": "RT1" });
    let resp: AuthResponse = serde_json::from_value(body).unwrap();
    assert!(resp.into_credentials().is_none());
}

#[test]
fn refresh_body_uses_camel_case() {
    let json = serde_json::to_value(RefreshTokenBody { refresh_token: "RT1" }).unwrap();
    assert_eq!(json, serde_json::json!({ "refreshToken": "RT1" }));
}
