use std::path::PathBuf;

use axum::body::Body;
use axum::http::header::{COOKIE, LOCATION};
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use super::*;
use crate::routes::{EdgeConfig, app};

fn static_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("meetscribe-edge-{}-{name}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("index.html"), "<html>shell</html>").unwrap();
    dir
}

fn edge(name: &str) -> axum::Router {
    app(EdgeConfig { static_dir: static_dir(name), guard: Arc::new(Guard::default()) })
}

async fn get(router: axum::Router, path: &str, cookie: Option<&str>) -> axum::response::Response {
    let mut builder = Request::builder().uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    router.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap()
}

fn location(resp: &axum::response::Response) -> &str {
    resp.headers().get(LOCATION).unwrap().to_str().unwrap()
}

#[test]
fn bypass_is_segment_aware() {
    assert!(bypasses("/api"));
    assert!(bypasses("/api/v1/users/me"));
    assert!(bypasses("/assets/app.js"));
    assert!(bypasses("/favicon.ico"));
    assert!(!bypasses("/apiary"));
    assert!(!bypasses("/meetings"));
}

#[tokio::test]
async fn protected_without_cookie_redirects_to_login() {
    let resp = get(edge("protected-anon"), "/meetings/42", None).await;
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&resp), "/auth/login");
}

#[tokio::test]
async fn protected_with_cookie_serves_shell() {
    let resp = get(edge("protected-auth"), "/meetings", Some("accessToken=AT1")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"<html>shell</html>");
}

#[tokio::test]
async fn auth_entry_with_cookie_redirects_to_dashboard() {
    let resp = get(edge("entry-auth"), "/auth/login", Some("theme=dark; accessToken=AT1")).await;
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&resp), "/dashboard");
}

#[tokio::test]
async fn empty_cookie_counts_as_absent() {
    let resp = get(edge("empty-cookie"), "/dashboard", Some("accessToken=")).await;
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
}

#[tokio::test]
async fn public_and_bypassed_paths_pass_through() {
    assert_eq!(get(edge("public"), "/", None).await.status(), StatusCode::OK);
    assert_eq!(get(edge("healthz"), "/healthz", None).await.status(), StatusCode::OK);

    let resp = get(edge("bypass"), "/api/v1/meetings", None).await;
    assert_ne!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
}
