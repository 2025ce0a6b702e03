//! Route guard middleware.
//!
//! Reads the `accessToken` cookie and answers with a `307` before any page
//! content loads. Presence only: validity is the API's business.

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use client::state::tokens::ACCESS_COOKIE;
use client::{Guard, GuardDecision};

/// Paths that never go through the guard: API calls, bundled assets, and
/// the favicon.
const BYPASS_PREFIXES: &[&str] = &["/api", "/assets", "/pkg", "/favicon.ico"];

pub(crate) fn bypasses(path: &str) -> bool {
    BYPASS_PREFIXES.iter().any(|prefix| {
        path.strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    })
}

pub async fn route_guard(State(guard): State<Arc<Guard>>, jar: CookieJar, request: Request, next: Next) -> Response {
    let path = request.uri().path();
    if bypasses(path) {
        return next.run(request).await;
    }

    let token_present = jar.get(ACCESS_COOKIE).is_some_and(|c| !c.value().is_empty());
    match guard.decide(path, token_present) {
        GuardDecision::Allow => next.run(request).await,
        GuardDecision::Redirect(to) => {
            tracing::debug!(%path, %to, "route guard redirect");
            Redirect::temporary(to).into_response()
        }
    }
}
