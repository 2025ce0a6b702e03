//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Everything except the health check falls through to the static SPA
//! bundle, with `index.html` answering unknown paths so client-side routing
//! can take over. The route guard wraps the whole router.

pub mod guard;

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::http::StatusCode;
use axum::middleware;
use axum::routing::get;
use client::Guard;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

#[derive(Clone, Debug)]
pub struct EdgeConfig {
    pub static_dir: PathBuf,
    pub guard: Arc<Guard>,
}

pub fn app(config: EdgeConfig) -> Router {
    let index = config.static_dir.join("index.html");
    let spa = ServeDir::new(&config.static_dir)
        .append_index_html_on_directories(true)
        .fallback(ServeFile::new(index));

    Router::new()
        .route("/healthz", get(healthz))
        .fallback_service(spa)
        .layer(middleware::from_fn_with_state(config.guard, guard::route_guard))
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
