//! Edge router for the Meetscribe web front-end.
//!
//! Serves the single-page app shell and applies the route guard to every
//! navigation before any page content is returned.

mod routes;

use std::path::PathBuf;
use std::sync::Arc;

use client::Guard;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_STATIC_DIR: &str = "dist";

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt::init();

    let port = match std::env::var("PORT") {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(%raw, "invalid PORT; using default");
            DEFAULT_PORT
        }),
        Err(_) => DEFAULT_PORT,
    };
    let static_dir = std::env::var("STATIC_DIR").map_or_else(|_| PathBuf::from(DEFAULT_STATIC_DIR), PathBuf::from);

    let app = routes::app(routes::EdgeConfig { static_dir: static_dir.clone(), guard: Arc::new(Guard::default()) });
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;

    tracing::info!(%port, static_dir = %static_dir.display(), "meetscribe-edge listening");
    axum::serve(listener, app).await
}
