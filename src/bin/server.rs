//! HTTP server binary.
//!
//! Wires up:
//! - the video catalog, scanned once at startup
//! - OCR engines (per call, or pooled with OCR_POOL_SIZE)
//! - the axum router

use frametext::{http, ServerConfig, VideoService};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let config = ServerConfig::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 1. Catalog
    let catalog = Arc::new(config.build_catalog());
    info!(
        videos = catalog.len(),
        dir = %config.video_dir.display(),
        "video catalog loaded"
    );

    // 2. OCR
    let ocr = Arc::new(config.ocr_engines());
    info!(
        language = %config.ocr_language,
        pool = config.ocr_pool_size,
        "OCR engines configured"
    );

    // 3. HTTP
    let service = Arc::new(VideoService::new(catalog, ocr));
    let app = http::router(service);

    let listener = tokio::net::TcpListener::bind(config.bind_address())
        .await
        .expect("Failed to bind TCP listener");
    info!("Listening at {}", config.bind_address());
    axum::serve(listener, app)
        .await
        .expect("Server failed to start");
}
