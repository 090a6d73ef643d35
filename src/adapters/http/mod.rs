//! HTTP inbound adapter.

pub mod error;
pub mod handlers;

use crate::application::VideoService;
use axum::{routing::get, Router};
use std::sync::Arc;

pub fn router(service: Arc<VideoService>) -> Router {
    Router::new()
        .route("/video", get(handlers::list_videos))
        .route("/video/:id", get(handlers::video_metadata))
        .route("/video/:id/frame/:t", get(handlers::video_frame))
        .route("/video/:id/frame/:t/ocr", get(handlers::video_frame_ocr))
        .with_state(service)
}
