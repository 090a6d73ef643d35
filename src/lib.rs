//! frametext - Video frame extraction and OCR over HTTP
//!
//! Hexagonal Architecture:
//! - domain/: Video access (av), the video catalog, OCR engine handling
//! - ports/: Trait definitions (OCR engines)
//! - adapters/: Concrete implementations (Tesseract, HTTP)
//! - application/: Request-scoped video service
//! - config: Environment configuration
//!
//! # Features
//! - `tesseract` (default): OCR through libtesseract. Without it the OCR
//!   endpoint answers with an "unavailable" error.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

#[cfg(test)]
mod test_support;

// Re-exports for convenience
pub use adapters::http;
pub use application::VideoService;
pub use config::ServerConfig;
pub use domain::av::VideoAccessor;
pub use domain::catalog::VideoCatalog;
pub use domain::error::{OcrError, VideoError};
pub use domain::ocr::{OcrEngines, OcrSource};
