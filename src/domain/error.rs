//! Error types shared by the domain, application and adapters.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VideoError {
    /// Unknown catalog id, or the catalog path is not a readable file.
    #[error("Video not found: {0}")]
    NotFound(String),

    #[error("cannot open {source_name}: {reason}")]
    Open { source_name: String, reason: String },

    #[error("could not read frame: {0}")]
    FrameRead(String),

    #[error("failed to encode frame: {0}")]
    Encode(#[from] image::ImageError),

    #[error("OCR failed: {0}")]
    Ocr(#[from] OcrError),

    /// The blocking worker running the request panicked or was cancelled.
    #[error("worker failed: {0}")]
    Worker(String),
}

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("no OCR engine compiled in (enable the `tesseract` feature)")]
    Unavailable,

    #[error("engine initialization failed: {0}")]
    Init(String),

    #[error("recognition failed: {0}")]
    Recognize(String),
}

pub type Result<T> = std::result::Result<T, VideoError>;
