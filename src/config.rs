//! Configuration for the HTTP service.

use crate::adapters::tesseract::{TesseractFactory, DEFAULT_LANGUAGE};
use crate::domain::catalog::VideoCatalog;
use crate::domain::ocr::OcrEngines;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// HTTP server bind address
    pub addr: String,
    /// HTTP server port
    pub port: String,
    /// Directory scanned for videos at startup
    pub video_dir: PathBuf,
    /// Explicit `id=path` catalog entries, applied after the scan
    pub videos: Vec<(String, PathBuf)>,
    /// Directory holding the OCR language models
    pub tessdata_dir: Option<PathBuf>,
    /// OCR language code
    pub ocr_language: String,
    /// Idle OCR engines to keep; 0 builds a fresh engine per call
    pub ocr_pool_size: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables (and `.env`).
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            addr: lookup("ADDR").unwrap_or_else(|| String::from("127.0.0.1")),
            port: lookup("PORT").unwrap_or_else(|| String::from("3000")),
            video_dir: lookup("VIDEO_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./resources")),
            videos: lookup("VIDEOS")
                .map(|raw| parse_video_list(&raw))
                .unwrap_or_default(),
            tessdata_dir: lookup("TESSDATA_DIR").map(PathBuf::from),
            ocr_language: lookup("OCR_LANG").unwrap_or_else(|| String::from(DEFAULT_LANGUAGE)),
            ocr_pool_size: lookup("OCR_POOL_SIZE")
                .and_then(|size| size.trim().parse().ok())
                .unwrap_or(0),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.addr, self.port)
    }

    /// Scan `video_dir`, then apply the explicit entries on top.
    pub fn build_catalog(&self) -> VideoCatalog {
        let scanned = VideoCatalog::scan_dir(&self.video_dir).unwrap_or_else(|e| {
            warn!(dir = %self.video_dir.display(), "cannot scan video directory: {}", e);
            VideoCatalog::default()
        });

        self.videos
            .iter()
            .fold(scanned, |catalog, (id, path)| catalog.with_entry(id.clone(), path.clone()))
    }

    pub fn ocr_engines(&self) -> OcrEngines {
        let factory = Arc::new(TesseractFactory::new(
            self.tessdata_dir.clone(),
            self.ocr_language.clone(),
        ));
        OcrEngines::pooled(factory, self.ocr_pool_size)
    }
}

/// Parse `id=path` pairs separated by commas. Malformed items are skipped
/// with a warning; blank items (a trailing comma) are skipped silently.
pub fn parse_video_list(raw: &str) -> Vec<(String, PathBuf)> {
    raw.split(',')
        .filter(|item| !item.trim().is_empty())
        .filter_map(|item| match item.split_once('=') {
            Some((id, path)) if !id.trim().is_empty() && !path.trim().is_empty() => {
                Some((id.trim().to_string(), PathBuf::from(path.trim())))
            }
            _ => {
                warn!(item, "ignoring malformed VIDEOS entry");
                None
            }
        })
        .collect()
}
