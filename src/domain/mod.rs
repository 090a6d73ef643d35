//! Domain layer - Video access, the catalog and OCR engine handling.

pub mod av;
pub mod catalog;
pub mod error;
pub mod ocr;
