use crate::domain::error::OcrError;
use image::RgbImage;
use std::path::Path;

/// An initialized OCR engine. Implementations may keep expensive state
/// (language models) between calls, which is what makes pooling useful.
#[cfg_attr(test, mockall::automock)]
pub trait TextRecognizer: Send {
    /// Recognize text in a decoded RGB raster.
    fn recognize_image(&mut self, image: &RgbImage) -> Result<String, OcrError>;

    /// Recognize text in an image file on disk.
    fn recognize_file(&mut self, path: &Path) -> Result<String, OcrError>;
}

/// Builds fresh recognizers with a fixed model directory and language.
#[cfg_attr(test, mockall::automock)]
pub trait RecognizerFactory: Send + Sync {
    fn create(&self) -> Result<Box<dyn TextRecognizer>, OcrError>;
}
