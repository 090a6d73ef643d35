//! Tesseract-backed OCR engines.

use crate::domain::error::OcrError;
use crate::ports::ocr::{RecognizerFactory, TextRecognizer};
use std::path::PathBuf;

pub const DEFAULT_LANGUAGE: &str = "eng";

/// Builds Tesseract engines for a fixed model directory and language.
#[derive(Debug, Clone)]
pub struct TesseractFactory {
    datapath: Option<PathBuf>,
    language: String,
}

impl TesseractFactory {
    /// `datapath` is the directory holding `<language>.traineddata`; `None`
    /// lets Tesseract use its compiled-in default (or `TESSDATA_PREFIX`).
    pub fn new(datapath: Option<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            datapath,
            language: language.into(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }
}

impl Default for TesseractFactory {
    fn default() -> Self {
        Self::new(None, DEFAULT_LANGUAGE)
    }
}

impl RecognizerFactory for TesseractFactory {
    #[cfg(feature = "tesseract")]
    fn create(&self) -> Result<Box<dyn TextRecognizer>, OcrError> {
        let datapath = self
            .datapath
            .as_ref()
            .map(|path| path.to_string_lossy().into_owned());
        let engine = engine::TesseractRecognizer::new(datapath, self.language.clone())?;
        Ok(Box::new(engine))
    }

    #[cfg(not(feature = "tesseract"))]
    fn create(&self) -> Result<Box<dyn TextRecognizer>, OcrError> {
        Err(OcrError::Unavailable)
    }
}

#[cfg(feature = "tesseract")]
mod engine {
    use super::{OcrError, TextRecognizer};
    use image::RgbImage;
    use std::path::Path;
    use tesseract::Tesseract;

    /// The Tesseract API consumes itself on every image change, so the
    /// engine is held in an `Option` and rebuilt if a call fails midway.
    pub(super) struct TesseractRecognizer {
        datapath: Option<String>,
        language: String,
        api: Option<Tesseract>,
    }

    impl TesseractRecognizer {
        pub(super) fn new(datapath: Option<String>, language: String) -> Result<Self, OcrError> {
            let api = init(datapath.as_deref(), &language)?;
            Ok(Self {
                datapath,
                language,
                api: Some(api),
            })
        }

        fn take_api(&mut self) -> Result<Tesseract, OcrError> {
            match self.api.take() {
                Some(api) => Ok(api),
                None => init(self.datapath.as_deref(), &self.language),
            }
        }

        fn read_text(&mut self, mut api: Tesseract) -> Result<String, OcrError> {
            let text = api
                .get_text()
                .map_err(|e| OcrError::Recognize(e.to_string()))?;
            self.api = Some(api);
            Ok(text)
        }
    }

    fn init(datapath: Option<&str>, language: &str) -> Result<Tesseract, OcrError> {
        Tesseract::new(datapath, Some(language)).map_err(|e| OcrError::Init(e.to_string()))
    }

    impl TextRecognizer for TesseractRecognizer {
        fn recognize_image(&mut self, image: &RgbImage) -> Result<String, OcrError> {
            let (width, height) = image.dimensions();
            let api = self
                .take_api()?
                .set_frame(image.as_raw(), width as i32, height as i32, 3, width as i32 * 3)
                .map_err(|e| OcrError::Recognize(e.to_string()))?;
            self.read_text(api)
        }

        fn recognize_file(&mut self, path: &Path) -> Result<String, OcrError> {
            let filename = path.to_str().ok_or_else(|| {
                OcrError::Recognize(format!("non UTF-8 image path {}", path.display()))
            })?;
            let api = self
                .take_api()?
                .set_image(filename)
                .map_err(|e| OcrError::Recognize(e.to_string()))?;
            self.read_text(api)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_language_is_english() {
        assert_eq!(TesseractFactory::default().language(), "eng");
    }

    #[cfg(not(feature = "tesseract"))]
    #[test]
    fn test_without_engine_reports_unavailable() {
        let result = TesseractFactory::default().create();
        assert!(matches!(result, Err(OcrError::Unavailable)));
    }

    #[cfg(feature = "tesseract")]
    #[test]
    fn test_bad_model_dir_fails_init() {
        let dir = tempfile::tempdir().unwrap();
        let factory = TesseractFactory::new(Some(dir.path().to_path_buf()), "eng");
        assert!(matches!(factory.create(), Err(OcrError::Init(_))));
    }
}
