//! OCR engine acquisition.
//!
//! Engines are built by a [`RecognizerFactory`]. By default every call
//! builds a fresh one; a pool keeps initialized engines around instead.

use crate::domain::error::OcrError;
use crate::ports::ocr::{RecognizerFactory, TextRecognizer};
use image::RgbImage;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// What to run OCR against.
#[derive(Debug, Clone, PartialEq)]
pub enum OcrSource {
    Frame(u64),
    Seconds(f64),
    ImagePath(PathBuf),
}

pub struct OcrEngines {
    factory: Arc<dyn RecognizerFactory>,
    idle: Option<Mutex<Vec<Box<dyn TextRecognizer>>>>,
    max_idle: usize,
}

impl OcrEngines {
    /// A fresh engine for every call, dropped afterwards.
    pub fn per_call(factory: Arc<dyn RecognizerFactory>) -> Self {
        Self {
            factory,
            idle: None,
            max_idle: 0,
        }
    }

    /// Reuse engines across calls, keeping at most `max_idle` of them.
    /// Concurrent callers beyond that build extra engines that are dropped
    /// after use.
    pub fn pooled(factory: Arc<dyn RecognizerFactory>, max_idle: usize) -> Self {
        if max_idle == 0 {
            return Self::per_call(factory);
        }
        Self {
            factory,
            idle: Some(Mutex::new(Vec::with_capacity(max_idle))),
            max_idle,
        }
    }

    pub fn is_pooled(&self) -> bool {
        self.idle.is_some()
    }

    pub fn idle_engines(&self) -> usize {
        self.idle
            .as_ref()
            .map_or(0, |idle| idle.lock().unwrap_or_else(PoisonError::into_inner).len())
    }

    pub fn recognize_image(&self, image: &RgbImage) -> Result<String, OcrError> {
        self.with_engine(|engine| engine.recognize_image(image))
    }

    pub fn recognize_file(&self, path: &Path) -> Result<String, OcrError> {
        self.with_engine(|engine| engine.recognize_file(path))
    }

    fn with_engine(
        &self,
        op: impl FnOnce(&mut dyn TextRecognizer) -> Result<String, OcrError>,
    ) -> Result<String, OcrError> {
        let mut engine = self.checkout()?;
        let result = op(engine.as_mut());
        self.checkin(engine);
        result.map(|text| text.trim().to_string())
    }

    fn checkout(&self) -> Result<Box<dyn TextRecognizer>, OcrError> {
        if let Some(idle) = &self.idle {
            if let Some(engine) = idle.lock().unwrap_or_else(PoisonError::into_inner).pop() {
                return Ok(engine);
            }
        }
        debug!("building OCR engine");
        self.factory.create()
    }

    fn checkin(&self, engine: Box<dyn TextRecognizer>) {
        if let Some(idle) = &self.idle {
            let mut idle = idle.lock().unwrap_or_else(PoisonError::into_inner);
            if idle.len() < self.max_idle {
                idle.push(engine);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::ocr::{MockRecognizerFactory, MockTextRecognizer};
    use image::Rgb;

    fn recognizer_saying(text: &'static str) -> Box<dyn TextRecognizer> {
        let mut recognizer = MockTextRecognizer::new();
        recognizer
            .expect_recognize_image()
            .returning(move |_| Ok(text.to_string()));
        recognizer
            .expect_recognize_file()
            .returning(move |_| Ok(text.to_string()));
        Box::new(recognizer)
    }

    fn blank() -> RgbImage {
        RgbImage::from_pixel(8, 8, Rgb([255, 255, 255]))
    }

    #[test]
    fn test_per_call_builds_engine_every_time() {
        let mut factory = MockRecognizerFactory::new();
        factory
            .expect_create()
            .times(3)
            .returning(|| Ok(recognizer_saying("hello")));

        let engines = OcrEngines::per_call(Arc::new(factory));
        for _ in 0..3 {
            assert_eq!(engines.recognize_image(&blank()).unwrap(), "hello");
        }
        assert!(!engines.is_pooled());
        assert_eq!(engines.idle_engines(), 0);
    }

    #[test]
    fn test_pool_reuses_engine() {
        let mut factory = MockRecognizerFactory::new();
        factory
            .expect_create()
            .times(1)
            .returning(|| Ok(recognizer_saying("pooled")));

        let engines = OcrEngines::pooled(Arc::new(factory), 2);
        for _ in 0..4 {
            assert_eq!(engines.recognize_image(&blank()).unwrap(), "pooled");
        }
        assert_eq!(engines.idle_engines(), 1);
    }

    #[test]
    fn test_pool_of_zero_is_per_call() {
        let factory = MockRecognizerFactory::new();
        let engines = OcrEngines::pooled(Arc::new(factory), 0);
        assert!(!engines.is_pooled());
    }

    #[test]
    fn test_text_is_trimmed() {
        let mut factory = MockRecognizerFactory::new();
        factory
            .expect_create()
            .returning(|| Ok(recognizer_saying("  def main():\n\n")));

        let engines = OcrEngines::per_call(Arc::new(factory));
        assert_eq!(engines.recognize_image(&blank()).unwrap(), "def main():");
    }

    #[test]
    fn test_no_text_is_empty_string() {
        let mut factory = MockRecognizerFactory::new();
        factory
            .expect_create()
            .returning(|| Ok(recognizer_saying("\n")));

        let engines = OcrEngines::per_call(Arc::new(factory));
        assert_eq!(engines.recognize_file(Path::new("blank.png")).unwrap(), "");
    }

    #[test]
    fn test_factory_error_propagates() {
        let mut factory = MockRecognizerFactory::new();
        factory
            .expect_create()
            .returning(|| Err(OcrError::Init("missing eng.traineddata".into())));

        let engines = OcrEngines::per_call(Arc::new(factory));
        let err = engines.recognize_image(&blank()).unwrap_err();
        assert!(matches!(err, OcrError::Init(_)));
    }

    #[test]
    fn test_failed_engine_still_returns_to_pool() {
        let mut factory = MockRecognizerFactory::new();
        factory.expect_create().times(1).returning(|| {
            let mut recognizer = MockTextRecognizer::new();
            recognizer
                .expect_recognize_image()
                .returning(|_| Err(OcrError::Recognize("bad frame".into())));
            Ok(Box::new(recognizer) as Box<dyn TextRecognizer>)
        });

        let engines = OcrEngines::pooled(Arc::new(factory), 1);
        assert!(engines.recognize_image(&blank()).is_err());
        assert_eq!(engines.idle_engines(), 1);
    }
}
