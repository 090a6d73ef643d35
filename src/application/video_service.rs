use crate::domain::av::{VideoAccessor, VideoMetadata};
use crate::domain::catalog::VideoCatalog;
use crate::domain::error::{Result, VideoError};
use crate::domain::ocr::{OcrEngines, OcrSource};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task;
use tracing::info;

#[derive(Debug, Clone, Serialize)]
pub struct VideoListing {
    pub count: usize,
    pub videos: Vec<VideoSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VideoSummary {
    pub id: String,
    pub path: String,
    #[serde(rename = "_links")]
    pub links: SummaryLinks,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryLinks {
    #[serde(rename = "self")]
    pub self_link: String,
    pub frame_example: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VideoDetails {
    #[serde(flatten)]
    pub metadata: VideoMetadata,
    #[serde(rename = "_links")]
    pub links: DetailLinks,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetailLinks {
    #[serde(rename = "self")]
    pub self_link: String,
    pub frames: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameText {
    pub text: String,
}

/// Serves catalog lookups. Every request opens its own [`VideoAccessor`] on
/// a blocking worker and releases it before returning, so nothing decoded
/// is shared between requests.
#[derive(Clone)]
pub struct VideoService {
    catalog: Arc<VideoCatalog>,
    ocr: Arc<OcrEngines>,
}

impl VideoService {
    pub fn new(catalog: Arc<VideoCatalog>, ocr: Arc<OcrEngines>) -> Self {
        Self { catalog, ocr }
    }

    pub fn list_videos(&self) -> VideoListing {
        let videos: Vec<VideoSummary> = self
            .catalog
            .entries()
            .map(|entry| VideoSummary {
                links: SummaryLinks {
                    self_link: format!("/video/{}", entry.id),
                    frame_example: format!("/video/{}/frame/1.0", entry.id),
                },
                path: entry.path.display().to_string(),
                id: entry.id,
            })
            .collect();

        VideoListing {
            count: videos.len(),
            videos,
        }
    }

    pub async fn get_metadata(&self, id: &str) -> Result<VideoDetails> {
        let metadata = self.with_accessor(id, |video| Ok(video.metadata())).await?;
        Ok(VideoDetails {
            metadata,
            links: DetailLinks {
                self_link: format!("/video/{}", id),
                frames: format!("/video/{}/frame/{{seconds}}", id),
            },
        })
    }

    pub async fn get_frame_png(&self, id: &str, seconds: f64) -> Result<Vec<u8>> {
        self.with_accessor(id, move |video| video.read_frame_png(seconds))
            .await
    }

    pub async fn get_frame_ocr(&self, id: &str, seconds: f64) -> Result<FrameText> {
        let engines = self.ocr.clone();
        let text = self
            .with_accessor(id, move |video| {
                video.recognize_text(OcrSource::Seconds(seconds), &engines)
            })
            .await?;
        Ok(FrameText { text })
    }

    /// Resolve `id`, open it on a blocking worker, run `op` and release the
    /// handle. The file existence check runs on the worker too. A panic
    /// inside `op` drops the accessor during unwinding.
    async fn with_accessor<T, F>(&self, id: &str, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut VideoAccessor) -> Result<T> + Send + 'static,
    {
        let catalog = self.catalog.clone();
        let id = id.to_string();

        task::spawn_blocking(move || {
            let path = catalog.resolve(&id)?;
            info!(%id, path = %path.display(), "opening video");
            let mut video = VideoAccessor::open(path)?;
            let result = op(&mut video);
            video.release();
            result
        })
        .await
        .map_err(|e| VideoError::Worker(e.to_string()))?
    }
}
