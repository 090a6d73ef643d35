use crate::application::{FrameText, VideoDetails, VideoListing, VideoService};
use crate::domain::error::VideoError;
use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::info;

pub async fn list_videos(State(service): State<Arc<VideoService>>) -> Json<VideoListing> {
    Json(service.list_videos())
}

pub async fn video_metadata(
    State(service): State<Arc<VideoService>>,
    Path(id): Path<String>,
) -> Result<Json<VideoDetails>, VideoError> {
    info!(%id, "metadata requested");
    Ok(Json(service.get_metadata(&id).await?))
}

pub async fn video_frame(
    State(service): State<Arc<VideoService>>,
    Path((id, t)): Path<(String, f64)>,
) -> Result<impl IntoResponse, VideoError> {
    info!(%id, seconds = t, "frame requested");
    let png = service.get_frame_png(&id, t).await?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}

pub async fn video_frame_ocr(
    State(service): State<Arc<VideoService>>,
    Path((id, t)): Path<(String, f64)>,
) -> Result<Json<FrameText>, VideoError> {
    info!(%id, seconds = t, "frame text requested");
    Ok(Json(service.get_frame_ocr(&id, t).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::VideoCatalog;
    use crate::domain::ocr::OcrEngines;
    use crate::ports::ocr::{MockRecognizerFactory, MockTextRecognizer, TextRecognizer};
    use crate::test_support::{fixture_video, DEMO_SOURCE};
    use axum::http::StatusCode;
    use bytes::Bytes;
    use tempfile::tempdir;

    fn service(catalog: VideoCatalog) -> Arc<VideoService> {
        let mut factory = MockRecognizerFactory::new();
        factory.expect_create().returning(|| {
            let mut recognizer = MockTextRecognizer::new();
            recognizer
                .expect_recognize_image()
                .returning(|_| Ok("class Video:\n".to_string()));
            Ok(Box::new(recognizer) as Box<dyn TextRecognizer>)
        });
        let engines = OcrEngines::per_call(Arc::new(factory));
        Arc::new(VideoService::new(Arc::new(catalog), Arc::new(engines)))
    }

    async fn body(response: axum::response::Response) -> Bytes {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_list_videos_handler() {
        let catalog = VideoCatalog::new([("demo", "/videos/oop.mp4")]);
        let Json(listing) = list_videos(State(service(catalog))).await;
        assert_eq!(listing.count, 1);
        assert_eq!(listing.videos[0].links.frame_example, "/video/demo/frame/1.0");
    }

    #[tokio::test]
    async fn test_unknown_video_is_404() {
        let response = video_metadata(
            State(service(VideoCatalog::default())),
            Path("missing".to_string()),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = video_frame(
            State(service(VideoCatalog::default())),
            Path(("missing".to_string(), 1.0)),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = video_frame_ocr(
            State(service(VideoCatalog::default())),
            Path(("missing".to_string(), 1.0)),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unreadable_video_is_400() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.mp4");
        std::fs::write(&path, b"not a video").unwrap();

        let response = video_metadata(
            State(service(VideoCatalog::new([("broken", path)]))),
            Path("broken".to_string()),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_frame_handler_serves_png() {
        let dir = tempdir().unwrap();
        let Some(path) = fixture_video(dir.path(), "demo.mp4", DEMO_SOURCE) else {
            return;
        };
        let service = service(VideoCatalog::new([("demo", path)]));

        let response = video_frame(State(service.clone()), Path(("demo".to_string(), 1.0)))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
        let png = body(response).await;
        assert_eq!(&png[..4], b"\x89PNG");

        let response = video_frame(State(service), Path(("demo".to_string(), 9999.0)))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_metadata_and_ocr_handlers() {
        let dir = tempdir().unwrap();
        let Some(path) = fixture_video(dir.path(), "demo.mp4", DEMO_SOURCE) else {
            return;
        };
        let service = service(VideoCatalog::new([("demo", path)]));

        let response = video_metadata(State(service.clone()), Path("demo".to_string()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body(response).await).unwrap();
        assert_eq!(json["frame_count"], 300);
        assert_eq!(json["duration_seconds"], 10.0);
        assert_eq!(json["_links"]["self"], "/video/demo");

        let response = video_frame_ocr(State(service), Path(("demo".to_string(), 1.0)))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let text: FrameText = serde_json::from_slice(&body(response).await).unwrap();
        assert_eq!(text.text, "class Video:");
    }
}
