use crate::domain::error::VideoError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

impl VideoError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            VideoError::NotFound(_) => StatusCode::NOT_FOUND,
            VideoError::Open { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for VideoError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = match &self {
            VideoError::NotFound(_) => "Video not found".to_string(),
            VideoError::Open {
                source_name,
                reason,
            } => format!("Could not open video {source_name}: {reason}"),
            _ => self.to_string(),
        };

        if status.is_server_error() {
            error!(%status, "{}", self);
        } else {
            warn!(%status, "{}", self);
        }

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
