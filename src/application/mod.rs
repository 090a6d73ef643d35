//! Application layer - Request-scoped services built on the domain.

pub mod video_service;

pub use video_service::{FrameText, VideoDetails, VideoListing, VideoService};
