//! Audio/Video domain modules.

pub mod accessor;
pub mod frame;


pub use accessor::{frame_index_at, VideoAccessor, VideoMetadata};
