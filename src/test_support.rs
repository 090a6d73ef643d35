//! Fixture videos for functional tests, generated with the ffmpeg CLI.

use std::path::{Path, PathBuf};
use std::process::Command;

/// 10 seconds of the lavfi test pattern at 30 fps (300 frames).
pub const DEMO_SOURCE: &str = "testsrc=duration=10:size=160x120:rate=30";

/// 2 seconds of plain white at 30 fps, nothing to read.
pub const BLANK_SOURCE: &str = "color=c=white:duration=2:size=160x120:rate=30";

/// Render a lavfi source into `dir/name`. Returns `None` when the ffmpeg
/// CLI is not installed, so callers can skip.
pub fn fixture_video(dir: &Path, name: &str, lavfi_source: &str) -> Option<PathBuf> {
    let path = dir.join(name);
    let status = Command::new("ffmpeg")
        .arg("-y")
        .arg("-v")
        .arg("error")
        .arg("-f")
        .arg("lavfi")
        .arg("-i")
        .arg(lavfi_source)
        .arg("-c:v")
        .arg("mpeg4")
        .arg("-q:v")
        .arg("5")
        .arg("-pix_fmt")
        .arg("yuv420p")
        .arg(&path)
        .status()
        .ok()?;

    if status.success() {
        Some(path)
    } else {
        eprintln!("ffmpeg could not render {}, skipping", lavfi_source);
        None
    }
}
