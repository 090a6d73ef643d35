use super::frame::{encode_png, to_rgb_image};
use crate::domain::error::{Result, VideoError};
use crate::domain::ocr::{OcrEngines, OcrSource};
use ffmpeg_next as ffmpeg;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// libavformat seeks in microseconds when no stream is given.
const AV_TIME_BASE: f64 = 1_000_000.0;

/// Stream start time reported when the container has none (AV_NOPTS_VALUE).
const NO_PTS: i64 = i64::MIN;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub fps: f64,
    pub frame_count: u64,
    pub duration_seconds: f64,
}

/// One opened video: the ffmpeg input and decoder for its best video stream,
/// plus the frame rate and frame count read at open time.
///
/// The decoder keeps a seek cursor, so an accessor belongs to a single
/// caller. Call [`VideoAccessor::release`] when done; dropping it also
/// closes the input.
pub struct VideoAccessor {
    source: String,
    input: ffmpeg::format::context::Input,
    decoder: ffmpeg::decoder::Video,
    stream_index: usize,
    time_base: f64,
    start_pts: i64,
    frames_per_second: f64,
    frame_count: u64,
}

impl VideoAccessor {
    /// Open a file path or stream URL.
    pub fn open(source: impl AsRef<Path>) -> Result<Self> {
        let path = source.as_ref();
        let source = path.display().to_string();
        let open_error = |reason: String| VideoError::Open {
            source_name: source.clone(),
            reason,
        };

        ffmpeg::init().map_err(|e| open_error(e.to_string()))?;
        let input = ffmpeg::format::input(&path).map_err(|e| open_error(e.to_string()))?;

        let (stream_index, time_base, start_pts, frames_per_second, frame_count, decoder) = {
            let stream = input
                .streams()
                .best(ffmpeg::media::Type::Video)
                .ok_or_else(|| open_error("no video stream".into()))?;

            let frames_per_second = [stream.avg_frame_rate(), stream.rate()]
                .into_iter()
                .map(f64::from)
                .find(|fps| fps.is_finite() && *fps > 0.0)
                .ok_or_else(|| open_error("stream reports no frame rate".into()))?;

            let frame_count = match stream.frames() {
                frames if frames > 0 => frames as u64,
                _ => estimate_frame_count(input.duration(), frames_per_second),
            };

            let start_pts = match stream.start_time() {
                NO_PTS => 0,
                pts => pts,
            };

            let decoder = ffmpeg::codec::context::Context::from_parameters(stream.parameters())
                .and_then(|context| context.decoder().video())
                .map_err(|e| open_error(e.to_string()))?;

            (
                stream.index(),
                f64::from(stream.time_base()),
                start_pts,
                frames_per_second,
                frame_count,
                decoder,
            )
        };

        debug!(
            source = %source,
            fps = frames_per_second,
            frames = frame_count,
            "opened video"
        );

        Ok(Self {
            source,
            input,
            decoder,
            stream_index,
            time_base,
            start_pts,
            frames_per_second,
            frame_count,
        })
    }

    pub fn frames_per_second(&self) -> f64 {
        self.frames_per_second
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn duration_seconds(&self) -> f64 {
        duration_seconds(self.frame_count, self.frames_per_second)
    }

    pub fn metadata(&self) -> VideoMetadata {
        VideoMetadata {
            fps: self.frames_per_second,
            frame_count: self.frame_count,
            duration_seconds: self.duration_seconds(),
        }
    }

    pub fn describe(&self) -> String {
        describe(self.frame_count, self.frames_per_second)
    }

    pub fn frame_index_at(&self, seconds: f64) -> u64 {
        frame_index_at(self.frames_per_second, seconds)
    }

    /// Decode the frame at `index` as RGB.
    ///
    /// Seeks to the nearest keyframe at or before the target and decodes
    /// forward. Indices past the end of the stream are not rejected up
    /// front; they fail here once the stream runs out. A seek that lands
    /// after the target is a read error rather than a later frame.
    pub fn read_frame_pixels(&mut self, index: u64) -> Result<RgbImage> {
        let timestamp =
            seek_timestamp(index, self.frames_per_second, self.start_pts, self.time_base);
        debug!(source = %self.source, index, timestamp, "seeking");

        self.input
            .seek(timestamp, ..timestamp)
            .map_err(|e| VideoError::FrameRead(format!("seek to frame {index} failed: {e}")))?;
        self.decoder.flush();

        let stream_index = self.stream_index;
        let (start_pts, time_base, fps) = (self.start_pts, self.time_base, self.frames_per_second);
        let mut decoded = ffmpeg::util::frame::Video::empty();
        let mut first_index = None;

        for (stream, packet) in self.input.packets() {
            if stream.index() != stream_index {
                continue;
            }

            self.decoder
                .send_packet(&packet)
                .map_err(|e| VideoError::FrameRead(format!("decoder rejected packet: {e}")))?;

            while self.decoder.receive_frame(&mut decoded).is_ok() {
                let current = presentation_index(&decoded, start_pts, time_base, fps);
                if reached_target(current, index, &mut first_index)? {
                    return to_rgb_image(&decoded);
                }
            }
        }

        // Drain frames still buffered in the decoder.
        self.decoder
            .send_eof()
            .map_err(|e| VideoError::FrameRead(format!("decoder flush failed: {e}")))?;
        while self.decoder.receive_frame(&mut decoded).is_ok() {
            let current = presentation_index(&decoded, start_pts, time_base, fps);
            if reached_target(current, index, &mut first_index)? {
                return to_rgb_image(&decoded);
            }
        }

        Err(VideoError::FrameRead(format!(
            "frame {index} is past the end of {} ({} frames)",
            self.source, self.frame_count
        )))
    }

    /// PNG bytes of the frame shown at `seconds`.
    pub fn read_frame_png(&mut self, seconds: f64) -> Result<Vec<u8>> {
        let image = self.read_frame_pixels(self.frame_index_at(seconds))?;
        encode_png(&image)
    }

    /// Write the frame shown at `seconds` to `output_path`, replacing any
    /// existing file. The image format follows the file extension.
    pub fn save_frame_as_image(&mut self, seconds: f64, output_path: impl AsRef<Path>) -> Result<()> {
        let output_path = output_path.as_ref();
        let image = self.read_frame_pixels(self.frame_index_at(seconds))?;
        image.save(output_path)?;
        info!(source = %self.source, seconds, output = %output_path.display(), "saved frame");
        Ok(())
    }

    /// Run OCR on a frame of this video or on an image file.
    ///
    /// Returns an empty string when the engine finds no text.
    pub fn recognize_text(&mut self, source: OcrSource, engines: &OcrEngines) -> Result<String> {
        let text = match source {
            OcrSource::Frame(index) => {
                let image = self.read_frame_pixels(index)?;
                engines.recognize_image(&image)?
            }
            OcrSource::Seconds(seconds) => {
                let image = self.read_frame_pixels(self.frame_index_at(seconds))?;
                engines.recognize_image(&image)?
            }
            OcrSource::ImagePath(path) => engines.recognize_file(&path)?,
        };
        Ok(text)
    }

    /// Close the decoder and the underlying input.
    pub fn release(self) {
        debug!(source = %self.source, "released video");
    }
}

impl fmt::Display for VideoAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// `floor(fps * seconds)`. Negative or NaN products saturate to frame 0.
pub fn frame_index_at(frames_per_second: f64, seconds: f64) -> u64 {
    (frames_per_second * seconds).floor() as u64
}

pub fn duration_seconds(frame_count: u64, frames_per_second: f64) -> f64 {
    frame_count as f64 / frames_per_second
}

pub fn describe(frame_count: u64, frames_per_second: f64) -> String {
    let minutes = duration_seconds(frame_count, frames_per_second) / 60.0;
    format!(
        "This video has a total of {} frames, running at {:.2} frames per second for {:.2} minutes",
        frame_count, frames_per_second, minutes
    )
}

/// Container seek position (AV_TIME_BASE units) of frame `index`, offset by
/// the stream's start time.
fn seek_timestamp(index: u64, frames_per_second: f64, start_pts: i64, time_base: f64) -> i64 {
    let seconds = start_pts as f64 * time_base + index as f64 / frames_per_second;
    (seconds * AV_TIME_BASE) as i64
}

/// Whether the decoded frame `current` is the one wanted. The first frame
/// after a seek must not already be past `target`.
fn reached_target(current: u64, target: u64, first_index: &mut Option<u64>) -> Result<bool> {
    let first = *first_index.get_or_insert(current);
    if first > target {
        return Err(VideoError::FrameRead(format!(
            "seek for frame {target} overshot to frame {first}"
        )));
    }
    Ok(current >= target)
}

/// Container duration is in AV_TIME_BASE units; 0 when unknown.
fn estimate_frame_count(container_duration: i64, frames_per_second: f64) -> u64 {
    if container_duration <= 0 {
        return 0;
    }
    (container_duration as f64 / AV_TIME_BASE * frames_per_second).floor() as u64
}

fn presentation_index(
    frame: &ffmpeg::util::frame::Video,
    start_pts: i64,
    time_base: f64,
    frames_per_second: f64,
) -> u64 {
    let pts = frame.timestamp().or_else(|| frame.pts()).unwrap_or(start_pts);
    pts_to_index(pts, start_pts, time_base, frames_per_second)
}

fn pts_to_index(pts: i64, start_pts: i64, time_base: f64, frames_per_second: f64) -> u64 {
    ((pts - start_pts) as f64 * time_base * frames_per_second).round() as u64
}
