use crate::domain::error::{Result, VideoError};
use ffmpeg_next as ffmpeg;
use image::{ImageFormat, RgbImage};
use std::io::Cursor;

/// Convert a decoded frame, whatever its native pixel format, into an RGB raster.
pub fn to_rgb_image(frame: &ffmpeg::util::frame::Video) -> Result<RgbImage> {
    let mut scaler = ffmpeg::software::scaling::context::Context::get(
        frame.format(),
        frame.width(),
        frame.height(),
        ffmpeg::format::Pixel::RGB24,
        frame.width(),
        frame.height(),
        ffmpeg::software::scaling::flag::Flags::BILINEAR,
    )
    .map_err(|e| VideoError::FrameRead(format!("no RGB converter for frame: {e}")))?;

    let mut rgb_frame = ffmpeg::util::frame::Video::empty();
    scaler
        .run(frame, &mut rgb_frame)
        .map_err(|e| VideoError::FrameRead(format!("RGB conversion failed: {e}")))?;

    let (width, height) = (rgb_frame.width(), rgb_frame.height());
    let pixels = pack_rows(rgb_frame.data(0), rgb_frame.stride(0), width, height)
        .ok_or_else(|| VideoError::FrameRead("decoded plane is smaller than the frame".into()))?;

    RgbImage::from_raw(width, height, pixels)
        .ok_or_else(|| VideoError::FrameRead("Failed to create image buffer".into()))
}

/// Copy `height` rows of `width` RGB24 pixels out of a plane whose rows are
/// `stride` bytes apart, dropping the alignment padding at the end of each row.
pub(crate) fn pack_rows(plane: &[u8], stride: usize, width: u32, height: u32) -> Option<Vec<u8>> {
    let row_len = width as usize * 3;
    if stride < row_len {
        return None;
    }

    let mut pixels = Vec::with_capacity(row_len * height as usize);
    for row in 0..height as usize {
        let start = row * stride;
        pixels.extend_from_slice(plane.get(start..start + row_len)?);
    }
    Some(pixels)
}

pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_pack_rows_drops_padding() {
        // 2x2 image, 8 byte stride (2 bytes of padding per row)
        let plane = [
            1, 2, 3, 4, 5, 6, 0, 0, //
            7, 8, 9, 10, 11, 12, 0, 0,
        ];
        let pixels = pack_rows(&plane, 8, 2, 2).unwrap();
        assert_eq!(pixels, vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
    }

    #[test]
    fn test_pack_rows_tight_stride() {
        let plane = [9u8; 12];
        assert_eq!(pack_rows(&plane, 6, 2, 2).unwrap().len(), 12);
    }

    #[test]
    fn test_pack_rows_short_plane() {
        let plane = [0u8; 10];
        assert!(pack_rows(&plane, 6, 2, 2).is_none());
    }

    #[test]
    fn test_pack_rows_stride_smaller_than_row() {
        let plane = [0u8; 64];
        assert!(pack_rows(&plane, 4, 2, 2).is_none());
    }

    #[test]
    fn test_encode_png_signature() {
        let image = RgbImage::from_pixel(4, 3, Rgb([200, 10, 10]));
        let bytes = encode_png(&image).unwrap();
        assert_eq!(&bytes[..8], &PNG_MAGIC);

        let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (4, 3));
        assert_eq!(decoded.get_pixel(2, 1), &Rgb([200, 10, 10]));
    }
}
