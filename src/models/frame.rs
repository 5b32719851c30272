use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::error::FrameError;

/// Pixel layout of a captured frame.
///
/// The variants mirror what camera sensors hand out; everything is reduced to
/// 8-bit luma before it reaches a decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    /// One luma byte per pixel
    #[default]
    Grayscale,
    /// Two bytes per pixel, big-endian `RRRRRGGG GGGBBBBB`
    Rgb565,
    /// Packed YUYV, two bytes per pixel with luma on even bytes
    Yuv422,
    /// Three bytes per pixel, R G B
    Rgb888,
    /// Baseline JPEG stream
    Jpeg,
}

impl PixelFormat {
    /// Bytes per pixel for raw formats, `None` for compressed ones
    pub fn bytes_per_pixel(&self) -> Option<usize> {
        match self {
            PixelFormat::Grayscale => Some(1),
            PixelFormat::Rgb565 | PixelFormat::Yuv422 => Some(2),
            PixelFormat::Rgb888 => Some(3),
            PixelFormat::Jpeg => None,
        }
    }

    /// Whether the buffer is a compressed bitstream
    pub fn is_compressed(&self) -> bool {
        self.bytes_per_pixel().is_none()
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PixelFormat::Grayscale => "grayscale",
            PixelFormat::Rgb565 => "rgb565",
            PixelFormat::Yuv422 => "yuv422",
            PixelFormat::Rgb888 => "rgb888",
            PixelFormat::Jpeg => "jpeg",
        };
        f.write_str(name)
    }
}

/// One captured image buffer with known geometry.
///
/// A `Frame` can only be built through [`Frame::new`], which refuses buffers
/// that are too short for the declared geometry. Downstream code can therefore
/// rely on `buffer().len() >= required_len()` for raw formats.
#[derive(Debug, Clone)]
pub struct Frame {
    width: usize,
    height: usize,
    pixel_format: PixelFormat,
    buffer: Vec<u8>,
    captured_at: Instant,
}

impl Frame {
    /// Wrap a captured buffer, stamping it with the current time
    pub fn new(
        width: usize,
        height: usize,
        pixel_format: PixelFormat,
        buffer: Vec<u8>,
    ) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::EmptyGeometry { width, height });
        }
        match required_len(width, height, pixel_format) {
            Some(expected) if buffer.len() < expected => {
                return Err(FrameError::ShortBuffer {
                    width,
                    height,
                    format: pixel_format,
                    expected,
                    actual: buffer.len(),
                });
            }
            _ => {}
        }
        Ok(Self {
            width,
            height,
            pixel_format,
            buffer,
            captured_at: Instant::now(),
        })
    }

    /// Convenience constructor for 8-bit luma frames
    pub fn grayscale(width: usize, height: usize, buffer: Vec<u8>) -> Result<Self, FrameError> {
        Self::new(width, height, PixelFormat::Grayscale, buffer)
    }

    /// Override the capture timestamp
    pub fn with_timestamp(mut self, captured_at: Instant) -> Self {
        self.captured_at = captured_at;
        self
    }

    /// Frame width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Frame height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Pixel layout of the buffer
    pub fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    /// Width times height
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Raw pixel bytes
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// When the sensor delivered the frame
    pub fn captured_at(&self) -> Instant {
        self.captured_at
    }

    /// Minimum buffer length for raw formats
    pub fn required_len(&self) -> Option<usize> {
        required_len(self.width, self.height, self.pixel_format)
    }

    /// Give the backing buffer back, e.g. for recycling by the source
    pub fn into_buffer(self) -> Vec<u8> {
        self.buffer
    }
}

fn required_len(width: usize, height: usize, format: PixelFormat) -> Option<usize> {
    format
        .bytes_per_pixel()
        .map(|bpp| width.saturating_mul(height).saturating_mul(bpp))
}
