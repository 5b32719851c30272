use std::fs;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageOutputFormat};
use tracing::debug;

use super::FrameSource;
use crate::error::CaptureError;
use crate::models::{Frame, PixelFormat};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "pgm", "ppm", "tif", "tiff"];

/// Replays still images as if a sensor had captured them.
///
/// Each image is re-encoded into the configured [`PixelFormat`] so the
/// pipeline sees the same byte layout a camera would deliver. Once every path
/// has been served the source reports [`CaptureError::Exhausted`], unless it
/// was built with [`ImageFileSource::looping`].
#[derive(Debug, Clone)]
pub struct ImageFileSource {
    paths: Vec<PathBuf>,
    next: usize,
    looping: bool,
    pixel_format: PixelFormat,
}

impl ImageFileSource {
    /// Serve `paths` in order as grayscale frames
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
            next: 0,
            looping: false,
            pixel_format: PixelFormat::Grayscale,
        }
    }

    /// Every image file directly inside `dir`, sorted by name
    pub fn from_dir(dir: &Path) -> io::Result<Self> {
        let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && has_image_extension(path))
            .collect();
        paths.sort();
        Ok(Self::new(paths))
    }

    /// Start over after the last image instead of reporting exhaustion
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Byte layout of the produced frames
    pub fn with_pixel_format(mut self, pixel_format: PixelFormat) -> Self {
        self.pixel_format = pixel_format;
        self
    }

    /// Images not yet served in the current pass
    pub fn remaining(&self) -> usize {
        self.paths.len() - self.next
    }

    /// The replay list
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Number of images in the replay list
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether there is nothing to replay
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    fn load(&self, path: &Path) -> Result<Frame, CaptureError> {
        let image = image::open(path).map_err(|e| CaptureError::Image {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let (width, height) = (image.width() as usize, image.height() as usize);
        let buffer = encode(&image, self.pixel_format).map_err(|reason| CaptureError::Image {
            path: path.to_path_buf(),
            reason,
        })?;
        Ok(Frame::new(width, height, self.pixel_format, buffer)?)
    }
}

impl FrameSource for ImageFileSource {
    fn acquire(&mut self) -> Result<Frame, CaptureError> {
        if self.next == self.paths.len() {
            if !self.looping || self.paths.is_empty() {
                return Err(CaptureError::Exhausted);
            }
            self.next = 0;
        }
        let path = self.paths[self.next].clone();
        self.next += 1;
        debug!(path = %path.display(), "replaying image");
        self.load(&path)
    }

    fn release(&mut self, _frame: Frame) {}
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Lay out a decoded image the way a sensor configured for `format` would
fn encode(image: &DynamicImage, format: PixelFormat) -> Result<Vec<u8>, String> {
    let buffer = match format {
        PixelFormat::Grayscale => image.to_luma8().into_raw(),
        PixelFormat::Rgb888 => image.to_rgb8().into_raw(),
        PixelFormat::Rgb565 => image
            .to_rgb8()
            .pixels()
            .flat_map(|p| {
                let [r, g, b] = p.0;
                [(r & 0xF8) | (g >> 5), ((g & 0x1C) << 3) | (b >> 3)]
            })
            .collect(),
        PixelFormat::Yuv422 => image
            .to_luma8()
            .into_raw()
            .into_iter()
            .flat_map(|y| [y, 128])
            .collect(),
        PixelFormat::Jpeg => {
            let mut bytes = Vec::new();
            image
                .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Jpeg(90))
                .map_err(|e| e.to_string())?;
            bytes
        }
    };
    Ok(buffer)
}
