//! Frame producers feeding the pipeline.
//!
//! A [`FrameSource`] hands out one frame at a time and takes it back once the
//! cycle that acquired it is over, the way a camera driver lends out and
//! reclaims its frame buffers.

mod channel;
mod image_files;

pub use channel::{ChannelSource, FrameProducer, frame_channel, frame_channel_for};
pub use image_files::ImageFileSource;

use crate::error::CaptureError;
use crate::models::Frame;

/// Something that captures frames.
pub trait FrameSource {
    /// Wait a bounded time for the next frame.
    ///
    /// Implementations must not block indefinitely; a sensor that produces
    /// nothing in time reports [`CaptureError::Timeout`].
    fn acquire(&mut self) -> Result<Frame, CaptureError>;

    /// Return a frame obtained from [`FrameSource::acquire`]
    fn release(&mut self, frame: Frame);
}

impl<S: FrameSource + ?Sized> FrameSource for &mut S {
    fn acquire(&mut self) -> Result<Frame, CaptureError> {
        (**self).acquire()
    }

    fn release(&mut self, frame: Frame) {
        (**self).release(frame)
    }
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn acquire(&mut self) -> Result<Frame, CaptureError> {
        (**self).acquire()
    }

    fn release(&mut self, frame: Frame) {
        (**self).release(frame)
    }
}
