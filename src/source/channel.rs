use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError, bounded};
use tracing::trace;

use super::FrameSource;
use crate::config::PipelineConfig;
use crate::error::CaptureError;
use crate::models::Frame;

/// Create a capture channel holding at most `capacity` frames in flight.
///
/// The [`FrameProducer`] half goes to the capture thread; the
/// [`ChannelSource`] half is handed to the pipeline. Buffers of released
/// frames flow back to the producer so it can refill them instead of
/// allocating.
///
/// ```
/// use std::time::Duration;
/// use camqr::models::Frame;
/// use camqr::source::{FrameSource, frame_channel};
///
/// let (producer, mut source) = frame_channel(2, Duration::from_millis(50));
/// producer.send(Frame::grayscale(4, 4, vec![0; 16]).unwrap()).unwrap();
/// let frame = source.acquire().unwrap();
/// source.release(frame);
/// assert_eq!(producer.recycled_buffer().map(|b| b.len()), Some(16));
/// ```
pub fn frame_channel(capacity: usize, timeout: Duration) -> (FrameProducer, ChannelSource) {
    let capacity = capacity.max(1);
    let (frame_tx, frame_rx) = bounded(capacity);
    let (recycle_tx, recycle_rx) = bounded(capacity);
    (
        FrameProducer {
            frames: frame_tx,
            recycled: recycle_rx,
        },
        ChannelSource {
            frames: frame_rx,
            recycled: recycle_tx,
            timeout,
        },
    )
}

/// [`frame_channel`] waiting up to the configured `capture_timeout_ms` per acquire
pub fn frame_channel_for(
    capacity: usize,
    config: &PipelineConfig,
) -> (FrameProducer, ChannelSource) {
    frame_channel(capacity, config.capture_timeout())
}

/// Capture-thread side of [`frame_channel`]
#[derive(Debug, Clone)]
pub struct FrameProducer {
    frames: Sender<Frame>,
    recycled: Receiver<Vec<u8>>,
}

impl FrameProducer {
    /// Queue a frame, blocking while the channel is full.
    ///
    /// Fails with [`CaptureError::Disconnected`] once the pipeline side is gone.
    pub fn send(&self, frame: Frame) -> Result<(), CaptureError> {
        self.frames
            .send(frame)
            .map_err(|_| CaptureError::Disconnected)
    }

    /// Queue a frame unless the channel is full, handing it back if so
    pub fn try_send(&self, frame: Frame) -> Result<(), Frame> {
        match self.frames.try_send(frame) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(frame)) | Err(TrySendError::Disconnected(frame)) => Err(frame),
        }
    }

    /// A buffer returned by the pipeline, if one is waiting
    pub fn recycled_buffer(&self) -> Option<Vec<u8>> {
        self.recycled.try_recv().ok()
    }
}

/// Pipeline side of [`frame_channel`]
#[derive(Debug)]
pub struct ChannelSource {
    frames: Receiver<Frame>,
    recycled: Sender<Vec<u8>>,
    timeout: Duration,
}

impl ChannelSource {
    /// Bounded wait applied by [`FrameSource::acquire`]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl FrameSource for ChannelSource {
    fn acquire(&mut self) -> Result<Frame, CaptureError> {
        match self.frames.recv_timeout(self.timeout) {
            Ok(frame) => Ok(frame),
            Err(RecvTimeoutError::Timeout) => Err(CaptureError::Timeout(self.timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(CaptureError::Disconnected),
        }
    }

    fn release(&mut self, frame: Frame) {
        if self.recycled.try_send(frame.into_buffer()).is_err() {
            trace!("recycle queue full, dropping frame buffer");
        }
    }
}
