//! Error types for the frame pipeline.
//!
//! Every per-frame failure is converted into a [`crate::sink::ReportEvent`] by
//! the controller; only [`PipelineError`] ever leaves the loop.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::models::PixelFormat;

/// The sensor produced no usable frame this cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    /// Bounded wait on the sensor expired
    #[error("no frame arrived within {0:?}")]
    Timeout(Duration),
    /// The capture side hung up
    #[error("frame source disconnected")]
    Disconnected,
    /// A finite source has nothing left to replay
    #[error("frame source exhausted")]
    Exhausted,
    /// A replayed image could not be read
    #[error("failed to load {path}: {reason}")]
    Image {
        /// File that failed
        path: PathBuf,
        /// Decoder message
        reason: String,
    },
    /// The captured bytes did not form a valid frame
    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// A frame violated its geometry or format contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// Width or height is zero
    #[error("frame geometry {width}x{height} is empty")]
    EmptyGeometry {
        /// Declared width
        width: usize,
        /// Declared height
        height: usize,
    },
    /// Buffer is shorter than the declared geometry needs
    #[error("{width}x{height} {format} frame needs {expected} bytes, buffer holds {actual}")]
    ShortBuffer {
        /// Declared width
        width: usize,
        /// Declared height
        height: usize,
        /// Declared pixel format
        format: PixelFormat,
        /// Bytes required
        expected: usize,
        /// Bytes present
        actual: usize,
    },
    /// Pixel format differs from the configured one
    #[error("frame is {actual}, pipeline is configured for {expected}")]
    UnexpectedFormat {
        /// Configured format
        expected: PixelFormat,
        /// Format of the frame
        actual: PixelFormat,
    },
    /// Decoder working buffer does not match the frame geometry
    #[error("decoder buffer holds {actual} bytes, frame needs {expected}")]
    LoadSizeMismatch {
        /// Luma bytes the frame produces
        expected: usize,
        /// Capacity the decoder exposed
        actual: usize,
    },
    /// Compressed payload could not be decoded
    #[error("compressed frame could not be decoded: {0}")]
    Compressed(String),
    /// Compressed payload decoded to a different geometry than declared
    #[error("compressed frame decodes to {actual_width}x{actual_height}, declared {width}x{height}")]
    GeometryMismatch {
        /// Declared width
        width: usize,
        /// Declared height
        height: usize,
        /// Decoded width
        actual_width: usize,
        /// Decoded height
        actual_height: usize,
    },
}

/// The decoder could not be sized for a frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProvisionError {
    /// Width or height is zero
    #[error("cannot provision a decoder for {width}x{height}")]
    EmptyGeometry {
        /// Requested width
        width: usize,
        /// Requested height
        height: usize,
    },
    /// Geometry exceeds the engine's pixel budget
    #[error("{width}x{height} exceeds the decoder budget of {budget} pixels")]
    OverBudget {
        /// Requested width
        width: usize,
        /// Requested height
        height: usize,
        /// Maximum pixel count
        budget: usize,
    },
    /// The allocator refused the working buffers
    #[error("allocating {bytes} bytes of decoder memory failed")]
    OutOfMemory {
        /// Size of the failed request
        bytes: usize,
    },
}

/// Configuration could not be loaded or is inconsistent.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Config path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
    /// File is not valid TOML for [`crate::config::PipelineConfig`]
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    /// Values parsed but make no sense together
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Fatal loop termination.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// Provisioning kept failing past the configured escalation threshold
    #[error("decoder provisioning failed {consecutive} cycles in a row (last: {last})")]
    ProvisionExhausted {
        /// Consecutive failed cycles
        consecutive: u32,
        /// Most recent failure
        last: ProvisionError,
    },
}
