//! camqr - camera frame to QR symbol pipeline
//!
//! A capture loop that takes frames from a sensor, provisions a decoder for
//! each frame's geometry, locates and decodes every QR symbol in it, and
//! reports the results. Per-frame failures never stop the loop.
//!
//! The moving parts are three traits and one controller:
//!
//! - [`source::FrameSource`] hands out frames
//! - [`engine::DecoderEngine`] detects and decodes ([`engine::QrEngine`] ships in the crate)
//! - [`sink::ResultSink`] receives [`sink::ReportEvent`]s
//! - [`pipeline::PipelineController`] runs the cycle between them

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Pipeline configuration and frame-size presets
pub mod config;
/// QR symbol decoding (format/version info, Reed-Solomon, segment modes)
pub mod decoder;
/// QR symbol location (finder patterns, grouping, grid sampling)
pub mod detector;
/// The decoder engine contract and the QR implementation
pub mod engine;
/// Error types
pub mod error;
/// Core data structures (Frame, BitMatrix, Point, DecodedSymbol, etc.)
pub mod models;
/// The per-frame controller
pub mod pipeline;
/// Result sinks
pub mod sink;
/// Frame sources
pub mod source;
/// Utility functions (grayscale, binarization, geometry)
pub mod utils;

pub use config::{FrameSize, PipelineConfig};
pub use decoder::DecodeError;
pub use engine::{DecoderEngine, QrEngine};
pub use error::{CaptureError, ConfigError, FrameError, PipelineError, ProvisionError};
pub use models::{
    BitMatrix, CandidateRegion, DataType, DecodedSymbol, EcLevel, Frame, MaskPattern, PixelFormat,
    Point, RegionGeometry,
};
pub use pipeline::{CycleOutcome, CycleStats, PipelineController, Shutdown};
pub use sink::{ReportEvent, ReportKind, ResultSink};
pub use source::FrameSource;
