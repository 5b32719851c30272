//! The stateful detector/decoder contract driven by the pipeline controller.

mod qr;

pub use qr::QrEngine;

use crate::decoder::DecodeError;
use crate::error::ProvisionError;
use crate::models::{CandidateRegion, DecodedSymbol};

/// A resizable symbol detector/decoder.
///
/// The controller drives one engine through `resize`, `load`, `detect`, then
/// `extract`/`decode` once per candidate, and finally `release`, for every
/// frame. Implementations own all working memory; regions borrow from it.
pub trait DecoderEngine {
    /// Provision working memory for a `width` x `height` frame.
    ///
    /// Calling this again with unchanged geometry must not reallocate.
    fn resize(&mut self, width: usize, height: usize) -> Result<(), ProvisionError>;

    /// Writable 8-bit luma buffer of exactly `width * height` bytes
    fn load(&mut self) -> &mut [u8];

    /// Locate candidate regions in the loaded buffer and return how many were found
    fn detect(&mut self) -> usize;

    /// Borrow candidate `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below the last `detect` count.
    fn extract(&self, index: usize) -> CandidateRegion<'_>;

    /// Decode one region; must not touch engine state
    fn decode(&self, region: &CandidateRegion<'_>) -> Result<DecodedSymbol, DecodeError>;

    /// Free working memory. Safe to call after a failed `resize`.
    fn release(&mut self);
}
