use tracing::{debug, trace};

use super::DecoderEngine;
use crate::decoder::{self, DecodeError};
use crate::detector::{self, Grid};
use crate::error::ProvisionError;
use crate::models::{BitMatrix, CandidateRegion, DecodedSymbol};
use crate::utils::binarization::{binarize_into, otsu_threshold};

/// QR symbol engine: Otsu binarisation, finder scan, grid sampling, full decode.
///
/// ```
/// use camqr::engine::{DecoderEngine, QrEngine};
///
/// let mut engine = QrEngine::new();
/// engine.resize(64, 48).unwrap();
/// engine.load().fill(255);
/// assert_eq!(engine.detect(), 0);
/// engine.release();
/// ```
#[derive(Debug, Default)]
pub struct QrEngine {
    width: usize,
    height: usize,
    luma: Vec<u8>,
    binary: BitMatrix,
    grids: Vec<Grid>,
    pixel_budget: Option<usize>,
}

impl QrEngine {
    /// Engine without a memory ceiling
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine that refuses frames with more than `pixels` pixels
    pub fn with_pixel_budget(pixels: usize) -> Self {
        Self {
            pixel_budget: Some(pixels),
            ..Self::default()
        }
    }

    /// Geometry currently provisioned, if any
    pub fn dimensions(&self) -> Option<(usize, usize)> {
        (!self.luma.is_empty()).then_some((self.width, self.height))
    }

    fn allocate(
        width: usize,
        height: usize,
        pixels: usize,
    ) -> Result<(Vec<u8>, BitMatrix), ProvisionError> {
        let mut luma = Vec::new();
        luma.try_reserve_exact(pixels)
            .map_err(|_| ProvisionError::OutOfMemory { bytes: pixels })?;
        luma.resize(pixels, 0);
        let binary = BitMatrix::try_new(width, height)
            .map_err(|_| ProvisionError::OutOfMemory {
                bytes: pixels.div_ceil(8),
            })?;
        Ok((luma, binary))
    }
}

impl DecoderEngine for QrEngine {
    fn resize(&mut self, width: usize, height: usize) -> Result<(), ProvisionError> {
        if width == 0 || height == 0 {
            return Err(ProvisionError::EmptyGeometry { width, height });
        }
        let pixels = width
            .checked_mul(height)
            .ok_or(ProvisionError::OutOfMemory { bytes: usize::MAX })?;
        if let Some(budget) = self.pixel_budget {
            if pixels > budget {
                return Err(ProvisionError::OverBudget {
                    width,
                    height,
                    budget,
                });
            }
        }

        if self.dimensions() == Some((width, height)) {
            trace!(width, height, "decoder already provisioned");
            return Ok(());
        }

        let (luma, binary) = Self::allocate(width, height, pixels)?;
        self.luma = luma;
        self.binary = binary;
        self.grids.clear();
        self.width = width;
        self.height = height;
        debug!(width, height, "decoder provisioned");
        Ok(())
    }

    fn load(&mut self) -> &mut [u8] {
        self.grids.clear();
        &mut self.luma
    }

    fn detect(&mut self) -> usize {
        self.grids.clear();
        if self.luma.is_empty() {
            return 0;
        }

        let threshold = otsu_threshold(&self.luma);
        binarize_into(&self.luma, threshold, &mut self.binary);
        detector::locate_into(&self.binary, &mut self.grids);

        debug!(threshold, candidates = self.grids.len(), "detection pass");
        self.grids.len()
    }

    fn extract(&self, index: usize) -> CandidateRegion<'_> {
        let grid = &self.grids[index];
        CandidateRegion {
            index,
            corners: grid.corners,
            size: grid.size,
            cells: &grid.cells,
        }
    }

    fn decode(&self, region: &CandidateRegion<'_>) -> Result<DecodedSymbol, DecodeError> {
        decoder::decode(region)
    }

    fn release(&mut self) {
        self.luma = Vec::new();
        self.binary = BitMatrix::default();
        self.grids = Vec::new();
        self.width = 0;
        self.height = 0;
    }
}
