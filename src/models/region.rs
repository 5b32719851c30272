use super::{BitMatrix, Point};

/// A located, not yet decoded symbol.
///
/// The cell bitmap is borrowed from the engine that produced the region, so a
/// region cannot outlive the detection pass it came from. Use
/// [`CandidateRegion::geometry`] to keep an owned copy for reporting.
#[derive(Debug, Clone, Copy)]
pub struct CandidateRegion<'a> {
    /// Detection-order index within the frame
    pub index: usize,
    /// Symbol corners in image coordinates: top-left, top-right, bottom-right, bottom-left
    pub corners: [Point; 4],
    /// Grid size in modules
    pub size: usize,
    /// Sampled cells, `size` x `size`, dark = set
    pub cells: &'a BitMatrix,
}

impl CandidateRegion<'_> {
    /// Whether the cell at column `x`, row `y` is dark
    pub fn cell(&self, x: usize, y: usize) -> bool {
        self.cells.get(x, y)
    }

    /// Owned snapshot of the geometric description
    pub fn geometry(&self) -> RegionGeometry {
        RegionGeometry {
            corners: self.corners,
            size: self.size,
            cells: self.cells.clone(),
        }
    }
}

/// Owned geometric metadata forwarded alongside decode results
#[derive(Debug, Clone, PartialEq)]
pub struct RegionGeometry {
    /// Symbol corners in image coordinates: top-left, top-right, bottom-right, bottom-left
    pub corners: [Point; 4],
    /// Grid size in modules
    pub size: usize,
    /// Sampled cells
    pub cells: BitMatrix,
}

impl RegionGeometry {
    /// Whether the cell at column `x`, row `y` is dark
    pub fn cell(&self, x: usize, y: usize) -> bool {
        self.cells.get(x, y)
    }
}
