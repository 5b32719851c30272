//! Symbol location on a binarised frame
//!
//! - Finder pattern detection (the three square markers)
//! - Grouping finders into oriented triples
//! - Grid sampling through a perspective transform

/// Finder pattern detection using 1:1:3:1:1 ratio scanning
pub mod finder;
/// Triple assembly and orientation
pub mod grouping;
/// Module grid sampling
pub mod sampler;

use crate::models::BitMatrix;

pub use sampler::Grid;

/// Locate every symbol in `binary`, replacing the contents of `grids`.
///
/// Grids come out in detection order: top-left finder by row, then column.
pub fn locate_into(binary: &BitMatrix, grids: &mut Vec<Grid>) {
    grids.clear();
    let finders = finder::find_patterns(binary);
    let triples = grouping::group(&finders);
    tracing::trace!(
        finders = finders.len(),
        triples = triples.len(),
        "finder scan complete"
    );
    grids.extend(triples.iter().filter_map(|t| sampler::sample(binary, t)));
}
