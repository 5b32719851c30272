/// Version determination from grid size, checked against the version blocks on v7+
use super::bch;
use super::error::DecodeError;
use crate::models::BitMatrix;

/// Module (x, y) of bit `i` in the block beside the top-right finder;
/// the bottom-left copy is the transpose.
pub fn version_position(i: usize, size: usize) -> (usize, usize) {
    (size - 11 + i % 3, i / 3)
}

fn read_word(cells: &BitMatrix, size: usize, transpose: bool) -> u32 {
    (0..18).fold(0u32, |word, i| {
        let (x, y) = version_position(i, size);
        let dark = if transpose {
            cells.get(y, x)
        } else {
            cells.get(x, y)
        };
        if dark { word | (1 << i) } else { word }
    })
}

/// Version implied by a grid of `size` modules
pub fn version_for_size(size: usize) -> Result<u8, DecodeError> {
    if size < 17 || (size - 17) % 4 != 0 {
        return Err(DecodeError::InvalidGridSize);
    }
    let version = (size - 17) / 4;
    if !(1..=40).contains(&version) {
        return Err(DecodeError::InvalidVersion);
    }
    Ok(version as u8)
}

/// Determine the version of a sampled grid.
///
/// From version 7 on, a readable version block that disagrees with the grid
/// size is an error; an unreadable one is ignored and the size wins.
pub fn read_version(cells: &BitMatrix, size: usize) -> Result<u8, DecodeError> {
    let version = version_for_size(size)?;
    if version < 7 {
        return Ok(version);
    }

    let a = bch::nearest_version(read_word(cells, size, false));
    let b = bch::nearest_version(read_word(cells, size, true));
    let (encoded, distance) = if b.1 < a.1 { b } else { a };
    if distance <= bch::MAX_CORRECTABLE && encoded != version {
        return Err(DecodeError::InvalidVersion);
    }
    Ok(version)
}
