//! Symbol decoding from a sampled module grid
//!
//! - Version and format information (BCH protected)
//! - Zig-zag codeword extraction with unmasking
//! - Block de-interleaving and Reed-Solomon correction
//! - Segment parsing (numeric, alphanumeric, byte, kanji, ECI)

/// BCH codebooks for format and version words
pub mod bch;
/// Codeword extraction and block correction
pub mod bitstream;
/// Decode failure kinds
pub mod error;
/// Format information extraction (mask pattern, EC level)
pub mod format;
/// Function module mask builder (finder/timing/format/alignment/version)
pub mod function_mask;
/// Per-mode segment decoders
pub mod modes;
/// Segment stream parsing
pub mod payload;
/// Reed-Solomon error correction
pub mod reed_solomon;
/// Block structure tables
pub mod tables;
/// Version determination (versions 7-40 carry version blocks)
pub mod version;

pub use error::DecodeError;

use crate::models::{BitMatrix, CandidateRegion, DecodedSymbol};
use function_mask::FunctionMask;

/// Decode a located region
pub fn decode(region: &CandidateRegion<'_>) -> Result<DecodedSymbol, DecodeError> {
    decode_cells(region.cells, region.size)
}

/// Decode a `size` x `size` cell bitmap, dark = set
pub fn decode_cells(cells: &BitMatrix, size: usize) -> Result<DecodedSymbol, DecodeError> {
    if cells.width() != size || cells.height() != size {
        return Err(DecodeError::InvalidGridSize);
    }

    let version = version::read_version(cells, size)?;
    let format = format::read_format(cells, size)?;
    let layout =
        tables::block_layout(version, format.ec_level).ok_or(DecodeError::InvalidVersion)?;

    let func = FunctionMask::new(version);
    let raw = bitstream::read_codewords(cells, &func, format.mask, layout.total_codewords);
    let data = bitstream::correct_blocks(&raw, &layout)?;
    let payload = payload::decode_payload(&data, version)?;

    Ok(DecodedSymbol {
        version,
        ecc_level: format.ec_level,
        mask: format.mask,
        data_type: payload.data_type,
        payload: payload.bytes,
        eci: payload.eci,
    })
}
