/// Format information extraction (EC level and mask)
use super::bch;
use super::error::DecodeError;
use crate::models::{BitMatrix, EcLevel, MaskPattern};

/// Decoded 5-bit format payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatInfo {
    /// Error correction level
    pub ec_level: EcLevel,
    /// Data mask
    pub mask: MaskPattern,
}

impl FormatInfo {
    fn from_data(data: u8) -> Self {
        Self {
            ec_level: EcLevel::from_format_bits(data >> 3),
            mask: MaskPattern::from_bits(data),
        }
    }

    /// The 5 data bits this info encodes to
    pub fn data_bits(&self) -> u8 {
        (self.ec_level.format_bits() << 3) | self.mask.index()
    }
}

/// Module (x, y) holding bit `i` of the copy wrapped around the top-left finder
pub fn primary_position(i: usize) -> (usize, usize) {
    match i {
        0..=5 => (8, i),
        6 => (8, 7),
        7 => (8, 8),
        8 => (7, 8),
        _ => (14 - i, 8),
    }
}

/// Module (x, y) holding bit `i` of the copy split between the other two finders
pub fn secondary_position(i: usize, size: usize) -> (usize, usize) {
    if i < 8 {
        (size - 1 - i, 8)
    } else {
        (8, size - 15 + i)
    }
}

fn read_word(cells: &BitMatrix, position: impl Fn(usize) -> (usize, usize)) -> u16 {
    (0..15).fold(0u16, |word, i| {
        let (x, y) = position(i);
        if cells.get(x, y) { word | (1 << i) } else { word }
    })
}

/// Read both format copies and keep whichever is closer to a valid codeword
pub fn read_format(cells: &BitMatrix, size: usize) -> Result<FormatInfo, DecodeError> {
    let primary = bch::nearest_format(read_word(cells, primary_position));
    let secondary = bch::nearest_format(read_word(cells, |i| secondary_position(i, size)));

    let (data, distance) = if secondary.1 < primary.1 {
        secondary
    } else {
        primary
    };
    if distance > bch::MAX_CORRECTABLE {
        return Err(DecodeError::FormatEcc);
    }
    Ok(FormatInfo::from_data(data))
}
