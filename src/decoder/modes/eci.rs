//! Extended channel interpretation designator (Mode 0111)

use crate::decoder::error::DecodeError;
use crate::decoder::payload::BitReader;

/// Read a one, two or three byte ECI assignment number
pub fn decode(reader: &mut BitReader<'_>) -> Result<u32, DecodeError> {
    let first = reader.read(8)?;
    let value = if first & 0xC0 == 0x80 {
        ((first & 0x3F) << 8) | reader.read(8)?
    } else if first & 0xE0 == 0xC0 {
        ((first & 0x1F) << 16) | reader.read(16)?
    } else {
        first
    };
    Ok(value)
}
