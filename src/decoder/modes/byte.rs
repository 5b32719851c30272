//! Byte mode decoder (Mode 0100), 8 bits per character

use crate::decoder::error::DecodeError;
use crate::decoder::payload::{BitReader, reserve};

/// Append `count` raw bytes to `out`; no text decoding is applied
pub fn decode(
    reader: &mut BitReader<'_>,
    count: usize,
    out: &mut Vec<u8>,
) -> Result<(), DecodeError> {
    reserve(out, count)?;
    for _ in 0..count {
        out.push(reader.read(8)? as u8);
    }
    Ok(())
}
