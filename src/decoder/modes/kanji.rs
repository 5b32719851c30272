//! Kanji mode decoder (Mode 1000)
//! Each character is 13 bits, expanded back to a two-byte Shift-JIS code

use crate::decoder::error::DecodeError;
use crate::decoder::payload::{BitReader, reserve};

/// Append `count` Shift-JIS characters (two bytes each) to `out`
pub fn decode(
    reader: &mut BitReader<'_>,
    count: usize,
    out: &mut Vec<u8>,
) -> Result<(), DecodeError> {
    reserve(out, count * 2)?;
    for _ in 0..count {
        let packed = reader.read(13)?;
        let intermediate = ((packed / 0xC0) << 8) | (packed % 0xC0);
        let sjis = if intermediate + 0x8140 <= 0x9FFC {
            intermediate + 0x8140
        } else {
            intermediate + 0xC140
        };
        out.push((sjis >> 8) as u8);
        out.push(sjis as u8);
    }
    Ok(())
}
