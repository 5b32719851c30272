//! Numeric mode decoder (Mode 0001)
//! Groups of 3 digits = 10 bits, 2 digits = 7 bits, 1 digit = 4 bits

use crate::decoder::error::DecodeError;
use crate::decoder::payload::{BitReader, reserve};

/// Append `count` ASCII digits to `out`
pub fn decode(
    reader: &mut BitReader<'_>,
    count: usize,
    out: &mut Vec<u8>,
) -> Result<(), DecodeError> {
    reserve(out, count)?;

    let mut remaining = count;
    while remaining > 0 {
        let digits = remaining.min(3);
        let bits = match digits {
            3 => 10,
            2 => 7,
            _ => 4,
        };
        let mut value = reader.read(bits)?;

        let mut group = [b'0'; 3];
        for slot in group[..digits].iter_mut().rev() {
            *slot = b'0' + (value % 10) as u8;
            value /= 10;
        }
        out.extend_from_slice(&group[..digits]);
        remaining -= digits;
    }

    Ok(())
}
