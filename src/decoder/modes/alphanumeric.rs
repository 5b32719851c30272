//! Alphanumeric mode decoder (Mode 0010)
//! Alphanumeric character set: 0-9, A-Z, space, $%*+-./:

use crate::decoder::error::DecodeError;
use crate::decoder::payload::{BitReader, reserve};

const ALPHANUMERIC_TABLE: &[u8; 45] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

/// Append `count` characters to `out`; pairs take 11 bits, a trailing single 6
pub fn decode(
    reader: &mut BitReader<'_>,
    count: usize,
    out: &mut Vec<u8>,
) -> Result<(), DecodeError> {
    reserve(out, count)?;

    let mut remaining = count;
    while remaining >= 2 {
        let value = reader.read(11)? as usize;
        out.push(ALPHANUMERIC_TABLE[(value / 45) % 45]);
        out.push(ALPHANUMERIC_TABLE[value % 45]);
        remaining -= 2;
    }
    if remaining == 1 {
        let value = reader.read(6)? as usize;
        out.push(ALPHANUMERIC_TABLE[value % 45]);
    }

    Ok(())
}
