//! Segment parsing of the corrected data codewords.

use super::error::DecodeError;
use super::modes::{alphanumeric, byte, eci, kanji, numeric};
use crate::models::DataType;

/// Largest payload a version 40 symbol can carry
pub const MAX_PAYLOAD: usize = 8896;

/// MSB-first reader over the data codewords
pub struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BitReader<'a> {
    /// Start at the first bit of `data`
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bits left to read
    pub fn remaining(&self) -> usize {
        self.data.len() * 8 - self.pos
    }

    /// Read `n` (at most 32) bits as an unsigned value
    pub fn read(&mut self, n: usize) -> Result<u32, DecodeError> {
        if n > self.remaining() {
            return Err(DecodeError::DataUnderflow);
        }
        let mut value = 0u32;
        for _ in 0..n {
            let bit = (self.data[self.pos >> 3] >> (7 - (self.pos & 7))) & 1;
            value = (value << 1) | bit as u32;
            self.pos += 1;
        }
        Ok(value)
    }
}

/// Parsed segment stream
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Payload {
    /// Concatenated segment contents
    pub bytes: Vec<u8>,
    /// Widest segment mode encountered
    pub data_type: Option<DataType>,
    /// Last ECI designator encountered
    pub eci: Option<u32>,
}

const MODE_TERMINATOR: u32 = 0b0000;
const MODE_NUMERIC: u32 = 0b0001;
const MODE_ALPHANUMERIC: u32 = 0b0010;
const MODE_BYTE: u32 = 0b0100;
const MODE_ECI: u32 = 0b0111;
const MODE_KANJI: u32 = 0b1000;

/// Character count field width for a mode at a version
pub fn char_count_bits(data_type: DataType, version: u8) -> usize {
    let band = match version {
        0..=9 => 0,
        10..=26 => 1,
        _ => 2,
    };
    let widths = match data_type {
        DataType::Numeric => [10, 12, 14],
        DataType::Alphanumeric => [9, 11, 13],
        DataType::Byte => [8, 16, 16],
        DataType::Kanji => [8, 10, 12],
    };
    widths[band]
}

/// Walk the segments until a terminator or fewer than four bits remain
pub fn decode_payload(data: &[u8], version: u8) -> Result<Payload, DecodeError> {
    let mut reader = BitReader::new(data);
    let mut payload = Payload::default();

    while reader.remaining() >= 4 {
        let mode = reader.read(4)?;
        let data_type = match mode {
            MODE_TERMINATOR => break,
            MODE_ECI => {
                payload.eci = Some(eci::decode(&mut reader)?);
                continue;
            }
            MODE_NUMERIC => DataType::Numeric,
            MODE_ALPHANUMERIC => DataType::Alphanumeric,
            MODE_BYTE => DataType::Byte,
            MODE_KANJI => DataType::Kanji,
            _ => return Err(DecodeError::UnknownDataType),
        };

        let count = reader.read(char_count_bits(data_type, version))? as usize;
        let out = &mut payload.bytes;
        match data_type {
            DataType::Numeric => numeric::decode(&mut reader, count, out)?,
            DataType::Alphanumeric => alphanumeric::decode(&mut reader, count, out)?,
            DataType::Byte => byte::decode(&mut reader, count, out)?,
            DataType::Kanji => kanji::decode(&mut reader, count, out)?,
        }
        payload.data_type = payload.data_type.max(Some(data_type));
    }

    Ok(payload)
}

/// Fail with [`DecodeError::DataOverflow`] if `extra` more bytes would not fit
pub(crate) fn reserve(out: &[u8], extra: usize) -> Result<(), DecodeError> {
    if out.len() + extra > MAX_PAYLOAD {
        return Err(DecodeError::DataOverflow);
    }
    Ok(())
}
