/// BCH codes protecting the format (15,5) and version (18,6) words
///
/// Both codes have minimum distance 7 or 8, so matching a read word against the
/// full codebook and accepting a Hamming distance of three or less corrects
/// every pattern the code can correct.
pub const MAX_CORRECTABLE: u32 = 3;

const FORMAT_GENERATOR: u32 = 0x537;
const FORMAT_XOR_MASK: u32 = 0x5412;
const VERSION_GENERATOR: u32 = 0x1F25;

/// 15-bit format word for 5 data bits (level bits << 3 | mask), mask applied
pub const fn format_word(data: u8) -> u16 {
    let data = data as u32 & 0x1F;
    let mut rem = data;
    let mut i = 0;
    while i < 10 {
        rem = (rem << 1) ^ ((rem >> 9) * FORMAT_GENERATOR);
        i += 1;
    }
    (((data << 10) | rem) ^ FORMAT_XOR_MASK) as u16
}

/// 18-bit version word for versions 7-40
pub const fn version_word(version: u8) -> u32 {
    let data = version as u32;
    let mut rem = data;
    let mut i = 0;
    while i < 12 {
        rem = (rem << 1) ^ ((rem >> 11) * VERSION_GENERATOR);
        i += 1;
    }
    (data << 12) | rem
}

/// Closest format codeword as `(data, distance)`
pub fn nearest_format(word: u16) -> (u8, u32) {
    (0u8..32)
        .map(|data| (data, (format_word(data) ^ word).count_ones()))
        .min_by_key(|&(_, d)| d)
        .unwrap_or((0, u32::MAX))
}

/// Closest version codeword as `(version, distance)`
pub fn nearest_version(word: u32) -> (u8, u32) {
    (7u8..=40)
        .map(|v| (v, (version_word(v) ^ word).count_ones()))
        .min_by_key(|&(_, d)| d)
        .unwrap_or((0, u32::MAX))
}
