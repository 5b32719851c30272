use std::borrow::Cow;
use std::fmt;

/// Error correction level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EcLevel {
    /// Low (~7% recovery capacity)
    L,
    /// Medium (~15% recovery capacity)
    M,
    /// Quartile (~25% recovery capacity)
    Q,
    /// High (~30% recovery capacity)
    H,
}

impl EcLevel {
    /// Decode the two level bits of the format word (01=L, 00=M, 11=Q, 10=H)
    pub fn from_format_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0b01 => EcLevel::L,
            0b00 => EcLevel::M,
            0b11 => EcLevel::Q,
            _ => EcLevel::H,
        }
    }

    /// The two level bits as stored in the format word
    pub fn format_bits(&self) -> u8 {
        match self {
            EcLevel::L => 0b01,
            EcLevel::M => 0b00,
            EcLevel::Q => 0b11,
            EcLevel::H => 0b10,
        }
    }

    /// Row index into the block tables (L, M, Q, H)
    pub(crate) fn table_index(&self) -> usize {
        match self {
            EcLevel::L => 0,
            EcLevel::M => 1,
            EcLevel::Q => 2,
            EcLevel::H => 3,
        }
    }

    /// Single-letter name
    pub fn as_char(&self) -> char {
        match self {
            EcLevel::L => 'L',
            EcLevel::M => 'M',
            EcLevel::Q => 'Q',
            EcLevel::H => 'H',
        }
    }
}

impl fmt::Display for EcLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Mask pattern (0-7)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaskPattern {
    /// (i + j) % 2 == 0
    Pattern0 = 0,
    /// i % 2 == 0
    Pattern1 = 1,
    /// j % 3 == 0
    Pattern2 = 2,
    /// (i + j) % 3 == 0
    Pattern3 = 3,
    /// (i/2 + j/3) % 2 == 0
    Pattern4 = 4,
    /// (i*j)%2 + (i*j)%3 == 0
    Pattern5 = 5,
    /// ((i*j)%2 + (i*j)%3) % 2 == 0
    Pattern6 = 6,
    /// ((i+j)%2 + (i*j)%3) % 2 == 0
    Pattern7 = 7,
}

impl MaskPattern {
    /// Mask from the three low bits of the format word
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x07 {
            0 => MaskPattern::Pattern0,
            1 => MaskPattern::Pattern1,
            2 => MaskPattern::Pattern2,
            3 => MaskPattern::Pattern3,
            4 => MaskPattern::Pattern4,
            5 => MaskPattern::Pattern5,
            6 => MaskPattern::Pattern6,
            _ => MaskPattern::Pattern7,
        }
    }

    /// Numeric mask id
    pub fn index(&self) -> u8 {
        *self as u8
    }

    /// Whether the module at row `i`, column `j` is inverted by this mask
    pub fn is_masked(&self, i: usize, j: usize) -> bool {
        match self {
            MaskPattern::Pattern0 => (i + j) % 2 == 0,
            MaskPattern::Pattern1 => i % 2 == 0,
            MaskPattern::Pattern2 => j % 3 == 0,
            MaskPattern::Pattern3 => (i + j) % 3 == 0,
            MaskPattern::Pattern4 => (i / 2 + j / 3) % 2 == 0,
            MaskPattern::Pattern5 => (i * j) % 2 + (i * j) % 3 == 0,
            MaskPattern::Pattern6 => ((i * j) % 2 + (i * j) % 3) % 2 == 0,
            MaskPattern::Pattern7 => ((i + j) % 2 + (i * j) % 3) % 2 == 0,
        }
    }
}

/// Segment encodings, ordered so the "widest" one seen can be reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DataType {
    /// Digits 0-9
    Numeric,
    /// The 45-character alphanumeric set
    Alphanumeric,
    /// Raw 8-bit bytes
    Byte,
    /// Shift-JIS double-byte characters
    Kanji,
}

impl DataType {
    /// Conventional upper-case label
    pub fn label(&self) -> &'static str {
        match self {
            DataType::Numeric => "NUMERIC",
            DataType::Alphanumeric => "ALPHA",
            DataType::Byte => "BYTE",
            DataType::Kanji => "KANJI",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Successfully decoded symbol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSymbol {
    /// Symbol version (1-40)
    pub version: u8,
    /// Error correction level from the format word
    pub ecc_level: EcLevel,
    /// Mask pattern from the format word
    pub mask: MaskPattern,
    /// Widest segment encoding present, `None` for an empty payload
    pub data_type: Option<DataType>,
    /// Decoded bytes
    pub payload: Vec<u8>,
    /// Extended channel interpretation marker, if one was present
    pub eci: Option<u32>,
}

impl DecodedSymbol {
    /// Payload as text, replacing invalid UTF-8
    pub fn payload_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }
}
