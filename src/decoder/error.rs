use thiserror::Error;

/// Why a located region failed to decode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum DecodeError {
    /// Grid size is not 17 + 4v
    #[error("Invalid grid size")]
    InvalidGridSize,
    /// Version outside 1-40 or contradicted by the version blocks
    #[error("Invalid version")]
    InvalidVersion,
    /// Neither format word copy could be corrected
    #[error("Format data ECC failure")]
    FormatEcc,
    /// A data block had more errors than its ECC can repair
    #[error("ECC failure")]
    DataEcc,
    /// Unrecognised segment mode indicator
    #[error("Unknown data type")]
    UnknownDataType,
    /// Payload grew past the maximum symbol capacity
    #[error("Data overflow")]
    DataOverflow,
    /// Bitstream ended inside a segment
    #[error("Data underflow")]
    DataUnderflow,
}
