/// Captured frames and their pixel formats
pub mod frame;
/// Packed bit matrix
pub mod matrix;
/// 2D points
pub mod point;
/// Located candidate regions
pub mod region;
/// Decoded symbols and their format fields
pub mod symbol;

pub use frame::{Frame, PixelFormat};
pub use matrix::BitMatrix;
pub use point::Point;
pub use region::{CandidateRegion, RegionGeometry};
pub use symbol::{DataType, DecodedSymbol, EcLevel, MaskPattern};
