//! Segment decoders, one per mode
//!
//! Each decoder reads `count` characters from the shared bit reader and appends
//! their bytes to the payload.

pub mod alphanumeric;
pub mod byte;
pub mod eci;
pub mod kanji;
pub mod numeric;
