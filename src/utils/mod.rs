//! Image processing helpers shared by the engine
//!
//! - Luma conversion for every supported sensor format
//! - Otsu binarization
//! - Perspective transforms for grid sampling

/// Otsu thresholding
pub mod binarization;
/// Perspective transforms
pub mod geometry;
/// Luma conversion
pub mod grayscale;
