use std::collections::TryReserveError;

/// Packed bit matrix used for binarised frames and sampled symbol cells.
///
/// Bit `p = y * width + x` lives in byte `p >> 3` at position `p & 7`, which is
/// the layout symbol libraries use for their cell bitmaps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitMatrix {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl BitMatrix {
    /// Create a new zeroed bit matrix
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; Self::bytes_for(width, height)],
        }
    }

    /// Create a zeroed matrix, reporting allocation failure instead of aborting
    pub fn try_new(width: usize, height: usize) -> Result<Self, TryReserveError> {
        let len = Self::bytes_for(width, height);
        let mut data = Vec::new();
        data.try_reserve_exact(len)?;
        data.resize(len, 0);
        Ok(Self {
            width,
            height,
            data,
        })
    }

    fn bytes_for(width: usize, height: usize) -> usize {
        (width * height).div_ceil(8)
    }

    /// Get matrix width
    pub fn width(&self) -> usize {
        self.width
    }

    /// Get matrix height
    pub fn height(&self) -> usize {
        self.height
    }

    /// Get bit at (x, y); out-of-range reads are light
    pub fn get(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let index = y * self.width + x;
        (self.data[index >> 3] >> (index & 7)) & 1 == 1
    }

    /// Set bit at (x, y); out-of-range writes are ignored
    pub fn set(&mut self, x: usize, y: usize, value: bool) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = y * self.width + x;
        if value {
            self.data[index >> 3] |= 1 << (index & 7);
        } else {
            self.data[index >> 3] &= !(1 << (index & 7));
        }
    }

    /// Toggle bit at (x, y)
    pub fn toggle(&mut self, x: usize, y: usize) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = y * self.width + x;
        self.data[index >> 3] ^= 1 << (index & 7);
    }

    /// Clear all bits to 0
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Number of set bits
    pub fn count_ones(&self) -> usize {
        self.data.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Get raw packed data
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl Default for BitMatrix {
    fn default() -> Self {
        Self::new(0, 0)
    }
}
