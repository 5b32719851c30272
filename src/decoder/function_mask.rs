use crate::models::BitMatrix;

/// Function module mask for a specific version.
/// true = function module (not data), false = data module.
#[derive(Debug, Clone)]
pub struct FunctionMask {
    mask: BitMatrix,
    version: u8,
}

impl FunctionMask {
    /// Mask for `version` (1-40)
    pub fn new(version: u8) -> Self {
        let size = 17 + 4 * version as usize;
        let mut mask = BitMatrix::new(size, size);

        // Finder patterns + separators (up to 9x9 areas, clipped to bounds)
        Self::mark_finder_area(&mut mask, 0, 0);
        Self::mark_finder_area(&mut mask, size - 7, 0);
        Self::mark_finder_area(&mut mask, 0, size - 7);

        // Timing patterns (row 6 and column 6)
        for i in 0..size {
            mask.set(6, i, true);
            mask.set(i, 6, true);
        }

        let align = alignment_pattern_positions(version);
        for &cx in &align {
            for &cy in &align {
                let in_tl = cx <= 8 && cy <= 8;
                let in_tr = cx >= size - 9 && cy <= 8;
                let in_bl = cx <= 8 && cy >= size - 9;
                if in_tl || in_tr || in_bl {
                    continue;
                }
                for y in cy - 2..=cy + 2 {
                    for x in cx - 2..=cx + 2 {
                        mask.set(x, y, true);
                    }
                }
            }
        }

        // Format info areas and the dark module
        for i in 0..9 {
            mask.set(8, i, true);
            mask.set(i, 8, true);
        }
        for i in 0..8 {
            mask.set(size - 1 - i, 8, true);
            mask.set(8, size - 1 - i, true);
        }

        if version >= 7 {
            for dy in 0..6 {
                for dx in 0..3 {
                    mask.set(size - 11 + dx, dy, true);
                    mask.set(dy, size - 11 + dx, true);
                }
            }
        }

        Self { mask, version }
    }

    /// Modules per side
    pub fn size(&self) -> usize {
        self.mask.width()
    }

    /// Version this mask was built for
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Whether module (x, y) is reserved for a function pattern
    pub fn is_function(&self, x: usize, y: usize) -> bool {
        self.mask.get(x, y)
    }

    /// Count of modules left for data, ECC and remainder bits
    pub fn data_modules_count(&self) -> usize {
        let size = self.size();
        size * size - self.mask.count_ones()
    }

    fn mark_finder_area(mask: &mut BitMatrix, x: usize, y: usize) {
        let size = mask.width();
        let start_x = x.saturating_sub(1);
        let start_y = y.saturating_sub(1);
        let end_x = (x + 8).min(size);
        let end_y = (y + 8).min(size);
        for yy in start_y..end_y {
            for xx in start_x..end_x {
                mask.set(xx, yy, true);
            }
        }
    }
}

/// Alignment pattern centre coordinates for a version, ascending
pub fn alignment_pattern_positions(version: u8) -> Vec<usize> {
    if version <= 1 {
        return Vec::new();
    }
    let v = version as usize;
    let num_align = v / 7 + 2;
    let size = 17 + 4 * v;
    let step = (v * 8 + num_align * 3 + 5) / (num_align * 4 - 4) * 2;

    let mut positions = vec![6; num_align];
    for (k, slot) in positions.iter_mut().skip(1).rev().enumerate() {
        *slot = size - 7 - k * step;
    }
    positions
}
