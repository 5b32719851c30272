/// Codeword extraction from the module grid and block de-interleaving
use super::error::DecodeError;
use super::function_mask::FunctionMask;
use super::reed_solomon::ReedSolomonDecoder;
use super::tables::BlockLayout;
use crate::models::{BitMatrix, MaskPattern};

/// Read `count` codewords in the standard zig-zag order, removing the data mask.
///
/// Column pairs are walked right to left, skipping the vertical timing column,
/// alternating upward and downward. Bits are packed MSB first; remainder bits
/// past the last full codeword are ignored.
pub fn read_codewords(
    cells: &BitMatrix,
    func: &FunctionMask,
    mask: MaskPattern,
    count: usize,
) -> Vec<u8> {
    let size = func.size();
    let mut codewords = vec![0u8; count];
    let total_bits = count * 8;
    let mut bit = 0usize;

    let mut right = size as isize - 1;
    while right >= 1 {
        if right == 6 {
            right = 5;
        }
        let upward = ((right + 1) & 2) == 0;
        for vert in 0..size {
            let y = if upward { size - 1 - vert } else { vert };
            for j in 0..2 {
                let x = (right - j) as usize;
                if func.is_function(x, y) || bit >= total_bits {
                    continue;
                }
                let dark = cells.get(x, y) ^ mask.is_masked(y, x);
                if dark {
                    codewords[bit >> 3] |= 0x80 >> (bit & 7);
                }
                bit += 1;
            }
        }
        right -= 2;
    }

    codewords
}

/// Split interleaved codewords into blocks, correct each, and concatenate the data.
///
/// Short blocks come first; long blocks carry one extra data codeword that is
/// interleaved after every short block has run out.
pub fn correct_blocks(raw: &[u8], layout: &BlockLayout) -> Result<Vec<u8>, DecodeError> {
    if raw.len() != layout.total_codewords {
        return Err(DecodeError::DataUnderflow);
    }

    let num_blocks = layout.num_blocks;
    let num_short = layout.num_short_blocks();
    let short_len = layout.short_block_len();
    let ecc = layout.ecc_per_block;
    let short_data = short_len - ecc;

    let mut blocks: Vec<Vec<u8>> = (0..num_blocks)
        .map(|_| Vec::with_capacity(short_len + 1))
        .collect();
    let mut next = raw.iter().copied();

    for i in 0..=short_data {
        for (j, block) in blocks.iter_mut().enumerate() {
            if i == short_data && j < num_short {
                continue;
            }
            block.extend(next.next());
        }
    }
    for _ in 0..ecc {
        for block in blocks.iter_mut() {
            block.extend(next.next());
        }
    }

    let rs = ReedSolomonDecoder::new(ecc);
    let mut data = Vec::with_capacity(layout.data_codewords());
    for block in blocks.iter_mut() {
        rs.decode(block)?;
        data.extend_from_slice(&block[..block.len() - ecc]);
    }
    Ok(data)
}
