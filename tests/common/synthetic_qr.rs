//! Minimal version 1 QR encoder for tests.
//!
//! Only byte-mode payloads in a single version 1 block are supported, which is
//! all the scenarios need. Module placement follows ISO/IEC 18004 directly
//! and does not go through the crate's decoder tables.

use camqr::decoder::bch::format_word;
use camqr::decoder::format::{primary_position, secondary_position};
use camqr::decoder::reed_solomon::Gf256;
use camqr::models::{BitMatrix, EcLevel};

/// Modules per side of a version 1 symbol
pub const SIZE: usize = 21;

/// A rendered symbol as a module grid, dark = true
#[derive(Debug, Clone)]
pub struct SyntheticSymbol {
    modules: Vec<bool>,
    function: Vec<bool>,
}

impl SyntheticSymbol {
    /// Encode `payload` (byte mode) at version 1 with the given level and mask
    pub fn encode(payload: &[u8], ec_level: EcLevel, mask: u8) -> Self {
        let (data_len, ecc_len) = match ec_level {
            EcLevel::L => (19, 7),
            EcLevel::M => (16, 10),
            EcLevel::Q => (13, 13),
            EcLevel::H => (9, 17),
        };
        assert!(payload.len() + 2 <= data_len, "payload too long for version 1");

        let mut symbol = Self {
            modules: vec![false; SIZE * SIZE],
            function: vec![false; SIZE * SIZE],
        };
        symbol.draw_function_patterns();

        let mut codewords = data_codewords(payload, data_len);
        let ecc = rs_remainder(&codewords, ecc_len);
        codewords.extend_from_slice(&ecc);
        symbol.draw_codewords(&codewords);
        symbol.apply_mask(mask);
        symbol.draw_format(ec_level, mask);
        symbol
    }

    /// The canonical test symbol: "HELLO", level M, mask 0
    pub fn hello() -> Self {
        Self::encode(b"HELLO", EcLevel::M, 0)
    }

    /// Whether module (x, y) is dark
    pub fn module(&self, x: usize, y: usize) -> bool {
        self.modules[y * SIZE + x]
    }

    /// Whether module (x, y) belongs to a function pattern
    pub fn is_function(&self, x: usize, y: usize) -> bool {
        self.function[y * SIZE + x]
    }

    /// Invert module (x, y)
    pub fn flip(&mut self, x: usize, y: usize) {
        self.modules[y * SIZE + x] ^= true;
    }

    /// Scramble the bottom-right data area badly enough to defeat error correction
    pub fn corrupt_data(&mut self) {
        for y in 9..SIZE {
            for x in 9..SIZE {
                if (x + 2 * y) % 3 == 0 {
                    self.flip(x, y);
                }
            }
        }
    }

    /// The module grid as a cell bitmap
    pub fn cells(&self) -> BitMatrix {
        let mut cells = BitMatrix::new(SIZE, SIZE);
        for y in 0..SIZE {
            for x in 0..SIZE {
                cells.set(x, y, self.module(x, y));
            }
        }
        cells
    }

    /// Render as 8-bit luma with `scale` px per module and a `quiet`-module border
    pub fn render(&self, scale: usize, quiet: usize) -> (Vec<u8>, usize) {
        let side = (SIZE + 2 * quiet) * scale;
        let mut canvas = Canvas::new(side, side);
        canvas.stamp(self, 0, 0, scale, quiet);
        (canvas.pixels, side)
    }

    fn set_function(&mut self, x: usize, y: usize, dark: bool) {
        self.modules[y * SIZE + x] = dark;
        self.function[y * SIZE + x] = true;
    }

    fn draw_function_patterns(&mut self) {
        for i in 0..SIZE {
            self.set_function(6, i, i % 2 == 0);
            self.set_function(i, 6, i % 2 == 0);
        }

        for (cx, cy) in [(3, 3), (SIZE - 4, 3), (3, SIZE - 4)] {
            for dy in -4isize..=4 {
                for dx in -4isize..=4 {
                    let (x, y) = (cx as isize + dx, cy as isize + dy);
                    if x < 0 || y < 0 || x >= SIZE as isize || y >= SIZE as isize {
                        continue;
                    }
                    let dist = dx.abs().max(dy.abs());
                    self.set_function(x as usize, y as usize, dist != 2 && dist != 4);
                }
            }
        }

        // reserve the format areas; real bits are drawn after masking
        for i in 0..15 {
            let (x, y) = primary_position(i);
            self.set_function(x, y, false);
            let (x, y) = secondary_position(i, SIZE);
            self.set_function(x, y, false);
        }
        self.set_function(8, SIZE - 8, true);
    }

    fn draw_codewords(&mut self, codewords: &[u8]) {
        let total_bits = codewords.len() * 8;
        let mut bit = 0;
        let mut right = SIZE as isize - 1;
        while right >= 1 {
            if right == 6 {
                right = 5;
            }
            let upward = ((right + 1) & 2) == 0;
            for vert in 0..SIZE {
                let y = if upward { SIZE - 1 - vert } else { vert };
                for j in 0..2 {
                    let x = (right - j) as usize;
                    if self.is_function(x, y) || bit >= total_bits {
                        continue;
                    }
                    self.modules[y * SIZE + x] = (codewords[bit >> 3] >> (7 - (bit & 7))) & 1 == 1;
                    bit += 1;
                }
            }
            right -= 2;
        }
        assert_eq!(bit, total_bits, "codewords did not fill the symbol");
    }

    fn apply_mask(&mut self, mask: u8) {
        for y in 0..SIZE {
            for x in 0..SIZE {
                if !self.is_function(x, y) && mask_bit(mask, y, x) {
                    self.flip(x, y);
                }
            }
        }
    }

    fn draw_format(&mut self, ec_level: EcLevel, mask: u8) {
        let word = format_word((ec_level.format_bits() << 3) | mask);
        for i in 0..15 {
            let dark = (word >> i) & 1 == 1;
            let (x, y) = primary_position(i);
            self.modules[y * SIZE + x] = dark;
            let (x, y) = secondary_position(i, SIZE);
            self.modules[y * SIZE + x] = dark;
        }
    }
}

/// White 8-bit canvas that symbols can be stamped onto
pub struct Canvas {
    /// Row-major luma
    pub pixels: Vec<u8>,
    /// Width in pixels
    pub width: usize,
    /// Height in pixels
    pub height: usize,
}

impl Canvas {
    /// All-white canvas
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![255; width * height],
            width,
            height,
        }
    }

    /// Draw `symbol` with its quiet zone starting at pixel (`left`, `top`)
    pub fn stamp(
        &mut self,
        symbol: &SyntheticSymbol,
        left: usize,
        top: usize,
        scale: usize,
        quiet: usize,
    ) {
        let side = (SIZE + 2 * quiet) * scale;
        for py in 0..side {
            for px in 0..side {
                let (mx, my) = (px / scale, py / scale);
                let dark = mx >= quiet
                    && my >= quiet
                    && mx < quiet + SIZE
                    && my < quiet + SIZE
                    && symbol.module(mx - quiet, my - quiet);
                self.pixels[(top + py) * self.width + left + px] = if dark { 0 } else { 255 };
            }
        }
    }
}

fn mask_bit(mask: u8, i: usize, j: usize) -> bool {
    match mask {
        0 => (i + j) % 2 == 0,
        1 => i % 2 == 0,
        2 => j % 3 == 0,
        3 => (i + j) % 3 == 0,
        4 => (i / 2 + j / 3) % 2 == 0,
        5 => (i * j) % 2 + (i * j) % 3 == 0,
        6 => ((i * j) % 2 + (i * j) % 3) % 2 == 0,
        7 => ((i + j) % 2 + (i * j) % 3) % 2 == 0,
        _ => panic!("mask {mask} out of range"),
    }
}

/// Byte-mode segment, terminator, byte alignment and 0xEC/0x11 padding
pub fn data_codewords(payload: &[u8], data_len: usize) -> Vec<u8> {
    fn push(bits: &mut Vec<bool>, value: u32, width: usize) {
        for i in (0..width).rev() {
            bits.push((value >> i) & 1 == 1);
        }
    }

    let mut bits = Vec::new();
    push(&mut bits, 0b0100, 4);
    push(&mut bits, payload.len() as u32, 8);
    for &b in payload {
        push(&mut bits, b as u32, 8);
    }
    let terminator = (data_len * 8 - bits.len()).min(4);
    push(&mut bits, 0, terminator);
    while bits.len() % 8 != 0 {
        bits.push(false);
    }

    let mut bytes: Vec<u8> = bits
        .chunks(8)
        .map(|chunk| chunk.iter().fold(0u8, |acc, &b| (acc << 1) | b as u8))
        .collect();
    for pad in [0xEC, 0x11].into_iter().cycle() {
        if bytes.len() >= data_len {
            break;
        }
        bytes.push(pad);
    }
    bytes
}

/// Parity bytes for `data` under the generator with roots alpha^0 .. alpha^(degree-1)
fn rs_remainder(data: &[u8], degree: usize) -> Vec<u8> {
    let mut generator = vec![1u8];
    for i in 0..degree {
        let root = Gf256::exp(i);
        let mut next = vec![0u8; generator.len() + 1];
        for (j, &g) in generator.iter().enumerate() {
            next[j] ^= g;
            next[j + 1] ^= Gf256::mul(g, root);
        }
        generator = next;
    }

    let mut remainder = vec![0u8; degree];
    for &d in data {
        let factor = d ^ remainder[0];
        remainder.rotate_left(1);
        remainder[degree - 1] = 0;
        for (r, &g) in remainder.iter_mut().zip(&generator[1..]) {
            *r ^= Gf256::mul(g, factor);
        }
    }
    remainder
}
