//! Reed-Solomon error correction over GF(256), primitive polynomial 0x11D.
//!
//! Codewords are stored highest degree first: `block[0]` is the coefficient of
//! x^(n-1). The generator has roots alpha^0 .. alpha^(ecc-1).

use super::error::DecodeError;

/// GF(256) field operations using log/exp tables
pub struct Gf256;

static LOG_TABLE: [u8; 256] = [
    0, 0, 1, 25, 2, 50, 26, 198, 3, 223, 51, 238, 27, 104, 199, 75, 4, 100, 224, 14, 52, 141, 239,
    129, 28, 193, 105, 248, 200, 8, 76, 113, 5, 138, 101, 47, 225, 36, 15, 33, 53, 147, 142, 218,
    240, 18, 130, 69, 29, 181, 194, 125, 106, 39, 249, 185, 201, 154, 9, 120, 77, 228, 114, 166, 6,
    191, 139, 98, 102, 221, 48, 253, 226, 152, 37, 179, 16, 145, 34, 136, 54, 208, 148, 206, 143,
    150, 219, 189, 241, 210, 19, 92, 131, 56, 70, 64, 30, 66, 182, 163, 195, 72, 126, 110, 107, 58,
    40, 84, 250, 133, 186, 61, 202, 94, 155, 159, 10, 21, 121, 43, 78, 212, 229, 172, 115, 243,
    167, 87, 7, 112, 192, 247, 140, 128, 99, 13, 103, 74, 222, 237, 49, 197, 254, 24, 227, 165,
    153, 119, 38, 184, 180, 124, 17, 68, 146, 217, 35, 32, 137, 46, 55, 63, 209, 91, 149, 188, 207,
    205, 144, 135, 151, 178, 220, 252, 190, 97, 242, 86, 211, 171, 20, 42, 93, 158, 132, 60, 57,
    83, 71, 109, 65, 162, 31, 45, 67, 216, 183, 123, 164, 118, 196, 23, 73, 236, 127, 12, 111, 246,
    108, 161, 59, 82, 41, 157, 85, 170, 251, 96, 134, 177, 187, 204, 62, 90, 203, 89, 95, 176, 156,
    169, 160, 81, 11, 245, 22, 235, 122, 117, 44, 215, 79, 174, 213, 233, 230, 231, 173, 232, 116,
    214, 244, 234, 168, 80, 88, 175,
];

static EXP_TABLE: [u8; 256] = [
    1, 2, 4, 8, 16, 32, 64, 128, 29, 58, 116, 232, 205, 135, 19, 38, 76, 152, 45, 90, 180, 117,
    234, 201, 143, 3, 6, 12, 24, 48, 96, 192, 157, 39, 78, 156, 37, 74, 148, 53, 106, 212, 181,
    119, 238, 193, 159, 35, 70, 140, 5, 10, 20, 40, 80, 160, 93, 186, 105, 210, 185, 111, 222, 161,
    95, 190, 97, 194, 153, 47, 94, 188, 101, 202, 137, 15, 30, 60, 120, 240, 253, 231, 211, 187,
    107, 214, 177, 127, 254, 225, 223, 163, 91, 182, 113, 226, 217, 175, 67, 134, 17, 34, 68, 136,
    13, 26, 52, 104, 208, 189, 103, 206, 129, 31, 62, 124, 248, 237, 199, 147, 59, 118, 236, 197,
    151, 51, 102, 204, 133, 23, 46, 92, 184, 109, 218, 169, 79, 158, 33, 66, 132, 21, 42, 84, 168,
    77, 154, 41, 82, 164, 85, 170, 73, 146, 57, 114, 228, 213, 183, 115, 230, 209, 191, 99, 198,
    145, 63, 126, 252, 229, 215, 179, 123, 246, 241, 255, 227, 219, 171, 75, 150, 49, 98, 196, 149,
    55, 110, 220, 165, 87, 174, 65, 130, 25, 50, 100, 200, 141, 7, 14, 28, 56, 112, 224, 221, 167,
    83, 166, 81, 162, 89, 178, 121, 242, 249, 239, 195, 155, 43, 86, 172, 69, 138, 9, 18, 36, 72,
    144, 61, 122, 244, 245, 247, 243, 251, 235, 203, 139, 11, 22, 44, 88, 176, 125, 250, 233, 207,
    131, 27, 54, 108, 216, 173, 71, 142, 1,
];

impl Gf256 {
    /// Field product
    pub fn mul(a: u8, b: u8) -> u8 {
        if a == 0 || b == 0 {
            return 0;
        }
        let log_a = LOG_TABLE[a as usize] as usize;
        let log_b = LOG_TABLE[b as usize] as usize;
        EXP_TABLE[(log_a + log_b) % 255]
    }

    /// Field quotient; `b` must be non-zero
    pub fn div(a: u8, b: u8) -> u8 {
        debug_assert!(b != 0, "division by zero in GF(256)");
        if a == 0 || b == 0 {
            return 0;
        }
        let log_a = LOG_TABLE[a as usize] as usize;
        let log_b = LOG_TABLE[b as usize] as usize;
        EXP_TABLE[(log_a + 255 - log_b) % 255]
    }

    /// alpha^n
    pub fn exp(n: usize) -> u8 {
        EXP_TABLE[n % 255]
    }

    /// a^n
    pub fn pow(a: u8, n: usize) -> u8 {
        if a == 0 {
            return if n == 0 { 1 } else { 0 };
        }
        let log_a = LOG_TABLE[a as usize] as usize;
        EXP_TABLE[(log_a * (n % 255)) % 255]
    }
}

/// Evaluate a polynomial stored lowest degree first at `x`
fn eval_ascending(poly: &[u8], x: u8) -> u8 {
    poly.iter()
        .rev()
        .fold(0u8, |acc, &coeff| Gf256::mul(acc, x) ^ coeff)
}

/// Reed-Solomon decoder for one block
pub struct ReedSolomonDecoder {
    num_ecc_codewords: usize,
}

impl ReedSolomonDecoder {
    /// Decoder for blocks carrying `num_ecc_codewords` parity bytes
    pub fn new(num_ecc_codewords: usize) -> Self {
        Self { num_ecc_codewords }
    }

    /// Correct `block` in place, returning the number of repaired codewords
    pub fn decode(&self, block: &mut [u8]) -> Result<usize, DecodeError> {
        let n = block.len();
        if n > 255 || n <= self.num_ecc_codewords {
            return Err(DecodeError::DataEcc);
        }

        let syndrome = self.syndromes(block);
        if syndrome.iter().all(|&s| s == 0) {
            return Ok(0);
        }

        let sigma = Self::error_locator(&syndrome);
        let degree = sigma.iter().rposition(|&c| c != 0).unwrap_or(0);
        if degree == 0 || 2 * degree > self.num_ecc_codewords {
            return Err(DecodeError::DataEcc);
        }
        let sigma = &sigma[..=degree];

        // Chien search: error at index j has locator X = alpha^(n-1-j), root X^-1
        let positions: Vec<usize> = (0..n)
            .filter(|&j| eval_ascending(sigma, Gf256::exp(255 - (n - 1 - j) % 255)) == 0)
            .collect();
        if positions.len() != degree {
            return Err(DecodeError::DataEcc);
        }

        // Forney: omega = S * sigma mod x^nsym
        let mut omega = vec![0u8; syndrome.len()];
        for (i, slot) in omega.iter_mut().enumerate() {
            for j in 0..=i.min(degree) {
                *slot ^= Gf256::mul(sigma[j], syndrome[i - j]);
            }
        }

        for &pos in &positions {
            let x = Gf256::exp(n - 1 - pos);
            let x_inv = Gf256::exp(255 - (n - 1 - pos) % 255);
            let omega_val = eval_ascending(&omega, x_inv);
            let sigma_prime = sigma
                .iter()
                .enumerate()
                .skip(1)
                .step_by(2)
                .fold(0u8, |acc, (i, &c)| acc ^ Gf256::mul(c, Gf256::pow(x_inv, i - 1)));
            if sigma_prime == 0 {
                return Err(DecodeError::DataEcc);
            }
            block[pos] ^= Gf256::mul(x, Gf256::div(omega_val, sigma_prime));
        }

        if self.syndromes(block).iter().any(|&s| s != 0) {
            return Err(DecodeError::DataEcc);
        }
        Ok(positions.len())
    }

    /// S_i = r(alpha^i) for i in 0..ecc
    fn syndromes(&self, block: &[u8]) -> Vec<u8> {
        (0..self.num_ecc_codewords)
            .map(|i| {
                let x = Gf256::exp(i);
                block.iter().fold(0u8, |acc, &c| Gf256::mul(acc, x) ^ c)
            })
            .collect()
    }

    /// Berlekamp-Massey; returns the locator lowest degree first
    fn error_locator(syndrome: &[u8]) -> Vec<u8> {
        let mut sigma = vec![1u8];
        let mut prev = vec![1u8];
        let mut prev_delta = 1u8;
        let mut l = 0usize;
        let mut m = 1usize;

        for i in 0..syndrome.len() {
            let mut delta = syndrome[i];
            for j in 1..=l.min(sigma.len() - 1) {
                delta ^= Gf256::mul(sigma[j], syndrome[i - j]);
            }

            if delta == 0 {
                m += 1;
                continue;
            }

            let snapshot = sigma.clone();
            let factor = Gf256::div(delta, prev_delta);
            if sigma.len() < prev.len() + m {
                sigma.resize(prev.len() + m, 0);
            }
            for (j, &b) in prev.iter().enumerate() {
                sigma[j + m] ^= Gf256::mul(factor, b);
            }

            if 2 * l <= i {
                prev = snapshot;
                prev_delta = delta;
                l = i + 1 - l;
                m = 1;
            } else {
                m += 1;
            }
        }

        sigma
    }
}
