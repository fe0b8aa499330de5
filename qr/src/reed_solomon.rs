//! Reed-Solomon error correction over GF(2^8).
//!
//! 1. **Generator Polynomial**: for n EC codewords,
//!    g(x) = (x - alpha^0)(x - alpha^1)...(x - alpha^(n-1))
//! 2. **Encoding**: treat the block's data as polynomial coefficients shifted
//!    up by n degrees and divide by g(x). The remainder is the EC codewords.
//! 3. **Interleaving**: data codewords of all blocks column by column, then
//!    EC codewords column by column.

use crate::version::{ErrorCorrectionLevel, Version};

/// GF(2^8) arithmetic with log/antilog tables.
///
/// Elements are polynomials over GF(2) modulo x^8 + x^4 + x^3 + x^2 + 1 (0x11D).
/// Addition is XOR, multiplication is `exp(log(a) + log(b) mod 255)`.
pub struct GF256;

impl GF256 {
    /// Logarithm table (index 1-255 -> exponent). Entry 0 is unused.
    const LOG: [u8; 256] = Self::generate_log_table();

    /// Antilogarithm table (exponent 0-254 -> value)
    const EXP: [u8; 256] = Self::generate_exp_table();

    const fn generate_exp_table() -> [u8; 256] {
        let mut table = [0u8; 256];
        let mut x = 1u16;

        let mut i = 0;
        while i < 255 {
            table[i] = x as u8;
            x <<= 1;
            if x >= 256 {
                x ^= 0x11D;
            }
            i += 1;
        }

        table[255] = table[0];
        table
    }

    const fn generate_log_table() -> [u8; 256] {
        let exp = Self::generate_exp_table();
        let mut table = [0u8; 256];

        let mut i = 0;
        while i < 255 {
            table[exp[i] as usize] = i as u8;
            i += 1;
        }

        table
    }

    /// Discrete logarithm base alpha.
    ///
    /// # Panics
    ///
    /// `log(0)` is undefined and panics.
    pub fn log(n: u8) -> u8 {
        assert!(n != 0, "glog(0) is undefined in GF(2^8)");
        Self::LOG[n as usize]
    }

    /// alpha^n, with the exponent reduced modulo 255.
    pub fn exp(n: usize) -> u8 {
        Self::EXP[n % 255]
    }

    pub fn mul(a: u8, b: u8) -> u8 {
        if a == 0 || b == 0 {
            0
        } else {
            Self::exp(Self::log(a) as usize + Self::log(b) as usize)
        }
    }

    /// # Panics
    ///
    /// Panics when `b` is zero.
    pub fn div(a: u8, b: u8) -> u8 {
        assert!(b != 0, "Cannot divide by zero in GF(2^8)");
        if a == 0 {
            0
        } else {
            Self::exp(Self::log(a) as usize + 255 - Self::log(b) as usize)
        }
    }
}

/// A polynomial over GF(2^8), coefficients highest degree first.
///
/// Leading zero coefficients are stripped on construction, so the first
/// coefficient is non-zero unless the polynomial is empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Polynomial {
    coefficients: Vec<u8>,
}

impl Polynomial {
    /// Build from `coefficients` multiplied by x^shift.
    ///
    /// The zero polynomial is represented with no coefficients at all.
    pub fn new(coefficients: &[u8], shift: usize) -> Self {
        let Some(start) = coefficients.iter().position(|&c| c != 0) else {
            return Self {
                coefficients: Vec::new(),
            };
        };
        let mut coefficients = coefficients[start..].to_vec();
        coefficients.resize(coefficients.len() + shift, 0);
        Self { coefficients }
    }

    pub fn coefficients(&self) -> &[u8] {
        &self.coefficients
    }

    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    pub fn multiply(&self, other: &Polynomial) -> Polynomial {
        if self.is_empty() || other.is_empty() {
            return Polynomial::new(&[], 0);
        }
        let mut product = vec![0u8; self.len() + other.len() - 1];
        for (i, &a) in self.coefficients.iter().enumerate() {
            for (j, &b) in other.coefficients.iter().enumerate() {
                product[i + j] ^= GF256::mul(a, b);
            }
        }
        Polynomial::new(&product, 0)
    }

    /// Remainder of long division by `divisor`.
    ///
    /// # Panics
    ///
    /// Panics when `divisor` is the zero polynomial.
    pub fn modulo(&self, divisor: &Polynomial) -> Polynomial {
        assert!(!divisor.is_empty(), "division by the zero polynomial");
        let lead = divisor.coefficients[0];
        let mut remainder = self.clone();

        while remainder.len() >= divisor.len() {
            let factor = GF256::div(remainder.coefficients[0], lead);
            let mut next = remainder.coefficients;
            for (i, &coef) in divisor.coefficients.iter().enumerate() {
                next[i] ^= GF256::mul(coef, factor);
            }
            remainder = Polynomial::new(&next, 0);
        }

        remainder
    }
}

/// Generator polynomial of the given degree: product of (x - alpha^i).
pub fn generator_polynomial(degree: usize) -> Polynomial {
    (0..degree).fold(Polynomial::new(&[1], 0), |acc, i| {
        acc.multiply(&Polynomial::new(&[1, GF256::exp(i)], 0))
    })
}

/// EC codewords for one block, exactly `generator.len() - 1` bytes.
pub fn ec_codewords(data: &[u8], generator: &Polynomial) -> Vec<u8> {
    let ec_count = generator.len() - 1;
    let remainder = Polynomial::new(data, ec_count).modulo(generator);

    // Left-pad a short remainder with zeros.
    let mut ec = vec![0u8; ec_count - remainder.len()];
    ec.extend_from_slice(remainder.coefficients());
    ec
}

/// Split data codewords into blocks, append EC per block and interleave.
pub fn add_error_correction(data: &[u8], version: Version, ecl: ErrorCorrectionLevel) -> Vec<u8> {
    let blocks = version.rs_blocks(ecl);
    debug_assert_eq!(data.len(), blocks.iter().map(|b| b.data_count).sum::<usize>());

    let ec_per_block = blocks[0].ec_count();
    let generator = generator_polynomial(ec_per_block);

    let mut data_blocks: Vec<&[u8]> = Vec::with_capacity(blocks.len());
    let mut ec_blocks: Vec<Vec<u8>> = Vec::with_capacity(blocks.len());

    let mut offset = 0;
    for block in &blocks {
        let chunk = &data[offset..offset + block.data_count];
        offset += block.data_count;
        ec_blocks.push(ec_codewords(chunk, &generator));
        data_blocks.push(chunk);
    }

    let max_data_len = blocks.iter().map(|b| b.data_count).max().unwrap_or(0);
    let mut result = Vec::with_capacity(version.total_codewords(ecl));

    // Interleave data codewords
    for i in 0..max_data_len {
        for block in &data_blocks {
            if let Some(&byte) = block.get(i) {
                result.push(byte);
            }
        }
    }

    // Interleave EC codewords
    for i in 0..ec_per_block {
        for block in &ec_blocks {
            result.push(block[i]);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_degree_seven() {
        let generator = generator_polynomial(7);
        assert_eq!(
            generator.coefficients(),
            &[1, 127, 122, 154, 164, 11, 68, 117]
        );
    }

    #[test]
    fn generator_degree_ten_in_alpha_exponents() {
        // g(x) = a^0 x^10 + a^251 x^9 + a^67 x^8 + a^46 x^7 + a^61 x^6 + a^118 x^5
        //      + a^70 x^4 + a^64 x^3 + a^94 x^2 + a^32 x + a^45
        let expected: Vec<u8> = [0, 251, 67, 46, 61, 118, 70, 64, 94, 32, 45]
            .iter()
            .map(|&e| GF256::exp(e))
            .collect();
        assert_eq!(generator_polynomial(10).coefficients(), expected.as_slice());
    }

    /// "HELLO WORLD" as 1-M alphanumeric data codewords.
    #[test]
    fn ec_codewords_known_vector() {
        let data = [
            32, 91, 11, 120, 209, 114, 220, 77, 67, 64, 236, 17, 236, 17, 236, 17,
        ];
        let ec = ec_codewords(&data, &generator_polynomial(10));
        assert_eq!(ec, vec![196, 35, 39, 119, 235, 215, 231, 226, 93, 23]);
    }

    #[test]
    fn ec_codewords_of_zero_data_are_zero() {
        let ec = ec_codewords(&[0u8; 16], &generator_polynomial(10));
        assert_eq!(ec, vec![0u8; 10]);
    }

    #[test]
    fn codeword_polynomial_is_divisible_by_generator() {
        let data: Vec<u8> = (0..43u8).map(|i| i.wrapping_mul(37) ^ 0x5A).collect();
        let generator = generator_polynomial(26);
        let ec = ec_codewords(&data, &generator);
        let mut codeword = data.clone();
        codeword.extend_from_slice(&ec);
        assert!(Polynomial::new(&codeword, 0).modulo(&generator).is_empty());
    }

    #[test]
    fn polynomial_strips_leading_zeros_and_shifts() {
        let poly = Polynomial::new(&[0, 0, 3, 0, 5], 2);
        assert_eq!(poly.coefficients(), &[3, 0, 5, 0, 0]);
        assert!(Polynomial::new(&[0, 0], 3).is_empty());
    }

    #[test]
    fn single_block_layout_is_data_then_ec() {
        let version = Version::new(1).unwrap();
        let ecl = ErrorCorrectionLevel::M;
        let data: Vec<u8> = (0..16).collect();
        let out = add_error_correction(&data, version, ecl);
        assert_eq!(out.len(), 26);
        assert_eq!(&out[..16], data.as_slice());
        assert_eq!(&out[16..], ec_codewords(&data, &generator_polynomial(10)).as_slice());
    }

    #[test]
    fn interleaves_uneven_blocks() {
        // 5-Q: two blocks of 15 data codewords, then two of 16; 18 EC each.
        let version = Version::new(5).unwrap();
        let ecl = ErrorCorrectionLevel::Q;
        let data: Vec<u8> = (0..62).collect();
        let out = add_error_correction(&data, version, ecl);
        assert_eq!(out.len(), 134);

        assert_eq!(&out[..4], &[0, 15, 30, 46]);
        assert_eq!(&out[4..8], &[1, 16, 31, 47]);
        // Column 15 only exists in the two long blocks.
        assert_eq!(&out[60..62], &[45, 61]);

        let generator = generator_polynomial(18);
        let ec_first = ec_codewords(&data[..15], &generator);
        let ec_last = ec_codewords(&data[46..], &generator);
        assert_eq!(out[62], ec_first[0]);
        assert_eq!(out[65], ec_last[0]);
        assert_eq!(out[133], ec_last[17]);
    }

    #[test]
    #[should_panic(expected = "glog(0)")]
    fn log_of_zero_panics() {
        GF256::log(0);
    }
}
