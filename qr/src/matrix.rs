//! Module placement: function patterns, format/version information and the
//! zig-zag data layout.
//!
//! [`place`] is a pure function of `(codewords, version, level, mask)`. It
//! builds a fresh [`Grid`] in a fixed order:
//!
//! 1. finder patterns with their separators
//! 2. alignment patterns
//! 3. timing patterns
//! 4. format information and the dark module
//! 5. version information (version 7+)
//! 6. data bits, XOR'd with the mask
//!
//! Alignment centres that are already taken are skipped, timing modules never
//! overwrite earlier patterns, and data bits only go into cells still
//! [`Module::Unset`].

use crate::mask::MaskPattern;
use crate::version::{ErrorCorrectionLevel, Version};

/// BCH(15,5) generator for format information: x^10 + x^8 + x^5 + x^4 + x^2 + x + 1.
const G15: u32 = 0b101_0011_0111;

/// XOR mask applied to format information so it is never all zero.
const G15_MASK: u32 = 0b101_0100_0001_0010;

/// BCH(18,6) generator for version information.
const G18: u32 = 0b1_1111_0010_0101;

/// One cell of the symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Module {
    /// Not yet written. Only exists while placement is in progress.
    Unset,
    /// Finder, separator, alignment, timing, format or version module. Never masked.
    Function(bool),
    /// Data or error correction module, already masked.
    Data(bool),
}

impl Module {
    pub fn is_dark(self) -> bool {
        matches!(self, Module::Function(true) | Module::Data(true))
    }

    pub fn is_function(self) -> bool {
        matches!(self, Module::Function(_))
    }
}

/// A square grid of modules stored row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    size: usize,
    modules: Vec<Module>,
}

impl Grid {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            modules: vec![Module::Unset; size * size],
        }
    }

    /// A grid of data modules, dark where `dark(row, col)` holds.
    #[cfg(test)]
    pub(crate) fn from_fn(size: usize, dark: impl Fn(usize, usize) -> bool) -> Self {
        let mut grid = Self::new(size);
        for row in 0..size {
            for col in 0..size {
                grid.set(row, col, Module::Data(dark(row, col)));
            }
        }
        grid
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Module> {
        if row < self.size && col < self.size {
            Some(self.modules[row * self.size + col])
        } else {
            None
        }
    }

    /// # Panics
    ///
    /// Panics if `row` or `col` is outside `[0, size)`.
    pub fn module(&self, row: usize, col: usize) -> Module {
        match self.get(row, col) {
            Some(module) => module,
            None => panic!(
                "module ({}, {}) outside {}x{} grid",
                row, col, self.size, self.size
            ),
        }
    }

    /// # Panics
    ///
    /// Panics if `row` or `col` is outside `[0, size)`.
    pub fn is_dark(&self, row: usize, col: usize) -> bool {
        self.module(row, col).is_dark()
    }

    pub fn dark_count(&self) -> usize {
        self.modules.iter().filter(|m| m.is_dark()).count()
    }

    /// Rows of dark flags, top to bottom.
    pub fn to_rows(&self) -> Vec<Vec<bool>> {
        self.modules
            .chunks(self.size)
            .map(|row| row.iter().map(|m| m.is_dark()).collect())
            .collect()
    }

    fn is_unset(&self, row: usize, col: usize) -> bool {
        self.module(row, col) == Module::Unset
    }

    fn set(&mut self, row: usize, col: usize, module: Module) {
        let idx = row * self.size + col;
        self.modules[idx] = module;
    }

    fn set_function(&mut self, row: usize, col: usize, dark: bool) {
        self.set(row, col, Module::Function(dark));
    }

    /// Place a 7x7 finder pattern with its top-left corner at (row, col),
    /// together with the light separator around it where it lies inside the grid.
    ///
    /// ```text
    /// #######
    /// #.....#
    /// #.###.#
    /// #.###.#
    /// #.###.#
    /// #.....#
    /// #######
    /// ```
    fn place_finder_pattern(&mut self, row: usize, col: usize) {
        for dr in -1isize..=7 {
            for dc in -1isize..=7 {
                let r = row as isize + dr;
                let c = col as isize + dc;
                if r < 0 || c < 0 || r >= self.size as isize || c >= self.size as isize {
                    continue;
                }

                let on_ring = (0..=6).contains(&dr)
                    && (0..=6).contains(&dc)
                    && (dr == 0 || dr == 6 || dc == 0 || dc == 6);
                let in_center = (2..=4).contains(&dr) && (2..=4).contains(&dc);
                self.set_function(r as usize, c as usize, on_ring || in_center);
            }
        }
    }

    /// Alignment patterns at every pair of table coordinates whose centre is still free.
    fn place_alignment_patterns(&mut self, version: Version) {
        let positions = version.alignment_positions();

        for &row in positions {
            for &col in positions {
                if !self.is_unset(row, col) {
                    continue;
                }
                self.place_alignment_pattern(row, col);
            }
        }
    }

    /// A single 5x5 alignment pattern centred at (row, col).
    fn place_alignment_pattern(&mut self, center_row: usize, center_col: usize) {
        for dr in 0..5 {
            for dc in 0..5 {
                let is_edge = dr == 0 || dr == 4 || dc == 0 || dc == 4;
                let is_center = dr == 2 && dc == 2;
                self.set_function(center_row + dr - 2, center_col + dc - 2, is_edge || is_center);
            }
        }
    }

    /// Alternating modules on row 6 and column 6 between the finder patterns.
    fn place_timing_patterns(&mut self) {
        for i in 8..self.size - 8 {
            let dark = i.is_multiple_of(2);
            if self.is_unset(i, 6) {
                self.set_function(i, 6, dark);
            }
            if self.is_unset(6, i) {
                self.set_function(6, i, dark);
            }
        }
    }

    /// Both copies of the 15 format bits, plus the dark module.
    fn place_format_info(&mut self, ecl: ErrorCorrectionLevel, mask: MaskPattern) {
        let size = self.size;
        let bits = format_bits(ecl, mask);

        for i in 0..15 {
            let dark = (bits >> i) & 1 == 1;

            // Vertical strip: beside the top-left finder, then the bottom-left one.
            let row = match i {
                0..=5 => i,
                6..=7 => i + 1,
                _ => size - 15 + i,
            };
            self.set_function(row, 8, dark);

            // Horizontal strip: beside the top-right finder, then the top-left one.
            let col = match i {
                0..=7 => size - 1 - i,
                8 => 7,
                _ => 14 - i,
            };
            self.set_function(8, col, dark);
        }

        self.set_function(size - 8, 8, true);
    }

    /// Two 6x3 copies of the 18 version bits, near the top-right and bottom-left finders.
    fn place_version_info(&mut self, version: Version) {
        let size = self.size;
        let bits = version_bits(version);

        for i in 0..18 {
            let dark = (bits >> i) & 1 == 1;
            let a = i / 3;
            let b = size - 11 + i % 3;
            self.set_function(a, b, dark);
            self.set_function(b, a, dark);
        }
    }

    /// Place data bits using the QR code zigzag pattern.
    ///
    /// Data is placed starting from bottom-right, moving up in 2-column
    /// strips, alternating direction. Column 6 (timing pattern) is skipped.
    /// Modules past the end of the codeword stream carry a zero bit.
    fn place_data_bits(&mut self, codewords: &[u8], mask: MaskPattern) {
        let size = self.size;
        let total_bits = codewords.len() * 8;
        let mut bit_idx = 0;

        let mut col = size - 1;
        let mut going_up = true;

        while col > 0 {
            if col == 6 {
                col -= 1;
            }

            for i in 0..size {
                let row = if going_up { size - 1 - i } else { i };
                for c in [col, col - 1] {
                    if !self.is_unset(row, c) {
                        continue;
                    }
                    let bit = bit_idx < total_bits
                        && (codewords[bit_idx / 8] >> (7 - bit_idx % 8)) & 1 == 1;
                    self.set(row, c, Module::Data(bit ^ mask.is_masked(row, c)));
                    bit_idx += 1;
                }
            }

            going_up = !going_up;
            col = col.saturating_sub(2);
        }
    }
}

/// Build the complete symbol for one mask.
pub fn place(
    codewords: &[u8],
    version: Version,
    ecl: ErrorCorrectionLevel,
    mask: MaskPattern,
) -> Grid {
    let size = version.size();
    let mut grid = Grid::new(size);

    grid.place_finder_pattern(0, 0);
    grid.place_finder_pattern(size - 7, 0);
    grid.place_finder_pattern(0, size - 7);
    grid.place_alignment_patterns(version);
    grid.place_timing_patterns();
    grid.place_format_info(ecl, mask);
    if version.number() >= 7 {
        grid.place_version_info(version);
    }
    grid.place_data_bits(codewords, mask);

    grid
}

/// Number of significant bits in `value`.
fn bch_digit(value: u32) -> u32 {
    u32::BITS - value.leading_zeros()
}

/// Remainder of `data * x^(deg generator)` divided by `generator` over GF(2).
fn bch_remainder(data: u32, generator: u32) -> u32 {
    let degree = bch_digit(generator);
    let mut rem = data << (degree - 1);
    while bch_digit(rem) >= degree {
        rem ^= generator << (bch_digit(rem) - degree);
    }
    rem
}

/// BCH(15,5) format information: `[EC level (2)][mask (3)][BCH (10)]` XOR `G15_MASK`.
pub(crate) fn format_bits(ecl: ErrorCorrectionLevel, mask: MaskPattern) -> u32 {
    let data = (ecl.format_info_bits() << 3) | mask.id() as u32;
    ((data << 10) | bch_remainder(data, G15)) ^ G15_MASK
}

/// BCH(18,6) version information: `[version (6)][BCH (12)]`.
pub(crate) fn version_bits(version: Version) -> u32 {
    let data = version.number() as u32;
    (data << 12) | bch_remainder(data, G18)
}
