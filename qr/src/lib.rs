//! # QR Matrix
//!
//! A QR code symbol encoder implementing **ISO/IEC 18004:2015** in byte mode.
//!
//! Text goes in, a square matrix of dark/light modules comes out, together with
//! the module count and a cell size fitted to a target pixel size. Drawing is
//! left to the caller; the optional `render` feature adds SVG and terminal output.
//!
//! ## Specification Reference
//!
//! - Section 6: Symbol structure (finder patterns, timing, alignment)
//! - Section 7: Data encoding (byte mode, character count indicators)
//! - Section 8: Error correction (Reed-Solomon codes over GF(2^8))
//! - Section 9: Codeword placement (zigzag pattern)
//! - Section 10: Data masking (8 mask patterns, penalty scoring)
//! - Annex C: Format and version information encoding
//!
//! ## Library Organization
//!
//! ```text
//! lib.rs
//! +-- Public API
//! |   +-- encode()                 Entry point: text + pixel size -> EncodedQr (level M)
//! |   +-- encode_with_options()    Same, with EncodeOptions
//! |   +-- QrCode::encode()         Full symbol with version, mask, penalty
//! |
//! +-- bits.rs (Section 7)
//! |   +-- ByteSegment              Text -> 8-bit bytes
//! |   +-- BitBuffer                Accumulate bits MSB first
//! |   +-- build_data_codewords()   Mode, count, data, terminator, padding
//! |
//! +-- version.rs
//! |   +-- Version                  1..=40, size 4v+17
//! |   +-- select_version()         Smallest version holding the segment
//! |   +-- RS block table           Fixed 40 x 4 block layout
//! |
//! +-- reed_solomon.rs (Section 8)
//! |   +-- GF256                    log/exp tables, built at compile time
//! |   +-- Polynomial               multiply, modulo
//! |   +-- add_error_correction()   EC codewords per block, interleaved
//! |
//! +-- matrix.rs (Section 6, 9, Annex C)
//! |   +-- Grid / Module            Tri-state module grid
//! |   +-- place()                  Function patterns, format/version info, data
//! |
//! +-- mask.rs (Section 10)
//!     +-- MaskPattern              The eight mask formulas
//!     +-- PenaltyScore             Four-rule penalty
//!     +-- select_best_mask()       Try all masks, keep the lowest penalty
//! ```
//!
//! ## Example Usage
//!
//! ```
//! let qr = qr_matrix::encode("https://example.com", 120).unwrap();
//! assert_eq!(qr.module_count, 25);
//! assert_eq!(qr.cell_size_pixels, 4);
//! assert!(qr.modules[0][0]);
//! ```

pub mod bits;
pub mod error;
pub mod mask;
pub mod matrix;
pub mod reed_solomon;
#[cfg(feature = "render")]
pub mod render;
pub mod version;

use serde::{Deserialize, Serialize};

pub use bits::ByteSegment;
pub use error::{QrError, Result};
pub use mask::{MaskPattern, PenaltyScore};
pub use matrix::{Grid, Module};
pub use version::{ErrorCorrectionLevel, Version};

/// Pixel size used when no target is given.
pub const DEFAULT_TARGET_PIXEL_SIZE: u32 = 120;

/// How text is turned into bytes for the byte-mode segment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextEncoding {
    /// Low 8 bits of each UTF-16 code unit. Exact for Latin-1 text.
    #[default]
    CodeUnit,
    /// UTF-8 bytes.
    Utf8,
}

impl TextEncoding {
    pub fn segment(self, text: &str) -> ByteSegment {
        match self {
            TextEncoding::CodeUnit => ByteSegment::from_text(text),
            TextEncoding::Utf8 => ByteSegment::from_utf8(text),
        }
    }
}

/// Encoder settings. Missing fields take their defaults when deserialized.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EncodeOptions {
    pub error_correction: ErrorCorrectionLevel,
    pub target_pixel_size: u32,
    pub text_encoding: TextEncoding,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            error_correction: ErrorCorrectionLevel::M,
            target_pixel_size: DEFAULT_TARGET_PIXEL_SIZE,
            text_encoding: TextEncoding::CodeUnit,
        }
    }
}

/// A finished, masked QR symbol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QrCode {
    grid: Grid,
    version: Version,
    error_correction: ErrorCorrectionLevel,
    mask: MaskPattern,
    /// Interleaved data and EC codewords, as placed in the grid.
    codewords: Vec<u8>,
}

impl QrCode {
    /// Encode `text` one byte per UTF-16 code unit.
    ///
    /// Selects the smallest version that holds the data at `ecl`.
    pub fn encode(text: &str, ecl: ErrorCorrectionLevel) -> Result<Self> {
        Self::from_segment(&ByteSegment::from_text(text), ecl)
    }

    pub fn from_segment(segment: &ByteSegment, ecl: ErrorCorrectionLevel) -> Result<Self> {
        // Step 1: Determine the minimum version needed
        let version = version::select_version(segment, ecl)?;

        // Step 2: Encode data into codewords
        let data_codewords = bits::build_data_codewords(segment, version, ecl)?;

        // Step 3: Add error correction
        let codewords = reed_solomon::add_error_correction(&data_codewords, version, ecl);

        // Step 4: Place everything under each mask and keep the best
        let (grid, mask) = mask::select_best_mask(&codewords, version, ecl);

        Ok(Self {
            grid,
            version,
            error_correction: ecl,
            mask,
            codewords,
        })
    }

    /// Modules per side.
    pub fn size(&self) -> usize {
        self.grid.size()
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn error_correction(&self) -> ErrorCorrectionLevel {
        self.error_correction
    }

    pub fn mask(&self) -> MaskPattern {
        self.mask
    }

    /// Get the module value at (row, col). true = dark.
    ///
    /// Panics outside the symbol.
    pub fn is_dark(&self, row: usize, col: usize) -> bool {
        self.grid.is_dark(row, col)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<bool> {
        self.grid.get(row, col).map(Module::is_dark)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn to_rows(&self) -> Vec<Vec<bool>> {
        self.grid.to_rows()
    }

    pub fn penalty(&self) -> PenaltyScore {
        PenaltyScore::of(&self.grid)
    }

    pub fn codewords(&self) -> &[u8] {
        &self.codewords
    }
}

/// Module matrix sized for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedQr {
    /// `modules[row][col]`, true = dark.
    pub modules: Vec<Vec<bool>>,
    pub module_count: usize,
    pub cell_size_pixels: u32,
}

impl EncodedQr {
    pub fn from_code(code: &QrCode, target_pixel_size: u32) -> Self {
        let module_count = code.size();
        Self {
            modules: code.to_rows(),
            module_count,
            cell_size_pixels: cell_size(target_pixel_size, module_count),
        }
    }

    /// Side length in pixels, `cell_size_pixels * module_count`.
    pub fn rendered_size(&self) -> u32 {
        self.cell_size_pixels * self.module_count as u32
    }
}

/// Largest whole cell size that fits `target` pixels, never below one.
fn cell_size(target: u32, module_count: usize) -> u32 {
    (target / module_count as u32).max(1)
}

/// Encode `text` at level M and fit the cells to `target_pixel_size`.
pub fn encode(text: &str, target_pixel_size: u32) -> Result<EncodedQr> {
    encode_with_options(
        text,
        &EncodeOptions {
            target_pixel_size,
            ..EncodeOptions::default()
        },
    )
}

pub fn encode_with_options(text: &str, options: &EncodeOptions) -> Result<EncodedQr> {
    let segment = options.text_encoding.segment(text);
    let code = QrCode::from_segment(&segment, options.error_correction)?;
    Ok(EncodedQr::from_code(&code, options.target_pixel_size))
}
