//! Symbol versions, error correction levels and the fixed capacity tables.
//!
//! Everything in this module is a lookup over constants from ISO/IEC 18004:
//! the Reed-Solomon block structure (Table 9) and the alignment pattern
//! centres (Annex E). The capacity planner at the bottom picks the smallest
//! version whose data capacity holds a given segment.

use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::bits::ByteSegment;
use crate::error::{QrError, Result};

/// QR Code error correction levels.
///
/// Higher levels can recover more damage but require more space.
/// The percentages indicate how much of the code can be damaged
/// while still being readable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCorrectionLevel {
    /// Low: ~7% error recovery.
    L = 0,
    /// Medium: ~15% error recovery. Used by [`crate::encode`].
    #[default]
    M = 1,
    /// Quartile: ~25% error recovery.
    Q = 2,
    /// High: ~30% error recovery.
    H = 3,
}

impl ErrorCorrectionLevel {
    /// Get the format info indicator bits for this EC level.
    ///
    /// Per ISO 18004:2015 Table C.1, the 2-bit indicators are:
    /// - L = 01
    /// - M = 00
    /// - Q = 11
    /// - H = 10
    ///
    /// Note: This encoding differs from the natural enum ordering.
    pub(crate) fn format_info_bits(self) -> u32 {
        match self {
            ErrorCorrectionLevel::L => 0b01,
            ErrorCorrectionLevel::M => 0b00,
            ErrorCorrectionLevel::Q => 0b11,
            ErrorCorrectionLevel::H => 0b10,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCorrectionLevel::L => "L",
            ErrorCorrectionLevel::M => "M",
            ErrorCorrectionLevel::Q => "Q",
            ErrorCorrectionLevel::H => "H",
        }
    }
}

impl fmt::Display for ErrorCorrectionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ErrorCorrectionLevel {
    type Err = QrError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "L" => Ok(ErrorCorrectionLevel::L),
            "M" => Ok(ErrorCorrectionLevel::M),
            "Q" => Ok(ErrorCorrectionLevel::Q),
            "H" => Ok(ErrorCorrectionLevel::H),
            _ => Err(QrError::InvalidErrorCorrectionLevel(s.to_string())),
        }
    }
}

/// A QR symbol version (1-40). Determines size: `version * 4 + 17` modules per side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version(u8);

impl Version {
    pub const MIN: Version = Version(1);
    pub const MAX: Version = Version(40);

    pub fn new(number: u8) -> Result<Self> {
        if (1..=40).contains(&number) {
            Ok(Version(number))
        } else {
            Err(QrError::InvalidVersion(number))
        }
    }

    pub fn number(self) -> u8 {
        self.0
    }

    /// Modules per side.
    pub fn size(self) -> usize {
        self.0 as usize * 4 + 17
    }

    /// Width of the character count field for byte mode.
    ///
    /// Versions 1-9: 8 bits, 10-26: 16 bits, 27-40: 16 bits.
    pub fn char_count_bits(self) -> usize {
        match self.0 {
            1..=9 => 8,
            10..=26 => 16,
            _ => 16,
        }
    }

    /// Centre coordinates of the alignment patterns, used for both rows and columns.
    pub fn alignment_positions(self) -> &'static [usize] {
        ALIGNMENT_POSITIONS[self.0 as usize - 1]
    }

    /// The Reed-Solomon blocks of this version at `ecl`, in transmission order.
    pub fn rs_blocks(self, ecl: ErrorCorrectionLevel) -> Vec<RsBlock> {
        let entry = RS_BLOCK_TABLE[(self.0 as usize - 1) * 4 + ecl as usize];
        entry
            .chunks_exact(3)
            .flat_map(|group| {
                let block = RsBlock {
                    total_count: group[1] as usize,
                    data_count: group[2] as usize,
                };
                std::iter::repeat_n(block, group[0] as usize)
            })
            .collect()
    }

    /// Total data codewords across all blocks.
    pub fn data_codewords(self, ecl: ErrorCorrectionLevel) -> usize {
        self.rs_blocks(ecl).iter().map(|b| b.data_count).sum()
    }

    /// Total codewords (data + error correction) of the symbol.
    pub fn total_codewords(self, ecl: ErrorCorrectionLevel) -> usize {
        self.rs_blocks(ecl).iter().map(|b| b.total_count).sum()
    }

    pub(crate) fn all() -> impl Iterator<Item = Version> {
        (Self::MIN.0..=Self::MAX.0).map(Version)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One Reed-Solomon block: `total_count` codewords of which `data_count` carry data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RsBlock {
    pub total_count: usize,
    pub data_count: usize,
}

impl RsBlock {
    /// Error correction codewords, also the generator polynomial degree.
    pub fn ec_count(&self) -> usize {
        self.total_count - self.data_count
    }
}

/// Bits needed by a byte-mode stream of `len` bytes, before terminator and padding.
pub(crate) fn required_bits(len: usize, version: Version) -> usize {
    4 + version.char_count_bits() + 8 * len
}

/// Find the minimum QR version that can hold the segment.
pub fn select_version(segment: &ByteSegment, ecl: ErrorCorrectionLevel) -> Result<Version> {
    for version in Version::all() {
        let required = required_bits(segment.len(), version);
        let capacity = version.data_codewords(ecl) * 8;
        if required <= capacity {
            debug!(
                "selected version {} for {} bytes at level {} ({}/{} bits)",
                version,
                segment.len(),
                ecl,
                required,
                capacity
            );
            return Ok(version);
        }
    }

    Err(QrError::CapacityExceeded {
        required_bits: required_bits(segment.len(), Version::MAX),
        capacity_bits: Version::MAX.data_codewords(ecl) * 8,
    })
}

/// Alignment pattern centres per version, ISO 18004:2015 Annex E.
static ALIGNMENT_POSITIONS: [&[usize]; 40] = [
    &[],
    &[6, 18],
    &[6, 22],
    &[6, 26],
    &[6, 30],
    &[6, 34],
    &[6, 22, 38],
    &[6, 24, 42],
    &[6, 26, 46],
    &[6, 28, 50],
    &[6, 30, 54],
    &[6, 32, 58],
    &[6, 34, 62],
    &[6, 26, 46, 66],
    &[6, 26, 48, 70],
    &[6, 26, 50, 74],
    &[6, 30, 54, 78],
    &[6, 30, 56, 82],
    &[6, 30, 58, 86],
    &[6, 34, 62, 90],
    &[6, 28, 50, 72, 94],
    &[6, 26, 50, 74, 98],
    &[6, 30, 54, 78, 102],
    &[6, 28, 54, 80, 106],
    &[6, 32, 58, 84, 110],
    &[6, 30, 58, 86, 114],
    &[6, 34, 62, 90, 118],
    &[6, 26, 50, 74, 98, 122],
    &[6, 30, 54, 78, 102, 126],
    &[6, 26, 52, 78, 104, 130],
    &[6, 30, 56, 82, 108, 134],
    &[6, 34, 60, 86, 112, 138],
    &[6, 30, 58, 86, 114, 142],
    &[6, 34, 62, 90, 118, 146],
    &[6, 30, 54, 78, 102, 126, 150],
    &[6, 24, 50, 76, 102, 128, 154],
    &[6, 28, 54, 80, 106, 132, 158],
    &[6, 32, 58, 84, 110, 136, 162],
    &[6, 26, 54, 82, 110, 138, 166],
    &[6, 30, 58, 86, 114, 142, 170],
];

/// Reed-Solomon block structure, ISO 18004:2015 Table 9.
///
/// Four rows per version in L, M, Q, H order. Each row is a list of
/// `(block count, total codewords, data codewords)` groups.
static RS_BLOCK_TABLE: [&[u16]; 160] = [
    // Version 1
    &[1, 26, 19],
    &[1, 26, 16],
    &[1, 26, 13],
    &[1, 26, 9],
    // Version 2
    &[1, 44, 34],
    &[1, 44, 28],
    &[1, 44, 22],
    &[1, 44, 16],
    // Version 3
    &[1, 70, 55],
    &[1, 70, 44],
    &[2, 35, 17],
    &[2, 35, 13],
    // Version 4
    &[1, 100, 80],
    &[2, 50, 32],
    &[2, 50, 24],
    &[4, 25, 9],
    // Version 5
    &[1, 134, 108],
    &[2, 67, 43],
    &[2, 33, 15, 2, 34, 16],
    &[2, 33, 11, 2, 34, 12],
    // Version 6
    &[2, 86, 68],
    &[4, 43, 27],
    &[4, 43, 19],
    &[4, 43, 15],
    // Version 7
    &[2, 98, 78],
    &[4, 49, 31],
    &[2, 32, 14, 4, 33, 15],
    &[4, 39, 13, 1, 40, 14],
    // Version 8
    &[2, 121, 97],
    &[2, 60, 38, 2, 61, 39],
    &[4, 40, 18, 2, 41, 19],
    &[4, 40, 14, 2, 41, 15],
    // Version 9
    &[2, 146, 116],
    &[3, 58, 36, 2, 59, 37],
    &[4, 36, 16, 4, 37, 17],
    &[4, 36, 12, 4, 37, 13],
    // Version 10
    &[2, 86, 68, 2, 87, 69],
    &[4, 69, 43, 1, 70, 44],
    &[6, 43, 19, 2, 44, 20],
    &[6, 43, 15, 2, 44, 16],
    // Version 11
    &[4, 101, 81],
    &[1, 80, 50, 4, 81, 51],
    &[4, 50, 22, 4, 51, 23],
    &[3, 36, 12, 8, 37, 13],
    // Version 12
    &[2, 116, 92, 2, 117, 93],
    &[6, 58, 36, 2, 59, 37],
    &[4, 46, 20, 6, 47, 21],
    &[7, 42, 14, 4, 43, 15],
    // Version 13
    &[4, 133, 107],
    &[8, 59, 37, 1, 60, 38],
    &[8, 44, 20, 4, 45, 21],
    &[12, 33, 11, 4, 34, 12],
    // Version 14
    &[3, 145, 115, 1, 146, 116],
    &[4, 64, 40, 5, 65, 41],
    &[11, 36, 16, 5, 37, 17],
    &[11, 36, 12, 5, 37, 13],
    // Version 15
    &[5, 109, 87, 1, 110, 88],
    &[5, 65, 41, 5, 66, 42],
    &[5, 54, 24, 7, 55, 25],
    &[11, 36, 12, 7, 37, 13],
    // Version 16
    &[5, 122, 98, 1, 123, 99],
    &[7, 73, 45, 3, 74, 46],
    &[15, 43, 19, 2, 44, 20],
    &[3, 45, 15, 13, 46, 16],
    // Version 17
    &[1, 135, 107, 5, 136, 108],
    &[10, 74, 46, 1, 75, 47],
    &[1, 50, 22, 15, 51, 23],
    &[2, 42, 14, 17, 43, 15],
    // Version 18
    &[5, 150, 120, 1, 151, 121],
    &[9, 69, 43, 4, 70, 44],
    &[17, 50, 22, 1, 51, 23],
    &[2, 42, 14, 19, 43, 15],
    // Version 19
    &[3, 141, 113, 4, 142, 114],
    &[3, 70, 44, 11, 71, 45],
    &[17, 47, 21, 4, 48, 22],
    &[9, 39, 13, 16, 40, 14],
    // Version 20
    &[3, 135, 107, 5, 136, 108],
    &[3, 67, 41, 13, 68, 42],
    &[15, 54, 24, 5, 55, 25],
    &[15, 43, 15, 10, 44, 16],
    // Version 21
    &[4, 144, 116, 4, 145, 117],
    &[17, 68, 42],
    &[17, 50, 22, 6, 51, 23],
    &[19, 46, 16, 6, 47, 17],
    // Version 22
    &[2, 139, 111, 7, 140, 112],
    &[17, 74, 46],
    &[7, 54, 24, 16, 55, 25],
    &[34, 37, 13],
    // Version 23
    &[4, 151, 121, 5, 152, 122],
    &[4, 75, 47, 14, 76, 48],
    &[11, 54, 24, 14, 55, 25],
    &[16, 45, 15, 14, 46, 16],
    // Version 24
    &[6, 147, 117, 4, 148, 118],
    &[6, 73, 45, 14, 74, 46],
    &[11, 54, 24, 16, 55, 25],
    &[30, 46, 16, 2, 47, 17],
    // Version 25
    &[8, 132, 106, 4, 133, 107],
    &[8, 75, 47, 13, 76, 48],
    &[7, 54, 24, 22, 55, 25],
    &[22, 45, 15, 13, 46, 16],
    // Version 26
    &[10, 142, 114, 2, 143, 115],
    &[19, 74, 46, 4, 75, 47],
    &[28, 50, 22, 6, 51, 23],
    &[33, 46, 16, 4, 47, 17],
    // Version 27
    &[8, 152, 122, 4, 153, 123],
    &[22, 73, 45, 3, 74, 46],
    &[8, 53, 23, 26, 54, 24],
    &[12, 45, 15, 28, 46, 16],
    // Version 28
    &[3, 147, 117, 10, 148, 118],
    &[3, 73, 45, 23, 74, 46],
    &[4, 54, 24, 31, 55, 25],
    &[11, 45, 15, 31, 46, 16],
    // Version 29
    &[7, 146, 116, 7, 147, 117],
    &[21, 73, 45, 7, 74, 46],
    &[1, 53, 23, 37, 54, 24],
    &[19, 45, 15, 26, 46, 16],
    // Version 30
    &[5, 145, 115, 10, 146, 116],
    &[19, 75, 47, 10, 76, 48],
    &[15, 54, 24, 25, 55, 25],
    &[23, 45, 15, 25, 46, 16],
    // Version 31
    &[13, 145, 115, 3, 146, 116],
    &[2, 74, 46, 29, 75, 47],
    &[42, 54, 24, 1, 55, 25],
    &[23, 45, 15, 28, 46, 16],
    // Version 32
    &[17, 145, 115],
    &[10, 74, 46, 23, 75, 47],
    &[10, 54, 24, 35, 55, 25],
    &[19, 45, 15, 35, 46, 16],
    // Version 33
    &[17, 145, 115, 1, 146, 116],
    &[14, 74, 46, 21, 75, 47],
    &[29, 54, 24, 19, 55, 25],
    &[11, 45, 15, 46, 46, 16],
    // Version 34
    &[13, 145, 115, 6, 146, 116],
    &[14, 74, 46, 23, 75, 47],
    &[44, 54, 24, 7, 55, 25],
    &[59, 46, 16, 1, 47, 17],
    // Version 35
    &[12, 151, 121, 7, 152, 122],
    &[12, 75, 47, 26, 76, 48],
    &[39, 54, 24, 14, 55, 25],
    &[22, 45, 15, 41, 46, 16],
    // Version 36
    &[6, 151, 121, 14, 152, 122],
    &[6, 75, 47, 34, 76, 48],
    &[46, 54, 24, 10, 55, 25],
    &[2, 45, 15, 64, 46, 16],
    // Version 37
    &[17, 152, 122, 4, 153, 123],
    &[29, 74, 46, 14, 75, 47],
    &[49, 54, 24, 10, 55, 25],
    &[24, 45, 15, 46, 46, 16],
    // Version 38
    &[4, 152, 122, 18, 153, 123],
    &[13, 74, 46, 32, 75, 47],
    &[48, 54, 24, 14, 55, 25],
    &[42, 45, 15, 32, 46, 16],
    // Version 39
    &[20, 147, 117, 4, 148, 118],
    &[40, 75, 47, 7, 76, 48],
    &[43, 54, 24, 22, 55, 25],
    &[10, 45, 15, 67, 46, 16],
    // Version 40
    &[19, 148, 118, 6, 149, 119],
    &[18, 75, 47, 31, 76, 48],
    &[34, 54, 24, 34, 55, 25],
    &[20, 45, 15, 61, 46, 16],
];
