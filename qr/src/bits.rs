//! Data encoding: byte segments and the padded data bit stream.
//!
//! The encoding format is:
//! - Mode indicator (4 bits): 0100 for byte mode
//! - Character count (8 or 16 bits depending on version)
//! - Data bytes
//! - Terminator (up to 4 zero bits)
//! - Pad to byte boundary
//! - Pad codewords (0xEC, 0x11 alternating)

use crate::error::{QrError, Result};
use crate::version::{ErrorCorrectionLevel, Version};

/// Mode indicator for 8-bit byte data.
pub const MODE_BYTE: u32 = 0b0100;

const PAD_CODEWORDS: [u8; 2] = [0xEC, 0x11];

/// Bit buffer for accumulating bits before converting to bytes.
///
/// Bits are packed MSB first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BitBuffer {
    bytes: Vec<u8>,
    len: usize,
}

impl BitBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the low `count` bits of `value`, most significant first.
    pub fn put(&mut self, value: u32, count: usize) {
        debug_assert!(count <= 32);
        for i in (0..count).rev() {
            self.put_bit((value >> i) & 1 == 1);
        }
    }

    pub fn put_bit(&mut self, bit: bool) {
        let byte_idx = self.len / 8;
        if self.bytes.len() <= byte_idx {
            self.bytes.push(0);
        }
        if bit {
            self.bytes[byte_idx] |= 0x80 >> (self.len % 8);
        }
        self.len += 1;
    }

    /// Length in bits.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// An 8-bit byte mode data segment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ByteSegment {
    data: Vec<u8>,
}

impl ByteSegment {
    /// One byte per UTF-16 code unit, keeping the low 8 bits.
    ///
    /// Latin-1 text is carried verbatim; wider characters are truncated.
    pub fn from_text(text: &str) -> Self {
        Self {
            data: text.encode_utf16().map(|unit| unit as u8).collect(),
        }
    }

    /// The UTF-8 encoding of `text`.
    pub fn from_utf8(text: &str) -> Self {
        Self::from_bytes(text.as_bytes())
    }

    pub fn from_bytes(data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }

    /// Byte count, as written in the character count field.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Append the payload bits.
    pub fn write(&self, buffer: &mut BitBuffer) {
        for &byte in &self.data {
            buffer.put(byte as u32, 8);
        }
    }
}

/// Serialize a segment into exactly `version.data_codewords(ecl)` codewords.
pub fn build_data_codewords(
    segment: &ByteSegment,
    version: Version,
    ecl: ErrorCorrectionLevel,
) -> Result<Vec<u8>> {
    let mut bits = BitBuffer::new();

    bits.put(MODE_BYTE, 4);
    bits.put(segment.len() as u32, version.char_count_bits());
    segment.write(&mut bits);

    let capacity_bits = version.data_codewords(ecl) * 8;
    if bits.len() > capacity_bits {
        return Err(QrError::DataOverflow {
            bits: bits.len(),
            capacity_bits,
        });
    }

    // Terminator
    if bits.len() + 4 <= capacity_bits {
        bits.put(0, 4);
    }

    // Pad to byte boundary
    while !bits.len().is_multiple_of(8) {
        bits.put_bit(false);
    }

    // Pad codewords
    let mut codewords = bits.into_bytes();
    let mut pad_idx = 0;
    while codewords.len() * 8 < capacity_bits {
        codewords.push(PAD_CODEWORDS[pad_idx]);
        pad_idx ^= 1;
    }

    Ok(codewords)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(n: u8) -> Version {
        Version::new(n).unwrap()
    }

    #[test]
    fn bit_buffer_packs_msb_first() {
        let mut bits = BitBuffer::new();
        bits.put(0b0100, 4);
        bits.put(0b1, 1);
        assert_eq!(bits.len(), 5);
        assert_eq!(bits.as_bytes(), &[0b0100_1000]);

        bits.put(0xFF, 8);
        assert_eq!(bits.len(), 13);
        assert_eq!(bits.as_bytes(), &[0b0100_1111, 0b1111_1000]);
    }

    #[test]
    fn text_segment_truncates_code_units() {
        assert_eq!(ByteSegment::from_text("Az").data(), b"Az");
        // U+00E9 fits one byte, U+20AC keeps its low byte.
        assert_eq!(ByteSegment::from_text("\u{e9}\u{20ac}").data(), &[0xE9, 0xAC]);
        assert_eq!(ByteSegment::from_utf8("\u{e9}").data(), &[0xC3, 0xA9]);
        assert!(ByteSegment::from_text("").is_empty());
    }

    /// "HELLO" in byte mode should produce:
    /// Mode: 0100, Count: 00000101, Data: 01001000 01000101 01001100 01001100 01001111
    #[test]
    fn test_data_encoding_hello() {
        let segment = ByteSegment::from_text("HELLO");
        let codewords = build_data_codewords(&segment, v(1), ErrorCorrectionLevel::M).unwrap();

        assert_eq!(codewords.len(), 16, "Should have 16 data codewords for v1-M");
        // mode (0100) + first 4 bits of count (0000)
        assert_eq!(codewords[0], 0x40);
        // last 4 bits of count (0101) + first 4 bits of 'H' (0100)
        assert_eq!(codewords[1], 0x54);
        // last 4 bits of 'H' (1000) + first 4 bits of 'E' (0100)
        assert_eq!(codewords[2], 0x84);
        // last 4 bits of 'O' (1111) + terminator (0000)
        assert_eq!(codewords[6], 0xF0);
        assert_eq!(&codewords[7..11], &[0xEC, 0x11, 0xEC, 0x11]);
    }

    #[test]
    fn empty_segment_is_all_padding() {
        let codewords =
            build_data_codewords(&ByteSegment::from_text(""), v(1), ErrorCorrectionLevel::M)
                .unwrap();
        // 0100 | 0000 0000 (count) | 0000 (terminator)
        assert_eq!(&codewords[..2], &[0x40, 0x00]);
        assert_eq!(&codewords[2..4], &[0xEC, 0x11]);
        assert_eq!(codewords.len(), 16);
    }

    #[test]
    fn terminator_fills_last_nibble() {
        // v1-M holds 128 bits: 4 + 8 + 14*8 = 124, leaving 4 for the terminator.
        let segment = ByteSegment::from_bytes(&[0xFF; 14]);
        let codewords = build_data_codewords(&segment, v(1), ErrorCorrectionLevel::M).unwrap();
        assert_eq!(codewords.len(), 16);
        assert_eq!(codewords[15], 0xF0);
    }

    #[test]
    fn sixteen_bit_count_from_version_ten() {
        let segment = ByteSegment::from_bytes(&[0u8; 3]);
        let codewords = build_data_codewords(&segment, v(10), ErrorCorrectionLevel::M).unwrap();
        // 0100 | 0000 0000 0000 0011 | ...
        assert_eq!(&codewords[..3], &[0x40, 0x00, 0x30]);
        assert_eq!(codewords.len(), v(10).data_codewords(ErrorCorrectionLevel::M));
    }

    #[test]
    fn overflow_is_reported() {
        let segment = ByteSegment::from_bytes(&[0u8; 15]);
        assert_eq!(
            build_data_codewords(&segment, v(1), ErrorCorrectionLevel::M),
            Err(QrError::DataOverflow {
                bits: 4 + 8 + 15 * 8,
                capacity_bits: 128,
            })
        );
    }

    #[test]
    fn output_always_fills_capacity() {
        for len in [0usize, 1, 7, 13, 14] {
            let segment = ByteSegment::from_bytes(&vec![0x5A; len]);
            for ecl in [ErrorCorrectionLevel::L, ErrorCorrectionLevel::M] {
                let codewords = build_data_codewords(&segment, v(1), ecl).unwrap();
                assert_eq!(codewords.len(), v(1).data_codewords(ecl));
            }
        }
    }
}
