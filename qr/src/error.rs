//! Error type shared by every stage of the encoder.

use thiserror::Error;

/// Errors returned by the encoder.
///
/// Every variant is fatal for the `encode` call that produced it: no partial
/// symbol is ever returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QrError {
    /// The segment does not fit even a version 40 symbol at the requested level.
    #[error("data too large for QR code: needs {required_bits} bits, version 40 holds {capacity_bits}")]
    CapacityExceeded {
        required_bits: usize,
        capacity_bits: usize,
    },

    /// The bit stream overflowed the data capacity of the chosen version.
    #[error("code length overflow: {bits} bits > {capacity_bits} bits")]
    DataOverflow { bits: usize, capacity_bits: usize },

    /// A version number outside 1..=40.
    #[error("invalid QR version {0} (expected 1..=40)")]
    InvalidVersion(u8),

    /// A mask pattern id outside 0..=7.
    #[error("invalid mask pattern {0} (expected 0..=7)")]
    InvalidMaskPattern(u8),

    /// An error correction level name other than L, M, Q or H.
    #[error("invalid error correction level {0:?} (expected L, M, Q or H)")]
    InvalidErrorCorrectionLevel(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, QrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_message_names_both_sizes() {
        let err = QrError::CapacityExceeded {
            required_bits: 30000,
            capacity_bits: 18672,
        };
        let msg = err.to_string();
        assert!(msg.contains("30000"));
        assert!(msg.contains("18672"));
    }

    #[test]
    fn invalid_level_message_quotes_input() {
        let err = QrError::InvalidErrorCorrectionLevel("X".to_string());
        assert_eq!(
            err.to_string(),
            "invalid error correction level \"X\" (expected L, M, Q or H)"
        );
    }
}
