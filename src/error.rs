//! Error types for the bool coder.

use thiserror::Error;

/// Error variants for encoding and decoding.
#[derive(Debug, Error)]
pub enum BoolCoderError {
    /// The encoder needed to write a byte past the end of its output buffer.
    #[error("output buffer overflow: all {capacity} bytes are in use")]
    BufferOverflow { capacity: usize },

    /// A probability outside of 0..=255 was supplied.
    #[error("invalid probability: {0}")]
    InvalidProbability(i32),

    /// The debug decoder was asked for a bit with a different probability than the one it was written with.
    #[error("probability mismatch at bit {position}: written with {expected}, read with {actual}")]
    ProbabilityMismatch {
        position: u64,
        expected: u8,
        actual: u8,
    },

    /// An I/O error from the debug coder's serialization.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for bool coder operations.
pub type Result<T> = std::result::Result<T, BoolCoderError>;

/// Validates a probability held in a wider integer before it is handed to a coder.
pub fn checked_probability(value: i32) -> Result<u8> {
    u8::try_from(value).map_err(|_| BoolCoderError::InvalidProbability(value))
}

#[test]
fn probability_bounds() {
    assert_eq!(checked_probability(0).unwrap(), 0);
    assert_eq!(checked_probability(255).unwrap(), 255);

    assert!(matches!(
        checked_probability(256),
        Err(BoolCoderError::InvalidProbability(256))
    ));
    assert!(matches!(
        checked_probability(-1),
        Err(BoolCoderError::InvalidProbability(-1))
    ));
}
