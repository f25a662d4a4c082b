//! Error types for data parsing in freshvent-types.

use thiserror::Error;

/// Errors that can occur when encoding or decoding fan protocol records.
///
/// This error type is platform-agnostic and does not include
/// BLE-specific errors (those belong in freshvent-core).
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    /// A record buffer was not exactly the record's fixed wire width.
    ///
    /// The characteristic table is fixed per device family, so a wrong
    /// length means the wrong device or an incompatible firmware, not a
    /// transient fault.
    #[error("length need to be exactly {expected}, was {actual}")]
    LengthMismatch {
        /// The record's fixed wire width.
        expected: usize,
        /// The length that was actually supplied.
        actual: usize,
    },

    /// A detection label was not one of Low, Medium or High.
    #[error("\"{0}\" is not a valid detection level; valid levels are Low, Medium and High")]
    InvalidDetectionLabel(String),

    /// An authentication code input was malformed.
    #[error("invalid authentication code: {0}")]
    InvalidAuthCode(String),

    /// The device handed out the all-zero authentication code, which it
    /// does when it is not in pairing mode.
    #[error("fan was not in pairing mode")]
    NotInPairingMode,
}

/// Result type alias using freshvent-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
