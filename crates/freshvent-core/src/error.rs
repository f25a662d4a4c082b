//! Error types for freshvent-core.
//!
//! This module defines all error types that can occur when talking to a
//! fan over Bluetooth Low Energy.
//!
//! # Retry classification
//!
//! The snapshot reader retries whole-session attempts, so every variant
//! carries a retry classification via [`Error::is_retryable`]:
//!
//! | Error | Retryable | Rationale |
//! |-------|-----------|-----------|
//! | [`Error::Bluetooth`] | yes | Generic BLE errors are often transient |
//! | [`Error::ConnectFailed`] | yes | Device may be busy or waking up |
//! | [`Error::ConnectTimeout`] | yes | RF congestion |
//! | [`Error::Disconnected`] | yes | Reconnect and try again |
//! | [`Error::WriteFailed`] | yes | BLE writes can fail transiently |
//! | [`Error::Timeout`] | yes | Per-operation BLE timeout |
//! | [`Error::NotConnected`] | no | Call sequencing bug, retrying repeats it |
//! | [`Error::UpdateTimeout`] | no | The whole budget was already spent |
//! | [`Error::CharacteristicNotFound`] | no | Handled per field, not per session |
//! | [`Error::AuthenticationFailed`] | no | Wrong code stays wrong |
//! | [`Error::UnsupportedDevice`] | no | Wrong device family |
//! | [`Error::Parse`] | no | Wrong wire layout means wrong firmware |

use std::time::Duration;

use thiserror::Error;

use freshvent_types::ParseError;

/// Errors that can occur when communicating with a fan.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error
/// variants in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Bluetooth Low Energy error.
    #[error("Bluetooth error: {0}")]
    Bluetooth(#[from] btleplug::Error),

    /// The transport could not establish a connection.
    #[error("connection to {identity} failed: {reason}")]
    ConnectFailed {
        /// The device identity that failed to connect.
        identity: String,
        /// The transport's reason for the failure.
        reason: String,
    },

    /// The connection attempt did not complete within its deadline.
    #[error("connection to {identity} timed out after {duration:?}")]
    ConnectTimeout {
        /// The device identity that failed to connect.
        identity: String,
        /// The timeout that expired.
        duration: Duration,
    },

    /// Operation attempted on a session that is not open.
    #[error("not connected to device")]
    NotConnected,

    /// The device disconnected while an operation was in flight.
    #[error("device disconnected")]
    Disconnected,

    /// Required BLE characteristic not found on this device.
    #[error("characteristic not found: {uuid}")]
    CharacteristicNotFound {
        /// The UUID that was not found.
        uuid: uuid::Uuid,
    },

    /// A single transport operation timed out.
    #[error("operation '{operation}' timed out after {duration:?}")]
    Timeout {
        /// The operation that timed out.
        operation: String,
        /// The timeout that expired.
        duration: Duration,
    },

    /// The whole snapshot update ran out of its wall-clock budget.
    #[error("snapshot update timed out after {duration:?}")]
    UpdateTimeout {
        /// The update budget that expired.
        duration: Duration,
    },

    /// Writing the authentication code failed.
    #[error("authentication failed: {reason}")]
    AuthenticationFailed {
        /// The underlying failure.
        reason: String,
    },

    /// The connected device is not an Intellivent fan.
    #[error("unsupported device: {model}")]
    UnsupportedDevice {
        /// What the device reported itself as.
        model: String,
    },

    /// Write operation failed.
    #[error("write failed to characteristic {uuid}: {reason}")]
    WriteFailed {
        /// The characteristic UUID.
        uuid: uuid::Uuid,
        /// The reason for the failure.
        reason: String,
    },

    /// Failed to decode data received from the device.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl Error {
    /// Create a per-operation timeout error.
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a connection failure.
    pub fn connect_failed(identity: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConnectFailed {
            identity: identity.into(),
            reason: reason.into(),
        }
    }

    /// Whether a whole-session retry can plausibly clear this error.
    ///
    /// Used by the snapshot reader's retry loop; see the module docs for
    /// the full table.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Bluetooth(_)
            | Error::ConnectFailed { .. }
            | Error::ConnectTimeout { .. }
            | Error::Disconnected
            | Error::WriteFailed { .. }
            | Error::Timeout { .. } => true,
            Error::NotConnected
            | Error::UpdateTimeout { .. }
            | Error::CharacteristicNotFound { .. }
            | Error::AuthenticationFailed { .. }
            | Error::UnsupportedDevice { .. }
            | Error::Parse(_) => false,
        }
    }
}

/// Result type alias using freshvent-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::connect_failed("AA:BB:CC:DD:EE:FF", "out of range");
        assert!(err.to_string().contains("AA:BB:CC:DD:EE:FF"));
        assert!(err.to_string().contains("out of range"));

        let err = Error::NotConnected;
        assert_eq!(err.to_string(), "not connected to device");

        let err = Error::timeout("read sensors", Duration::from_secs(10));
        assert!(err.to_string().contains("read sensors"));
        assert!(err.to_string().contains("10s"));
    }

    #[test]
    fn test_retry_classification() {
        assert!(Error::Disconnected.is_retryable());
        assert!(Error::connect_failed("x", "busy").is_retryable());
        assert!(
            Error::ConnectTimeout {
                identity: "x".to_string(),
                duration: Duration::from_secs(5),
            }
            .is_retryable()
        );
        assert!(Error::timeout("read", Duration::from_secs(5)).is_retryable());

        assert!(!Error::NotConnected.is_retryable());
        assert!(
            !Error::UpdateTimeout {
                duration: Duration::from_secs(30)
            }
            .is_retryable()
        );
        assert!(
            !Error::AuthenticationFailed {
                reason: "write rejected".to_string()
            }
            .is_retryable()
        );
        assert!(
            !Error::UnsupportedDevice {
                model: "LYWSD03MMC".to_string()
            }
            .is_retryable()
        );
        assert!(
            !Error::Parse(ParseError::LengthMismatch {
                expected: 15,
                actual: 9
            })
            .is_retryable()
        );
    }

    #[test]
    fn test_parse_error_conversion() {
        let parse = ParseError::LengthMismatch {
            expected: 5,
            actual: 2,
        };
        let err: Error = parse.into();
        assert!(matches!(err, Error::Parse(_)));
        assert!(err.to_string().contains("exactly 5"));
    }
}
