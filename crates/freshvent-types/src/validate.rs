//! Input validation for values written to the fan.
//!
//! The firmware tolerates out-of-range numeric input by clamping, so the
//! clamp helpers here are total and never fail. Authentication codes are the
//! one input with no sensible clamp and get a fallible parser instead.

use crate::error::ParseError;

/// Lowest rotation speed the fan accepts, in rpm.
pub const MIN_RPM: u16 = 800;

/// Highest rotation speed the fan accepts, in rpm.
pub const MAX_RPM: u16 = 2400;

/// Highest detection level the fan knows about.
pub const MAX_DETECTION: u8 = 3;

/// Clamp a rotation speed into the fan's accepted range.
///
/// # Examples
///
/// ```
/// use freshvent_types::validate::clamp_rpm;
///
/// assert_eq!(clamp_rpm(0), 800);
/// assert_eq!(clamp_rpm(1200), 1200);
/// assert_eq!(clamp_rpm(3000), 2400);
/// ```
#[must_use]
pub fn clamp_rpm(value: u16) -> u16 {
    value.clamp(MIN_RPM, MAX_RPM)
}

/// Clamp a time value (minutes or seconds, depending on the record) into
/// the representable range: negatives become zero, values beyond the wire
/// width saturate.
#[must_use]
pub fn clamp_time(value: i32) -> u16 {
    value.clamp(0, i32::from(u16::MAX)) as u16
}

/// Clamp a raw detection level into the fan's 0..=3 range.
#[must_use]
pub fn clamp_detection(value: u8) -> u8 {
    value.min(MAX_DETECTION)
}

/// A validated 4-byte authentication code.
///
/// The code is handed out by the fan while it is in pairing mode and must
/// be written back on every later connection before mode characteristics
/// accept writes.
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AuthCode([u8; 4]);

impl AuthCode {
    /// Validate a raw 4-byte authentication code.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidAuthCode`] unless the input is exactly
    /// 4 bytes, and [`ParseError::NotInPairingMode`] for the all-zero code,
    /// which the fan reports when it was not put in pairing mode before the
    /// code was fetched.
    pub fn from_bytes(value: &[u8]) -> Result<Self, ParseError> {
        let code: [u8; 4] = value.try_into().map_err(|_| {
            ParseError::InvalidAuthCode(format!(
                "authentication code need to be 4 bytes, was {}",
                value.len()
            ))
        })?;

        if code == [0, 0, 0, 0] {
            return Err(ParseError::NotInPairingMode);
        }

        Ok(Self(code))
    }

    /// Validate an 8-character hex authentication code.
    ///
    /// The hex form is what users copy out of the vendor app, and that app
    /// displays whatever the fan handed out, zeros included, so this path
    /// intentionally skips the pairing-mode check that [`from_bytes`]
    /// applies.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidAuthCode`] unless the input is exactly
    /// 8 hex characters.
    ///
    /// [`from_bytes`]: Self::from_bytes
    pub fn from_hex(value: &str) -> Result<Self, ParseError> {
        if value.chars().count() != 8 {
            return Err(ParseError::InvalidAuthCode(format!(
                "authentication code need to be 8 characters, was {}",
                value.chars().count()
            )));
        }
        if !value.is_ascii() {
            return Err(ParseError::InvalidAuthCode(format!(
                "not a hex string: {value:?}"
            )));
        }

        let mut code = [0u8; 4];
        for (i, byte) in code.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&value[i * 2..i * 2 + 2], 16).map_err(|_| {
                ParseError::InvalidAuthCode(format!("not a hex string: {value:?}"))
            })?;
        }

        Ok(Self(code))
    }

    /// The raw code bytes, as written to the authentication characteristic.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl std::str::FromStr for AuthCode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl std::fmt::Debug for AuthCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The code is a credential; keep it out of logs.
        write!(f, "AuthCode(****)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_rpm_boundaries() {
        assert_eq!(clamp_rpm(799), 800);
        assert_eq!(clamp_rpm(800), 800);
        assert_eq!(clamp_rpm(2400), 2400);
        assert_eq!(clamp_rpm(2401), 2400);
        assert_eq!(clamp_rpm(0), 800);
        assert_eq!(clamp_rpm(u16::MAX), 2400);
    }

    #[test]
    fn test_clamp_rpm_idempotent() {
        for value in [0u16, 799, 800, 1200, 2400, 2401, u16::MAX] {
            assert_eq!(clamp_rpm(clamp_rpm(value)), clamp_rpm(value));
        }
    }

    #[test]
    fn test_clamp_time() {
        assert_eq!(clamp_time(-1), 0);
        assert_eq!(clamp_time(0), 0);
        assert_eq!(clamp_time(100), 100);
        assert_eq!(clamp_time(i32::MAX), u16::MAX);
    }

    #[test]
    fn test_clamp_detection() {
        assert_eq!(clamp_detection(0), 0);
        assert_eq!(clamp_detection(1), 1);
        assert_eq!(clamp_detection(3), 3);
        assert_eq!(clamp_detection(4), 3);
        assert_eq!(clamp_detection(u8::MAX), 3);
    }

    #[test]
    fn test_auth_code_from_bytes() {
        let code = AuthCode::from_bytes(&[1, 2, 3, 4]).unwrap();
        assert_eq!(code.as_bytes(), &[1, 2, 3, 4]);

        assert!(matches!(
            AuthCode::from_bytes(&[1, 2]),
            Err(ParseError::InvalidAuthCode(_))
        ));
        assert!(matches!(
            AuthCode::from_bytes(&[1, 2, 3, 4, 5]),
            Err(ParseError::InvalidAuthCode(_))
        ));
    }

    #[test]
    fn test_auth_code_pairing_mode() {
        assert_eq!(
            AuthCode::from_bytes(&[0, 0, 0, 0]),
            Err(ParseError::NotInPairingMode)
        );
    }

    #[test]
    fn test_auth_code_from_hex() {
        let code = AuthCode::from_hex("01020304").unwrap();
        assert_eq!(code.as_bytes(), &[1, 2, 3, 4]);

        let code = AuthCode::from_hex("deadBEEF").unwrap();
        assert_eq!(code.as_bytes(), &[0xDE, 0xAD, 0xBE, 0xEF]);

        // The hex path takes the code as displayed by the vendor app,
        // zeros included.
        let code = AuthCode::from_hex("00000000").unwrap();
        assert_eq!(code.as_bytes(), &[0, 0, 0, 0]);

        assert!(matches!(
            AuthCode::from_hex("aa"),
            Err(ParseError::InvalidAuthCode(_))
        ));
        assert!(matches!(
            AuthCode::from_hex("aaaaaaaaaa"),
            Err(ParseError::InvalidAuthCode(_))
        ));
        assert!(matches!(
            AuthCode::from_hex("zzzzzzzz"),
            Err(ParseError::InvalidAuthCode(_))
        ));
    }

    #[test]
    fn test_auth_code_debug_redacts() {
        let code = AuthCode::from_bytes(&[1, 2, 3, 4]).unwrap();
        let debug = format!("{code:?}");
        assert!(!debug.contains('1'));
        assert!(debug.contains("****"));
    }
}
