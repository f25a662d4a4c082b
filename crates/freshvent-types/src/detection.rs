//! Detection level conversions.
//!
//! The fan reports sensor sensitivity as a small ordinal (1..=3), but the
//! mapping between raw level and user-facing label is not uniform across
//! sensors: the light sensor reverses nothing but refuses "Low" (the
//! firmware reports Medium for the lowest raw value), while the VOC sensor
//! reverses the whole ordering. Both quirks are device behavior and are
//! reproduced here exactly.

use crate::error::ParseError;
use crate::validate::clamp_detection;

/// User-facing detection sensitivity label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DetectionLabel {
    /// Raw level 0, which the fan uses for "not configured".
    Unknown,
    /// Lowest sensitivity.
    Low,
    /// Middle sensitivity.
    Medium,
    /// Highest sensitivity.
    High,
}

impl std::fmt::Display for DetectionLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetectionLabel::Unknown => write!(f, "Unknown"),
            DetectionLabel::Low => write!(f, "Low"),
            DetectionLabel::Medium => write!(f, "Medium"),
            DetectionLabel::High => write!(f, "High"),
        }
    }
}

impl std::str::FromStr for DetectionLabel {
    type Err = ParseError;

    /// Parse a label case-insensitively. "Unknown" is not accepted: it is a
    /// decode-side sentinel, never valid input.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("low") {
            Ok(DetectionLabel::Low)
        } else if s.eq_ignore_ascii_case("medium") {
            Ok(DetectionLabel::Medium)
        } else if s.eq_ignore_ascii_case("high") {
            Ok(DetectionLabel::High)
        } else {
            Err(ParseError::InvalidDetectionLabel(s.to_string()))
        }
    }
}

/// Which direction the raw-level-to-label mapping runs for a sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionOrder {
    /// 1 = Low, 3 = High (humidity and light sensors).
    Regular,
    /// 1 = High, 3 = Low (VOC sensor).
    Reversed,
}

/// Convert a raw detection level to its label.
///
/// The raw value is clamped into 0..=3 first; 0 maps to
/// [`DetectionLabel::Unknown`]. With `collapse_low` set, the raw value that
/// would map to Low maps to Medium instead, reproducing the firmware's
/// behavior for sensors that disallow the lowest setting.
///
/// # Examples
///
/// ```
/// use freshvent_types::detection::{label_for_level, DetectionLabel, DetectionOrder};
///
/// assert_eq!(label_for_level(1, DetectionOrder::Regular, false), DetectionLabel::Low);
/// assert_eq!(label_for_level(1, DetectionOrder::Reversed, false), DetectionLabel::High);
/// assert_eq!(label_for_level(1, DetectionOrder::Regular, true), DetectionLabel::Medium);
/// ```
#[must_use]
pub fn label_for_level(value: u8, order: DetectionOrder, collapse_low: bool) -> DetectionLabel {
    match clamp_detection(value) {
        1 => {
            if collapse_low && order == DetectionOrder::Regular {
                DetectionLabel::Medium
            } else if order == DetectionOrder::Regular {
                DetectionLabel::Low
            } else {
                DetectionLabel::High
            }
        }
        2 => DetectionLabel::Medium,
        3 => {
            if collapse_low && order == DetectionOrder::Reversed {
                DetectionLabel::Medium
            } else if order == DetectionOrder::Regular {
                DetectionLabel::High
            } else {
                DetectionLabel::Low
            }
        }
        _ => DetectionLabel::Unknown,
    }
}

/// Convert a label back to its raw detection level.
///
/// The inverse of [`label_for_level`] for levels 1..=3.
///
/// # Errors
///
/// Returns [`ParseError::InvalidDetectionLabel`] for
/// [`DetectionLabel::Unknown`], which has no raw level to map to.
pub fn level_for_label(
    label: DetectionLabel,
    order: DetectionOrder,
    collapse_low: bool,
) -> Result<u8, ParseError> {
    match label {
        DetectionLabel::Low => {
            if collapse_low {
                Ok(2)
            } else if order == DetectionOrder::Regular {
                Ok(1)
            } else {
                Ok(3)
            }
        }
        DetectionLabel::Medium => Ok(2),
        DetectionLabel::High => {
            if order == DetectionOrder::Regular {
                Ok(3)
            } else {
                Ok(1)
            }
        }
        DetectionLabel::Unknown => {
            Err(ParseError::InvalidDetectionLabel("Unknown".to_string()))
        }
    }
}
