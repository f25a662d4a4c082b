//! Fan operating mode records.
//!
//! Each mode is a fixed-width little-endian record behind its own GATT
//! characteristic. Decoding demands the exact wire width and otherwise
//! reports incoming values as-is, out of range or not; the device owns
//! truth about what it stored. Encoding never fails: numeric inputs are
//! clamped the same way the firmware clamps them.

use bytes::{Buf, BufMut};

use crate::detection::{label_for_level, level_for_label, DetectionLabel, DetectionOrder};
use crate::error::ParseError;
use crate::validate::{clamp_detection, clamp_rpm, clamp_time};

/// Marker byte the firmware expects in the second position of an airing
/// mode write.
const AIRING_MARKER: u8 = 0x1A;

fn check_len(data: &[u8], expected: usize) -> Result<(), ParseError> {
    if data.len() != expected {
        return Err(ParseError::LengthMismatch {
            expected,
            actual: data.len(),
        });
    }
    Ok(())
}

/// Humidity detection mode: spin up when the humidity sensor trips.
///
/// Wire format (4 bytes): enabled u8, detection u8, rpm u16.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HumidityMode {
    /// Whether the mode is active.
    pub enabled: bool,
    /// Detection sensitivity label derived from `detection_raw`.
    pub detection: DetectionLabel,
    /// Raw detection level as stored on the device.
    pub detection_raw: u8,
    /// Fan speed for this mode in rpm.
    pub rpm: u16,
}

impl HumidityMode {
    /// Fixed wire width of this record.
    pub const WIRE_LEN: usize = 4;

    /// Build a record from a sensitivity label, clamping the speed.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidDetectionLabel`] for
    /// [`DetectionLabel::Unknown`].
    pub fn new(enabled: bool, detection: DetectionLabel, rpm: u16) -> Result<Self, ParseError> {
        let detection_raw = level_for_label(detection, DetectionOrder::Regular, false)?;
        Ok(Self {
            enabled,
            detection,
            detection_raw,
            rpm: clamp_rpm(rpm),
        })
    }

    /// Decode a humidity mode record.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::LengthMismatch`] unless `data` is exactly
    /// [`WIRE_LEN`](Self::WIRE_LEN) bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self, ParseError> {
        check_len(data, Self::WIRE_LEN)?;

        let mut buf = data;
        let enabled = buf.get_u8() != 0;
        let detection_raw = buf.get_u8();
        let rpm = buf.get_u16_le();

        Ok(Self {
            enabled,
            detection: label_for_level(detection_raw, DetectionOrder::Regular, false),
            detection_raw,
            rpm,
        })
    }

    /// Encode for writing; clamps the detection level and speed.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::WIRE_LEN] {
        let mut out = [0u8; Self::WIRE_LEN];
        let mut buf = &mut out[..];
        buf.put_u8(u8::from(self.enabled));
        buf.put_u8(clamp_detection(self.detection_raw));
        buf.put_u16_le(clamp_rpm(self.rpm));
        out
    }
}

/// Light sensor settings within [`LightVocMode`].
///
/// The light sensor has no Low setting; raw level 1 reads back as Medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LightSettings {
    /// Whether light triggering is active.
    pub enabled: bool,
    /// Detection sensitivity label derived from `detection_raw`.
    pub detection: DetectionLabel,
    /// Raw detection level as stored on the device.
    pub detection_raw: u8,
}

/// VOC sensor settings within [`LightVocMode`].
///
/// The VOC sensor orders its levels in reverse: raw 1 is High, raw 3 is Low.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VocSettings {
    /// Whether VOC triggering is active.
    pub enabled: bool,
    /// Detection sensitivity label derived from `detection_raw`.
    pub detection: DetectionLabel,
    /// Raw detection level as stored on the device.
    pub detection_raw: u8,
}

/// Combined light and VOC trigger mode.
///
/// Wire format (4 bytes): light.enabled u8, light.detection u8,
/// voc.enabled u8, voc.detection u8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LightVocMode {
    /// Light sensor settings.
    pub light: LightSettings,
    /// VOC sensor settings.
    pub voc: VocSettings,
}

impl LightVocMode {
    /// Fixed wire width of this record.
    pub const WIRE_LEN: usize = 4;

    /// Build a record from sensitivity labels.
    ///
    /// Both labels map through the regular ordering on the write path; the
    /// sensor-specific orderings apply only to how the device reports
    /// levels back.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidDetectionLabel`] for
    /// [`DetectionLabel::Unknown`] in either position.
    pub fn new(
        light_enabled: bool,
        light_detection: DetectionLabel,
        voc_enabled: bool,
        voc_detection: DetectionLabel,
    ) -> Result<Self, ParseError> {
        let light_raw = level_for_label(light_detection, DetectionOrder::Regular, false)?;
        let voc_raw = level_for_label(voc_detection, DetectionOrder::Regular, false)?;
        Ok(Self {
            light: LightSettings {
                enabled: light_enabled,
                detection: light_detection,
                detection_raw: light_raw,
            },
            voc: VocSettings {
                enabled: voc_enabled,
                detection: voc_detection,
                detection_raw: voc_raw,
            },
        })
    }

    /// Decode a light/VOC mode record.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::LengthMismatch`] unless `data` is exactly
    /// [`WIRE_LEN`](Self::WIRE_LEN) bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self, ParseError> {
        check_len(data, Self::WIRE_LEN)?;

        let mut buf = data;
        let light_enabled = buf.get_u8() != 0;
        let light_raw = buf.get_u8();
        let voc_enabled = buf.get_u8() != 0;
        let voc_raw = buf.get_u8();

        Ok(Self {
            light: LightSettings {
                enabled: light_enabled,
                detection: label_for_level(light_raw, DetectionOrder::Regular, true),
                detection_raw: light_raw,
            },
            voc: VocSettings {
                enabled: voc_enabled,
                detection: label_for_level(voc_raw, DetectionOrder::Reversed, false),
                detection_raw: voc_raw,
            },
        })
    }

    /// Encode for writing; clamps both detection levels.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::WIRE_LEN] {
        let mut out = [0u8; Self::WIRE_LEN];
        let mut buf = &mut out[..];
        buf.put_u8(u8::from(self.light.enabled));
        buf.put_u8(clamp_detection(self.light.detection_raw));
        buf.put_u8(u8::from(self.voc.enabled));
        buf.put_u8(clamp_detection(self.voc.detection_raw));
        out
    }
}

/// Constant speed mode: run at a fixed rpm.
///
/// Wire format (3 bytes): enabled u8, rpm u16.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstantSpeedMode {
    /// Whether the mode is active.
    pub enabled: bool,
    /// Fan speed in rpm.
    pub rpm: u16,
}

impl ConstantSpeedMode {
    /// Fixed wire width of this record.
    pub const WIRE_LEN: usize = 3;

    /// Build a record, clamping the speed.
    #[must_use]
    pub fn new(enabled: bool, rpm: u16) -> Self {
        Self {
            enabled,
            rpm: clamp_rpm(rpm),
        }
    }

    /// Decode a constant speed record.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::LengthMismatch`] unless `data` is exactly
    /// [`WIRE_LEN`](Self::WIRE_LEN) bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self, ParseError> {
        check_len(data, Self::WIRE_LEN)?;

        let mut buf = data;
        let enabled = buf.get_u8() != 0;
        let rpm = buf.get_u16_le();

        Ok(Self { enabled, rpm })
    }

    /// Encode for writing; clamps the speed.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::WIRE_LEN] {
        let mut out = [0u8; Self::WIRE_LEN];
        let mut buf = &mut out[..];
        buf.put_u8(u8::from(self.enabled));
        buf.put_u16_le(clamp_rpm(self.rpm));
        out
    }
}

/// Start delay settings within [`TimerMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DelaySettings {
    /// Whether the start delay is active.
    pub enabled: bool,
    /// Delay before the timer starts, in minutes.
    pub minutes: u8,
}

/// Timer mode: run for a fixed number of minutes, optionally delayed.
///
/// Wire format (5 bytes): minutes u8, delay.enabled u8, delay.minutes u8,
/// rpm u16.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimerMode {
    /// Running time in minutes.
    pub minutes: u8,
    /// Start delay settings.
    pub delay: DelaySettings,
    /// Fan speed for this mode in rpm.
    pub rpm: u16,
}

impl TimerMode {
    /// Fixed wire width of this record.
    pub const WIRE_LEN: usize = 5;

    /// Build a record, clamping the speed.
    #[must_use]
    pub fn new(minutes: u8, delay_enabled: bool, delay_minutes: u8, rpm: u16) -> Self {
        Self {
            minutes,
            delay: DelaySettings {
                enabled: delay_enabled,
                minutes: delay_minutes,
            },
            rpm: clamp_rpm(rpm),
        }
    }

    /// Decode a timer mode record.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::LengthMismatch`] unless `data` is exactly
    /// [`WIRE_LEN`](Self::WIRE_LEN) bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self, ParseError> {
        check_len(data, Self::WIRE_LEN)?;

        let mut buf = data;
        let minutes = buf.get_u8();
        let delay_enabled = buf.get_u8() != 0;
        let delay_minutes = buf.get_u8();
        let rpm = buf.get_u16_le();

        Ok(Self {
            minutes,
            delay: DelaySettings {
                enabled: delay_enabled,
                minutes: delay_minutes,
            },
            rpm,
        })
    }

    /// Encode for writing; clamps the speed.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::WIRE_LEN] {
        let mut out = [0u8; Self::WIRE_LEN];
        let mut buf = &mut out[..];
        buf.put_u8(self.minutes);
        buf.put_u8(u8::from(self.delay.enabled));
        buf.put_u8(self.delay.minutes);
        buf.put_u16_le(clamp_rpm(self.rpm));
        out
    }
}

/// Airing mode: periodic run to exchange room air.
///
/// Wire format (5 bytes): enabled u8, marker u8, minutes u8, rpm u16.
/// The marker byte is constant on writes and ignored on reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AiringMode {
    /// Whether the mode is active.
    pub enabled: bool,
    /// Running time in minutes.
    pub minutes: u8,
    /// Fan speed for this mode in rpm.
    pub rpm: u16,
}

impl AiringMode {
    /// Fixed wire width of this record.
    pub const WIRE_LEN: usize = 5;

    /// Build a record, clamping the running time and speed.
    #[must_use]
    pub fn new(enabled: bool, minutes: i32, rpm: u16) -> Self {
        Self {
            enabled,
            minutes: clamp_time(minutes).min(u16::from(u8::MAX)) as u8,
            rpm: clamp_rpm(rpm),
        }
    }

    /// Decode an airing mode record.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::LengthMismatch`] unless `data` is exactly
    /// [`WIRE_LEN`](Self::WIRE_LEN) bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self, ParseError> {
        check_len(data, Self::WIRE_LEN)?;

        let mut buf = data;
        let enabled = buf.get_u8() != 0;
        let _marker = buf.get_u8();
        let minutes = buf.get_u8();
        let rpm = buf.get_u16_le();

        Ok(Self {
            enabled,
            minutes,
            rpm,
        })
    }

    /// Encode for writing; clamps the speed and restores the marker byte.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::WIRE_LEN] {
        let mut out = [0u8; Self::WIRE_LEN];
        let mut buf = &mut out[..];
        buf.put_u8(u8::from(self.enabled));
        buf.put_u8(AIRING_MARKER);
        buf.put_u8(self.minutes);
        buf.put_u16_le(clamp_rpm(self.rpm));
        out
    }
}

/// Pause mode: hold the fan off for a number of minutes.
///
/// Wire format (2 bytes): enabled u8, minutes u8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PauseMode {
    /// Whether the pause is active.
    pub enabled: bool,
    /// Pause duration in minutes.
    pub minutes: u8,
}

impl PauseMode {
    /// Fixed wire width of this record.
    pub const WIRE_LEN: usize = 2;

    /// Build a record, clamping the duration.
    #[must_use]
    pub fn new(enabled: bool, minutes: i32) -> Self {
        Self {
            enabled,
            minutes: clamp_time(minutes).min(u16::from(u8::MAX)) as u8,
        }
    }

    /// Decode a pause mode record.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::LengthMismatch`] unless `data` is exactly
    /// [`WIRE_LEN`](Self::WIRE_LEN) bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self, ParseError> {
        check_len(data, Self::WIRE_LEN)?;

        let mut buf = data;
        let enabled = buf.get_u8() != 0;
        let minutes = buf.get_u8();

        Ok(Self { enabled, minutes })
    }

    /// Encode for writing.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::WIRE_LEN] {
        [u8::from(self.enabled), self.minutes]
    }
}

/// Boost mode: temporary full-power run.
///
/// Wire format (5 bytes): enabled u8, rpm u16, seconds u16. Note the field
/// order: speed before duration, unlike the minute-based modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoostMode {
    /// Whether the boost is active.
    pub enabled: bool,
    /// Fan speed for the boost in rpm.
    pub rpm: u16,
    /// Boost duration in seconds.
    pub seconds: u16,
}

impl BoostMode {
    /// Fixed wire width of this record.
    pub const WIRE_LEN: usize = 5;

    /// Build a record, clamping the speed and duration.
    #[must_use]
    pub fn new(enabled: bool, rpm: u16, seconds: i32) -> Self {
        Self {
            enabled,
            rpm: clamp_rpm(rpm),
            seconds: clamp_time(seconds),
        }
    }

    /// Decode a boost mode record.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::LengthMismatch`] unless `data` is exactly
    /// [`WIRE_LEN`](Self::WIRE_LEN) bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self, ParseError> {
        check_len(data, Self::WIRE_LEN)?;

        let mut buf = data;
        let enabled = buf.get_u8() != 0;
        let rpm = buf.get_u16_le();
        let seconds = buf.get_u16_le();

        Ok(Self {
            enabled,
            rpm,
            seconds,
        })
    }

    /// Encode for writing; clamps the speed.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::WIRE_LEN] {
        let mut out = [0u8; Self::WIRE_LEN];
        let mut buf = &mut out[..];
        buf.put_u8(u8::from(self.enabled));
        buf.put_u16_le(clamp_rpm(self.rpm));
        buf.put_u16_le(self.seconds);
        out
    }
}

/// Temporary speed override.
///
/// Write-only: the device accepts the record but exposes no way to read it
/// back. Wire format (3 bytes): enabled u8, rpm u16.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TemporarySpeed {
    /// Whether the override is active.
    pub enabled: bool,
    /// Override speed in rpm.
    pub rpm: u16,
}

impl TemporarySpeed {
    /// Fixed wire width of this record.
    pub const WIRE_LEN: usize = 3;

    /// Build a record, clamping the speed.
    #[must_use]
    pub fn new(enabled: bool, rpm: u16) -> Self {
        Self {
            enabled,
            rpm: clamp_rpm(rpm),
        }
    }

    /// Encode for writing; clamps the speed.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::WIRE_LEN] {
        let mut out = [0u8; Self::WIRE_LEN];
        let mut buf = &mut out[..];
        buf.put_u8(u8::from(self.enabled));
        buf.put_u16_le(clamp_rpm(self.rpm));
        out
    }
}

/// All mode records read from one device, each present only if its
/// characteristic was successfully read and decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceModes {
    /// Humidity detection mode.
    pub humidity: Option<HumidityMode>,
    /// Combined light and VOC mode.
    pub light_voc: Option<LightVocMode>,
    /// Constant speed mode.
    pub constant_speed: Option<ConstantSpeedMode>,
    /// Timer mode.
    pub timer: Option<TimerMode>,
    /// Airing mode.
    pub airing: Option<AiringMode>,
    /// Pause mode.
    pub pause: Option<PauseMode>,
    /// Boost mode.
    pub boost: Option<BoostMode>,
}
