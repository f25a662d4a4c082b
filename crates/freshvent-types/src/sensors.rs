//! Sensor status snapshot.
//!
//! The device exposes one 15-byte status characteristic carrying the live
//! sensor state: active mode, humidity, two temperatures, rotation speed
//! and the authenticated flag. Several bytes are still unmapped; they are
//! preserved verbatim so a future firmware can be decoded against captures.

use bytes::Buf;

use crate::error::ParseError;

/// Operating mode reported in the status characteristic.
///
/// The code table is closed; codes outside it decode to
/// [`FanMode::Unknown`] rather than failing, since newer firmware may add
/// modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FanMode {
    /// Fan idle.
    Off,
    /// Pause mode active.
    Pause,
    /// Constant speed mode active.
    ConstantSpeed,
    /// Light-triggered run.
    Light,
    /// Timer run.
    Timer,
    /// Humidity-triggered run.
    Humidity,
    /// VOC-triggered run.
    Voc,
    /// Boost run.
    Boost,
    /// Mode code not in the table.
    Unknown,
}

impl From<u8> for FanMode {
    fn from(value: u8) -> Self {
        match value {
            0 => FanMode::Off,
            6 => FanMode::Pause,
            16 => FanMode::ConstantSpeed,
            34 => FanMode::Light,
            35 => FanMode::Timer,
            49 => FanMode::Humidity,
            52 => FanMode::Voc,
            103 => FanMode::Boost,
            _ => FanMode::Unknown,
        }
    }
}

impl std::fmt::Display for FanMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FanMode::Off => write!(f, "Off"),
            FanMode::Pause => write!(f, "Pause"),
            FanMode::ConstantSpeed => write!(f, "Constant speed"),
            FanMode::Light => write!(f, "Light"),
            FanMode::Timer => write!(f, "Timer"),
            FanMode::Humidity => write!(f, "Humidity"),
            FanMode::Voc => write!(f, "VOC"),
            FanMode::Boost => write!(f, "Boost"),
            FanMode::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Fixed wire width of the sensor status record.
pub const SENSOR_SNAPSHOT_BYTES: usize = 15;

/// Live sensor state read from the status characteristic.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SensorSnapshot {
    /// Whether the fan is currently running.
    pub status: bool,
    /// Active operating mode.
    pub mode: FanMode,
    /// Raw mode code as reported by the device.
    pub mode_raw: u8,
    /// Relative humidity in percent, absent when the sensor has no reading.
    pub humidity: Option<f32>,
    /// Current temperature in degrees Celsius.
    pub temperature: f32,
    /// Averaged temperature in degrees Celsius.
    pub temperature_avg: f32,
    /// Current rotation speed in rpm.
    pub rpm: u16,
    /// Whether this connection has authenticated.
    pub authenticated: bool,
    /// Unmapped bytes, preserved verbatim.
    pub unknowns: [u8; 4],
}

impl SensorSnapshot {
    /// Decode the 15-byte status record.
    ///
    /// The byte format is (all integers little-endian):
    /// - byte 0: status (u8, nonzero = running)
    /// - byte 1: mode code (u8)
    /// - bytes 2-3: humidity raw (u16, 0 = not measured)
    /// - bytes 4-5: temperature (u16, divide by 100 for °C)
    /// - byte 6: unmapped
    /// - byte 7: authenticated (u8)
    /// - bytes 8-9: rotation speed (u16, rpm)
    /// - bytes 10-11: averaged temperature (u16, divide by 100 for °C)
    /// - bytes 12-14: unmapped
    ///
    /// A humidity raw value of zero means "no reading" and decodes to
    /// `None`; nonzero values convert through the logarithmic scale
    /// `ln(raw / 10) * 10`, rounded to one decimal (raw 1000 gives 46.1).
    /// Temperatures are always present.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::LengthMismatch`] unless `data` is exactly
    /// [`SENSOR_SNAPSHOT_BYTES`] bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self, ParseError> {
        if data.len() != SENSOR_SNAPSHOT_BYTES {
            return Err(ParseError::LengthMismatch {
                expected: SENSOR_SNAPSHOT_BYTES,
                actual: data.len(),
            });
        }

        let mut buf = data;
        let status = buf.get_u8() != 0;
        let mode_raw = buf.get_u8();
        let humidity_raw = buf.get_u16_le();
        let temperature_raw = buf.get_u16_le();
        let unknown_a = buf.get_u8();
        let authenticated = buf.get_u8() != 0;
        let rpm = buf.get_u16_le();
        let temperature_avg_raw = buf.get_u16_le();
        let unknown_b = buf.get_u8();
        let unknown_c = buf.get_u8();
        let unknown_d = buf.get_u8();

        let humidity = if humidity_raw == 0 {
            None
        } else {
            Some(round1((f32::from(humidity_raw) / 10.0).ln() * 10.0))
        };

        Ok(Self {
            status,
            mode: FanMode::from(mode_raw),
            mode_raw,
            humidity,
            temperature: f32::from(temperature_raw) / 100.0,
            temperature_avg: f32::from(temperature_avg_raw) / 100.0,
            rpm,
            authenticated,
            unknowns: [unknown_a, unknown_b, unknown_c, unknown_d],
        })
    }
}

fn round1(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}
