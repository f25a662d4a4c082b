//! Platform-agnostic protocol types for Fresh Intellivent Sky fans.
//!
//! This crate provides the binary codec and value types shared by
//! freshvent-core and any other frontend: the seven fixed-width mode
//! records, the 15-byte sensor snapshot, detection level conversions,
//! input validation and the BLE characteristic table. Nothing in here
//! performs I/O.
//!
//! # Example
//!
//! ```
//! use freshvent_types::modes::BoostMode;
//!
//! let boost = BoostMode::new(true, 2400, 600);
//! assert_eq!(boost.to_bytes(), [0x01, 0x60, 0x09, 0x58, 0x02]);
//! ```

pub mod detection;
pub mod device;
pub mod error;
pub mod modes;
pub mod sensors;
pub mod uuid;
pub mod validate;

pub use detection::{DetectionLabel, DetectionOrder, label_for_level, level_for_label};
pub use device::{DEVICE_MODEL, DeviceSnapshot};
pub use error::{ParseError, ParseResult};
pub use modes::{
    AiringMode, BoostMode, ConstantSpeedMode, DelaySettings, DeviceModes, HumidityMode,
    LightSettings, LightVocMode, PauseMode, TemporarySpeed, TimerMode, VocSettings,
};
pub use sensors::{FanMode, SENSOR_SNAPSHOT_BYTES, SensorSnapshot};
pub use uuid as uuids;
pub use validate::{AuthCode, MAX_RPM, MIN_RPM, clamp_detection, clamp_rpm, clamp_time};
