//! Device snapshot assembled from one update pass.

use crate::modes::DeviceModes;
use crate::sensors::SensorSnapshot;

/// Model string reported by Intellivent Sky fans.
pub const DEVICE_MODEL: &str = "Intellivent Sky";

/// Everything read from a fan during one session.
///
/// Every identity field is independently optional: a single characteristic
/// read can fail without invalidating the rest of the snapshot. The same
/// goes for the sensor state and each mode record.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceSnapshot {
    /// Device name from the GAP service.
    pub name: Option<String>,
    /// Address or platform identifier the session connected to.
    pub address: Option<String>,
    /// Manufacturer name string.
    pub manufacturer: Option<String>,
    /// Model string.
    pub model: String,
    /// Firmware revision string.
    pub fw_version: Option<String>,
    /// Hardware revision string.
    pub hw_version: Option<String>,
    /// Software revision string.
    pub sw_version: Option<String>,
    /// Live sensor state, if the status characteristic was readable.
    pub sensors: Option<SensorSnapshot>,
    /// Mode records that were readable this session.
    pub modes: DeviceModes,
}

impl DeviceSnapshot {
    /// Create an empty snapshot for the given address.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            ..Self::default()
        }
    }
}

impl Default for DeviceSnapshot {
    fn default() -> Self {
        Self {
            name: None,
            address: None,
            manufacturer: None,
            model: DEVICE_MODEL.to_string(),
            fw_version: None,
            hw_version: None,
            sw_version: None,
            sensors: None,
            modes: DeviceModes::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_defaults() {
        let snapshot = DeviceSnapshot::new("AA:BB:CC:DD:EE:FF");
        assert_eq!(snapshot.address.as_deref(), Some("AA:BB:CC:DD:EE:FF"));
        assert_eq!(snapshot.model, "Intellivent Sky");
        assert!(snapshot.name.is_none());
        assert!(snapshot.sensors.is_none());
        assert!(snapshot.modes.humidity.is_none());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_snapshot_serde_round_trip() {
        let mut snapshot = DeviceSnapshot::new("AA:BB:CC:DD:EE:FF");
        snapshot.name = Some("FreshSky".to_string());
        snapshot.modes.pause = Some(crate::modes::PauseMode::new(true, 10));

        let json = serde_json::to_string(&snapshot).expect("serialize");
        let back: DeviceSnapshot = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, snapshot);
    }
}
