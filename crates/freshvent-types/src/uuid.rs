//! Bluetooth UUIDs for Fresh Intellivent Sky fans.
//!
//! This module contains all the UUIDs needed to communicate with an
//! Intellivent Sky over Bluetooth Low Energy. The characteristic table is
//! fixed for the device family: one vendor service carrying the mode and
//! sensor characteristics, plus the standard GAP and Device Information
//! services for identity strings.

use uuid::{Uuid, uuid};

// --- Fresh vendor service ---

/// Fresh custom service UUID advertised by Intellivent Sky fans.
pub const FAN_SERVICE: Uuid = uuid!("1a46a853-e5ed-4696-bac0-70e346884a26");

// --- Fan characteristic UUIDs ---

/// Authentication code characteristic (4 bytes, read in pairing mode, write to authenticate).
pub const AUTH: Uuid = uuid!("4cad343a-209a-40b7-b911-4d9b3df569b2");

/// Device status characteristic carrying the 15-byte sensor snapshot.
pub const DEVICE_STATUS: Uuid = uuid!("90fe29f2-5d58-4f39-a1f4-66a837b2b967");

/// Humidity mode characteristic (4 bytes).
pub const HUMIDITY: Uuid = uuid!("1c03f9a9-bc2e-4c70-8632-3789688e8a27");

/// Combined light and VOC mode characteristic (4 bytes).
pub const LIGHT_VOC: Uuid = uuid!("ab963f6f-0e71-4e66-b514-cf4d20cdf2c9");

/// Constant speed mode characteristic (3 bytes).
pub const CONSTANT_SPEED: Uuid = uuid!("7c4adc01-2f33-4091-b5d7-b86286fa8c97");

/// Timer mode characteristic (5 bytes).
pub const TIMER: Uuid = uuid!("c6fbfa47-0fdd-4341-b5b9-b1a3154d03d4");

/// Airing mode characteristic (5 bytes).
pub const AIRING: Uuid = uuid!("4c5d9b3a-9f86-4a6d-a6f7-6f0e0b2b52a7");

/// Pause mode characteristic (2 bytes).
pub const PAUSE: Uuid = uuid!("ffd54cb2-3bb3-4ed5-b9ad-4dfd62371303");

/// Boost mode characteristic (5 bytes).
pub const BOOST: Uuid = uuid!("118c949c-28c8-4139-b0b3-36657fd055a9");

/// Temporary speed characteristic (3 bytes, write only).
pub const TEMPORARY_SPEED: Uuid = uuid!("0e5f33f6-8a3d-42d9-a89a-0d770cc3fd5f");

// --- Standard BLE service UUIDs ---

/// Generic Access Profile (GAP) service.
pub const GAP_SERVICE: Uuid = uuid!("00001800-0000-1000-8000-00805f9b34fb");

/// Device Information service.
pub const DEVICE_INFO_SERVICE: Uuid = uuid!("0000180a-0000-1000-8000-00805f9b34fb");

// --- Device Information characteristic UUIDs ---

/// Device name characteristic.
pub const DEVICE_NAME: Uuid = uuid!("00002a00-0000-1000-8000-00805f9b34fb");

/// Firmware revision string characteristic.
pub const FIRMWARE_REVISION: Uuid = uuid!("00002a26-0000-1000-8000-00805f9b34fb");

/// Hardware revision string characteristic.
pub const HARDWARE_REVISION: Uuid = uuid!("00002a27-0000-1000-8000-00805f9b34fb");

/// Software revision string characteristic.
pub const SOFTWARE_REVISION: Uuid = uuid!("00002a28-0000-1000-8000-00805f9b34fb");

/// Manufacturer name string characteristic.
pub const MANUFACTURER_NAME: Uuid = uuid!("00002a29-0000-1000-8000-00805f9b34fb");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fan_service_uuid() {
        let expected = "1a46a853-e5ed-4696-bac0-70e346884a26";
        assert_eq!(FAN_SERVICE.to_string(), expected);
    }

    #[test]
    fn test_auth_uuid() {
        let expected = "4cad343a-209a-40b7-b911-4d9b3df569b2";
        assert_eq!(AUTH.to_string(), expected);
    }

    #[test]
    fn test_device_status_uuid() {
        let expected = "90fe29f2-5d58-4f39-a1f4-66a837b2b967";
        assert_eq!(DEVICE_STATUS.to_string(), expected);
    }

    #[test]
    fn test_mode_uuids_are_distinct() {
        let uuids = [
            AUTH,
            DEVICE_STATUS,
            HUMIDITY,
            LIGHT_VOC,
            CONSTANT_SPEED,
            TIMER,
            AIRING,
            PAUSE,
            BOOST,
            TEMPORARY_SPEED,
        ];

        for (i, a) in uuids.iter().enumerate() {
            for b in &uuids[i + 1..] {
                assert_ne!(a, b, "characteristic UUIDs must be distinct");
            }
        }
    }

    #[test]
    fn test_standard_service_uuids_are_distinct() {
        assert_ne!(GAP_SERVICE, DEVICE_INFO_SERVICE);
        assert_ne!(GAP_SERVICE, FAN_SERVICE);
    }

    #[test]
    fn test_standard_ble_characteristic_prefix() {
        // Standard BLE characteristics use 16-bit UUIDs (start with 00002aXX)
        let standard_uuids = [
            DEVICE_NAME,
            FIRMWARE_REVISION,
            HARDWARE_REVISION,
            SOFTWARE_REVISION,
            MANUFACTURER_NAME,
        ];

        for uuid in standard_uuids {
            assert!(
                uuid.to_string().starts_with("00002a"),
                "UUID {} should start with 00002a",
                uuid
            );
        }
    }
}
