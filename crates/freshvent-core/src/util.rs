//! Utility functions for freshvent-core.

use btleplug::platform::PeripheralId;

/// Format a peripheral ID as a plain string.
///
/// On macOS peripheral IDs are UUIDs; elsewhere they wrap the MAC address.
/// This strips the `PeripheralId(...)` debug wrapper either way.
pub fn format_peripheral_id(id: &PeripheralId) -> String {
    format!("{:?}", id)
        .trim_start_matches("PeripheralId(")
        .trim_end_matches(')')
        .to_string()
}

/// Create an identifier string from an address and peripheral ID.
///
/// On macOS the reported address is 00:00:00:00:00:00; the peripheral ID
/// is the usable identifier there. Other platforms use the Bluetooth
/// address.
pub fn create_identifier(address: &str, peripheral_id: &PeripheralId) -> String {
    if address == "00:00:00:00:00:00" {
        format_peripheral_id(peripheral_id)
    } else {
        address.to_string()
    }
}
