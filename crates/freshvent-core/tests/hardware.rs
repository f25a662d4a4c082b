//! On-device smoke tests.
//!
//! These require a real Intellivent Sky in range, already known to the
//! local adapter, and should be run with:
//! `cargo test --package freshvent-core -- --ignored --nocapture`
//!
//! Set FRESHVENT_DEVICE to the fan's address, and FRESHVENT_AUTH_CODE to
//! the 8-character hex code if the fan is paired.

use std::env;
use std::time::Duration;

use freshvent_core::{BleConnector, SnapshotReader};
use freshvent_types::AuthCode;

fn device_identity() -> String {
    env::var("FRESHVENT_DEVICE").unwrap_or_else(|_| "Intellivent SKY".to_string())
}

#[tokio::test]
#[ignore = "requires BLE hardware"]
async fn test_read_snapshot_from_real_device() {
    let identity = device_identity();
    println!("Reading snapshot from {identity}");

    let connector = BleConnector::first_adapter()
        .await
        .expect("Bluetooth adapter available");

    let mut reader = SnapshotReader::new(connector).with_update_timeout(Duration::from_secs(60));
    if let Ok(code) = env::var("FRESHVENT_AUTH_CODE") {
        reader = reader.with_auth_code(AuthCode::from_hex(&code).expect("valid auth code"));
    }

    let snapshot = reader
        .read_snapshot(&identity)
        .await
        .expect("snapshot read");

    println!("Name: {:?}", snapshot.name);
    println!("Firmware: {:?}", snapshot.fw_version);
    if let Some(sensors) = snapshot.sensors {
        println!("Mode: {} ({} rpm)", sensors.mode, sensors.rpm);
        println!("Temperature: {:.1} °C", sensors.temperature);
        if let Some(humidity) = sensors.humidity {
            println!("Humidity: {humidity:.1}%");
        }
        println!("Authenticated: {}", sensors.authenticated);
    } else {
        println!("Sensor status unavailable");
    }
}
