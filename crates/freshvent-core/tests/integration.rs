//! Integration tests for freshvent-core.
//!
//! These run entirely against the mock transport; no BLE hardware is
//! involved. See `hardware.rs` for the on-device smoke test.

use std::time::Duration;

use freshvent_core::mock::MockConnector;
use freshvent_core::{Error, RetryConfig, SnapshotReader};
use freshvent_types::detection::DetectionLabel;
use freshvent_types::sensors::FanMode;
use freshvent_types::uuid::{
    AIRING, AUTH, BOOST, CONSTANT_SPEED, DEVICE_NAME, DEVICE_STATUS, FIRMWARE_REVISION,
    HARDWARE_REVISION, HUMIDITY, LIGHT_VOC, MANUFACTURER_NAME, PAUSE, SOFTWARE_REVISION, TIMER,
};
use freshvent_types::AuthCode;

const IDENTITY: &str = "AA:BB:CC:DD:EE:FF";

fn hex(s: &str) -> Vec<u8> {
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).expect("valid hex"))
        .collect()
}

/// A mock with every characteristic a healthy fan exposes.
async fn full_device() -> MockConnector {
    let connector = MockConnector::new();
    connector.set_value(DEVICE_NAME, b"Intellivent SKY".to_vec()).await;
    connector.set_value(FIRMWARE_REVISION, b"3.0".to_vec()).await;
    connector.set_value(HARDWARE_REVISION, b"1.0".to_vec()).await;
    connector.set_value(SOFTWARE_REVISION, b"2.0".to_vec()).await;
    connector.set_value(MANUFACTURER_NAME, b"Fresh".to_vec()).await;
    connector
        .set_value(DEVICE_STATUS, hex("00009001CE090000E8033C0A000000"))
        .await;
    connector.set_value(HUMIDITY, hex("01013905")).await;
    connector.set_value(LIGHT_VOC, hex("01010101")).await;
    connector.set_value(CONSTANT_SPEED, hex("013905")).await;
    connector.set_value(TIMER, hex("050102E803")).await;
    connector.set_value(AIRING, hex("01261EE803")).await;
    connector.set_value(PAUSE, hex("010A")).await;
    connector.set_value(BOOST, hex("0160095802")).await;
    connector
}

fn fast_retry() -> RetryConfig {
    RetryConfig::new(3)
        .initial_delay(Duration::from_millis(1))
        .jitter(false)
}

#[tokio::test]
async fn test_full_snapshot() {
    let connector = full_device().await;
    let reader = SnapshotReader::new(connector.clone()).with_retry(fast_retry());

    let snapshot = reader.read_snapshot(IDENTITY).await.unwrap();

    assert_eq!(snapshot.address.as_deref(), Some(IDENTITY));
    assert_eq!(snapshot.name.as_deref(), Some("Intellivent SKY"));
    assert_eq!(snapshot.fw_version.as_deref(), Some("3.0"));
    assert_eq!(snapshot.hw_version.as_deref(), Some("1.0"));
    assert_eq!(snapshot.sw_version.as_deref(), Some("2.0"));
    assert_eq!(snapshot.manufacturer.as_deref(), Some("Fresh"));
    assert_eq!(snapshot.model, "Intellivent Sky");

    let sensors = snapshot.sensors.expect("sensor snapshot present");
    assert!(!sensors.status);
    assert_eq!(sensors.mode, FanMode::Off);
    assert_eq!(sensors.temperature, 25.1);
    assert_eq!(sensors.rpm, 1000);

    let humidity = snapshot.modes.humidity.expect("humidity mode present");
    assert!(humidity.enabled);
    assert_eq!(humidity.detection, DetectionLabel::Low);
    assert_eq!(humidity.rpm, 1337);

    let airing = snapshot.modes.airing.expect("airing mode present");
    assert!(airing.enabled);
    assert_eq!(airing.minutes, 30);
    assert_eq!(airing.rpm, 1000);

    let timer = snapshot.modes.timer.expect("timer mode present");
    assert_eq!(timer.minutes, 5);
    assert!(timer.delay.enabled);
    assert_eq!(timer.delay.minutes, 2);
    assert_eq!(timer.rpm, 1000);

    let boost = snapshot.modes.boost.expect("boost mode present");
    assert_eq!(boost.rpm, 2400);
    assert_eq!(boost.seconds, 600);

    assert!(snapshot.modes.light_voc.is_some());
    assert!(snapshot.modes.constant_speed.is_some());
    assert!(snapshot.modes.pause.is_some());

    // The session was closed exactly once, on the single attempt.
    assert_eq!(connector.connects(), 1);
    assert_eq!(connector.disconnects(), 1);
}

#[tokio::test]
async fn test_missing_identity_fields_leave_gaps() {
    let connector = full_device().await;
    connector.set_missing(FIRMWARE_REVISION).await;
    connector.set_missing(MANUFACTURER_NAME).await;

    let reader = SnapshotReader::new(connector.clone()).with_retry(fast_retry());
    let snapshot = reader.read_snapshot(IDENTITY).await.unwrap();

    assert_eq!(snapshot.fw_version, None);
    assert_eq!(snapshot.manufacturer, None);
    // The rest of the snapshot is unaffected.
    assert_eq!(snapshot.name.as_deref(), Some("Intellivent SKY"));
    assert!(snapshot.sensors.is_some());
}

#[tokio::test]
async fn test_missing_characteristic_invalidates_cache_and_continues() {
    let connector = full_device().await;
    connector.set_missing(HUMIDITY).await;

    let reader = SnapshotReader::new(connector.clone()).with_retry(fast_retry());
    let snapshot = reader.read_snapshot(IDENTITY).await.unwrap();

    // The missing mode is absent, the rest survived, and the transport was
    // told to rebuild its characteristic table.
    assert!(snapshot.modes.humidity.is_none());
    assert!(snapshot.modes.boost.is_some());
    assert!(snapshot.sensors.is_some());
    assert!(connector.cache_clears() >= 1);
    // One characteristic gap does not fail the attempt.
    assert_eq!(connector.connects(), 1);
}

#[tokio::test]
async fn test_undecodable_field_is_absent() {
    let connector = full_device().await;
    // Wrong width: decodes must fail, the field stays empty.
    connector.set_value(BOOST, vec![0x01, 0x02]).await;

    let reader = SnapshotReader::new(connector.clone()).with_retry(fast_retry());
    let snapshot = reader.read_snapshot(IDENTITY).await.unwrap();

    assert!(snapshot.modes.boost.is_none());
    assert!(snapshot.modes.pause.is_some());
}

#[tokio::test]
async fn test_transient_connect_failure_retries() {
    let connector = full_device().await;
    connector.fail_connects(2);

    let reader = SnapshotReader::new(connector.clone()).with_retry(fast_retry());
    let snapshot = reader.read_snapshot(IDENTITY).await.unwrap();

    assert!(snapshot.sensors.is_some());
    assert_eq!(connector.connects(), 3);
}

#[tokio::test]
async fn test_connect_failure_exhausts_attempts() {
    let connector = full_device().await;
    connector.fail_connects(10);

    let reader = SnapshotReader::new(connector.clone()).with_retry(fast_retry());
    let err = reader.read_snapshot(IDENTITY).await.unwrap_err();

    assert!(matches!(err, Error::ConnectFailed { .. }));
    assert_eq!(connector.connects(), 3);
}

#[tokio::test]
async fn test_disconnect_mid_pass_retries_with_fresh_session() {
    let connector = full_device().await;
    // The first attempt dies while reading the timer characteristic; the
    // trap is one-shot, so the retry's fresh session completes.
    connector.set_disconnect_on_read(TIMER).await;

    let reader = SnapshotReader::new(connector.clone()).with_retry(fast_retry());
    let snapshot = reader.read_snapshot(IDENTITY).await.unwrap();

    assert!(snapshot.modes.timer.is_some());
    assert_eq!(connector.connects(), 2);
    // Both sessions were closed, including the one the disconnect killed.
    assert_eq!(connector.disconnects(), 2);
}

#[tokio::test]
async fn test_authentication_failure_is_terminal() {
    let connector = full_device().await;
    connector.set_failing(AUTH).await;

    let code = AuthCode::from_bytes(&[1, 2, 3, 4]).unwrap();
    let reader = SnapshotReader::new(connector.clone())
        .with_auth_code(code)
        .with_retry(fast_retry());

    let err = reader.read_snapshot(IDENTITY).await.unwrap_err();
    assert!(matches!(err, Error::AuthenticationFailed { .. }));
    // Terminal: no retry was attempted, and the session still closed.
    assert_eq!(connector.connects(), 1);
    assert_eq!(connector.disconnects(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_authenticated_snapshot_writes_code_first() {
    let connector = full_device().await;
    let code = AuthCode::from_hex("01020304").unwrap();

    let reader = SnapshotReader::new(connector.clone())
        .with_auth_code(code)
        .with_retry(fast_retry());
    let snapshot = reader.read_snapshot(IDENTITY).await.unwrap();

    assert!(snapshot.sensors.is_some());
    assert_eq!(
        connector.written(AUTH).await.as_deref(),
        Some(&[1, 2, 3, 4][..])
    );
}

#[tokio::test(start_paused = true)]
async fn test_update_timeout_is_distinct_and_terminal() {
    let connector = full_device().await;
    connector.set_hang_reads(true).await;

    let reader = SnapshotReader::new(connector.clone())
        .with_update_timeout(Duration::from_secs(5))
        .with_retry(fast_retry());

    let err = reader.read_snapshot(IDENTITY).await.unwrap_err();
    assert!(matches!(err, Error::UpdateTimeout { .. }));
    // The whole budget was spent; the reader does not try again.
    assert_eq!(connector.connects(), 1);
    assert_eq!(connector.disconnects(), 1);
}

#[tokio::test]
async fn test_device_without_fan_service_is_unsupported() {
    let connector = MockConnector::new();
    connector.set_value(DEVICE_NAME, b"LYWSD03MMC".to_vec()).await;

    let reader = SnapshotReader::new(connector.clone()).with_retry(fast_retry());
    let err = reader.read_snapshot(IDENTITY).await.unwrap_err();

    match err {
        Error::UnsupportedDevice { model } => assert_eq!(model, "LYWSD03MMC"),
        other => panic!("expected UnsupportedDevice, got {other:?}"),
    }
    // Terminal: one attempt only.
    assert_eq!(connector.connects(), 1);
}

#[tokio::test]
async fn test_snapshot_is_fresh_per_attempt() {
    let connector = full_device().await;
    // Kill the first attempt late in the pass, after several fields were
    // already populated.
    connector.set_disconnect_on_read(BOOST).await;

    let reader = SnapshotReader::new(connector.clone()).with_retry(fast_retry());
    let snapshot = reader.read_snapshot(IDENTITY).await.unwrap();

    // The returned snapshot comes entirely from the successful attempt.
    assert!(snapshot.modes.boost.is_some());
    assert!(snapshot.modes.humidity.is_some());
    assert_eq!(connector.connects(), 2);
}
