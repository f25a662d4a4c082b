//! BLE session and snapshot reader for Fresh Intellivent Sky fans.
//!
//! This crate drives one logical connection to an Intellivent Sky
//! bathroom ventilation fan: it authenticates, serializes characteristic
//! reads and writes, races every operation against the transport's
//! unsolicited-disconnect notification, and assembles full device
//! snapshots with session-level retry.
//!
//! # Architecture
//!
//! - [`transport`]: the abstract capability set the BLE stack provides
//!   ([`Connector`] / [`TransportLink`]).
//! - [`ble`]: the btleplug-backed transport.
//! - [`session`]: the per-connection state machine and the disconnect
//!   race.
//! - [`reader`]: whole-device snapshot assembly with retry.
//! - [`mock`]: a hardware-free transport for tests.
//!
//! The binary protocol itself (mode records, sensor snapshot, validation)
//! lives in [`freshvent_types`].
//!
//! # Quick start
//!
//! ```no_run
//! use freshvent_core::{BleConnector, SnapshotReader};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let connector = BleConnector::first_adapter().await?;
//!     let reader = SnapshotReader::new(connector);
//!
//!     let snapshot = reader.read_snapshot("AA:BB:CC:DD:EE:FF").await?;
//!     if let Some(sensors) = snapshot.sensors {
//!         println!("mode: {}, {} rpm", sensors.mode, sensors.rpm);
//!     }
//!     Ok(())
//! }
//! ```

pub mod ble;
pub mod error;
pub mod guard;
pub mod mock;
pub mod reader;
pub mod retry;
pub mod session;
pub mod transport;
pub mod util;

pub use ble::{BleConnector, ConnectionConfig};
pub use error::{Error, Result};
pub use guard::SessionGuard;
pub use reader::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_UPDATE_TIMEOUT, SnapshotReader};
pub use retry::{RetryConfig, with_retry};
pub use session::{AUTH_SETTLE_DELAY, Session, SessionState};
pub use transport::{Connector, TransportLink};

// Re-export the protocol crate for downstream convenience.
pub use freshvent_types as types;
pub use freshvent_types::{AuthCode, DeviceSnapshot, SensorSnapshot};
