//! Transport abstraction over the BLE stack.
//!
//! The session and snapshot reader talk to the device through these two
//! traits rather than btleplug directly, so that tests can run against
//! [`crate::mock::MockConnector`] and alternative stacks can be plugged in.

use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::Result;

/// Establishes transport links to devices.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connect to the device with the given identity (address or platform
    /// identifier) within `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ConnectTimeout`] when the deadline expires
    /// and [`crate::Error::ConnectFailed`] when the transport refuses the
    /// connection.
    async fn connect(&self, identity: &str, timeout: Duration) -> Result<Box<dyn TransportLink>>;
}

/// One live connection to one device.
///
/// Characteristic operations are not reentrant-safe on BLE stacks; callers
/// (the session) must serialize them. A link is single-use: after
/// [`disconnect`](Self::disconnect) it cannot be revived.
#[async_trait]
pub trait TransportLink: Send + Sync {
    /// Read the value of a characteristic.
    async fn read_characteristic(&self, uuid: Uuid) -> Result<Vec<u8>>;

    /// Write a value to a characteristic.
    ///
    /// With `with_response` set the write waits for the peripheral's
    /// acknowledgement.
    async fn write_characteristic(&self, uuid: Uuid, data: &[u8], with_response: bool)
    -> Result<()>;

    /// Drop and rebuild any cached characteristic table.
    ///
    /// Best-effort hint issued after a "characteristic not found"
    /// condition, in case service discovery returned a stale table.
    async fn clear_characteristic_cache(&self) -> Result<()>;

    /// Tear the connection down. Idempotent.
    async fn disconnect(&self) -> Result<()>;

    /// Token cancelled when the transport observes an unsolicited
    /// disconnect.
    ///
    /// This is a push signal: the transport fires it as soon as the
    /// disconnect is reported, independent of any in-flight operation.
    fn disconnected(&self) -> CancellationToken;
}
