//! Mock transport for testing.
//!
//! [`MockConnector`] implements [`Connector`] without any BLE hardware.
//! Characteristic values are canned per UUID, and the common failure modes
//! can be injected: refused connects, missing characteristics, failing
//! operations, hanging reads and unsolicited disconnects.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::transport::{Connector, TransportLink};

#[derive(Default)]
struct MockShared {
    values: RwLock<HashMap<Uuid, Vec<u8>>>,
    missing: RwLock<HashSet<Uuid>>,
    failing: RwLock<HashSet<Uuid>>,
    disconnect_on_read: RwLock<Option<Uuid>>,
    hang_reads: AtomicBool,
    read_latency_ms: AtomicU64,
    connect_failures: AtomicU32,
    connects: AtomicU32,
    reads: AtomicU32,
    writes: AtomicU32,
    cache_clears: AtomicU32,
    disconnects: AtomicU32,
    token: RwLock<CancellationToken>,
}

/// A mock fan transport for testing.
///
/// Create one, can the characteristic values the test needs, and hand it
/// to [`crate::Session::open`] or [`crate::SnapshotReader`].
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use freshvent_core::{mock::MockConnector, Session};
/// use freshvent_types::uuid::PAUSE;
///
/// #[tokio::main]
/// async fn main() {
///     let connector = MockConnector::new();
///     connector.set_value(PAUSE, vec![0x01, 0x0A]).await;
///
///     let session = Session::open(&connector, "AA:BB:CC:DD:EE:FF", Duration::from_secs(5))
///         .await
///         .unwrap();
///     let pause = session.read_pause_mode().await.unwrap();
///     assert_eq!(pause.minutes, 10);
/// }
/// ```
#[derive(Clone, Default)]
pub struct MockConnector {
    shared: Arc<MockShared>,
}

impl MockConnector {
    /// Create a mock with no canned values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the value a characteristic read will return.
    pub async fn set_value(&self, uuid: Uuid, value: Vec<u8>) {
        self.shared.values.write().await.insert(uuid, value);
    }

    /// Make a characteristic report as not present on the device.
    pub async fn set_missing(&self, uuid: Uuid) {
        self.shared.missing.write().await.insert(uuid);
    }

    /// Make a characteristic no longer report as missing.
    pub async fn clear_missing(&self, uuid: Uuid) {
        self.shared.missing.write().await.remove(&uuid);
    }

    /// Make reads and writes of a characteristic fail with a transport
    /// error.
    pub async fn set_failing(&self, uuid: Uuid) {
        self.shared.failing.write().await.insert(uuid);
    }

    /// Make all reads hang until the session's disconnect race resolves
    /// them.
    pub async fn set_hang_reads(&self, hang: bool) {
        self.shared.hang_reads.store(hang, Ordering::SeqCst);
    }

    /// Trigger an unsolicited disconnect the next time this characteristic
    /// is read. One-shot: the trap is cleared when it fires.
    pub async fn set_disconnect_on_read(&self, uuid: Uuid) {
        *self.shared.disconnect_on_read.write().await = Some(uuid);
    }

    /// Add artificial latency to every read.
    pub async fn set_read_latency(&self, latency: Duration) {
        self.shared
            .read_latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    /// Fail the next `count` connection attempts.
    pub fn fail_connects(&self, count: u32) {
        self.shared.connect_failures.store(count, Ordering::SeqCst);
    }

    /// Fire the unsolicited disconnect notification for the current link.
    pub async fn trigger_disconnect(&self) {
        self.shared.token.read().await.cancel();
    }

    /// Last value written to a characteristic, if any.
    pub async fn written(&self, uuid: Uuid) -> Option<Vec<u8>> {
        self.shared.values.read().await.get(&uuid).cloned()
    }

    /// Number of connection attempts made.
    pub fn connects(&self) -> u32 {
        self.shared.connects.load(Ordering::SeqCst)
    }

    /// Number of characteristic reads performed.
    pub fn reads(&self) -> u32 {
        self.shared.reads.load(Ordering::SeqCst)
    }

    /// Number of characteristic writes performed.
    pub fn writes(&self) -> u32 {
        self.shared.writes.load(Ordering::SeqCst)
    }

    /// Number of characteristic cache invalidations requested.
    pub fn cache_clears(&self) -> u32 {
        self.shared.cache_clears.load(Ordering::SeqCst)
    }

    /// Number of disconnects requested through the link.
    pub fn disconnects(&self) -> u32 {
        self.shared.disconnects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, identity: &str, _timeout: Duration) -> Result<Box<dyn TransportLink>> {
        self.shared.connects.fetch_add(1, Ordering::SeqCst);

        let remaining = self.shared.connect_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.shared
                .connect_failures
                .store(remaining - 1, Ordering::SeqCst);
            return Err(Error::connect_failed(identity, "injected connect failure"));
        }

        let token = CancellationToken::new();
        *self.shared.token.write().await = token.clone();

        Ok(Box::new(MockLink {
            shared: Arc::clone(&self.shared),
            token,
        }))
    }
}

struct MockLink {
    shared: Arc<MockShared>,
    token: CancellationToken,
}

impl MockLink {
    async fn apply_read_behavior(&self, uuid: Uuid) -> Result<()> {
        let latency = self.shared.read_latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        let trapped = {
            let mut trap = self.shared.disconnect_on_read.write().await;
            if *trap == Some(uuid) {
                trap.take();
                true
            } else {
                false
            }
        };
        if trapped {
            self.token.cancel();
            futures::future::pending::<()>().await;
        }

        if self.shared.hang_reads.load(Ordering::SeqCst) {
            futures::future::pending::<()>().await;
        }

        if self.shared.failing.read().await.contains(&uuid) {
            return Err(Error::Bluetooth(btleplug::Error::RuntimeError(
                "injected failure".to_string(),
            )));
        }

        if self.shared.missing.read().await.contains(&uuid) {
            return Err(Error::CharacteristicNotFound { uuid });
        }

        Ok(())
    }
}

#[async_trait]
impl TransportLink for MockLink {
    async fn read_characteristic(&self, uuid: Uuid) -> Result<Vec<u8>> {
        self.shared.reads.fetch_add(1, Ordering::SeqCst);
        self.apply_read_behavior(uuid).await?;

        self.shared
            .values
            .read()
            .await
            .get(&uuid)
            .cloned()
            .ok_or(Error::CharacteristicNotFound { uuid })
    }

    async fn write_characteristic(
        &self,
        uuid: Uuid,
        data: &[u8],
        _with_response: bool,
    ) -> Result<()> {
        self.shared.writes.fetch_add(1, Ordering::SeqCst);

        if self.shared.failing.read().await.contains(&uuid) {
            return Err(Error::WriteFailed {
                uuid,
                reason: "injected failure".to_string(),
            });
        }

        if self.shared.missing.read().await.contains(&uuid) {
            return Err(Error::CharacteristicNotFound { uuid });
        }

        self.shared.values.write().await.insert(uuid, data.to_vec());
        Ok(())
    }

    async fn clear_characteristic_cache(&self) -> Result<()> {
        self.shared.cache_clears.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        self.shared.disconnects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn disconnected(&self) -> CancellationToken {
        self.token.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use freshvent_types::uuid::{DEVICE_STATUS, PAUSE};

    #[tokio::test]
    async fn test_canned_value_round_trip() {
        let connector = MockConnector::new();
        connector.set_value(PAUSE, vec![1, 2]).await;

        let link = connector
            .connect("AA:BB:CC:DD:EE:FF", Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(link.read_characteristic(PAUSE).await.unwrap(), vec![1, 2]);
        assert_eq!(connector.reads(), 1);
    }

    #[tokio::test]
    async fn test_unknown_characteristic_is_not_found() {
        let connector = MockConnector::new();
        let link = connector
            .connect("AA:BB:CC:DD:EE:FF", Duration::from_secs(1))
            .await
            .unwrap();
        assert!(matches!(
            link.read_characteristic(DEVICE_STATUS).await,
            Err(Error::CharacteristicNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_connect_failure_injection() {
        let connector = MockConnector::new();
        connector.fail_connects(1);

        assert!(
            connector
                .connect("AA:BB:CC:DD:EE:FF", Duration::from_secs(1))
                .await
                .is_err()
        );
        assert!(
            connector
                .connect("AA:BB:CC:DD:EE:FF", Duration::from_secs(1))
                .await
                .is_ok()
        );
        assert_eq!(connector.connects(), 2);
    }

    #[tokio::test]
    async fn test_disconnect_trap_is_one_shot() {
        let connector = MockConnector::new();
        connector.set_value(PAUSE, vec![1, 2]).await;
        connector.set_disconnect_on_read(PAUSE).await;

        let link = connector
            .connect("AA:BB:CC:DD:EE:FF", Duration::from_secs(1))
            .await
            .unwrap();
        let token = link.disconnected();

        let read = link.read_characteristic(PAUSE);
        tokio::select! {
            () = token.cancelled() => {}
            _ = read => panic!("trapped read must not resolve"),
        }

        // A fresh link reads normally: the trap cleared when it fired.
        let link = connector
            .connect("AA:BB:CC:DD:EE:FF", Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(link.read_characteristic(PAUSE).await.unwrap(), vec![1, 2]);
    }
}
