//! btleplug-backed transport.
//!
//! [`BleConnector`] implements [`Connector`] over a btleplug adapter. The
//! peer must already be known to the adapter (paired or previously
//! discovered); scanning for devices is a separate concern and not part of
//! this crate.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use btleplug::api::{
    Central, CentralEvent, Characteristic, Manager as _, Peripheral as _, WriteType,
};
use btleplug::platform::{Adapter, Manager, Peripheral, PeripheralId};
use futures::StreamExt;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::transport::{Connector, TransportLink};
use crate::util::{create_identifier, format_peripheral_id};

/// Default timeout for BLE characteristic read operations.
const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for BLE characteristic write operations.
const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for service discovery.
const DEFAULT_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Per-operation timeouts for the BLE transport.
///
/// Increase these in challenging RF environments (concrete walls,
/// interference).
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Timeout for BLE read operations.
    pub read_timeout: Duration,
    /// Timeout for BLE write operations.
    pub write_timeout: Duration,
    /// Timeout for service discovery after connection.
    pub discovery_timeout: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            read_timeout: DEFAULT_READ_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            discovery_timeout: DEFAULT_DISCOVERY_TIMEOUT,
        }
    }
}

impl ConnectionConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the read timeout.
    #[must_use]
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Set the write timeout.
    #[must_use]
    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Set the service discovery timeout.
    #[must_use]
    pub fn discovery_timeout(mut self, timeout: Duration) -> Self {
        self.discovery_timeout = timeout;
        self
    }
}

/// [`Connector`] implementation over a btleplug [`Adapter`].
pub struct BleConnector {
    adapter: Adapter,
    config: ConnectionConfig,
}

impl BleConnector {
    /// Create a connector over the given adapter.
    pub fn new(adapter: Adapter) -> Self {
        Self::with_config(adapter, ConnectionConfig::default())
    }

    /// Create a connector with custom per-operation timeouts.
    pub fn with_config(adapter: Adapter, config: ConnectionConfig) -> Self {
        Self { adapter, config }
    }

    /// Create a connector over the first available Bluetooth adapter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectFailed`] when no adapter is present and
    /// [`Error::Bluetooth`] when the manager cannot be created.
    pub async fn first_adapter() -> Result<Self> {
        let manager = Manager::new().await?;
        let adapter = manager
            .adapters()
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::connect_failed("adapter", "no Bluetooth adapter available"))?;
        Ok(Self::new(adapter))
    }

    /// Resolve an identity string against the adapter's known peripherals.
    ///
    /// Matches the Bluetooth address (case-insensitive), the platform
    /// peripheral ID, or the advertised local name.
    async fn find_peripheral(&self, identity: &str) -> Result<Peripheral> {
        for peripheral in self.adapter.peripherals().await? {
            let address = peripheral.address().to_string();
            if address.eq_ignore_ascii_case(identity) {
                return Ok(peripheral);
            }
            if create_identifier(&address, &peripheral.id()) == identity
                || format_peripheral_id(&peripheral.id()) == identity
            {
                return Ok(peripheral);
            }
            let name = peripheral
                .properties()
                .await
                .ok()
                .flatten()
                .and_then(|p| p.local_name);
            if name.as_deref() == Some(identity) {
                return Ok(peripheral);
            }
        }

        Err(Error::connect_failed(
            identity,
            "device not known to the adapter; discover or pair it first",
        ))
    }
}

#[async_trait]
impl Connector for BleConnector {
    async fn connect(
        &self,
        identity: &str,
        connect_timeout: Duration,
    ) -> Result<Box<dyn TransportLink>> {
        let peripheral = self.find_peripheral(identity).await?;

        debug!("connecting");
        timeout(connect_timeout, peripheral.connect())
            .await
            .map_err(|_| Error::ConnectTimeout {
                identity: identity.to_string(),
                duration: connect_timeout,
            })?
            .map_err(|e| Error::connect_failed(identity, e.to_string()))?;

        debug!("discovering services");
        timeout(self.config.discovery_timeout, peripheral.discover_services())
            .await
            .map_err(|_| Error::timeout("discover services", self.config.discovery_timeout))??;

        let characteristics = characteristics_by_uuid(&peripheral);
        debug!(count = characteristics.len(), "cached characteristics");

        let disconnected = CancellationToken::new();
        let listener =
            spawn_disconnect_listener(&self.adapter, peripheral.id(), disconnected.clone())
                .await?;

        Ok(Box::new(BleLink {
            peripheral,
            config: self.config.clone(),
            characteristics: RwLock::new(characteristics),
            disconnected,
            listener: tokio::sync::Mutex::new(Some(listener)),
        }))
    }
}

fn characteristics_by_uuid(peripheral: &Peripheral) -> HashMap<Uuid, Characteristic> {
    let mut cache = HashMap::new();
    for service in peripheral.services() {
        for characteristic in &service.characteristics {
            cache.insert(characteristic.uuid, characteristic.clone());
        }
    }
    cache
}

/// Watch adapter events and cancel the token when the peer drops the
/// connection. This is the push half of the session's disconnect race.
async fn spawn_disconnect_listener(
    adapter: &Adapter,
    id: PeripheralId,
    token: CancellationToken,
) -> Result<JoinHandle<()>> {
    let mut events = adapter.events().await?;
    Ok(tokio::spawn(async move {
        while let Some(event) = events.next().await {
            if let CentralEvent::DeviceDisconnected(peripheral_id) = event {
                if peripheral_id == id {
                    debug!("transport reported unsolicited disconnect");
                    token.cancel();
                    break;
                }
            }
        }
    }))
}

/// One live btleplug connection.
struct BleLink {
    peripheral: Peripheral,
    config: ConnectionConfig,
    characteristics: RwLock<HashMap<Uuid, Characteristic>>,
    disconnected: CancellationToken,
    listener: tokio::sync::Mutex<Option<JoinHandle<()>>>,
}

impl BleLink {
    async fn find_characteristic(&self, uuid: Uuid) -> Result<Characteristic> {
        {
            let cache = self.characteristics.read().await;
            if let Some(characteristic) = cache.get(&uuid) {
                return Ok(characteristic.clone());
            }
            if !cache.is_empty() {
                return Err(Error::CharacteristicNotFound { uuid });
            }
        }

        // Cache empty: discovery may not have populated yet. Search the
        // services directly before giving up.
        warn!(%uuid, "characteristic cache empty, searching services");
        for service in self.peripheral.services() {
            for characteristic in &service.characteristics {
                if characteristic.uuid == uuid {
                    return Ok(characteristic.clone());
                }
            }
        }

        Err(Error::CharacteristicNotFound { uuid })
    }
}

#[async_trait]
impl TransportLink for BleLink {
    async fn read_characteristic(&self, uuid: Uuid) -> Result<Vec<u8>> {
        let characteristic = self.find_characteristic(uuid).await?;
        let data = timeout(self.config.read_timeout, self.peripheral.read(&characteristic))
            .await
            .map_err(|_| {
                Error::timeout(
                    format!("read characteristic {uuid}"),
                    self.config.read_timeout,
                )
            })??;
        Ok(data)
    }

    async fn write_characteristic(
        &self,
        uuid: Uuid,
        data: &[u8],
        with_response: bool,
    ) -> Result<()> {
        let characteristic = self.find_characteristic(uuid).await?;
        let write_type = if with_response {
            WriteType::WithResponse
        } else {
            WriteType::WithoutResponse
        };

        timeout(
            self.config.write_timeout,
            self.peripheral.write(&characteristic, data, write_type),
        )
        .await
        .map_err(|_| {
            Error::timeout(
                format!("write characteristic {uuid}"),
                self.config.write_timeout,
            )
        })?
        .map_err(|e| Error::WriteFailed {
            uuid,
            reason: e.to_string(),
        })
    }

    async fn clear_characteristic_cache(&self) -> Result<()> {
        debug!("rebuilding characteristic cache");
        self.characteristics.write().await.clear();

        timeout(self.config.discovery_timeout, self.peripheral.discover_services())
            .await
            .map_err(|_| Error::timeout("rediscover services", self.config.discovery_timeout))??;

        let rebuilt = characteristics_by_uuid(&self.peripheral);
        debug!(count = rebuilt.len(), "characteristic cache rebuilt");
        *self.characteristics.write().await = rebuilt;
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        if let Some(listener) = self.listener.lock().await.take() {
            listener.abort();
        }
        self.peripheral.disconnect().await?;
        Ok(())
    }

    fn disconnected(&self) -> CancellationToken {
        self.disconnected.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_config_builders() {
        let config = ConnectionConfig::new()
            .read_timeout(Duration::from_secs(15))
            .write_timeout(Duration::from_secs(5))
            .discovery_timeout(Duration::from_secs(20));

        assert_eq!(config.read_timeout, Duration::from_secs(15));
        assert_eq!(config.write_timeout, Duration::from_secs(5));
        assert_eq!(config.discovery_timeout, Duration::from_secs(20));
    }
}
