//! Whole-device snapshot assembly.
//!
//! [`SnapshotReader`] owns the connect, authenticate, read-everything,
//! close lifecycle and the retry policy around it. Each field of the
//! snapshot is read independently: an unreadable characteristic leaves its
//! field empty and is logged, it never aborts the rest of the pass. Only a
//! mid-pass disconnect (or another transient transport error) tears the
//! attempt down for a retry with a fresh session.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};
use uuid::Uuid;

use freshvent_types::DeviceSnapshot;
use freshvent_types::uuid::{
    DEVICE_NAME, FIRMWARE_REVISION, HARDWARE_REVISION, MANUFACTURER_NAME, SOFTWARE_REVISION,
};
use freshvent_types::validate::AuthCode;

use crate::error::{Error, Result};
use crate::retry::{RetryConfig, with_retry};
use crate::session::Session;
use crate::transport::Connector;

/// Default wall-clock budget for one snapshot attempt.
pub const DEFAULT_UPDATE_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for establishing the transport connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Number of vendor characteristics probed per pass (status plus the seven
/// modes). When every one of them is missing, the peer does not carry the
/// fan service at all.
const VENDOR_CHARACTERISTICS: usize = 8;

/// Reads complete device snapshots with session-level retry.
///
/// # Example
///
/// ```no_run
/// use freshvent_core::{BleConnector, SnapshotReader};
/// use freshvent_types::AuthCode;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let connector = BleConnector::first_adapter().await?;
///     let reader = SnapshotReader::new(connector)
///         .with_auth_code(AuthCode::from_hex("01020304")?);
///
///     let snapshot = reader.read_snapshot("AA:BB:CC:DD:EE:FF").await?;
///     println!("fan: {:?}", snapshot.name);
///     Ok(())
/// }
/// ```
pub struct SnapshotReader {
    connector: Arc<dyn Connector>,
    auth_code: Option<AuthCode>,
    connect_timeout: Duration,
    update_timeout: Duration,
    retry: RetryConfig,
}

impl SnapshotReader {
    /// Create a reader over the given transport with default policy
    /// (3 attempts, 30 second update budget).
    pub fn new(connector: impl Connector + 'static) -> Self {
        Self {
            connector: Arc::new(connector),
            auth_code: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            update_timeout: DEFAULT_UPDATE_TIMEOUT,
            retry: RetryConfig::default(),
        }
    }

    /// Authenticate each session with this code before reading.
    #[must_use]
    pub fn with_auth_code(mut self, code: AuthCode) -> Self {
        self.auth_code = Some(code);
        self
    }

    /// Set the connect timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the wall-clock budget for one snapshot attempt.
    #[must_use]
    pub fn with_update_timeout(mut self, timeout: Duration) -> Self {
        self.update_timeout = timeout;
        self
    }

    /// Set the retry policy for whole-snapshot attempts.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Connect, read everything the device offers and disconnect.
    ///
    /// Transient failures (disconnects, transport errors) retry the whole
    /// attempt with a fresh session, up to the configured attempt count;
    /// the final attempt's error propagates unwrapped. Authentication
    /// failures, unsupported devices and codec violations are terminal.
    ///
    /// # Errors
    ///
    /// See [`Error::is_retryable`] for the classification.
    #[tracing::instrument(level = "info", skip(self), fields(identity = %identity))]
    pub async fn read_snapshot(&self, identity: &str) -> Result<DeviceSnapshot> {
        with_retry(&self.retry, "read_snapshot", || self.try_snapshot(identity)).await
    }

    /// One attempt: open, populate within the update budget, always close.
    async fn try_snapshot(&self, identity: &str) -> Result<DeviceSnapshot> {
        let session =
            Session::open(self.connector.as_ref(), identity, self.connect_timeout).await?;

        let outcome = match tokio::time::timeout(self.update_timeout, self.populate(&session)).await
        {
            Ok(result) => result,
            Err(_) => Err(Error::UpdateTimeout {
                duration: self.update_timeout,
            }),
        };

        // Close on every exit path; the snapshot (or error) is already
        // decided.
        if let Err(e) = session.close().await {
            debug!(error = %e, "closing session failed");
        }

        if outcome.is_ok() {
            info!("snapshot complete");
        }
        outcome
    }

    async fn populate(&self, session: &Session) -> Result<DeviceSnapshot> {
        if let Some(code) = &self.auth_code {
            session.authenticate(code).await?;
        }

        let mut snapshot = DeviceSnapshot::new(session.identity());

        snapshot.name = self.read_string(session, DEVICE_NAME, "device name").await?;
        snapshot.fw_version = self
            .read_string(session, FIRMWARE_REVISION, "firmware version")
            .await?;
        snapshot.hw_version = self
            .read_string(session, HARDWARE_REVISION, "hardware version")
            .await?;
        snapshot.sw_version = self
            .read_string(session, SOFTWARE_REVISION, "software version")
            .await?;
        snapshot.manufacturer = self
            .read_string(session, MANUFACTURER_NAME, "manufacturer name")
            .await?;

        let mut missing_vendor = 0usize;

        snapshot.sensors = tolerate(
            session,
            "sensor status",
            session.read_sensors().await,
            &mut missing_vendor,
        )
        .await?;

        snapshot.modes.humidity = tolerate(
            session,
            "humidity mode",
            session.read_humidity_mode().await,
            &mut missing_vendor,
        )
        .await?;
        snapshot.modes.light_voc = tolerate(
            session,
            "light/VOC mode",
            session.read_light_voc_mode().await,
            &mut missing_vendor,
        )
        .await?;
        snapshot.modes.constant_speed = tolerate(
            session,
            "constant speed mode",
            session.read_constant_speed_mode().await,
            &mut missing_vendor,
        )
        .await?;
        snapshot.modes.timer = tolerate(
            session,
            "timer mode",
            session.read_timer_mode().await,
            &mut missing_vendor,
        )
        .await?;
        snapshot.modes.airing = tolerate(
            session,
            "airing mode",
            session.read_airing_mode().await,
            &mut missing_vendor,
        )
        .await?;
        snapshot.modes.pause = tolerate(
            session,
            "pause mode",
            session.read_pause_mode().await,
            &mut missing_vendor,
        )
        .await?;
        snapshot.modes.boost = tolerate(
            session,
            "boost mode",
            session.read_boost_mode().await,
            &mut missing_vendor,
        )
        .await?;

        // A device without a single vendor characteristic is not a fan of
        // this family, whatever it calls itself.
        if missing_vendor == VENDOR_CHARACTERISTICS {
            return Err(Error::UnsupportedDevice {
                model: snapshot
                    .name
                    .clone()
                    .unwrap_or_else(|| "unknown".to_string()),
            });
        }

        Ok(snapshot)
    }

    /// Read an identity string, tolerating its absence.
    async fn read_string(
        &self,
        session: &Session,
        uuid: Uuid,
        field: &'static str,
    ) -> Result<Option<String>> {
        let mut ignored = 0usize;
        let data = tolerate(session, field, session.read(uuid).await, &mut ignored).await?;
        Ok(data.map(|bytes| String::from_utf8_lossy(&bytes).replace('\0', "")))
    }
}

/// Fold one field's outcome into the snapshot pass.
///
/// Transient session-fatal errors (a disconnect, a dead session) propagate
/// so the whole attempt can retry; everything else downgrades to an empty
/// field with a log line. A missing characteristic additionally asks the
/// transport to rebuild its characteristic table, in case service
/// discovery went stale.
async fn tolerate<T>(
    session: &Session,
    field: &'static str,
    result: Result<T>,
    missing_vendor: &mut usize,
) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(Error::Disconnected) => Err(Error::Disconnected),
        Err(Error::NotConnected) => Err(Error::NotConnected),
        Err(Error::CharacteristicNotFound { uuid }) => {
            *missing_vendor += 1;
            session.clear_characteristic_cache().await;
            debug!(field, %uuid, "characteristic not found, leaving field empty");
            Ok(None)
        }
        Err(e) => {
            debug!(field, error = %e, "could not read field, leaving it empty");
            Ok(None)
        }
    }
}
