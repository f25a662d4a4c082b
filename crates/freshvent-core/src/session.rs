//! Connection session to a single fan.
//!
//! A [`Session`] owns one transport link from open to close and drives the
//! state machine `Connected -> (Authenticated)? -> Closed`. `Closed` is
//! terminal: reconnecting means opening a new session.
//!
//! Every characteristic operation races the transport future against the
//! link's disconnect token. The race is biased towards the token: a
//! disconnect that arrived before the operation's own result always wins,
//! so a stale "success" the stack delivers after the link died can never be
//! mistaken for live data.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use freshvent_types::modes::{
    AiringMode, BoostMode, ConstantSpeedMode, HumidityMode, LightVocMode, PauseMode,
    TemporarySpeed, TimerMode,
};
use freshvent_types::sensors::SensorSnapshot;
use freshvent_types::uuid::{
    AIRING, AUTH, BOOST, CONSTANT_SPEED, DEVICE_STATUS, HUMIDITY, LIGHT_VOC, PAUSE,
    TEMPORARY_SPEED, TIMER,
};
use freshvent_types::validate::AuthCode;

use crate::error::{Error, Result};
use crate::transport::{Connector, TransportLink};

/// How long to wait after writing the authentication code before issuing
/// further operations. The device gives no acknowledgement, it just needs
/// a moment before authenticated characteristics respond.
pub const AUTH_SETTLE_DELAY: Duration = Duration::from_millis(500);

/// Lifecycle state of a [`Session`].
///
/// The connect phase happens inside [`Session::open`]; a session value
/// always starts out `Connected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SessionState {
    /// Transport link established, not authenticated.
    Connected = 0,
    /// Authentication code written and settled.
    Authenticated = 1,
    /// Session torn down, by request or by disconnect. Terminal.
    Closed = 2,
}

/// One logical connection to one fan.
///
/// A session is the sole owner of its transport link. Operations are
/// serialized internally; concurrent callers queue rather than interleave,
/// since BLE characteristic operations are not reentrant-safe per
/// connection.
pub struct Session {
    link: Box<dyn TransportLink>,
    disconnected: CancellationToken,
    identity: String,
    state: AtomicU8,
    closed: AtomicBool,
    ops: tokio::sync::Mutex<()>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("identity", &self.identity)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Open a session by connecting through the given transport.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectTimeout`] or [`Error::ConnectFailed`] when
    /// the transport cannot establish the link.
    #[tracing::instrument(level = "info", skip(connector), fields(identity = %identity))]
    pub async fn open(
        connector: &dyn Connector,
        identity: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let link = connector.connect(identity, timeout).await?;
        let disconnected = link.disconnected();
        info!("session connected");

        Ok(Self {
            link,
            disconnected,
            identity: identity.to_string(),
            state: AtomicU8::new(SessionState::Connected as u8),
            closed: AtomicBool::new(false),
            ops: tokio::sync::Mutex::new(()),
        })
    }

    /// The identity this session connected to.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        match self.state.load(Ordering::SeqCst) {
            0 => SessionState::Connected,
            1 => SessionState::Authenticated,
            _ => SessionState::Closed,
        }
    }

    fn ensure_open(&self) -> Result<()> {
        match self.state() {
            SessionState::Connected | SessionState::Authenticated => Ok(()),
            SessionState::Closed => Err(Error::NotConnected),
        }
    }

    fn mark_closed(&self) {
        self.state
            .store(SessionState::Closed as u8, Ordering::SeqCst);
    }

    /// Write the authentication code and move to `Authenticated`.
    ///
    /// Only valid from `Connected`. The device sends no acknowledgement
    /// for the code itself; all this can verify is that the write went
    /// through, after which it waits [`AUTH_SETTLE_DELAY`]. A wrong code
    /// surfaces later as rejected mode writes, a protocol limitation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] outside `Connected`,
    /// [`Error::Disconnected`] if the device drops mid-write, and
    /// [`Error::AuthenticationFailed`] when the write itself fails.
    #[tracing::instrument(level = "debug", skip_all)]
    pub async fn authenticate(&self, code: &AuthCode) -> Result<()> {
        if self.state() != SessionState::Connected {
            return Err(Error::NotConnected);
        }

        let result = {
            let _op = self.ops.lock().await;
            tokio::select! {
                biased;
                () = self.disconnected.cancelled() => {
                    self.mark_closed();
                    return Err(Error::Disconnected);
                }
                result = self.link.write_characteristic(AUTH, code.as_bytes(), true) => result,
            }
        };

        match result {
            Ok(()) => {
                sleep(AUTH_SETTLE_DELAY).await;
                self.state
                    .store(SessionState::Authenticated as u8, Ordering::SeqCst);
                debug!("authenticated");
                Ok(())
            }
            Err(e) => Err(Error::AuthenticationFailed {
                reason: e.to_string(),
            }),
        }
    }

    /// Read a characteristic, racing the disconnect signal.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] outside `Connected`/`Authenticated`
    /// and [`Error::Disconnected`] when the disconnect notification
    /// resolves before the transport result; transport errors pass
    /// through.
    pub async fn read(&self, uuid: Uuid) -> Result<Vec<u8>> {
        self.ensure_open()?;
        let _op = self.ops.lock().await;
        // Biased select: the disconnect token is polled before the
        // transport future, so a disconnect that fired first wins even if
        // the stack has a stale result queued up.
        tokio::select! {
            biased;
            () = self.disconnected.cancelled() => {
                self.mark_closed();
                Err(Error::Disconnected)
            }
            result = self.link.read_characteristic(uuid) => result,
        }
    }

    /// Write a characteristic with response, racing the disconnect signal.
    ///
    /// # Errors
    ///
    /// Same contract as [`read`](Self::read).
    pub async fn write(&self, uuid: Uuid, data: &[u8]) -> Result<()> {
        self.ensure_open()?;
        let _op = self.ops.lock().await;
        tokio::select! {
            biased;
            () = self.disconnected.cancelled() => {
                self.mark_closed();
                Err(Error::Disconnected)
            }
            result = self.link.write_characteristic(uuid, data, true) => result,
        }
    }

    /// Hint the transport to rebuild its characteristic table.
    ///
    /// Best-effort: issued after a "characteristic not found" condition in
    /// case service discovery returned a stale table. Failures are logged
    /// and swallowed.
    pub async fn clear_characteristic_cache(&self) {
        if let Err(e) = self.link.clear_characteristic_cache().await {
            debug!(error = %e, "clearing characteristic cache failed");
        }
    }

    /// Close the session. Idempotent and safe to call from any state,
    /// including after a fatal error.
    ///
    /// # Errors
    ///
    /// Propagates the transport's disconnect error; the session counts as
    /// closed either way.
    #[tracing::instrument(level = "debug", skip_all, fields(identity = %self.identity))]
    pub async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            debug!("session already closed");
            return Ok(());
        }
        self.mark_closed();
        debug!("closing session");
        self.link.disconnect().await
    }

    // --- Typed characteristic accessors ---

    /// Read the authentication code the fan hands out in pairing mode.
    ///
    /// # Errors
    ///
    /// Returns [`freshvent_types::ParseError::NotInPairingMode`] (wrapped
    /// in [`Error::Parse`]) when the fan reports the all-zero code.
    pub async fn fetch_auth_code(&self) -> Result<AuthCode> {
        let data = self.read(AUTH).await?;
        Ok(AuthCode::from_bytes(&data)?)
    }

    /// Read the live sensor snapshot.
    pub async fn read_sensors(&self) -> Result<SensorSnapshot> {
        let data = self.read(DEVICE_STATUS).await?;
        Ok(SensorSnapshot::from_bytes(&data)?)
    }

    /// Read the humidity mode record.
    pub async fn read_humidity_mode(&self) -> Result<HumidityMode> {
        let data = self.read(HUMIDITY).await?;
        Ok(HumidityMode::from_bytes(&data)?)
    }

    /// Write the humidity mode record.
    pub async fn write_humidity_mode(&self, mode: &HumidityMode) -> Result<()> {
        self.write(HUMIDITY, &mode.to_bytes()).await
    }

    /// Read the light/VOC mode record.
    pub async fn read_light_voc_mode(&self) -> Result<LightVocMode> {
        let data = self.read(LIGHT_VOC).await?;
        Ok(LightVocMode::from_bytes(&data)?)
    }

    /// Write the light/VOC mode record.
    pub async fn write_light_voc_mode(&self, mode: &LightVocMode) -> Result<()> {
        self.write(LIGHT_VOC, &mode.to_bytes()).await
    }

    /// Read the constant speed mode record.
    pub async fn read_constant_speed_mode(&self) -> Result<ConstantSpeedMode> {
        let data = self.read(CONSTANT_SPEED).await?;
        Ok(ConstantSpeedMode::from_bytes(&data)?)
    }

    /// Write the constant speed mode record.
    pub async fn write_constant_speed_mode(&self, mode: &ConstantSpeedMode) -> Result<()> {
        self.write(CONSTANT_SPEED, &mode.to_bytes()).await
    }

    /// Read the timer mode record.
    pub async fn read_timer_mode(&self) -> Result<TimerMode> {
        let data = self.read(TIMER).await?;
        Ok(TimerMode::from_bytes(&data)?)
    }

    /// Write the timer mode record.
    pub async fn write_timer_mode(&self, mode: &TimerMode) -> Result<()> {
        self.write(TIMER, &mode.to_bytes()).await
    }

    /// Read the airing mode record.
    pub async fn read_airing_mode(&self) -> Result<AiringMode> {
        let data = self.read(AIRING).await?;
        Ok(AiringMode::from_bytes(&data)?)
    }

    /// Write the airing mode record.
    pub async fn write_airing_mode(&self, mode: &AiringMode) -> Result<()> {
        self.write(AIRING, &mode.to_bytes()).await
    }

    /// Read the pause mode record.
    pub async fn read_pause_mode(&self) -> Result<PauseMode> {
        let data = self.read(PAUSE).await?;
        Ok(PauseMode::from_bytes(&data)?)
    }

    /// Write the pause mode record.
    pub async fn write_pause_mode(&self, mode: &PauseMode) -> Result<()> {
        self.write(PAUSE, &mode.to_bytes()).await
    }

    /// Read the boost mode record.
    pub async fn read_boost_mode(&self) -> Result<BoostMode> {
        let data = self.read(BOOST).await?;
        Ok(BoostMode::from_bytes(&data)?)
    }

    /// Write the boost mode record.
    pub async fn write_boost_mode(&self, mode: &BoostMode) -> Result<()> {
        self.write(BOOST, &mode.to_bytes()).await
    }

    /// Write a temporary speed override.
    pub async fn write_temporary_speed(&self, speed: &TemporarySpeed) -> Result<()> {
        self.write(TEMPORARY_SPEED, &speed.to_bytes()).await
    }
}
