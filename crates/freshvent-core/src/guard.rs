//! Scoped session ownership with close-on-drop.
//!
//! [`Session::close`](crate::Session::close) must run on every exit path,
//! normal return, error or cancellation. [`SessionGuard`] backstops that
//! discipline: when the guard goes out of scope it schedules a close, so a
//! forgotten early return cannot leak a connection.

use std::ops::Deref;

use tokio::runtime::Handle;
use tracing::warn;

use crate::session::Session;

/// A guard that closes its session when dropped.
///
/// # Example
///
/// ```ignore
/// use freshvent_core::{Session, SessionGuard};
///
/// async fn read_with_guard(connector: &dyn Connector) -> Result<(), Error> {
///     let session = Session::open(connector, "AA:BB:CC:DD:EE:FF", timeout).await?;
///     let guard = SessionGuard::new(session);
///
///     let sensors = guard.read_sensors().await?;
///     println!("fan running: {}", sensors.status);
///
///     // The session is closed when the guard goes out of scope.
///     Ok(())
/// }
/// ```
pub struct SessionGuard {
    session: Option<Session>,
}

impl SessionGuard {
    /// Wrap a session in a close-on-drop guard.
    pub fn new(session: Session) -> Self {
        Self {
            session: Some(session),
        }
    }

    /// Take the session back out, giving up the automatic close.
    ///
    /// After calling this the caller is responsible for
    /// [`Session::close`](crate::Session::close).
    pub fn into_inner(mut self) -> Session {
        // The option is only ever None after take, and take consumes self.
        self.session.take().expect("session already taken")
    }

    /// Borrow the guarded session.
    pub fn session(&self) -> &Session {
        self.session.as_ref().expect("session already taken")
    }
}

impl Deref for SessionGuard {
    type Target = Session;

    fn deref(&self) -> &Self::Target {
        self.session()
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            if let Ok(handle) = Handle::try_current() {
                handle.spawn(async move {
                    if let Err(e) = session.close().await {
                        warn!(error = %e, "failed to close session in guard drop");
                    }
                });
            } else {
                warn!("no tokio runtime available to close session in guard drop");
            }
        }
    }
}
