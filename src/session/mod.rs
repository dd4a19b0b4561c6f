//! The one live MPD connection, shared by both window loops.
//!
//! Every call goes through [`Session::call`]: when the connection turns out
//! to be closed, it is replaced and the call runs once more. A failure on that
//! second run is returned as is.


use crate::lock_or_recover;
use crate::log_debug;
use crate::mpd::{Connector, MpdError, PlaybackService};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

pub struct Session {
    connector: Box<dyn Connector>,
    connection: Mutex<Option<Box<dyn PlaybackService>>>,
    reconnects: AtomicU64,
}

impl Session {
    /// Connect for the first time. Startup treats failure as fatal.
    pub fn establish(connector: Box<dyn Connector>) -> Result<Self, MpdError> {
        let connection = connector.connect()?;
        tracing::info!(mpd = %connector.describe(), "connected to MPD");
        Ok(Self {
            connector,
            connection: Mutex::new(Some(connection)),
            reconnects: AtomicU64::new(0),
        })
    }

    /// Run `f`, reconnecting and retrying once if the connection was closed.
    pub fn call<T, F>(&self, op: &str, mut f: F) -> Result<T, MpdError>
    where
        F: FnMut(&mut dyn PlaybackService) -> Result<T, MpdError>,
    {
        let mut slot = lock_or_recover(&self.connection, "session");
        if let Some(connection) = slot.as_deref_mut() {
            match f(connection) {
                Err(err) if err.is_connection_closed() => {
                    log_debug(&format!("{op}: {err}; reconnecting"));
                    tracing::warn!(op, error = %err, "MPD connection dropped");
                    *slot = None;
                }
                result => return result,
            }
        }
        let connection = self.reconnect(&mut slot)?;
        f(connection)
    }

    /// Run `f` on whatever connection is current, without retrying.
    pub fn call_once<T, F>(&self, op: &str, f: F) -> Result<T, MpdError>
    where
        F: FnOnce(&mut dyn PlaybackService) -> Result<T, MpdError>,
    {
        let mut slot = lock_or_recover(&self.connection, "session");
        let result = match slot.as_deref_mut() {
            Some(connection) => f(connection),
            None => f(self.reconnect(&mut slot)?),
        };
        if let Err(err) = &result {
            log_debug(&format!("{op} failed: {err}"));
            if err.is_connection_closed() {
                *slot = None;
            }
        }
        result
    }

    /// Number of replacement connections opened so far.
    pub fn reconnect_count(&self) -> u64 {
        self.reconnects.load(Ordering::Relaxed)
    }

    fn reconnect<'a>(
        &self,
        slot: &'a mut Option<Box<dyn PlaybackService>>,
    ) -> Result<&'a mut dyn PlaybackService, MpdError> {
        self.reconnects.fetch_add(1, Ordering::Relaxed);
        match self.connector.connect() {
            Ok(connection) => {
                tracing::info!(mpd = %self.connector.describe(), "reconnected to MPD");
                Ok(&mut **slot.insert(connection))
            }
            Err(err) => {
                log_debug(&format!(
                    "reconnect to {} failed: {err}",
                    self.connector.describe()
                ));
                tracing::warn!(error = %err, "MPD reconnect failed");
                Err(err)
            }
        }
    }
}
