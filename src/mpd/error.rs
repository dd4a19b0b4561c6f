use std::io::{self, ErrorKind};
use thiserror::Error;

/// Failure of a call into MPD.
#[derive(Debug, Error)]
pub enum MpdError {
    /// The transport is gone; the session reconnects on this one.
    #[error("connection to MPD closed: {0}")]
    ConnectionClosed(String),

    #[error("failed to connect to MPD at {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: io::Error,
    },

    /// `ACK [code@index] {command} message`
    #[error("MPD rejected {command}: {message} (error {code})")]
    Ack {
        code: u32,
        command: String,
        message: String,
    },

    #[error("MPD I/O error: {0}")]
    Io(#[source] io::Error),

    #[error("unexpected MPD response: {0}")]
    Protocol(String),

    /// Queue positions start at zero.
    #[error("no queue position {0}")]
    BadPosition(i32),
}

impl MpdError {
    pub fn is_connection_closed(&self) -> bool {
        matches!(self, MpdError::ConnectionClosed(_))
    }
}

fn is_hangup(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::UnexpectedEof
            | ErrorKind::BrokenPipe
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::NotConnected
    )
}

impl From<io::Error> for MpdError {
    fn from(err: io::Error) -> Self {
        if is_hangup(err.kind()) {
            MpdError::ConnectionClosed(err.to_string())
        } else {
            MpdError::Io(err)
        }
    }
}

impl From<mpd::error::Error> for MpdError {
    fn from(err: mpd::error::Error) -> Self {
        match err {
            mpd::error::Error::Io(err) => err.into(),
            mpd::error::Error::Server(err) => MpdError::Ack {
                code: err.code as u32,
                command: err.command,
                message: err.detail,
            },
            mpd::error::Error::Parse(err) => MpdError::Protocol(err.to_string()),
            mpd::error::Error::Proto(err) => MpdError::Protocol(err.to_string()),
        }
    }
}
