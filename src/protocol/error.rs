use std::io;

use thiserror::Error;

/// Broad classification of a [`DictError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Connection,
    Protocol,
    InvalidDatabase,
    InvalidStrategy,
}

/// Failure of any operation on a [`DictConnection`](super::DictConnection).
#[derive(Debug, Error)]
pub enum DictError {
    /// The channel failed, the handshake was rejected, or the handle is closed.
    #[error("connection error: {reason}")]
    Connection {
        reason: String,
        #[source]
        source: Option<io::Error>,
    },

    /// A malformed status line or a status code that does not fit the command.
    #[error("protocol error: {reason}")]
    Protocol { code: Option<u16>, reason: String },

    /// The server rejected the requested database (status 550).
    #[error("invalid database: {0}")]
    InvalidDatabase(String),

    /// The server rejected the requested strategy (status 551).
    #[error("invalid strategy: {0}")]
    InvalidStrategy(String),
}

impl DictError {
    pub(crate) fn connection(reason: impl Into<String>) -> Self {
        Self::Connection {
            reason: reason.into(),
            source: None,
        }
    }

    pub(crate) fn protocol(reason: impl Into<String>) -> Self {
        Self::Protocol {
            code: None,
            reason: reason.into(),
        }
    }

    pub(crate) fn unexpected(code: u16, detail: &str) -> Self {
        Self::Protocol {
            code: Some(code),
            reason: format!("unexpected status {code} '{detail}'"),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Connection { .. } => ErrorKind::Connection,
            Self::Protocol { .. } => ErrorKind::Protocol,
            Self::InvalidDatabase(_) => ErrorKind::InvalidDatabase,
            Self::InvalidStrategy(_) => ErrorKind::InvalidStrategy,
        }
    }

    /// Status code observed on the wire, when the error came from one.
    pub fn code(&self) -> Option<u16> {
        match self {
            Self::Protocol { code, .. } => *code,
            Self::InvalidDatabase(_) => Some(550),
            Self::InvalidStrategy(_) => Some(551),
            Self::Connection { .. } => None,
        }
    }

    /// Free text the server attached to a negative acknowledgement.
    pub fn server_text(&self) -> Option<&str> {
        match self {
            Self::InvalidDatabase(text) | Self::InvalidStrategy(text) => Some(text),
            _ => None,
        }
    }
}

impl From<io::Error> for DictError {
    fn from(value: io::Error) -> Self {
        Self::Connection {
            reason: value.to_string(),
            source: Some(value),
        }
    }
}
