use serde::{self, Deserializer, Serializer};
use std::{io, sync::Arc};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Serialize, Deserialize)]
struct AnyHowError {
    description: String,
    backtrace: String,
}

#[derive(Serialize, Deserialize)]
struct IoError {
    description: String,
    kind: String,
}

fn serialize_io_error<S>(error: &Arc<io::Error>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let to_serialize = IoError {
        description: format!("{}", error),
        kind: format!("{:?}", error.kind()),
    };
    to_serialize.serialize(serializer)
}

fn deserialize_io_error<'de, D>(deserializer: D) -> Result<Arc<io::Error>, D::Error>
where
    D: Deserializer<'de>,
{
    let ret = IoError::deserialize(deserializer)?;
    let kind = match ret.kind.as_str() {
        "NotFound" => io::ErrorKind::NotFound,
        "PermissionDenied" => io::ErrorKind::PermissionDenied,
        "TimedOut" => io::ErrorKind::TimedOut,
        "AlreadyExists" => io::ErrorKind::AlreadyExists,
        "InvalidInput" => io::ErrorKind::InvalidInput,
        _ => io::ErrorKind::Other,
    };
    Ok(Arc::new(io::Error::new(kind, ret.description)))
}

fn serialize_anyhow_error<S>(error: &Arc<anyhow::Error>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let to_serialize = AnyHowError {
        description: error.to_string(),
        backtrace: format!("{:?}", error.backtrace()),
    };
    to_serialize.serialize(serializer)
}

fn deserialize_anyhow_error<'de, D>(deserializer: D) -> Result<Arc<anyhow::Error>, D::Error>
where
    D: Deserializer<'de>,
{
    let ret = AnyHowError::deserialize(deserializer)?;
    let ret = anyhow::Error::msg(ret.description);
    Ok(Arc::new(ret))
}

/// Low level cause of a failed connection or local file operation.
#[derive(Error, Clone, Debug, Serialize, Deserialize)]
pub enum TransportError {
    #[error("IO Error: {0}")]
    Io(
        #[serde(
            serialize_with = "serialize_io_error",
            deserialize_with = "deserialize_io_error"
        )]
        Arc<io::Error>,
    ),
    #[error("{0}")]
    Other(
        #[serde(
            serialize_with = "serialize_anyhow_error",
            deserialize_with = "deserialize_anyhow_error"
        )]
        Arc<anyhow::Error>,
    ),
}

impl From<io::Error> for TransportError {
    fn from(err: io::Error) -> Self {
        TransportError::Io(Arc::new(err))
    }
}

impl From<anyhow::Error> for TransportError {
    fn from(x: anyhow::Error) -> Self {
        TransportError::Other(Arc::new(x))
    }
}

/// Every failure reported by a session, the command table engine or a native driver.
///
/// Each variant carries the literal command, resource or driver call that failed,
/// so that a log line alone is enough to debug an instrument integration.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum Error {
    #[error("Cannot connect to `{target}`: {cause}")]
    Connection { target: String, cause: TransportError },
    #[error("No device found")]
    NoDeviceFound,
    #[error("Session is not open")]
    NotOpen,
    #[error("{what} is already open")]
    AlreadyOpen { what: String },
    #[error("Invalid option {index} for `{axis}`, valid range is 0..{len}")]
    InvalidOption {
        axis: String,
        index: i64,
        len: usize,
    },
    #[error("Malformed reply to `{command}`: {reply:?}")]
    MalformedReply { command: String, reply: String },
    #[error("Driver error {code} in `{call}`: {message}")]
    Driver {
        call: String,
        code: i32,
        message: String,
    },
    #[error("Operation not supported: {operation}")]
    NotSupported { operation: String },
    #[error("IO Error {0}")]
    Io(TransportError),
    #[error("Argument Error {0}")]
    Argument(
        #[serde(
            serialize_with = "serialize_anyhow_error",
            deserialize_with = "deserialize_anyhow_error"
        )]
        Arc<anyhow::Error>,
    ),
    #[error("Internal Error {0}")]
    Internal(
        #[serde(
            serialize_with = "serialize_anyhow_error",
            deserialize_with = "deserialize_anyhow_error"
        )]
        Arc<anyhow::Error>,
    ),
}

impl Error {
    pub fn connection<S: Into<String>, T: Into<TransportError>>(target: S, cause: T) -> Self {
        Self::Connection {
            target: target.into(),
            cause: cause.into(),
        }
    }

    pub fn driver<S: Into<String>, M: Into<String>>(call: S, code: i32, message: M) -> Self {
        Self::Driver {
            call: call.into(),
            code,
            message: message.into(),
        }
    }

    pub fn malformed_reply<S: Into<String>, R: Into<String>>(command: S, reply: R) -> Self {
        Self::MalformedReply {
            command: command.into(),
            reply: reply.into(),
        }
    }

    pub fn not_supported<S: Into<String>>(operation: S) -> Self {
        Self::NotSupported {
            operation: operation.into(),
        }
    }

    pub fn already_open<S: Into<String>>(what: S) -> Self {
        Self::AlreadyOpen { what: what.into() }
    }

    pub fn internal<T: Into<anyhow::Error>>(err: T) -> Self {
        Self::Internal(Arc::new(err.into()))
    }

    pub fn argument<T: Into<anyhow::Error>>(err: T) -> Self {
        Self::Argument(Arc::new(err.into()))
    }

    /// True for failures a caller may reasonably retry after re-opening the session.
    pub fn should_retry(&self) -> bool {
        match self {
            Error::Connection {
                cause: TransportError::Io(err),
                ..
            } => {
                err.kind() == io::ErrorKind::ConnectionReset
                    || err.kind() == io::ErrorKind::ConnectionAborted
                    || err.kind() == io::ErrorKind::BrokenPipe
                    || err.kind() == io::ErrorKind::TimedOut
            }
            Error::Connection { .. } => true,
            Error::Driver { .. } => true,
            Error::MalformedReply { .. } => true,
            _ => false,
        }
    }
}

impl From<io::Error> for Error {
    fn from(x: io::Error) -> Self {
        Error::Io(TransportError::Io(Arc::new(x)))
    }
}
