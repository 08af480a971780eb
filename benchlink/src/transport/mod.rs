//! Message based transports that carry SCPI text to an instrument.
//!
//! A [`Transport`] only moves bytes. Open/closed bookkeeping, reset and
//! identification live in [`crate::session::Session`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Error;

pub mod mock;
pub mod visa;

/// Line termination applied after a resource has been opened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// Keep whatever the underlying driver uses.
    Default,
    /// Commands and replies end with `\n`.
    Newline,
}

impl Default for Termination {
    fn default() -> Self {
        Termination::Default
    }
}

impl Termination {
    /// Serial (`ASRL...`) and network (`TCPIP...`, `...::SOCKET`) resources need an
    /// explicit newline, GPIB and USB resources terminate with EOI.
    pub fn for_resource(resource: &str) -> Self {
        let resource = resource.trim().to_uppercase();
        if resource.starts_with("ASRL")
            || resource.starts_with("TCPIP")
            || resource.ends_with("SOCKET")
        {
            Termination::Newline
        } else {
            Termination::Default
        }
    }
}

/// A message based I/O channel to one instrument.
///
/// `open`, `close` and `list_resources` are mandatory. Transports that cannot carry
/// text (such as a bare SPI/I2C adapter) keep the default implementations, which
/// fail with [`Error::NotSupported`].
pub trait Transport: Send {
    fn open(&mut self, resource: &str) -> crate::Result<()>;

    fn close(&mut self) -> crate::Result<()>;

    fn list_resources(&mut self) -> crate::Result<Vec<String>>;

    fn set_termination(&mut self, termination: Termination) -> crate::Result<()> {
        let _ = termination;
        Err(Error::not_supported("set_termination"))
    }

    fn set_timeout(&mut self, timeout: Duration) -> crate::Result<()> {
        let _ = timeout;
        Err(Error::not_supported("set_timeout"))
    }

    fn write(&mut self, command: &str) -> crate::Result<()> {
        Err(Error::not_supported(format!("write `{}`", command)))
    }

    fn query(&mut self, command: &str) -> crate::Result<String> {
        Err(Error::not_supported(format!("query `{}`", command)))
    }

    /// Read at most `max_bytes` of unterminated data, e.g. a file transfer.
    fn read_raw(&mut self, max_bytes: usize) -> crate::Result<Vec<u8>> {
        let _ = max_bytes;
        Err(Error::not_supported("read_raw"))
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn open(&mut self, resource: &str) -> crate::Result<()> {
        (**self).open(resource)
    }

    fn close(&mut self) -> crate::Result<()> {
        (**self).close()
    }

    fn list_resources(&mut self) -> crate::Result<Vec<String>> {
        (**self).list_resources()
    }

    fn set_termination(&mut self, termination: Termination) -> crate::Result<()> {
        (**self).set_termination(termination)
    }

    fn set_timeout(&mut self, timeout: Duration) -> crate::Result<()> {
        (**self).set_timeout(timeout)
    }

    fn write(&mut self, command: &str) -> crate::Result<()> {
        (**self).write(command)
    }

    fn query(&mut self, command: &str) -> crate::Result<String> {
        (**self).query(command)
    }

    fn read_raw(&mut self, max_bytes: usize) -> crate::Result<Vec<u8>> {
        (**self).read_raw(max_bytes)
    }
}
