//! Data types shared by everything that talks to benchlink instruments:
//! the error taxonomy and the SCPI request/response enums.

pub mod error;
pub mod scpi;
pub mod util;

pub use crate::error::{Error, TransportError};
pub use crate::scpi::{ScpiRequest, ScpiResponse};
pub use crate::util::parse_binary_header;

pub type Result<T> = std::result::Result<T, Error>;
