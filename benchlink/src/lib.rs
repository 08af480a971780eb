//! Drive laboratory instruments from declarative command tables.
//!
//! A [`Profile`] describes the command set of one instrument family. An
//! [`Adapter`] renders profile commands into SCPI text and sends them through a
//! [`Session`] over any [`Transport`]. NI-845x USB adapters are reached through the
//! native driver in [`ni845x`].

#[macro_use]
extern crate dlopen_derive;
#[macro_use]
extern crate lazy_static;

pub mod asynced;
pub mod engine;
pub mod ni845x;
pub mod profile;
pub mod profiles;
pub mod session;
pub mod transport;

pub use benchlink_protocol::{Error, ScpiRequest, ScpiResponse, TransportError};

pub use engine::{Adapter, Reading};
pub use profile::{Arg, Args, Profile};
pub use session::Session;
pub use transport::{Termination, Transport};

pub type Result<T> = std::result::Result<T, Error>;
