use serde::{Deserialize, Serialize};

/// A single exchange with a message based (SCPI) instrument.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum ScpiRequest {
    /// Write a command. A command ending with `?` is sent as a query and its reply is returned.
    Write(String),
    QueryString(String),
    /// Query a reply framed as an IEEE 488.2 definite length block (`#<n><len><data>`).
    QueryBinary(String),
    ReadRaw { max_bytes: usize },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum ScpiResponse {
    Done,
    String(String),
    Binary {
        #[serde(
            serialize_with = "crate::util::to_base64",
            deserialize_with = "crate::util::from_base64"
        )]
        data: Vec<u8>,
    },
}

impl ScpiRequest {
    pub fn command(&self) -> Option<&str> {
        match self {
            ScpiRequest::Write(x) => Some(x),
            ScpiRequest::QueryString(x) => Some(x),
            ScpiRequest::QueryBinary(x) => Some(x),
            ScpiRequest::ReadRaw { .. } => None,
        }
    }
}
