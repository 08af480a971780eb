use crate::Error;
use anyhow::anyhow;
use serde::{Deserialize, Deserializer, Serializer};

pub fn to_base64<S>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&base64::encode(data))
}

pub fn from_base64<'a, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'a>,
{
    use serde::de::Error;
    String::deserialize(deserializer)
        .and_then(|string| base64::decode(&string).map_err(|err| Error::custom(err.to_string())))
}

fn invalid_header(rx: &[u8]) -> Error {
    let head: Vec<u8> = rx.iter().take(16).cloned().collect();
    Error::malformed_reply(
        "binary block",
        format!("{}", anyhow!("invalid block header in {:?}", String::from_utf8_lossy(&head))),
    )
}

/// Parse an IEEE 488.2 definite length block header.
///
/// Returns `(offset, length)` of the payload within `rx`.
pub fn parse_binary_header(rx: &[u8]) -> crate::Result<(usize, usize)> {
    let begin = rx
        .iter()
        .position(|x| *x == b'#')
        .ok_or_else(|| invalid_header(rx))?;

    const DEFAULT_LENGTH_BEFORE_BLOCK: usize = 25;

    if begin > DEFAULT_LENGTH_BEFORE_BLOCK {
        return Err(invalid_header(rx));
    }
    let header_length = if rx.len() < begin + 2 {
        0
    } else {
        let digit = rx[begin + 1];
        if !digit.is_ascii_digit() {
            return Err(invalid_header(rx));
        }
        (digit - b'0') as usize
    };
    let offset = begin + 2 + header_length;
    if offset > rx.len() {
        return Err(invalid_header(rx));
    }
    let data_length = if header_length > 0 {
        let data = std::str::from_utf8(&rx[begin + 2..offset]).map_err(|_| invalid_header(rx))?;
        data.parse::<usize>().map_err(|_| invalid_header(rx))?
    } else {
        rx.len() - offset
    };
    if offset + data_length > rx.len() {
        Err(invalid_header(rx))
    } else {
        Ok((offset, data_length))
    }
}
