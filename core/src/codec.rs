//! JSON body encoding and decoding.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::RestError;

/// Encode a parameter mapping as a JSON request body.
///
/// Fails with `RestError::Serialization` rather than producing an empty body.
pub fn encode_body(parameters: &Map<String, Value>) -> Result<Vec<u8>, RestError> {
    serde_json::to_vec(parameters).map_err(|e| RestError::Serialization(e.to_string()))
}

/// Decode a JSON payload into `T`.
///
/// The error is serde_json's diagnostic: the structural reason plus line and
/// column.
pub fn decode_body<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, String> {
    serde_json::from_slice(bytes).map_err(|e| e.to_string())
}

/// Render at most `limit` bytes of `body` for an error message, cut on a char
/// boundary. Non-UTF-8 bytes are replaced.
pub(crate) fn body_excerpt(body: &[u8], limit: usize) -> String {
    let text = String::from_utf8_lossy(body);
    if text.len() <= limit {
        return text.into_owned();
    }
    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &text[..end])
}
