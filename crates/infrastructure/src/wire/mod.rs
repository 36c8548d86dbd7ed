//! JSON wire format spoken with the looking glass controller.
mod request;
mod response;
mod version;

use base64::{engine::general_purpose::STANDARD, Engine};

pub use request::{decode_request, parse_request, RequestDocument, WireRequest};
pub use response::{encode_error, encode_response, ErrorDocument, ResponseDocument, WireResponse};
pub use version::{Version, PROTOCOL_VERSION};

/// Base64 text for raw DNS bytes.
pub fn encode_payload(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub fn decode_payload(text: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(text)
}
