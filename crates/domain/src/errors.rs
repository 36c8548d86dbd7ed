use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum DomainError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Version of JSON input is invalid: {0}")]
    UnsupportedVersion(String),

    #[error("Failed to resolve address {0}")]
    AddressResolution(String),

    #[error("Address family mismatch: source {source_addr} cannot reach {destination}")]
    AddressFamilyMismatch {
        source_addr: String,
        destination: String,
    },

    #[error("Transport engine failure: {0}")]
    TransportFailure(String),

    #[error("Expected {expected} results, got {actual}")]
    ResultCountMismatch { expected: usize, actual: usize },

    #[error("Failed to encode response: {0}")]
    EncodingFailure(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}
