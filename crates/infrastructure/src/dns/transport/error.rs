use std::io;
use std::net::SocketAddr;
use thiserror::Error;

/// Failure the error classifier does not recognize.
///
/// These indicate an environment or programming defect rather than an
/// expected network condition, so they escape the query that hit them.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Unclassified {operation} failure for query to {destination}: {source}")]
    Unclassified {
        destination: SocketAddr,
        operation: &'static str,
        #[source]
        source: io::Error,
    },
}

impl TransportError {
    pub fn destination(&self) -> SocketAddr {
        match self {
            Self::Unclassified { destination, .. } => *destination,
        }
    }
}
