use super::QueryError;
use std::net::IpAddr;
use std::time::Duration;

/// Outcome of one finalized query, in the order it was submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResult {
    /// Response bytes on success, classified error otherwise.
    pub outcome: Result<Vec<u8>, QueryError>,
    /// Local address actually used, `None` when unknown.
    pub source: Option<IpAddr>,
    /// Local port actually bound, `None` when the socket was never bound.
    pub source_port: Option<u16>,
    pub elapsed: Duration,
}

impl QueryResult {
    pub fn response(&self) -> Option<&[u8]> {
        self.outcome.as_deref().ok()
    }

    pub fn error(&self) -> Option<QueryError> {
        self.outcome.as_ref().err().copied()
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed.as_millis() as u64
    }
}
