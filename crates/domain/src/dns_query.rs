use super::DnsProtocol;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

/// One raw DNS exchange to perform. Immutable once handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDescriptor {
    /// Unframed DNS message, opaque to the engine.
    pub request: Arc<[u8]>,
    pub destination: SocketAddr,
    pub source: Option<IpAddr>,
    /// 0 selects an ephemeral port.
    pub source_port: u16,
    pub protocol: DnsProtocol,
    pub timeout: Duration,
}

impl QueryDescriptor {
    pub fn new(
        request: impl Into<Arc<[u8]>>,
        destination: SocketAddr,
        protocol: DnsProtocol,
        timeout: Duration,
    ) -> Self {
        Self {
            request: request.into(),
            destination,
            source: None,
            source_port: 0,
            protocol,
            timeout,
        }
    }

    pub fn udp(request: impl Into<Arc<[u8]>>, destination: SocketAddr, timeout: Duration) -> Self {
        Self::new(request, destination, DnsProtocol::Udp, timeout)
    }

    pub fn tcp(request: impl Into<Arc<[u8]>>, destination: SocketAddr, timeout: Duration) -> Self {
        Self::new(request, destination, DnsProtocol::Tcp, timeout)
    }

    pub fn with_source(mut self, source: Option<IpAddr>, source_port: u16) -> Self {
        self.source = source;
        self.source_port = source_port;
        self
    }

    pub fn has_explicit_port(&self) -> bool {
        self.source_port > 0
    }
}
