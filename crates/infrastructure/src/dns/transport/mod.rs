pub mod bind;
pub mod buffer;
pub mod classify;
pub mod error;
pub mod handler;
pub mod manager;
pub mod tcp;
pub mod udp;

use looking_glass_domain::DnsProtocol;
use socket2::{Protocol, Socket, Type};
use std::io;
use std::net::{IpAddr, SocketAddr};

pub use buffer::ResponseBuffer;
pub use classify::classify;
pub use error::TransportError;
pub use handler::{QueryHandler, QueryState};
pub use manager::TransportManager;

/// Progress of a single non-blocking transport operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Pending,
    Complete,
}

/// Transport-specific half of a query state machine.
///
/// Every method is a single non-blocking operation. `WouldBlock` means the
/// socket was not actually ready and the caller should wait again.
pub trait QueryTransport {
    fn socket_type(&self) -> (Type, Protocol);

    /// Wraps the raw payload in the transport's framing.
    fn frame_request(&self, payload: &[u8]) -> Vec<u8>;

    /// Offset of the DNS message inside the framed request.
    fn start_of_payload(&self) -> usize;

    /// State entered once the connect has been initiated.
    fn initial_state(&self) -> QueryState;

    fn connect(&self, socket: &Socket, destination: SocketAddr) -> io::Result<()>;

    fn finish_connect(&self, socket: &Socket) -> io::Result<()>;

    fn read(&mut self, socket: &Socket, buf: &mut ResponseBuffer) -> io::Result<Step>;

    /// Normalizes the reported source address once the query is done.
    fn check_source(&self, source: Option<IpAddr>, destination: SocketAddr) -> Option<IpAddr>;
}

pub enum Transport {
    Udp(udp::UdpTransport),
    Tcp(tcp::TcpTransport),
}

impl Transport {
    pub fn new(protocol: DnsProtocol) -> Self {
        match protocol {
            DnsProtocol::Udp => Self::Udp(udp::UdpTransport::new()),
            DnsProtocol::Tcp => Self::Tcp(tcp::TcpTransport::new()),
        }
    }

    pub fn protocol(&self) -> DnsProtocol {
        match self {
            Self::Udp(_) => DnsProtocol::Udp,
            Self::Tcp(_) => DnsProtocol::Tcp,
        }
    }

    fn inner(&self) -> &dyn QueryTransport {
        match self {
            Self::Udp(t) => t,
            Self::Tcp(t) => t,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn QueryTransport {
        match self {
            Self::Udp(t) => t,
            Self::Tcp(t) => t,
        }
    }
}

impl QueryTransport for Transport {
    fn socket_type(&self) -> (Type, Protocol) {
        self.inner().socket_type()
    }

    fn frame_request(&self, payload: &[u8]) -> Vec<u8> {
        self.inner().frame_request(payload)
    }

    fn start_of_payload(&self) -> usize {
        self.inner().start_of_payload()
    }

    fn initial_state(&self) -> QueryState {
        self.inner().initial_state()
    }

    fn connect(&self, socket: &Socket, destination: SocketAddr) -> io::Result<()> {
        self.inner().connect(socket, destination)
    }

    fn finish_connect(&self, socket: &Socket) -> io::Result<()> {
        self.inner().finish_connect(socket)
    }

    fn read(&mut self, socket: &Socket, buf: &mut ResponseBuffer) -> io::Result<Step> {
        self.inner_mut().read(socket, buf)
    }

    fn check_source(&self, source: Option<IpAddr>, destination: SocketAddr) -> Option<IpAddr> {
        self.inner().check_source(source, destination)
    }
}
