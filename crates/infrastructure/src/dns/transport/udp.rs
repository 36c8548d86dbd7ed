//! UDP transport for looking-glass queries (RFC 1035 §4.2.1)
//!
//! Messages are sent as-is. The first datagram received on the connected
//! socket is the whole response.

use super::{QueryState, QueryTransport, ResponseBuffer, Step};
use socket2::{Protocol, Socket, Type};
use std::io::{self, Read};
use std::net::{IpAddr, SocketAddr};

#[derive(Debug, Default)]
pub struct UdpTransport;

impl UdpTransport {
    pub fn new() -> Self {
        Self
    }
}

impl QueryTransport for UdpTransport {
    fn socket_type(&self) -> (Type, Protocol) {
        (Type::DGRAM, Protocol::UDP)
    }

    fn frame_request(&self, payload: &[u8]) -> Vec<u8> {
        payload.to_vec()
    }

    fn start_of_payload(&self) -> usize {
        0
    }

    /// Connecting a datagram socket only fixes the peer, so writing can
    /// start straight away.
    fn initial_state(&self) -> QueryState {
        QueryState::Writing
    }

    fn connect(&self, socket: &Socket, destination: SocketAddr) -> io::Result<()> {
        socket.connect(&destination.into())
    }

    fn finish_connect(&self, _socket: &Socket) -> io::Result<()> {
        Ok(())
    }

    fn read(&mut self, socket: &Socket, buf: &mut ResponseBuffer) -> io::Result<Step> {
        let n = (&*socket).read(buf.unfilled_mut())?;
        if n == 0 {
            // ICMP port unreachable can surface as an empty read
            return Err(io::Error::from_raw_os_error(libc::ECONNREFUSED));
        }
        buf.advance(n);
        Ok(Step::Complete)
    }

    /// A wildcard bind says nothing about the interface actually used.
    fn check_source(&self, source: Option<IpAddr>, _destination: SocketAddr) -> Option<IpAddr> {
        source.filter(|ip| !ip.is_unspecified())
    }
}
