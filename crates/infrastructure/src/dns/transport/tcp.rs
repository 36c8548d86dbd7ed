//! TCP transport for looking-glass queries (RFC 1035 §4.2.2)
//!
//! Both directions carry a 2-byte big-endian length prefix. The response is
//! gathered into a scratch buffer until the prefix is known, then into a
//! buffer of exactly the announced length.

use super::{QueryState, QueryTransport, ResponseBuffer, Step};
use socket2::{Domain, Protocol, Socket, Type};
use std::io::{self, Read};
use std::net::{IpAddr, SocketAddr};
use tracing::warn;

const LENGTH_PREFIX: usize = 2;

#[derive(Debug, Default)]
pub struct TcpTransport {
    length_known: bool,
}

impl TcpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves past the length prefix once both bytes are in, replacing the
    /// scratch buffer with one sized to the frame.
    pub fn absorb(&mut self, buf: &mut ResponseBuffer) -> Step {
        if !self.length_known && buf.filled().len() >= LENGTH_PREFIX {
            let received = buf.filled();
            let len = u16::from_be_bytes([received[0], received[1]]) as usize;
            let mut frame = ResponseBuffer::with_len(len);
            frame.extend_from_slice(&received[LENGTH_PREFIX..]);
            *buf = frame;
            self.length_known = true;
        }

        if self.length_known && buf.is_full() {
            Step::Complete
        } else {
            Step::Pending
        }
    }
}

impl QueryTransport for TcpTransport {
    fn socket_type(&self) -> (Type, Protocol) {
        (Type::STREAM, Protocol::TCP)
    }

    fn frame_request(&self, payload: &[u8]) -> Vec<u8> {
        debug_assert!(payload.len() <= u16::MAX as usize);
        let mut framed = Vec::with_capacity(payload.len() + LENGTH_PREFIX);
        framed.extend_from_slice(&(payload.len() as u16).to_be_bytes());
        framed.extend_from_slice(payload);
        framed
    }

    fn start_of_payload(&self) -> usize {
        LENGTH_PREFIX
    }

    fn initial_state(&self) -> QueryState {
        QueryState::Connecting
    }

    fn connect(&self, socket: &Socket, destination: SocketAddr) -> io::Result<()> {
        match socket.connect(&destination.into()) {
            Ok(()) => Ok(()),
            Err(e)
                if e.raw_os_error() == Some(libc::EINPROGRESS)
                    || e.kind() == io::ErrorKind::WouldBlock =>
            {
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn finish_connect(&self, socket: &Socket) -> io::Result<()> {
        if let Some(e) = socket.take_error()? {
            return Err(e);
        }
        match socket.peer_addr() {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotConnected => {
                Err(io::ErrorKind::WouldBlock.into())
            }
            Err(e) => Err(e),
        }
    }

    fn read(&mut self, socket: &Socket, buf: &mut ResponseBuffer) -> io::Result<Step> {
        let n = (&*socket).read(buf.unfilled_mut())?;
        if n == 0 {
            return Err(io::Error::from_raw_os_error(libc::ECONNRESET));
        }
        buf.advance(n);
        Ok(self.absorb(buf))
    }

    fn check_source(&self, source: Option<IpAddr>, destination: SocketAddr) -> Option<IpAddr> {
        match source {
            Some(ip) if !ip.is_unspecified() => Some(ip),
            _ => match probe_local_address(destination) {
                Ok(ip) => Some(ip),
                Err(e) => {
                    warn!(destination = %destination, error = %e, "Local address probe failed");
                    None
                }
            },
        }
    }
}

/// Asks the routing table which local address reaches `destination` by
/// connecting a throwaway datagram socket. Nothing is sent.
fn probe_local_address(destination: SocketAddr) -> io::Result<IpAddr> {
    let probe = Socket::new(
        Domain::for_address(destination),
        Type::DGRAM,
        Some(Protocol::UDP),
    )?;
    probe.connect(&destination.into())?;
    probe
        .local_addr()?
        .as_socket()
        .map(|addr| addr.ip())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "probe socket has no IP address"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::transport::buffer::SCRATCH_CAPACITY;
    use std::net::Ipv4Addr;

    fn with_prefix(len: u16, payload: &[u8]) -> ResponseBuffer {
        let mut buf = ResponseBuffer::scratch();
        buf.extend_from_slice(&len.to_be_bytes());
        buf.extend_from_slice(payload);
        buf
    }

    #[test]
    fn test_request_framing() {
        let transport = TcpTransport::new();
        let framed = transport.frame_request(&[0xAB; 300]);
        assert_eq!(&framed[..2], &[1, 44]);
        assert_eq!(framed.len(), 302);
        assert_eq!(transport.start_of_payload(), 2);
        assert_eq!(transport.initial_state(), QueryState::Connecting);
    }

    #[test]
    fn test_single_byte_is_not_enough() {
        let mut transport = TcpTransport::new();
        let mut buf = ResponseBuffer::scratch();
        buf.extend_from_slice(&[0]);

        assert_eq!(transport.absorb(&mut buf), Step::Pending);
        assert_eq!(buf.capacity(), SCRATCH_CAPACITY);
    }

    #[test]
    fn test_frame_reassembled_across_three_reads() {
        let mut transport = TcpTransport::new();
        let mut buf = ResponseBuffer::scratch();

        buf.extend_from_slice(&[0, 5]);
        assert_eq!(transport.absorb(&mut buf), Step::Pending);
        assert_eq!(buf.capacity(), 5);

        buf.extend_from_slice(&[1, 2]);
        assert_eq!(transport.absorb(&mut buf), Step::Pending);

        buf.extend_from_slice(&[3, 4, 5]);
        assert_eq!(transport.absorb(&mut buf), Step::Complete);
        assert_eq!(buf.filled(), &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_payload_read_with_prefix_is_kept() {
        let mut transport = TcpTransport::new();
        let mut buf = with_prefix(3, &[7, 8]);

        assert_eq!(transport.absorb(&mut buf), Step::Pending);
        assert_eq!(buf.filled(), &[7, 8]);
    }

    #[test]
    fn test_trailing_bytes_beyond_frame_are_dropped() {
        let mut transport = TcpTransport::new();
        let mut buf = with_prefix(2, &[1, 2, 3, 4]);

        assert_eq!(transport.absorb(&mut buf), Step::Complete);
        assert_eq!(buf.filled(), &[1, 2]);
    }

    #[test]
    fn test_zero_length_frame_completes_empty() {
        let mut transport = TcpTransport::new();
        let mut buf = with_prefix(0, &[]);

        assert_eq!(transport.absorb(&mut buf), Step::Complete);
        assert!(buf.filled().is_empty());
    }

    #[test]
    fn test_every_frame_length_yields_exact_size() {
        for len in 1..=u16::MAX {
            let mut transport = TcpTransport::new();
            let mut buf = with_prefix(len, &[]);

            assert_eq!(transport.absorb(&mut buf), Step::Pending, "len {}", len);
            buf.advance(len as usize);
            assert_eq!(transport.absorb(&mut buf), Step::Complete, "len {}", len);
            assert_eq!(buf.filled().len(), len as usize);
        }
    }

    #[test]
    fn test_explicit_source_skips_probe() {
        let transport = TcpTransport::new();
        let src = Some(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 10)));
        let dst: SocketAddr = "192.0.2.1:53".parse().unwrap();
        assert_eq!(transport.check_source(src, dst), src);
    }

    #[test]
    fn test_missing_source_is_probed() {
        let transport = TcpTransport::new();
        let dst: SocketAddr = "127.0.0.1:53".parse().unwrap();
        let any = Some(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

        assert_eq!(
            transport.check_source(None, dst),
            Some(IpAddr::V4(Ipv4Addr::LOCALHOST))
        );
        assert_eq!(
            transport.check_source(any, dst),
            Some(IpAddr::V4(Ipv4Addr::LOCALHOST))
        );
    }
}
