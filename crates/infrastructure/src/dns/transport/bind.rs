use socket2::Socket;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::ops::RangeInclusive;
use tracing::trace;

/// Upper bound on random port candidates tried for one query.
pub const MAX_PORT_BIND_ATTEMPTS: usize = 10;

pub const EPHEMERAL_PORTS: RangeInclusive<u16> = 1024..=65535;

pub(crate) fn bind_socket(socket: &Socket, ip: IpAddr, port: u16) -> io::Result<SocketAddr> {
    bind_with_retry(ip, port, |addr| socket.bind(&addr.into()))
}

/// Binds `ip:port` exactly when a port is given. Otherwise draws random
/// ephemeral candidates, retrying only on `AddrInUse`.
pub fn bind_with_retry<F>(ip: IpAddr, port: u16, mut bind: F) -> io::Result<SocketAddr>
where
    F: FnMut(SocketAddr) -> io::Result<()>,
{
    if port > 0 {
        let addr = SocketAddr::new(ip, port);
        bind(addr)?;
        return Ok(addr);
    }

    let mut attempt = 0;
    loop {
        attempt += 1;
        let addr = SocketAddr::new(ip, fastrand::u16(EPHEMERAL_PORTS));
        match bind(addr) {
            Ok(()) => return Ok(addr),
            Err(e) if e.kind() == io::ErrorKind::AddrInUse && attempt < MAX_PORT_BIND_ATTEMPTS => {
                trace!(addr = %addr, attempt, "Source port in use, drawing another");
            }
            Err(e) => return Err(e),
        }
    }
}
