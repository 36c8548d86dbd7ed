use looking_glass_domain::{Errno, QueryError};
use std::io::{self, ErrorKind};

/// Maps a socket failure onto the closed query error taxonomy.
///
/// Anything not recognized is handed back untouched so the caller can
/// escalate it.
pub fn classify(err: io::Error) -> Result<QueryError, io::Error> {
    if let Some(code) = err.raw_os_error() {
        match code {
            libc::ETIMEDOUT => return Ok(QueryError::Timeout),
            libc::ENETUNREACH | libc::EHOSTUNREACH => {
                return Ok(QueryError::Network(Errno::EHOSTUNREACH))
            }
            libc::EPERM => return Ok(QueryError::Network(Errno::EACCES)),
            code => {
                if let Some(errno) = Errno::from_code(code) {
                    return Ok(QueryError::Network(errno));
                }
            }
        }
    }

    match err.kind() {
        ErrorKind::TimedOut => Ok(QueryError::Timeout),
        ErrorKind::ConnectionRefused => Ok(QueryError::Network(Errno::ECONNREFUSED)),
        ErrorKind::AddrNotAvailable => Ok(QueryError::Network(Errno::EADDRNOTAVAIL)),
        ErrorKind::AddrInUse => Ok(QueryError::Network(Errno::EADDRINUSE)),
        ErrorKind::PermissionDenied => Ok(QueryError::Network(Errno::EACCES)),
        ErrorKind::ConnectionReset => Ok(QueryError::Network(Errno::ECONNRESET)),
        _ => Err(err),
    }
}
