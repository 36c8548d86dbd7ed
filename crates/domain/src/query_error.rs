use std::fmt;

/// Closed set of OS error codes a query can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(clippy::upper_case_acronyms)]
pub enum Errno {
    EADDRNOTAVAIL,
    EADDRINUSE,
    EHOSTUNREACH,
    ECONNREFUSED,
    EACCES,
    ECONNRESET,
}

impl Errno {
    pub fn name(&self) -> &'static str {
        match self {
            Self::EADDRNOTAVAIL => "EADDRNOTAVAIL",
            Self::EADDRINUSE => "EADDRINUSE",
            Self::EHOSTUNREACH => "EHOSTUNREACH",
            Self::ECONNREFUSED => "ECONNREFUSED",
            Self::EACCES => "EACCES",
            Self::ECONNRESET => "ECONNRESET",
        }
    }

    /// Numeric value on the host platform.
    pub fn code(&self) -> i32 {
        match self {
            Self::EADDRNOTAVAIL => libc::EADDRNOTAVAIL,
            Self::EADDRINUSE => libc::EADDRINUSE,
            Self::EHOSTUNREACH => libc::EHOSTUNREACH,
            Self::ECONNREFUSED => libc::ECONNREFUSED,
            Self::EACCES => libc::EACCES,
            Self::ECONNRESET => libc::ECONNRESET,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        [
            Self::EADDRNOTAVAIL,
            Self::EADDRINUSE,
            Self::EHOSTUNREACH,
            Self::ECONNREFUSED,
            Self::EACCES,
            Self::ECONNRESET,
        ]
        .into_iter()
        .find(|errno| errno.code() == code)
    }
}

impl fmt::Display for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classified failure of a single query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryError {
    Timeout,
    Network(Errno),
}

impl QueryError {
    pub const TIMEOUT: &'static str = "TIMEOUT";
    pub const NETWORK_ERROR: &'static str = "NETWORK_ERROR";

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout => Self::TIMEOUT,
            Self::Network(_) => Self::NETWORK_ERROR,
        }
    }

    /// Only network errors carry a code.
    pub fn errno(&self) -> Option<Errno> {
        match self {
            Self::Timeout => None,
            Self::Network(errno) => Some(*errno),
        }
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => f.write_str(Self::TIMEOUT),
            Self::Network(errno) => write!(f, "{} ({})", Self::NETWORK_ERROR, errno),
        }
    }
}

impl From<Errno> for QueryError {
    fn from(errno: Errno) -> Self {
        Self::Network(errno)
    }
}
