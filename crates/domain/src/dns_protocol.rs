use std::fmt;
use std::str::FromStr;

/// Transport a single looking-glass query is carried over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DnsProtocol {
    Udp,
    Tcp,
}

impl DnsProtocol {
    pub fn from_tcp_flag(tcp: bool) -> Self {
        if tcp {
            Self::Tcp
        } else {
            Self::Udp
        }
    }

    pub fn is_tcp(&self) -> bool {
        matches!(self, Self::Tcp)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Udp => "UDP",
            Self::Tcp => "TCP",
        }
    }
}

impl fmt::Display for DnsProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DnsProtocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "udp" => Ok(Self::Udp),
            "tcp" => Ok(Self::Tcp),
            other => Err(format!("Unknown transport: {}", other)),
        }
    }
}
