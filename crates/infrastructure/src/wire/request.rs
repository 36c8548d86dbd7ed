use super::{decode_payload, Version};
use looking_glass_domain::{DnsProtocol, DomainError, QueryDescriptor};
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::lookup_host;
use tracing::debug;

/// Largest payload the TCP two-byte length prefix can describe.
const MAX_TCP_PAYLOAD: usize = u16::MAX as usize;

#[derive(Debug, Deserialize)]
struct VersionProbe {
    version: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequestDocument {
    pub version: f64,
    pub requests: Vec<WireRequest>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireRequest {
    /// Base64 DNS message.
    pub req: String,
    pub dst: String,
    pub dport: u16,
    #[serde(default)]
    pub src: Option<String>,
    #[serde(default)]
    pub sport: u16,
    /// Milliseconds.
    pub timeout: u64,
    pub tcp: bool,
}

/// Parses a request document. The version is checked before anything else
/// in the document is looked at.
pub fn parse_request(json: &str) -> Result<RequestDocument, DomainError> {
    let probe: VersionProbe = serde_json::from_str(json)
        .map_err(|e| DomainError::InvalidRequest(e.to_string()))?;

    match Version::from_number(probe.version) {
        Some(version) if version.is_supported() => {}
        _ => return Err(DomainError::UnsupportedVersion(format!("{:?}", probe.version))),
    }

    serde_json::from_str(json).map_err(|e| DomainError::InvalidRequest(e.to_string()))
}

/// Parses a request document and resolves every request into a descriptor.
pub async fn decode_request(json: &str) -> Result<Vec<QueryDescriptor>, DomainError> {
    let document = parse_request(json)?;
    let mut queries = Vec::with_capacity(document.requests.len());

    for request in document.requests {
        queries.push(request.into_descriptor().await?);
    }

    debug!(queries = queries.len(), "Request document decoded");
    Ok(queries)
}

impl WireRequest {
    pub async fn into_descriptor(self) -> Result<QueryDescriptor, DomainError> {
        let payload = decode_payload(&self.req)
            .map_err(|e| DomainError::InvalidRequest(format!("invalid base64 in req: {e}")))?;

        let protocol = DnsProtocol::from_tcp_flag(self.tcp);
        if protocol.is_tcp() && payload.len() > MAX_TCP_PAYLOAD {
            return Err(DomainError::InvalidRequest(format!(
                "TCP payload of {} bytes exceeds {} bytes",
                payload.len(),
                MAX_TCP_PAYLOAD
            )));
        }

        let destination = resolve_host(&self.dst).await?;
        let source = match self.src.as_deref() {
            Some(src) => Some(resolve_host(src).await?),
            None => None,
        };

        if let Some(source) = source {
            if source.is_ipv4() != destination.is_ipv4() {
                return Err(DomainError::AddressFamilyMismatch {
                    source_addr: source.to_string(),
                    destination: destination.to_string(),
                });
            }
        }

        Ok(QueryDescriptor::new(
            payload,
            SocketAddr::new(destination, self.dport),
            protocol,
            Duration::from_millis(self.timeout),
        )
        .with_source(source, self.sport))
    }
}

/// IP literal, or the first address a host name resolves to.
async fn resolve_host(host: &str) -> Result<IpAddr, DomainError> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(ip);
    }

    let mut addrs = lookup_host((host, 0))
        .await
        .map_err(|e| DomainError::AddressResolution(format!("{host}: {e}")))?;

    addrs
        .next()
        .map(|addr| addr.ip())
        .ok_or_else(|| DomainError::AddressResolution(format!("{host}: no addresses")))
}
