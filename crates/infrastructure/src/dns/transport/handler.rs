use super::bind::bind_socket;
use super::classify::classify;
use super::{QueryTransport, ResponseBuffer, Step, Transport, TransportError};
use crate::wire::encode_payload;
use looking_glass_domain::{DnsProtocol, QueryDescriptor, QueryError, QueryResult};
use socket2::{Domain, Socket};
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::io::unix::AsyncFd;
use tokio::io::Interest;
use tokio::time::Instant;
use tracing::{debug, error, trace, warn};

/// Deadline used when `start + timeout` does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryState {
    New,
    Preparing,
    Connecting,
    Writing,
    Reading,
    Complete,
    Errored,
    TimedOut,
    /// Hit a failure the classifier does not recognize.
    Aborted,
}

impl QueryState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Complete | Self::Errored | Self::TimedOut | Self::Aborted
        )
    }
}

/// State machine for one DNS exchange. Owns its socket from `prepare` until
/// `cleanup`.
pub struct QueryHandler {
    transport: Transport,
    destination: SocketAddr,
    source: Option<IpAddr>,
    source_port: u16,
    timeout: Duration,

    /// Framed request; `written` is how much of it the socket has accepted.
    request: Vec<u8>,
    written: usize,
    response: ResponseBuffer,

    socket: Option<AsyncFd<Socket>>,
    state: QueryState,
    error: Option<QueryError>,

    start: Option<Instant>,
    end: Option<Instant>,
    expiration: Option<Instant>,
}

impl QueryHandler {
    pub fn new(query: &QueryDescriptor) -> Self {
        let transport = Transport::new(query.protocol);
        let request = transport.frame_request(&query.request);

        Self {
            transport,
            destination: query.destination,
            source: query.source,
            source_port: query.source_port,
            timeout: query.timeout,
            request,
            written: 0,
            response: ResponseBuffer::default(),
            socket: None,
            state: QueryState::New,
            error: None,
            start: None,
            end: None,
            expiration: None,
        }
    }

    pub fn protocol(&self) -> DnsProtocol {
        self.transport.protocol()
    }

    pub fn destination(&self) -> SocketAddr {
        self.destination
    }

    pub fn state(&self) -> QueryState {
        self.state
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn error(&self) -> Option<QueryError> {
        self.error
    }

    pub fn source(&self) -> Option<IpAddr> {
        self.source
    }

    pub fn source_port(&self) -> u16 {
        self.source_port
    }

    pub fn expiration(&self) -> Option<Instant> {
        self.expiration
    }

    pub fn has_socket(&self) -> bool {
        self.socket.is_some()
    }

    /// Framed request bytes as written on the wire.
    pub fn request(&self) -> &[u8] {
        &self.request
    }

    pub fn start_of_request_payload(&self) -> usize {
        self.transport.start_of_payload()
    }

    pub fn elapsed(&self) -> Duration {
        match (self.start, self.end) {
            (Some(start), Some(end)) => end.saturating_duration_since(start),
            _ => Duration::ZERO,
        }
    }

    /// Allocates buffers, opens and binds the socket and starts connecting.
    ///
    /// Classified failures leave the query `Errored`; only unclassified ones
    /// are returned.
    pub fn prepare(&mut self) -> Result<(), TransportError> {
        if self.state != QueryState::New {
            return Ok(());
        }

        self.state = QueryState::Preparing;
        self.response = ResponseBuffer::scratch();

        match self.open_socket() {
            Ok(()) => {
                self.state = self.transport.initial_state();
                debug!(
                    destination = %self.destination,
                    protocol = %self.protocol(),
                    state = ?self.state,
                    "Query prepared"
                );
                Ok(())
            }
            Err(e) => self.fail(e, "prepare"),
        }
    }

    fn open_socket(&mut self) -> io::Result<()> {
        let (ty, protocol) = self.transport.socket_type();
        let socket = match Socket::new(Domain::for_address(self.destination), ty, Some(protocol)) {
            Ok(socket) => socket,
            Err(e) => {
                self.clear_local_addr();
                return Err(e);
            }
        };

        if let Err(e) = self.connect_socket(&socket) {
            self.record_local_addr(&socket);
            return Err(e);
        }

        // ERROR interest so ICMP failures wake a query with no data pending
        self.socket = Some(AsyncFd::with_interest(
            socket,
            Interest::READABLE | Interest::WRITABLE | Interest::ERROR,
        )?);
        Ok(())
    }

    fn connect_socket(&mut self, socket: &Socket) -> io::Result<()> {
        socket.set_nonblocking(true)?;
        let local = bind_socket(socket, self.bind_ip(), self.source_port)?;
        trace!(local = %local, destination = %self.destination, "Socket bound");

        self.set_start();
        self.transport.connect(socket, self.destination)
    }

    fn bind_ip(&self) -> IpAddr {
        self.source.unwrap_or(match self.destination {
            SocketAddr::V4(_) => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            SocketAddr::V6(_) => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
        })
    }

    fn set_start(&mut self) {
        let now = Instant::now();
        self.start = Some(now);
        self.expiration = Some(
            now.checked_add(self.timeout)
                .unwrap_or_else(|| now + FAR_FUTURE),
        );
    }

    /// Runs the query until it reaches a terminal state, waiting for socket
    /// readiness between steps. Each wake-up performs one operation.
    pub(crate) async fn drive(&mut self) -> Result<(), TransportError> {
        loop {
            match self.state {
                QueryState::Connecting => self.on_connect_ready().await?,
                QueryState::Writing => self.on_write_ready().await?,
                QueryState::Reading => self.on_read_ready().await?,
                _ => return Ok(()),
            }
        }
    }

    async fn on_connect_ready(&mut self) -> Result<(), TransportError> {
        let outcome = match self.socket.as_ref() {
            Some(fd) => match fd.ready(Interest::WRITABLE | Interest::ERROR).await {
                Ok(mut guard) => {
                    let transport = &self.transport;
                    guard.try_io(|inner| transport.finish_connect(inner.get_ref()))
                }
                Err(e) => Ok(Err(e)),
            },
            None => Ok(Err(socket_released())),
        };

        match outcome {
            Ok(Ok(())) => {
                trace!(destination = %self.destination, "Connected");
                self.state = QueryState::Writing;
                Ok(())
            }
            Ok(Err(e)) => self.fail(e, "connect"),
            Err(_would_block) => Ok(()),
        }
    }

    async fn on_write_ready(&mut self) -> Result<(), TransportError> {
        let outcome = match self.socket.as_ref() {
            Some(fd) => match fd.ready(Interest::WRITABLE | Interest::ERROR).await {
                Ok(mut guard) => {
                    let pending = &self.request[self.written..];
                    guard.try_io(|inner| inner.get_ref().send(pending))
                }
                Err(e) => Ok(Err(e)),
            },
            None => Ok(Err(socket_released())),
        };

        match outcome {
            Ok(Ok(n)) => {
                self.written += n;
                if self.written >= self.request.len() {
                    trace!(
                        destination = %self.destination,
                        bytes = self.request.len(),
                        "Request flushed"
                    );
                    self.state = QueryState::Reading;
                }
                Ok(())
            }
            Ok(Err(e)) => self.fail(e, "write"),
            Err(_would_block) => Ok(()),
        }
    }

    async fn on_read_ready(&mut self) -> Result<(), TransportError> {
        let outcome = match self.socket.as_ref() {
            Some(fd) => match fd.ready(Interest::READABLE | Interest::ERROR).await {
                Ok(mut guard) => {
                    let transport = &mut self.transport;
                    let response = &mut self.response;
                    guard.try_io(|inner| transport.read(inner.get_ref(), response))
                }
                Err(e) => Ok(Err(e)),
            },
            None => Ok(Err(socket_released())),
        };

        match outcome {
            Ok(Ok(Step::Complete)) => {
                self.state = QueryState::Complete;
                self.cleanup();
                debug!(
                    destination = %self.destination,
                    bytes = self.response.filled().len(),
                    elapsed_ms = self.elapsed().as_millis() as u64,
                    "Response received"
                );
                Ok(())
            }
            Ok(Ok(Step::Pending)) => Ok(()),
            Ok(Err(e)) => self.fail(e, "read"),
            Err(_would_block) => Ok(()),
        }
    }

    fn fail(&mut self, err: io::Error, operation: &'static str) -> Result<(), TransportError> {
        match classify(err) {
            Ok(query_error) => {
                debug!(
                    destination = %self.destination,
                    operation,
                    error = %query_error,
                    "Query failed"
                );
                self.state = match query_error {
                    QueryError::Timeout => QueryState::TimedOut,
                    QueryError::Network(_) => QueryState::Errored,
                };
                self.error = Some(query_error);
                self.cleanup();
                Ok(())
            }
            Err(source) => {
                error!(
                    destination = %self.destination,
                    operation,
                    error = %source,
                    "Unclassified transport failure"
                );
                self.state = QueryState::Aborted;
                self.cleanup();
                Err(TransportError::Unclassified {
                    destination: self.destination,
                    operation,
                    source,
                })
            }
        }
    }

    /// Forces the query to `TIMEOUT`, whatever it had transferred so far.
    pub fn timeout(&mut self) {
        if self.state.is_terminal() {
            return;
        }

        debug!(
            destination = %self.destination,
            state = ?self.state,
            written = self.written,
            "Query timed out"
        );
        self.error = Some(QueryError::Timeout);
        self.state = QueryState::TimedOut;
        self.cleanup();
    }

    /// Stamps the end time, records the bound local endpoint and closes the
    /// socket. Safe to call repeatedly; the socket is closed once.
    pub fn cleanup(&mut self) {
        if self.end.is_none() {
            self.end = Some(Instant::now());
        }

        if let Some(fd) = self.socket.take() {
            let socket = fd.into_inner();
            self.record_local_addr(&socket);
            drop(socket);
            trace!(destination = %self.destination, "Socket closed");
        }
    }

    fn record_local_addr(&mut self, socket: &Socket) {
        match socket.local_addr() {
            Ok(addr) => match addr.as_socket().filter(|addr| addr.port() != 0) {
                Some(addr) => {
                    self.source = Some(addr.ip());
                    self.source_port = addr.port();
                }
                // never bound: the requested address was not used
                None => self.clear_local_addr(),
            },
            Err(e) => warn!(
                destination = %self.destination,
                error = %e,
                "Could not read local socket address"
            ),
        }
    }

    fn clear_local_addr(&mut self) {
        self.source = None;
        self.source_port = 0;
    }

    /// Prepares the query for read-out: normalizes the source address,
    /// rewinds the request and drops any response if an error was recorded.
    pub fn finalize(&mut self) {
        self.source = self.transport.check_source(self.source, self.destination);
        self.written = 0;
        if self.error.is_some() {
            self.response = ResponseBuffer::default();
        }
    }

    /// `None` until the query has a classified outcome.
    pub fn result(&self) -> Option<QueryResult> {
        let outcome = match (self.error, self.state) {
            (Some(err), _) => Err(err),
            (None, QueryState::Complete) => Ok(self.response.to_vec()),
            _ => return None,
        };

        Some(QueryResult {
            outcome,
            source: self.source,
            source_port: (self.source_port != 0).then_some(self.source_port),
            elapsed: self.elapsed(),
        })
    }

    pub fn encoded_response(&self) -> Option<String> {
        match (self.error, self.state) {
            (None, QueryState::Complete) => Some(encode_payload(self.response.filled())),
            _ => None,
        }
    }
}

fn socket_released() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "socket already released")
}
