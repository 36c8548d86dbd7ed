#![allow(dead_code)]
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream, UdpSocket};
use tokio::sync::oneshot;

/// Minimal DNS query for `example.com A` with the given id.
pub fn sample_query(id: u16) -> Vec<u8> {
    let mut query = Vec::with_capacity(29);
    query.extend_from_slice(&id.to_be_bytes());
    query.extend_from_slice(&[0x01, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
    query.extend_from_slice(b"\x07example\x03com\x00");
    query.extend_from_slice(&[0x00, 0x01, 0x00, 0x01]);
    query
}

/// Echoes the question back as an answer with a single A record.
pub fn build_mock_response(query: &[u8]) -> Vec<u8> {
    if query.len() < 12 {
        return vec![];
    }

    let mut response = Vec::with_capacity(512);
    response.extend_from_slice(&query[0..2]);
    response.extend_from_slice(&[0x81, 0x80]);
    response.extend_from_slice(&query[4..6]);
    response.extend_from_slice(&[0x00, 0x01, 0x00, 0x00, 0x00, 0x00]);
    response.extend_from_slice(&query[12..]);
    response.extend_from_slice(&[
        0xc0, 0x0c, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x3c, 0x00, 0x04, 93, 184, 216, 34,
    ]);
    response
}

pub struct MockUdpServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockUdpServer {
    /// Answers every datagram with `build_mock_response`.
    pub async fn echo() -> Self {
        Self::start(true).await
    }

    /// Receives datagrams and never answers.
    pub async fn silent() -> Self {
        Self::start(false).await
    }

    async fn start(reply: bool) -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            let mut buf = vec![0u8; 65536];
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    result = socket.recv_from(&mut buf) => {
                        if let Ok((len, peer)) = result {
                            if reply {
                                let response = build_mock_response(&buf[..len]);
                                let _ = socket.send_to(&response, peer).await;
                            }
                        }
                    }
                }
            }
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

impl Drop for MockUdpServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// How a TCP mock answers a framed request.
#[derive(Clone)]
enum TcpBehavior {
    /// Whole framed response in one write.
    Framed(Vec<u8>),
    /// Framed response split at the given offsets, with a pause between writes.
    Chunked(Vec<u8>, Vec<usize>),
    /// Writes the prefix and a partial payload, then stalls.
    Partial(Vec<u8>, usize),
    /// Reads the request and closes the connection.
    CloseAfterRequest,
}

pub struct MockTcpServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockTcpServer {
    pub async fn framed(payload: Vec<u8>) -> Self {
        Self::start(TcpBehavior::Framed(payload)).await
    }

    pub async fn chunked(payload: Vec<u8>, splits: Vec<usize>) -> Self {
        Self::start(TcpBehavior::Chunked(payload, splits)).await
    }

    pub async fn partial(payload: Vec<u8>, sent: usize) -> Self {
        Self::start(TcpBehavior::Partial(payload, sent)).await
    }

    pub async fn close_after_request() -> Self {
        Self::start(TcpBehavior::CloseAfterRequest).await
    }

    async fn start(behavior: TcpBehavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    accepted = listener.accept() => {
                        if let Ok((stream, _)) = accepted {
                            tokio::spawn(serve(stream, behavior.clone()));
                        }
                    }
                }
            }
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

impl Drop for MockTcpServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

fn frame(payload: &[u8]) -> Vec<u8> {
    let mut framed = (payload.len() as u16).to_be_bytes().to_vec();
    framed.extend_from_slice(payload);
    framed
}

async fn read_request(stream: &mut TcpStream) -> std::io::Result<Vec<u8>> {
    let mut prefix = [0u8; 2];
    stream.read_exact(&mut prefix).await?;
    let mut request = vec![0u8; u16::from_be_bytes(prefix) as usize];
    stream.read_exact(&mut request).await?;
    Ok(request)
}

async fn serve(mut stream: TcpStream, behavior: TcpBehavior) {
    let _ = stream.set_nodelay(true);
    if read_request(&mut stream).await.is_err() {
        return;
    }

    match behavior {
        TcpBehavior::Framed(payload) => {
            let _ = stream.write_all(&frame(&payload)).await;
        }
        TcpBehavior::Chunked(payload, splits) => {
            let framed = frame(&payload);
            let mut start = 0;
            for end in splits.into_iter().chain(std::iter::once(framed.len())) {
                let _ = stream.write_all(&framed[start..end]).await;
                let _ = stream.flush().await;
                tokio::time::sleep(Duration::from_millis(30)).await;
                start = end;
            }
        }
        TcpBehavior::Partial(payload, sent) => {
            let framed = frame(&payload);
            let _ = stream.write_all(&framed[..sent]).await;
            tokio::time::sleep(Duration::from_secs(5)).await;
        }
        TcpBehavior::CloseAfterRequest => return,
    }

    // hold the connection until the client closes it
    let mut sink = [0u8; 64];
    let _ = stream.read(&mut sink).await;
}

/// Port on 127.0.0.1 with no TCP listener behind it.
pub fn closed_tcp_port() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

/// Port on 127.0.0.1 with no UDP socket behind it.
pub fn closed_udp_port() -> SocketAddr {
    let socket = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
    socket.local_addr().unwrap()
}

pub fn free_udp_port() -> u16 {
    closed_udp_port().port()
}
