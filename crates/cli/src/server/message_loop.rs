use futures::{SinkExt, StreamExt};
use looking_glass_domain::DomainError;
use looking_glass_infrastructure::wire::encode_error;
use looking_glass_infrastructure::LookingGlass;
use std::io;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::bytes::BytesMut;
use tokio_util::codec::{Decoder, FramedRead, FramedWrite, LinesCodec, LinesCodecError};
use tracing::{debug, info, warn};

enum Inbound {
    Line(String),
    Oversized,
}

/// `LinesCodec` that reports an over-long line as a frame instead of an
/// error, so the stream keeps going after it.
struct RequestCodec {
    lines: LinesCodec,
}

impl RequestCodec {
    fn new(max_message_bytes: usize) -> Self {
        Self {
            lines: LinesCodec::new_with_max_length(max_message_bytes),
        }
    }

    fn lift(result: Result<Option<String>, LinesCodecError>) -> io::Result<Option<Inbound>> {
        match result {
            Ok(line) => Ok(line.map(Inbound::Line)),
            Err(LinesCodecError::MaxLineLengthExceeded) => Ok(Some(Inbound::Oversized)),
            Err(LinesCodecError::Io(e)) => Err(e),
        }
    }
}

impl Decoder for RequestCodec {
    type Item = Inbound;
    type Error = io::Error;

    fn decode(&mut self, buf: &mut BytesMut) -> io::Result<Option<Inbound>> {
        Self::lift(self.lines.decode(buf))
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> io::Result<Option<Inbound>> {
        Self::lift(self.lines.decode_eof(buf))
    }
}

/// Answers newline-delimited request documents one at a time until the
/// input ends. Every non-empty inbound line gets exactly one outbound line.
pub async fn serve<R, W>(
    reader: R,
    writer: W,
    looking_glass: &LookingGlass,
    max_message_bytes: usize,
) -> anyhow::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut requests = FramedRead::new(reader, RequestCodec::new(max_message_bytes));
    let mut responses = FramedWrite::new(writer, LinesCodec::new());
    let mut handled = 0u64;

    while let Some(frame) = requests.next().await {
        let response = match frame {
            Ok(Inbound::Line(line)) if line.trim().is_empty() => continue,
            Ok(Inbound::Line(line)) => {
                debug!(bytes = line.len(), "Request received");
                looking_glass.run(&line).await
            }
            Ok(Inbound::Oversized) => {
                warn!(max_message_bytes, "Request exceeds maximum message size");
                encode_error(&DomainError::InvalidRequest(format!(
                    "message exceeds {max_message_bytes} bytes"
                )))
            }
            Err(e) => return Err(e.into()),
        };

        responses.send(response).await?;
        handled += 1;
    }

    info!(requests = handled, "Input closed");
    Ok(())
}
