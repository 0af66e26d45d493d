//! One logical stream session over a long-lived HTTP response.

use bytes::{Bytes, BytesMut};
use futures::stream::{Stream, StreamExt, TryStreamExt};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use barwire_types::BarEvent;

use crate::auth::AuthError;
use crate::decode::decode_line;

/// Configuration for the stream client.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Base URL of the streaming API.
    pub base_url: String,
    /// Connection establishment timeout.
    ///
    /// There is deliberately no total request timeout: the response body
    /// is a long-lived stream that stays open for the life of a session.
    pub connect_timeout: Duration,
    /// TCP keepalive interval.
    pub tcp_keepalive: Duration,
    /// User agent string.
    pub user_agent: String,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.tradestation.com/v2".to_string(),
            connect_timeout: Duration::from_secs(10),
            tcp_keepalive: Duration::from_secs(60),
            user_agent: format!("barwire/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Errors that terminate a stream session.
///
/// Unlike decode errors, any of these ends the session's event sequence;
/// the supervisor responds by opening a replacement session.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The request could not be sent.
    #[error("request failed: {0}")]
    Request(reqwest::Error),

    /// The server rejected the stream establishment.
    #[error("stream rejected with HTTP status {status}")]
    Connect {
        /// HTTP status code.
        status: u16,
    },

    /// Reading from the response body failed.
    #[error("stream read failed: {0}")]
    Read(reqwest::Error),

    /// The response body ended. A live stream has no clean end, so this
    /// is a transport failure, not a normal stop.
    #[error("stream ended unexpectedly")]
    UnexpectedEof,

    /// Token refresh failed before session establishment.
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// HTTP client tuned for long-lived streaming responses.
#[derive(Debug, Clone)]
pub struct StreamClient {
    client: reqwest::Client,
    config: StreamConfig,
}

impl StreamClient {
    /// Creates a new stream client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: StreamConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            // Disable Nagle's algorithm for lower latency on small records
            .tcp_nodelay(true)
            // Keep TCP connections alive across heartbeat gaps
            .tcp_keepalive(config.tcp_keepalive)
            // Connection timeout only; the body itself never times out
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .gzip(true)
            .build()?;
        Ok(Self { client, config })
    }

    /// Creates a client with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_defaults() -> Result<Self, reqwest::Error> {
        Self::new(StreamConfig::default())
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &StreamConfig {
        &self.config
    }
}

/// One open connection to the bar stream.
///
/// A session produces a lazy, unbounded sequence of decoded events via
/// [`Self::into_events`]; it ends only through a [`TransportError`].
#[derive(Debug)]
pub struct StreamSession {
    response: reqwest::Response,
}

impl StreamSession {
    /// Opens a session against a fully built stream URL.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Request`] if the request cannot be sent
    /// and [`TransportError::Connect`] on a non-success response status.
    pub async fn open(client: &StreamClient, url: &str) -> Result<Self, TransportError> {
        let response = client
            .client
            .get(url)
            .send()
            .await
            .map_err(TransportError::Request)?;

        if !response.status().is_success() {
            return Err(TransportError::Connect {
                status: response.status().as_u16(),
            });
        }

        debug!("stream established");
        Ok(Self { response })
    }

    /// Consumes the session, returning its event sequence.
    pub fn into_events(self) -> impl Stream<Item = Result<BarEvent, TransportError>> + Send {
        decoded_events(
            self.response
                .bytes_stream()
                .map_err(TransportError::Read)
                .boxed(),
        )
    }
}

/// Re-frames arbitrary byte chunks into newline-delimited records.
#[derive(Debug, Default)]
struct LineBuffer {
    buf: BytesMut,
}

impl LineBuffer {
    fn extend(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Pops the next complete line, without its terminator.
    fn next_line(&mut self) -> Option<String> {
        let pos = self.buf.iter().position(|&b| b == b'\n')?;
        let line: Bytes = self.buf.split_to(pos + 1).freeze();
        let text = String::from_utf8_lossy(&line[..pos]);
        Some(text.trim_end_matches('\r').to_string())
    }
}

/// Decodes a byte-chunk stream into bar events.
///
/// Records that decode to nothing (heartbeats, non-bar records) are
/// skipped silently; broken records are logged and skipped. The sequence
/// terminates after yielding exactly one `Err`: either a read failure or
/// [`TransportError::UnexpectedEof`] when the body ends.
pub fn decoded_events<B>(mut bytes: B) -> impl Stream<Item = Result<BarEvent, TransportError>> + Send
where
    B: Stream<Item = Result<Bytes, TransportError>> + Send + Unpin + 'static,
{
    let mut lines = LineBuffer::default();
    let mut finished = false;

    futures::stream::poll_fn(move |cx| {
        use std::task::Poll;

        if finished {
            return Poll::Ready(None);
        }
        loop {
            while let Some(line) = lines.next_line() {
                match decode_line(&line) {
                    Ok(Some(event)) => return Poll::Ready(Some(Ok(event))),
                    Ok(None) => {}
                    Err(e) => warn!(error = %e, "skipping undecodable record"),
                }
            }
            match bytes.poll_next_unpin(cx) {
                Poll::Ready(Some(Ok(chunk))) => lines.extend(&chunk),
                Poll::Ready(Some(Err(e))) => {
                    finished = true;
                    return Poll::Ready(Some(Err(e)));
                }
                Poll::Ready(None) => {
                    finished = true;
                    return Poll::Ready(Some(Err(TransportError::UnexpectedEof)));
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    })
}
