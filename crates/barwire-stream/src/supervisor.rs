//! Reconnecting stream supervision.
//!
//! A supervisor owns the reconnect loop for one logical bar stream: it
//! opens a session, pumps its events into an [`EventSink`], and on any
//! transport failure opens a replacement session so the sink keeps
//! receiving events. Retry is an explicit, testable policy rather than
//! unbounded immediate recursion.

use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use barwire_types::{BarEvent, BarSpec, EventSink};

use crate::auth::AccessTokenProvider;
use crate::session::{StreamClient, StreamSession, TransportError};
use crate::url::stream_url;

/// The event sequence produced by one session.
pub type BarEventStream = BoxStream<'static, Result<BarEvent, TransportError>>;

/// Opens sessions over one logical stream.
///
/// The supervisor calls [`Self::connect`] for the initial session and for
/// every replacement after a transport failure.
#[async_trait]
pub trait SessionSource: Send {
    /// Establishes a new session and returns its event sequence.
    async fn connect(&mut self) -> Result<BarEventStream, TransportError>;
}

/// Session source backed by the HTTP streaming endpoint.
///
/// Refreshes the access token before every establishment and rebuilds
/// the stream URL with it, so reconnects never reuse a stale token.
pub struct HttpSessionSource {
    client: StreamClient,
    tokens: Arc<dyn AccessTokenProvider>,
    spec: BarSpec,
}

impl HttpSessionSource {
    /// Creates a session source for the given stream.
    #[must_use]
    pub fn new(client: StreamClient, tokens: Arc<dyn AccessTokenProvider>, spec: BarSpec) -> Self {
        Self {
            client,
            tokens,
            spec,
        }
    }

    /// Returns the bar spec this source streams.
    #[must_use]
    pub const fn spec(&self) -> &BarSpec {
        &self.spec
    }
}

impl std::fmt::Debug for HttpSessionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSessionSource")
            .field("spec", &self.spec)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SessionSource for HttpSessionSource {
    async fn connect(&mut self) -> Result<BarEventStream, TransportError> {
        let token = self.tokens.refresh_access_token().await?;
        let url = stream_url(&self.client.config().base_url, &self.spec, &token);
        let session = StreamSession::open(&self.client, &url).await?;
        Ok(session.into_events().boxed())
    }
}

/// Retry policy for session re-establishment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum consecutive failed attempts before giving up, or `None`
    /// to retry forever.
    pub max_attempts: Option<u32>,
    /// Base delay for exponential backoff (in milliseconds).
    pub base_delay_ms: u64,
    /// Maximum delay between attempts (in milliseconds).
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: None,
            base_delay_ms: 500,
            max_delay_ms: 30_000,
        }
    }
}

impl RetryPolicy {
    /// Retry forever with no delay between attempts.
    ///
    /// This reproduces the behavior of feeds that expect an immediate
    /// reconnect; prefer the default backoff policy in production.
    #[must_use]
    pub const fn immediate() -> Self {
        Self {
            max_attempts: None,
            base_delay_ms: 0,
            max_delay_ms: 0,
        }
    }

    /// Calculates the backoff delay for the given attempt number
    /// (1-based), with exponential growth and deterministic jitter.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if self.base_delay_ms == 0 {
            return Duration::ZERO;
        }

        // Exponential backoff: base_delay * 2^attempt, capped
        let exp_delay = self
            .base_delay_ms
            .saturating_mul(1u64 << attempt.min(10));
        let capped = exp_delay.min(self.max_delay_ms);

        // Deterministic jitter (±25%) avoids needing an RNG
        let jitter_range = capped / 4;
        let jitter = if jitter_range > 0 {
            (u64::from(attempt) * 17) % (jitter_range * 2)
        } else {
            0
        };

        let delay = (capped + jitter).saturating_sub(jitter_range).max(100);
        Duration::from_millis(delay)
    }
}

/// Handle to a running supervisor task.
#[derive(Debug)]
pub struct SupervisorHandle {
    shutdown: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl SupervisorHandle {
    /// Signals the supervisor to stop and waits for it to finish.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.join.await {
            error!(error = %e, "supervisor task panicked");
        }
    }

    /// Waits for the supervisor to finish without signaling it.
    ///
    /// The task only finishes on its own when retries are exhausted or
    /// the sink reports an invariant breach.
    pub async fn join(self) {
        if let Err(e) = self.join.await {
            error!(error = %e, "supervisor task panicked");
        }
    }

    /// Returns true if the supervisor task has finished.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}

/// Supervises one logical stream, reconnecting across transport failures.
#[derive(Debug)]
pub struct StreamSupervisor<S> {
    source: S,
    policy: RetryPolicy,
}

impl<S> StreamSupervisor<S>
where
    S: SessionSource + 'static,
{
    /// Creates a supervisor over the given session source.
    #[must_use]
    pub const fn new(source: S, policy: RetryPolicy) -> Self {
        Self { source, policy }
    }

    /// Starts consuming the stream on a dedicated task and returns
    /// immediately.
    ///
    /// The sink's `on_session_start` runs once per opened session and
    /// events are delivered strictly in arrival order on the supervisor
    /// task. Transport failures trigger a replacement session per the
    /// retry policy; a sink error is surfaced and stops the supervisor.
    pub fn start<K>(mut self, mut sink: K) -> SupervisorHandle
    where
        K: EventSink + 'static,
    {
        let (shutdown, mut shutdown_rx) = watch::channel(false);

        let join = tokio::spawn(async move {
            let mut failures: u32 = 0;

            loop {
                let connected = tokio::select! {
                    () = stop_requested(&mut shutdown_rx) => return,
                    result = self.source.connect() => result,
                };

                match connected {
                    Ok(mut events) => {
                        failures = 0;
                        info!("stream session opened");
                        sink.on_session_start();

                        loop {
                            let item = tokio::select! {
                                () = stop_requested(&mut shutdown_rx) => return,
                                item = events.next() => item,
                            };
                            match item {
                                Some(Ok(event)) => {
                                    if let Err(e) = sink.on_event(event) {
                                        error!(
                                            error = %e,
                                            "event processing failed, stopping supervisor"
                                        );
                                        return;
                                    }
                                }
                                Some(Err(e)) => {
                                    warn!(error = %e, "transport failure, restarting session");
                                    break;
                                }
                                None => {
                                    warn!("event sequence ended, restarting session");
                                    break;
                                }
                            }
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "session establishment failed");
                    }
                }

                failures += 1;
                if let Some(max) = self.policy.max_attempts {
                    if failures > max {
                        error!(attempts = failures, "retry attempts exhausted, giving up");
                        return;
                    }
                }

                let delay = self.policy.delay_for(failures);
                if !delay.is_zero() {
                    tokio::select! {
                        () = stop_requested(&mut shutdown_rx) => return,
                        () = tokio::time::sleep(delay) => {}
                    }
                }
            }
        });

        SupervisorHandle { shutdown, join }
    }
}

/// Resolves when an explicit stop has been signaled.
///
/// Dropping the handle without calling `stop` leaves the supervisor
/// running for the life of the process, so a closed channel pends
/// forever instead of counting as a stop.
async fn stop_requested(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
