//! Event delivery seam between the stream supervisor and consumers.

use crate::BarEvent;

/// Receives decoded bar events from a stream supervisor.
///
/// Delivery is single-threaded per supervisor: events arrive strictly in
/// stream order on the supervisor's worker task, never concurrently.
///
/// An `Err` from [`Self::on_event`] is an invariant breach inside event
/// processing, not a transport problem: the supervisor surfaces it and
/// stops rather than masking it with a reconnect.
pub trait EventSink: Send {
    /// Error type for processing failures.
    type Error: std::error::Error + Send + 'static;

    /// Called once per successfully opened session, before any events
    /// from that session. The server replays history on every fresh
    /// connection, so state machines restart their backfill pass here.
    fn on_session_start(&mut self);

    /// Processes one decoded event.
    fn on_event(&mut self, event: BarEvent) -> Result<(), Self::Error>;
}
