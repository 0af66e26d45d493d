//! The bar reconstruction state machine.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info};

use barwire_types::{BarEvent, EventSink};

use crate::{Bar, BarSeries};

/// Aggregation phase for the current logical session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregatorState {
    /// Buffering the historical replay; nothing committed yet.
    Backfilling,
    /// Historical replay committed; events revise or extend the series.
    Live,
}

/// What processing one event did to the series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Historical close buffered for the pending backfill commit.
    Buffered,
    /// Event discarded (non-close backfill data, stale timestamp, or a
    /// ghost terminator with nothing to commit).
    Ignored,
    /// Backfill buffer materialized into the series; now live.
    Committed,
    /// Open row revised with a changed close value.
    Updated,
    /// Open row matched but the close value was unchanged.
    Unchanged,
    /// New bar appended to the series.
    Appended,
    /// Ghost bar with a later timestamp: observers signaled, nothing
    /// persisted.
    Signaled,
}

/// Errors from event processing.
///
/// These are invariant breaches, not data problems: the caller must
/// surface them instead of retrying.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateError {
    /// Live state reached with no committed bars.
    #[error("live state with an empty bar series")]
    EmptyLiveSeries,
}

/// A published, read-only view of the series.
///
/// The aggregator publishes a fresh snapshot on every observable change;
/// the version is strictly increasing so readers can cheaply detect
/// changes even when the row data is unchanged (ghost signals).
#[derive(Debug, Clone)]
pub struct SeriesSnapshot {
    /// Monotonic change counter; starts at 0 for the empty snapshot.
    pub version: u64,
    /// The committed series at publish time.
    pub series: Arc<BarSeries>,
}

/// Receives published snapshots from a [`BarAggregator`].
///
/// `changed()` / `borrow_and_update()` give the reset-on-observe
/// "changed" semantics: a reader sleeping on `changed()` wakes once per
/// publish batch and always sees the latest snapshot.
pub type SeriesWatch = watch::Receiver<SeriesSnapshot>;

/// Consumes classified bar events and maintains the ordered bar table.
///
/// The state machine starts in [`AggregatorState::Backfilling`], commits
/// the buffered history when the end-of-history marker arrives, and then
/// revises the series in place for the life of the session. A fresh
/// session attachment (see [`EventSink::on_session_start`]) restarts the
/// backfill pass, since the server replays history on every connection.
pub struct BarAggregator {
    state: AggregatorState,
    pending: Vec<Bar>,
    series: BarSeries,
    version: u64,
    snapshot_tx: watch::Sender<SeriesSnapshot>,
    commit_hook: Option<Box<dyn Fn(&BarSeries) + Send>>,
}

impl std::fmt::Debug for BarAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BarAggregator")
            .field("state", &self.state)
            .field("pending", &self.pending.len())
            .field("series", &self.series.len())
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl BarAggregator {
    /// Creates an aggregator and the snapshot watch for its readers.
    #[must_use]
    pub fn new() -> (Self, SeriesWatch) {
        let (snapshot_tx, snapshot_rx) = watch::channel(SeriesSnapshot {
            version: 0,
            series: Arc::new(BarSeries::new()),
        });
        (
            Self {
                state: AggregatorState::Backfilling,
                pending: Vec::new(),
                series: BarSeries::new(),
                version: 0,
                snapshot_tx,
                commit_hook: None,
            },
            snapshot_rx,
        )
    }

    /// Installs a hook invoked with the full series on every backfill
    /// commit. Best-effort persistence belongs here; the hook's failures
    /// are its own to log.
    #[must_use]
    pub fn with_commit_hook(mut self, hook: impl Fn(&BarSeries) + Send + 'static) -> Self {
        self.commit_hook = Some(Box::new(hook));
        self
    }

    /// Returns the current aggregation phase.
    #[must_use]
    pub const fn state(&self) -> AggregatorState {
        self.state
    }

    /// Returns the committed series.
    #[must_use]
    pub const fn series(&self) -> &BarSeries {
        &self.series
    }

    /// Returns the number of bars waiting in the backfill buffer.
    #[must_use]
    pub const fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Processes one event through the state machine.
    ///
    /// # Errors
    ///
    /// Returns [`AggregateError::EmptyLiveSeries`] if the live invariant
    /// (at least one committed row) is violated.
    pub fn process(&mut self, event: BarEvent) -> Result<Applied, AggregateError> {
        match self.state {
            AggregatorState::Backfilling => Ok(self.process_backfilling(&event)),
            AggregatorState::Live => self.process_live(&event),
        }
    }

    fn process_backfilling(&mut self, event: &BarEvent) -> Applied {
        let status = event.status;

        if status.is_historical() && !status.is_end_of_history() {
            // Only committed closes become rows; intrabar revisions and
            // ghost bars within the replay carry nothing durable.
            if status.is_close() && !status.is_ghost() {
                self.pending.push(Bar::from_event(event));
                return Applied::Buffered;
            }
            return Applied::Ignored;
        }

        // Anything else ends the backfill pass, end-of-history marker
        // included. The terminal event becomes the first live row when
        // it opens a new timestamp.
        let last_pending = self.pending.last().map(|bar| bar.timestamp);
        if !status.is_ghost() && last_pending != Some(event.timestamp) {
            self.pending.push(Bar::from_event(event));
        }

        if self.pending.is_empty() {
            // A ghost terminator with no replayed history: there is no
            // row to go live on, so keep backfilling.
            debug!("ignoring history terminator with empty backfill buffer");
            return Applied::Ignored;
        }

        self.series = BarSeries::from_bars(std::mem::take(&mut self.pending));
        self.state = AggregatorState::Live;
        info!(bars = self.series.len(), "backfill committed, entering live mode");

        if let Some(hook) = &self.commit_hook {
            hook(&self.series);
        }
        self.publish();
        Applied::Committed
    }

    fn process_live(&mut self, event: &BarEvent) -> Result<Applied, AggregateError> {
        let Some(last) = self.series.last_mut() else {
            return Err(AggregateError::EmptyLiveSeries);
        };

        if event.timestamp < last.timestamp {
            // Stale or out-of-order: the series never rewinds.
            return Ok(Applied::Ignored);
        }

        if event.timestamp == last.timestamp {
            let close_changed = last.close() != event.close();
            if !event.status.is_ghost() {
                // Ghost bars are observed for change detection only and
                // never touch stored data.
                last.merge(&event.fields);
            }
            if close_changed {
                self.publish();
                return Ok(Applied::Updated);
            }
            return Ok(Applied::Unchanged);
        }

        // A new bar has opened.
        if event.status.is_ghost() {
            // Signal observers (e.g. a closing tick) without persisting
            // the provisional row.
            self.publish();
            return Ok(Applied::Signaled);
        }
        self.series.push(Bar::from_event(event));
        self.publish();
        Ok(Applied::Appended)
    }

    fn publish(&mut self) {
        self.version += 1;
        self.snapshot_tx.send_replace(SeriesSnapshot {
            version: self.version,
            series: Arc::new(self.series.clone()),
        });
    }

    #[cfg(test)]
    fn force_live(&mut self) {
        self.state = AggregatorState::Live;
    }
}

impl EventSink for BarAggregator {
    type Error = AggregateError;

    fn on_session_start(&mut self) {
        if self.state == AggregatorState::Live || !self.pending.is_empty() {
            debug!("new session attached, restarting backfill pass");
        }
        self.state = AggregatorState::Backfilling;
        self.pending.clear();
    }

    fn on_event(&mut self, event: BarEvent) -> Result<(), AggregateError> {
        self.process(event).map(|_| ())
    }
}
