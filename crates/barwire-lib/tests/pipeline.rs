//! End-to-end pipeline tests: wire decode, supervision, and aggregation
//! together the way a real deployment does.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use std::collections::VecDeque;
use std::time::Duration;

use barwire_lib::{
    AggregatorState, BarAggregator, BarEventStream, BarStatus, RetryPolicy, SessionSource,
    StreamSupervisor, TransportError, decoded_events,
};

fn line(status: u32, millis: i64, close: f64) -> String {
    format!(
        "{{\"Status\":{status},\"TimeStamp\":\"/Date({millis})/\",\"Close\":{close:?},\"Open\":{close:?}}}\n"
    )
}

fn hist_close(millis: i64, close: f64) -> String {
    line(
        BarStatus::HISTORICAL.raw() | BarStatus::STANDARD_CLOSE.raw(),
        millis,
        close,
    )
}

fn end_of_history(millis: i64, close: f64) -> String {
    line(
        BarStatus::END_OF_HISTORY_STREAM.raw() | BarStatus::REAL_TIME.raw(),
        millis,
        close,
    )
}

fn live(millis: i64, close: f64) -> String {
    line(BarStatus::REAL_TIME.raw(), millis, close)
}

/// Replays scripted wire payloads through the real record decoder, one
/// session per payload, each ending in a transport failure the way a
/// dropped connection does. Pends forever once drained.
struct WireSource {
    sessions: VecDeque<String>,
}

impl WireSource {
    fn new(sessions: Vec<String>) -> Self {
        Self {
            sessions: sessions.into(),
        }
    }
}

#[async_trait]
impl SessionSource for WireSource {
    async fn connect(&mut self) -> Result<BarEventStream, TransportError> {
        match self.sessions.pop_front() {
            Some(payload) => {
                let chunks = vec![Ok(Bytes::from(payload))];
                Ok(decoded_events(stream::iter(chunks)).boxed())
            }
            None => std::future::pending().await,
        }
    }
}

fn no_delay() -> RetryPolicy {
    RetryPolicy {
        max_attempts: None,
        base_delay_ms: 0,
        max_delay_ms: 0,
    }
}

#[tokio::test]
async fn reconnect_replays_history_and_resumes_live() {
    // Session one: backfill t1..t3, go live at t4, update t4, then the
    // connection drops (decoded_events ends with UnexpectedEof).
    let session_one = [
        "\n".to_string(), // heartbeat
        hist_close(1_000, 1.0),
        hist_close(2_000, 2.0),
        hist_close(3_000, 3.0),
        end_of_history(4_000, 4.0),
        live(4_000, 4.5),
    ]
    .concat();

    // Session two: the server replays history, including a bar the first
    // session never saw, then moves past it.
    let session_two = [
        hist_close(1_000, 1.0),
        hist_close(2_000, 2.0),
        hist_close(3_000, 3.0),
        hist_close(4_000, 4.5),
        end_of_history(5_000, 5.0),
        live(6_000, 6.0),
    ]
    .concat();

    let (aggregator, mut snapshots) = BarAggregator::new();
    let source = WireSource::new(vec![session_one, session_two]);
    let handle = StreamSupervisor::new(source, no_delay()).start(aggregator);

    // Wait for the second session's live bar to land.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        tokio::time::timeout_at(deadline, snapshots.changed())
            .await
            .expect("pipeline stalled before reaching the final snapshot")
            .expect("aggregator dropped");
        if snapshots.borrow_and_update().series.len() == 6 {
            break;
        }
    }

    let snapshot = snapshots.borrow().clone();
    let timestamps: Vec<_> = snapshot
        .series
        .bars()
        .iter()
        .map(|b| b.timestamp.timestamp_millis())
        .collect();
    // The reconnect restarted the state machine at backfill and the
    // recommitted series reflects the fuller replay.
    assert_eq!(timestamps, vec![1_000, 2_000, 3_000, 4_000, 5_000, 6_000]);
    assert_eq!(
        snapshot.series.last().unwrap().close(),
        Some(&serde_json::Value::from(6.0))
    );

    // The transport failure never killed the supervisor.
    assert!(!handle.is_finished());
    handle.stop().await;
}

#[tokio::test]
async fn decoded_wire_payload_drives_the_state_machine() {
    let payload = [
        hist_close(1_000, 1.0),
        "not json\n".to_string(), // skipped, session continues
        hist_close(2_000, 2.0),
        end_of_history(3_000, 3.0),
    ]
    .concat();

    let (mut aggregator, _snapshots) = BarAggregator::new();
    let chunks = vec![Ok(Bytes::from(payload))];
    let mut events = decoded_events(stream::iter(chunks));

    while let Some(item) = events.next().await {
        match item {
            Ok(event) => aggregator.process(event).map(|_| ()).unwrap(),
            Err(TransportError::UnexpectedEof) => break,
            Err(other) => panic!("unexpected transport error: {other}"),
        }
    }

    assert_eq!(aggregator.state(), AggregatorState::Live);
    assert_eq!(aggregator.series().len(), 3);
}
