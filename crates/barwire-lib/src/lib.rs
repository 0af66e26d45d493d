//! Loss-resistant OHLC bar reconstruction from a classified event stream.
//!
//! This is a facade crate that re-exports functionality from the barwire
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```ignore
//! use barwire_lib::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = StreamClient::with_defaults()?;
//!     let tokens = Arc::new(StaticTokenProvider::new(std::env::var("ACCESS_TOKEN")?));
//!     let spec = BarSpec::new("@ES", BarType::Minute, 1);
//!
//!     let (aggregator, mut snapshots) = BarAggregator::new();
//!     let aggregator = aggregator.with_commit_hook(|series| {
//!         // Best-effort table export on each backfill commit.
//!         if let Ok(file) = std::fs::File::create("bars.csv") {
//!             let _ = CsvFormatter::new().write_series(series, file);
//!         }
//!     });
//!
//!     let source = HttpSessionSource::new(client, tokens, spec);
//!     let handle = StreamSupervisor::new(source, RetryPolicy::default()).start(aggregator);
//!
//!     // Independent reader: wake on change, render the latest snapshot.
//!     while snapshots.changed().await.is_ok() {
//!         let snapshot = snapshots.borrow_and_update().clone();
//!         println!("v{}: {} bars", snapshot.version, snapshot.series.len());
//!     }
//!
//!     handle.stop().await;
//!     Ok(())
//! }
//! ```

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/barwire/barwire/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use barwire_types::*;

// Re-export stream session and supervision
#[cfg(feature = "stream")]
pub use barwire_stream::{
    AccessTokenProvider, AuthError, BarEventStream, DecodeError, HttpSessionSource, RetryPolicy,
    SessionSource, StaticTokenProvider, StreamClient, StreamConfig, StreamSession,
    StreamSupervisor, SupervisorHandle, TransportError, decode_line, decoded_events,
    extract_epoch_millis, url,
};

// Re-export aggregation
#[cfg(feature = "aggregate")]
pub use barwire_aggregate::{
    AggregateError, AggregatorState, Applied, Bar, BarAggregator, BarSeries, SeriesSnapshot,
    SeriesWatch,
};

// Re-export formatters
#[cfg(feature = "format")]
pub use barwire_format::{CsvFormatter, FormatError, Formatter, JsonFormatter, OutputFormat};

/// Prelude module for convenient imports.
///
/// ```
/// use barwire_lib::prelude::*;
/// ```
pub mod prelude {
    pub use barwire_types::{BarEvent, BarSpec, BarStatus, BarType, EventSink};

    #[cfg(feature = "stream")]
    pub use barwire_stream::{
        AccessTokenProvider, HttpSessionSource, RetryPolicy, SessionSource, StaticTokenProvider,
        StreamClient, StreamConfig, StreamSupervisor, TransportError,
    };

    #[cfg(feature = "aggregate")]
    pub use barwire_aggregate::{
        AggregatorState, Applied, Bar, BarAggregator, BarSeries, SeriesSnapshot, SeriesWatch,
    };

    #[cfg(feature = "format")]
    pub use barwire_format::{CsvFormatter, Formatter, JsonFormatter, OutputFormat};
}
