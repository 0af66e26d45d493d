//! Bar series reconstruction for barwire.
//!
//! This crate provides the central state machine of the pipeline:
//!
//! - [`Bar`] / [`BarSeries`] - The ordered, append-or-update bar table
//! - [`BarAggregator`] - Classifies each event as append, in-place
//!   update, or discard, and handles the backfill-to-live transition
//! - [`SeriesSnapshot`] / [`SeriesWatch`] - Versioned read-only snapshot
//!   publishing for concurrent readers

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/barwire/barwire/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod aggregator;
mod series;

pub use aggregator::{
    AggregateError, AggregatorState, Applied, BarAggregator, SeriesSnapshot, SeriesWatch,
};
pub use series::{Bar, BarSeries};
