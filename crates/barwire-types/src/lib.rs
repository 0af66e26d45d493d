//! Core types for the barwire streaming bar pipeline.
//!
//! This crate provides the fundamental data structures used throughout
//! barwire:
//!
//! - [`BarStatus`] - Per-event status bitmask with flag predicates and
//!   diagnostic decomposition
//! - [`BarEvent`] - A decoded stream record with an open field set
//! - [`BarSpec`] / [`BarType`] - Description of one logical bar stream
//! - [`EventSink`] - The delivery seam between supervisor and aggregator

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/barwire/barwire/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod bar_spec;
mod event;
mod sink;
mod status;

pub use bar_spec::{BarSpec, BarType, BarTypeParseError};
pub use event::BarEvent;
pub use sink::EventSink;
pub use status::{BarStatus, NOTABLE_THRESHOLD};
