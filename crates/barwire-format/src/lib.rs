//! Export formats for barwire bar series.
//!
//! This crate renders a committed [`barwire_aggregate::BarSeries`] as a
//! flat delimited table, one row per bar:
//!
//! - [`CsvFormatter`] - CSV/TSV with the union of field names as columns
//! - [`JsonFormatter`] - JSON array or newline-delimited objects
//! - [`Formatter`] / [`OutputFormat`] - The format abstraction

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/barwire/barwire/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod csv;
mod formatter;
mod json;

pub use csv::CsvFormatter;
pub use formatter::{FormatError, Formatter, OutputFormat};
pub use json::JsonFormatter;
