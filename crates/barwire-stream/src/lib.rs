//! Stream session handling and reconnect supervision for barwire.
//!
//! This crate provides the transport-facing half of the pipeline:
//!
//! - [`url::stream_url`] - Constructs streaming endpoint URLs
//! - [`AccessTokenProvider`] - Collaborator seam for token refresh
//! - [`StreamClient`] / [`StreamSession`] - Long-lived HTTP stream with
//!   newline-delimited record decoding
//! - [`StreamSupervisor`] - Reconnect loop with an explicit [`RetryPolicy`]

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/barwire/barwire/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod auth;
mod decode;
mod session;
mod supervisor;
pub mod url;

pub use auth::{AccessTokenProvider, AuthError, StaticTokenProvider};
pub use decode::{DecodeError, decode_line, extract_epoch_millis};
pub use session::{StreamClient, StreamConfig, StreamSession, TransportError, decoded_events};
pub use supervisor::{
    BarEventStream, HttpSessionSource, RetryPolicy, SessionSource, StreamSupervisor,
    SupervisorHandle,
};
