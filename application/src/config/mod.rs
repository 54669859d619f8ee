//! Application-level configuration.
//!
//! - [`StreamConfig`]: reply stream control (single-stream policy, failure annotation)

pub mod stream_config;

pub use stream_config::{ActiveStreamPolicy, StreamConfig};
