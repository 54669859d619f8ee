//! Reply stream decoding.
//!
//! Leaf-first pipeline driven once per received chunk:
//!
//! - [`framer::LineFramer`]: bytes → complete lines
//! - [`dialect::extract`]: line → delta / sentinel / ignore
//! - [`accumulator::Accumulator`]: deltas → growing reply
//! - [`outcome::StreamOutcome`]: how the stream ended

pub mod accumulator;
pub mod dialect;
pub mod framer;
pub mod outcome;
