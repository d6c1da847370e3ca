//! # handoff
//!
//! A fixed pool of workers fed over an unbuffered work channel.
//!
//! The manager hands each message to whichever worker is ready, closes the
//! channel once the stream is exhausted, and waits for one completion report
//! per worker. Closing the channel is the only shutdown signal.

pub mod channel;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod telemetry;
