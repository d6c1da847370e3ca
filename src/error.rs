//! Error types for handoff.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("work channel closed: no worker left to receive")]
    PoolClosed,

    #[error("completion channel closed after {received}/{expected} reports")]
    WorkerLost { expected: usize, received: usize },

    #[error("timed out after {timeout:?} waiting for {expected} completion reports")]
    DrainTimeout { timeout: Duration, expected: usize },

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
