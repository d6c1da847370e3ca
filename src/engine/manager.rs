//! Manager: spawns the pool, feeds it, closes the work channel, and
//! collects one completion report per worker.

use crate::channel::work_channel;
use crate::config::{Config, DEFAULT_MESSAGES, DEFAULT_WORKERS};
use crate::error::{Error, Result};
use crate::model::{CompletionReport, RunSummary, WorkItem, WorkerId};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::info;

use super::worker::Worker;

/// Upper bound on a worker's simulated processing delay.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(100);

/// Largest pool a run will spawn. Also keeps the completion channel's
/// capacity within what tokio accepts.
pub const MAX_WORKERS: usize = 100_000;

/// Configuration for a manager run.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Number of workers to spawn.
    pub workers: usize,
    /// Number of messages to hand out.
    pub messages: usize,
    /// Each item sleeps a random duration below this before it is logged.
    pub max_delay: Duration,
    /// Give up collecting completion reports after this long. `None` waits
    /// forever.
    pub drain_timeout: Option<Duration>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            messages: DEFAULT_MESSAGES,
            max_delay: DEFAULT_MAX_DELAY,
            drain_timeout: None,
        }
    }
}

impl ManagerConfig {
    /// Take worker and message counts from a loaded [`Config`].
    pub fn from_config(config: &Config) -> Self {
        Self {
            workers: config.workers,
            messages: config.messages,
            ..Self::default()
        }
    }

    /// Reject settings that could never finish.
    pub fn validate(&self) -> Result<()> {
        if self.workers > MAX_WORKERS {
            return Err(Error::Config(format!(
                "{} workers exceeds the limit of {MAX_WORKERS}",
                self.workers
            )));
        }
        if self.workers == 0 && self.messages > 0 {
            return Err(Error::Config(format!(
                "{} messages but no workers to receive them",
                self.messages
            )));
        }
        Ok(())
    }
}

/// Owns both channels and the lifetime of one run.
pub struct Manager {
    config: ManagerConfig,
}

impl Manager {
    pub fn new(config: ManagerConfig) -> Self {
        Self { config }
    }

    /// Run the pool to completion.
    pub async fn run(&self) -> Result<RunSummary> {
        self.config.validate()?;
        let started = Instant::now();
        let ManagerConfig {
            workers, messages, ..
        } = self.config;

        info!(messages, workers, "sending {messages} messages to {workers} workers");

        let (work_tx, work_rx) = work_channel();
        let (done_tx, mut done_rx) = mpsc::channel(workers.max(1));

        for id in 1..=workers {
            let worker = Worker::new(WorkerId(id), self.config.max_delay);
            tokio::spawn(worker.run(work_rx.clone(), done_tx.clone()));
        }
        // Only workers hold these now; if they all die, the channels close.
        drop(work_rx);
        drop(done_tx);

        for n in 1..=messages {
            work_tx.send(WorkItem::numbered(n)).await?;
        }
        work_tx.close();

        let reports = self.collect(&mut done_rx, workers).await?;
        info!("goodbye");

        Ok(RunSummary {
            workers,
            messages,
            elapsed: started.elapsed(),
            reports,
        })
    }

    /// Receive exactly `expected` reports, in arrival order.
    async fn collect(
        &self,
        done: &mut mpsc::Receiver<CompletionReport>,
        expected: usize,
    ) -> Result<Vec<CompletionReport>> {
        let drain = async {
            let mut reports = Vec::with_capacity(expected);
            while reports.len() < expected {
                let Some(report) = done.recv().await else {
                    return Err(Error::WorkerLost {
                        expected,
                        received: reports.len(),
                    });
                };
                info!(
                    worker = %report.worker,
                    processed = report.processed,
                    "{}",
                    report.message
                );
                reports.push(report);
            }
            Ok(reports)
        };

        match self.config.drain_timeout {
            Some(timeout) => tokio::time::timeout(timeout, drain)
                .await
                .map_err(|_| Error::DrainTimeout { timeout, expected })?,
            None => drain.await,
        }
    }
}
