//! Worker lifecycle: drain the work channel, then file one report.

use crate::channel::WorkReceiver;
use crate::model::{CompletionReport, WorkerId, WorkerState};
use crate::telemetry::worker::{record_state_transition, start_worker_span};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{Instrument, info, warn};
use uuid::Uuid;

/// A pool member. Owns nothing shared beyond its channel handles.
#[derive(Debug, Clone)]
pub struct Worker {
    pub id: WorkerId,
    max_delay: Duration,
}

impl Worker {
    pub fn new(id: WorkerId, max_delay: Duration) -> Self {
        Self { id, max_delay }
    }

    /// Process items until the channel closes, then send the completion
    /// report. The report is the last message a worker sends.
    pub async fn run(self, work: WorkReceiver, done: mpsc::Sender<CompletionReport>) {
        let span = start_worker_span(self.id);
        span.record("worker.state", WorkerState::Running.as_str());
        let started = Instant::now();

        let processed = async {
            let mut processed = 0;
            while let Some(item) = work.recv().await {
                tokio::time::sleep(jitter(self.max_delay)).await;
                info!(worker = %self.id, "{item}");
                processed += 1;
            }
            processed
        }
        .instrument(span.clone())
        .await;

        record_state_transition(&span, WorkerState::Running, WorkerState::Draining);
        let report = CompletionReport::new(self.id, processed, started.elapsed());

        if done.send(report).await.is_err() {
            span.in_scope(|| warn!(worker = %self.id, "manager gone, report dropped"));
        }
        record_state_transition(&span, WorkerState::Draining, WorkerState::Finished);
    }
}

/// Uniform delay in `[0, max)` at millisecond granularity.
fn jitter(max: Duration) -> Duration {
    let max_ms = max.as_millis();
    if max_ms == 0 {
        return Duration::ZERO;
    }
    // v4 UUIDs carry 122 random bits; plenty for a sleep.
    let ms = Uuid::new_v4().as_u128() % max_ms;
    Duration::from_millis(ms as u64)
}
