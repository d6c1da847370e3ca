//! Worker span helpers.
//!
//! One span per worker for its whole run; lifecycle transitions are
//! recorded as events inside it.

use crate::model::{WorkerId, WorkerState};
use tracing::Span;

/// Start a span covering a worker's run.
///
/// The `worker.state` field is declared empty and filled in by
/// [`record_state_transition`].
pub fn start_worker_span(id: WorkerId) -> Span {
    tracing::info_span!(
        "worker.run",
        "worker.id" = %id,
        "worker.state" = tracing::field::Empty,
    )
}

/// Record a lifecycle transition on the given span.
pub fn record_state_transition(span: &Span, from: WorkerState, to: WorkerState) {
    debug_assert!(from.can_transition_to(to), "illegal transition {from} -> {to}");
    span.record("worker.state", to.as_str());
    span.in_scope(|| {
        tracing::debug!(from = from.as_str(), to = to.as_str(), "state_transition");
    });
}
