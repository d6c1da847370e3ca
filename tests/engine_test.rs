//! Integration tests for the manager/worker pool.

use handoff::channel::work_channel;
use handoff::config::Config;
use handoff::engine::{MAX_WORKERS, Manager, ManagerConfig, Worker};
use handoff::error::Error;
use handoff::model::{CompletionReport, WorkItem, WorkerId, WorkerState};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

fn quick(workers: usize, messages: usize) -> ManagerConfig {
    ManagerConfig {
        workers,
        messages,
        max_delay: Duration::from_millis(2),
        drain_timeout: Some(Duration::from_secs(10)),
    }
}

fn worker_ids(reports: &[CompletionReport]) -> HashSet<usize> {
    reports.iter().map(|r| r.worker.0).collect()
}

// ---------------------------------------------------------------------------
// Manager runs
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn every_worker_reports_exactly_once() {
    let summary = Manager::new(quick(8, 40)).run().await.unwrap();

    assert_eq!(summary.workers, 8);
    assert_eq!(summary.messages, 40);
    assert_eq!(summary.reports.len(), 8);
    // Arrival order is arbitrary; compare as a set.
    let expected: HashSet<usize> = (1..=8).collect();
    assert_eq!(worker_ids(&summary.reports), expected);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn processed_counts_sum_to_message_count() {
    let summary = Manager::new(quick(5, 73)).run().await.unwrap();
    assert_eq!(summary.total_processed(), 73);
}

#[tokio::test]
async fn no_messages_still_collects_every_report() {
    let summary = Manager::new(quick(6, 0)).run().await.unwrap();

    assert_eq!(summary.reports.len(), 6);
    assert_eq!(summary.total_processed(), 0);
    for report in &summary.reports {
        assert_eq!(report.processed, 0);
        assert!(report.elapsed < Duration::from_secs(1));
    }
}

#[tokio::test]
async fn single_worker_processes_everything() {
    let config = ManagerConfig {
        max_delay: Duration::from_millis(10),
        ..quick(1, 12)
    };
    let summary = Manager::new(config).run().await.unwrap();

    assert_eq!(summary.reports.len(), 1);
    let report = &summary.reports[0];
    assert_eq!(report.worker, WorkerId(1));
    assert_eq!(report.processed, 12);

    // The lone worker is alive for the whole run: it starts right after the
    // manager does and reports just before the manager returns.
    assert!(report.elapsed <= summary.elapsed);
    let gap = summary.elapsed - report.elapsed;
    assert!(
        gap < Duration::from_millis(50),
        "report covers {:?} of a {:?} run",
        report.elapsed,
        summary.elapsed
    );
}

#[tokio::test]
async fn more_workers_than_messages() {
    let summary = Manager::new(quick(10, 3)).run().await.unwrap();
    assert_eq!(summary.reports.len(), 10);
    assert_eq!(summary.total_processed(), 3);
}

#[tokio::test]
async fn zero_workers_with_messages_is_rejected() {
    let err = Manager::new(quick(0, 5)).run().await.unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[tokio::test]
async fn oversized_pool_is_rejected() {
    let err = Manager::new(quick(MAX_WORKERS + 1, 0)).run().await.unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[tokio::test]
async fn huge_worker_count_from_env_is_a_config_error() {
    let config = Config::from_lookup(|name| {
        (name == "NUM_WORKERS").then(|| "3000000000000000000".to_string())
    });
    assert_eq!(config.workers, 3_000_000_000_000_000_000);

    let manager_config = ManagerConfig {
        messages: 0,
        ..ManagerConfig::from_config(&config)
    };
    let err = Manager::new(manager_config).run().await.unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[tokio::test]
async fn zero_workers_and_zero_messages_completes_empty() {
    let summary = Manager::new(quick(0, 0)).run().await.unwrap();
    assert!(summary.reports.is_empty());
}

#[tokio::test]
async fn drain_timeout_surfaces_as_error() {
    // The lone worker claims the message and then sleeps for up to ten
    // minutes, far past the drain deadline.
    let config = ManagerConfig {
        workers: 1,
        messages: 1,
        max_delay: Duration::from_secs(600),
        drain_timeout: Some(Duration::from_millis(20)),
    };
    let err = Manager::new(config).run().await.unwrap_err();
    assert!(matches!(err, Error::DrainTimeout { expected: 1, .. }));
}

#[tokio::test]
async fn summary_serializes_to_json() {
    let summary = Manager::new(quick(2, 4)).run().await.unwrap();
    let json = serde_json::to_value(&summary).unwrap();

    assert_eq!(json["workers"], 2);
    assert_eq!(json["messages"], 4);
    assert_eq!(json["reports"].as_array().unwrap().len(), 2);
    assert!(json["reports"][0]["message"].as_str().unwrap().contains("finished in"));
}

// ---------------------------------------------------------------------------
// Log output
// ---------------------------------------------------------------------------

/// Run the manager on a current-thread runtime with a subscriber that
/// writes formatted lines into a buffer, and return those lines.
fn run_capturing_logs(config: ManagerConfig) -> Vec<String> {
    let buffer = Arc::new(Mutex::new(Vec::<u8>::new()));
    let sink = Arc::clone(&buffer);
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .with_writer(move || CaptureWriter(Arc::clone(&sink)))
        .finish();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    tracing::subscriber::with_default(subscriber, || {
        runtime.block_on(Manager::new(config).run()).unwrap();
    });

    let bytes = buffer.lock().unwrap().clone();
    String::from_utf8(bytes)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn default_run_logs_banner_reports_and_goodbye_in_order() {
    let config = ManagerConfig {
        max_delay: Duration::from_millis(1),
        ..ManagerConfig::from_config(&Config::from_lookup(|_| None))
    };
    let lines = run_capturing_logs(config);

    let banner = lines
        .iter()
        .position(|l| l.contains("sending 100 messages to 16 workers"))
        .expect("banner missing");
    let first_item = lines
        .iter()
        .position(|l| l.contains("work message #"))
        .expect("no per-item lines");
    assert!(banner < first_item, "banner logged after dispatch began");

    let item_lines = lines.iter().filter(|l| l.contains("work message #")).count();
    assert_eq!(item_lines, 100);

    let report_lines = lines.iter().filter(|l| l.contains("finished in")).count();
    assert_eq!(report_lines, 16);

    let last = lines.last().expect("no output");
    assert!(last.contains("goodbye"), "last line was {last:?}");
}

#[test]
fn manager_config_takes_counts_from_config() {
    let config = Config {
        workers: 3,
        messages: 9,
        ..Config::default()
    };
    let manager_config = ManagerConfig::from_config(&config);
    assert_eq!(manager_config.workers, 3);
    assert_eq!(manager_config.messages, 9);
    assert_eq!(manager_config.max_delay, Duration::from_millis(100));
    assert!(manager_config.drain_timeout.is_none());
}

#[test]
fn default_manager_config_matches_env_defaults() {
    let config = ManagerConfig::default();
    assert_eq!(config.workers, 16);
    assert_eq!(config.messages, 100);
}

// ---------------------------------------------------------------------------
// Worker in isolation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn worker_reports_after_channel_closes() {
    let (tx, rx) = work_channel();
    let (done_tx, mut done_rx) = mpsc::channel(1);

    let handle = tokio::spawn(Worker::new(WorkerId(7), Duration::ZERO).run(rx, done_tx));

    tx.send(WorkItem::new("a")).await.unwrap();
    tx.send(WorkItem::new("b")).await.unwrap();
    assert!(done_rx.try_recv().is_err(), "reported before close");
    tx.close();

    let report = done_rx.recv().await.expect("worker must report");
    assert_eq!(report.worker, WorkerId(7));
    assert_eq!(report.processed, 2);
    assert!(report.message.starts_with("worker 7 finished in "));

    handle.await.unwrap();
    // Exactly one report per worker.
    assert!(done_rx.recv().await.is_none());
}

#[tokio::test]
async fn worker_survives_missing_manager() {
    let (tx, rx) = work_channel();
    let (done_tx, done_rx) = mpsc::channel(1);
    drop(done_rx);
    tx.close();

    Worker::new(WorkerId(1), Duration::ZERO).run(rx, done_tx).await;
}

#[test]
fn worker_state_transitions_only_move_forward() {
    use WorkerState::*;
    assert!(Running.can_transition_to(Draining));
    assert!(Draining.can_transition_to(Finished));
    assert!(!Running.can_transition_to(Finished));
    assert!(!Finished.can_transition_to(Running));
    assert!(!Draining.can_transition_to(Running));
    assert!(Finished.is_terminal());
    assert!(!Running.is_terminal());
}

#[test]
fn worker_id_displays_zero_padded() {
    assert_eq!(WorkerId(3).to_string(), "03");
    assert_eq!(WorkerId(12).to_string(), "12");
}
