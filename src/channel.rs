//! Rendezvous work channel: one producer, many consumers.
//!
//! `send` returns only after some receiver has taken the item, so the
//! producer can never run ahead of the pool. Dropping or closing the sender
//! ends the stream for every receiver at once: each pending and future
//! `recv` returns `None` after the last item is claimed.

use crate::error::{Error, Result};
use crate::model::WorkItem;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc, oneshot};

/// An item in flight, paired with the claim signal its sender waits on.
struct Handoff {
    item: WorkItem,
    claimed: oneshot::Sender<()>,
}

/// Create a connected sender/receiver pair.
pub fn work_channel() -> (WorkSender, WorkReceiver) {
    let (tx, rx) = mpsc::channel(1);
    (
        WorkSender { tx },
        WorkReceiver {
            rx: Arc::new(Mutex::new(rx)),
        },
    )
}

/// Producing half. Not `Clone`: there is exactly one producer.
pub struct WorkSender {
    tx: mpsc::Sender<Handoff>,
}

impl WorkSender {
    /// Hand `item` to the next ready receiver and wait until it is claimed.
    ///
    /// Fails with [`Error::PoolClosed`] if every receiver is gone.
    pub async fn send(&self, item: WorkItem) -> Result<()> {
        let (claimed, on_claim) = oneshot::channel();
        self.tx
            .send(Handoff { item, claimed })
            .await
            .map_err(|_| Error::PoolClosed)?;
        on_claim.await.map_err(|_| Error::PoolClosed)
    }

    /// Close the channel. Consumes the sender, so it happens once and no
    /// send can follow it.
    pub fn close(self) {
        drop(self.tx);
    }
}

/// Consuming half. Clone one per worker.
#[derive(Clone)]
pub struct WorkReceiver {
    rx: Arc<Mutex<mpsc::Receiver<Handoff>>>,
}

impl WorkReceiver {
    /// Wait for the next item. `None` means the channel is closed and empty.
    pub async fn recv(&self) -> Option<WorkItem> {
        let handoff = self.rx.lock().await.recv().await?;
        // The sender may have been dropped mid-send; the item is still ours.
        let _ = handoff.claimed.send(());
        Some(handoff.item)
    }
}
