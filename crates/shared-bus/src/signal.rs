//! # Finished Signal
//!
//! One-shot "stop waiting" signal attached to every subscription. The sender
//! side never blocks: a signal with no listener, or a second signal, is
//! dropped.

use tokio::sync::mpsc;

/// Sender half, held by the registry entry.
#[derive(Debug, Clone)]
pub struct FinishedSignal {
    tx: mpsc::Sender<()>,
}

impl FinishedSignal {
    /// Signal the listener. Returns `false` if the signal was dropped.
    pub fn notify(&self) -> bool {
        self.tx.try_send(()).is_ok()
    }
}

/// Receiver half, held by the handler that blocks on the subscription.
#[derive(Debug)]
pub struct FinishedListener {
    rx: mpsc::Receiver<()>,
}

impl FinishedListener {
    /// Wait for the signal.
    ///
    /// If every sender is dropped without signalling (the entry was replaced
    /// or deleted) this never resolves; the handler then ends through its
    /// transport instead.
    pub async fn wait(&mut self) {
        if self.rx.recv().await.is_none() {
            std::future::pending::<()>().await;
        }
    }
}

#[must_use]
pub fn finished_signal() -> (FinishedSignal, FinishedListener) {
    let (tx, rx) = mpsc::channel(1);
    (FinishedSignal { tx }, FinishedListener { rx })
}
