use crate::domain::ports::SignalSink;
use crate::domain::signal::Signal;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, warn};

/// Fan-out hub between work units and signal sinks.
///
/// Publication goes through a bounded queue drained by a dispatcher task,
/// so a slow sink never blocks a work unit. When the queue is full the
/// incoming signal is dropped and counted; the next cycle supersedes it
/// anyway.
pub struct SignalHub {
    sinks: Arc<RwLock<Vec<Arc<dyn SignalSink>>>>,
    queue_tx: mpsc::Sender<Signal>,
    dropped: Arc<AtomicUsize>,
}

impl SignalHub {
    /// Create a hub and spawn its dispatcher task. The dispatcher stops
    /// when the last hub handle is dropped.
    pub fn new(capacity: usize) -> Self {
        let sinks: Arc<RwLock<Vec<Arc<dyn SignalSink>>>> = Arc::new(RwLock::new(Vec::new()));
        let (queue_tx, mut queue_rx) = mpsc::channel::<Signal>(capacity);

        let dispatch_sinks = Arc::clone(&sinks);
        tokio::spawn(async move {
            while let Some(signal) = queue_rx.recv().await {
                let sinks = dispatch_sinks.read().await;
                for sink in sinks.iter() {
                    sink.publish(&signal);
                }
            }
            debug!("SignalHub: dispatcher stopped");
        });

        Self {
            sinks,
            queue_tx,
            dropped: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Register a sink for all signals published from now on
    pub async fn register(&self, sink: Arc<dyn SignalSink>) {
        self.sinks.write().await.push(sink);
    }

    /// Queue a signal for delivery. Never blocks the caller: when the
    /// queue is full the signal is dropped and the drop counter bumped.
    pub fn publish(&self, signal: Signal) {
        match self.queue_tx.try_send(signal) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(signal)) => {
                let total = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                warn!(
                    "SignalHub: queue full, dropped {} {} signal ({} dropped so far)",
                    signal.symbol, signal.direction, total
                );
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                // Dispatcher already stopped, nothing left to deliver to
            }
        }
    }

    pub fn dropped_count(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }

    pub async fn sink_count(&self) -> usize {
        self.sinks.read().await.len()
    }
}

impl Clone for SignalHub {
    fn clone(&self) -> Self {
        Self {
            sinks: Arc::clone(&self.sinks),
            queue_tx: self.queue_tx.clone(),
            dropped: Arc::clone(&self.dropped),
        }
    }
}
