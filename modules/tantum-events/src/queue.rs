use std::sync::Arc;

use tantum_common::IngestError;
use tokio::sync::{mpsc, Mutex, RwLock};

use crate::{Event, QueueError};

/// Fixed-capacity FIFO between request handlers and workers.
///
/// `enqueue` waits for a free slot instead of failing when the queue is full,
/// so a slow database pushes back on HTTP clients. Consumers share one
/// receiver behind a mutex; each event is handed to exactly one of them.
///
/// Closing drops the queue's sender. Senders cloned by in-flight `enqueue`
/// calls finish their send, then the channel closes and `dequeue` returns
/// `None` once the buffer is drained.
#[derive(Clone)]
pub struct EventQueue {
    sender: Arc<RwLock<Option<mpsc::Sender<Event>>>>,
    receiver: Arc<Mutex<mpsc::Receiver<Event>>>,
    capacity: usize,
}

impl EventQueue {
    pub fn bounded(capacity: usize) -> Result<Self, IngestError> {
        if capacity == 0 {
            return Err(IngestError::Config(
                "event queue capacity must be at least 1".to_string(),
            ));
        }
        let (tx, rx) = mpsc::channel(capacity);
        Ok(Self {
            sender: Arc::new(RwLock::new(Some(tx))),
            receiver: Arc::new(Mutex::new(rx)),
            capacity,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Wait for a free slot and buffer the event.
    pub async fn enqueue(&self, event: Event) -> Result<(), QueueError> {
        let sender = self.sender.read().await.clone();
        let Some(sender) = sender else {
            return Err(QueueError::Closed(event));
        };
        sender.send(event).await.map_err(|e| QueueError::Closed(e.0))
    }

    /// Wait for the next event. `None` means closed and drained.
    pub async fn dequeue(&self) -> Option<Event> {
        let mut receiver = self.receiver.lock().await;
        receiver.recv().await
    }

    /// Refuse further enqueues. Idempotent.
    pub async fn close(&self) {
        self.sender.write().await.take();
    }

    pub async fn is_closed(&self) -> bool {
        self.sender.read().await.is_none()
    }
}
