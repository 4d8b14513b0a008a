use std::sync::Arc;

use tantum_common::IngestError;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::{Event, EventQueue, EventSink};

/// Fixed set of identical workers draining an [`EventQueue`] into an [`EventSink`].
///
/// Workers never coordinate with each other; exclusive delivery comes from the
/// queue. Each runs until the queue is closed and empty.
pub struct WorkerPool {
    workers: JoinSet<()>,
    size: usize,
}

impl WorkerPool {
    pub fn spawn(size: usize, queue: EventQueue, sink: Arc<dyn EventSink>) -> Self {
        info!(size, "Create worker pool");
        let mut workers = JoinSet::new();
        for id in 0..size {
            workers.spawn(run_worker(id, queue.clone(), sink.clone()));
        }
        info!("Worker pool created");
        Self { workers, size }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Wait for every worker to exit. Call after closing the queue.
    pub async fn join(mut self) {
        while let Some(result) = self.workers.join_next().await {
            if let Err(e) = result {
                error!(error = %e, "Worker task ended abnormally");
            }
        }
        info!("Worker pool stopped");
    }
}

async fn run_worker(id: usize, queue: EventQueue, sink: Arc<dyn EventSink>) {
    debug!(worker = id, "Worker started");
    while let Some(event) = queue.dequeue().await {
        match process_event(&event, sink.as_ref()).await {
            Ok(row_id) => info!(worker = id, row_id, "The insertion was successful"),
            Err(IngestError::Serialization(e)) => {
                error!(worker = id, error = %e, "Error marshaling request headers")
            }
            Err(e) => error!(worker = id, error = %e, "Error inserting into database"),
        }
    }
    debug!(worker = id, "Queue closed, worker exiting");
}

/// Serialize one event's metadata and write its row. No retries.
pub async fn process_event(event: &Event, sink: &dyn EventSink) -> Result<i32, IngestError> {
    let user_id = event.metadata_json()?;
    debug!("Insert into database");
    sink.insert(&user_id, &event.body_text()).await
}
