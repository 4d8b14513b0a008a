use thiserror::Error;

use crate::Event;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required header: {0}")]
    MissingHeader(&'static str),
}

#[derive(Error, Debug)]
pub enum QueueError {
    /// The queue was closed for shutdown. The rejected event is handed back.
    #[error("event queue is closed")]
    Closed(Event),
}
