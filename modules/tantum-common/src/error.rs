use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Startup error: {0}")]
    Startup(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
