use thiserror::Error;

use crate::event::SimEvent;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Asset '{name}' failed to load: {reason}")]
    AssetLoad { name: String, reason: String },

    #[error("Actor '{name}' not registered")]
    ActorNotFound { name: String },

    #[error("Publish of {event:?} exceeded max depth {depth}")]
    PublishDepthExceeded { event: SimEvent, depth: usize },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SimResult<T> = Result<T, SimError>;
