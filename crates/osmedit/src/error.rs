use crate::entity::EntityId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OsmError {
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    #[error("Invalid entity id: {0}")]
    InvalidId(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] confique::Error),
}

pub type Result<T> = std::result::Result<T, OsmError>;
