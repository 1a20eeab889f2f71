use roomsvital_core::ValidationError;
use roomsvital_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("room not found: {0}")]
    RoomNotFound(String),

    #[error("invalid page size: {0}")]
    InvalidPageSize(usize),

    #[error("invalid configuration: {0}")]
    Config(String),
}
