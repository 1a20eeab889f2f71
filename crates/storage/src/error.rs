use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A stored body that does not decode, or a document that does not encode.
    #[error("core error: {0}")]
    Core(#[from] roomsvital_core::CoreError),
}
