use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// A document body could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// A required form field is missing or unreadable. Raised before any I/O.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("unknown gender: {0}")]
    UnknownGender(String),

    #[error("room number is not a number: {0}")]
    InvalidRoomNo(String),
}
