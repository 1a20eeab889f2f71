use roomsvital_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Sign-in failure. Deliberately carries no provider detail.
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("{message}")]
    Provider { code: String, message: String },

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl AuthError {
    pub fn provider(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            code: code.into(),
            message: message.into(),
        }
    }
}
