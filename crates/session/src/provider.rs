use std::sync::Arc;

use async_trait::async_trait;

use roomsvital_core::ids::{ListenerId, UserId};

use crate::error::AuthError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(User),
    SignedOut,
}

impl AuthEvent {
    pub fn from_user(user: Option<User>) -> Self {
        match user {
            Some(user) => Self::SignedIn(user),
            None => Self::SignedOut,
        }
    }
}

pub type Listener = Arc<dyn Fn(&AuthEvent) + Send + Sync>;

/// Observable authentication provider.
///
/// A registered listener receives the provider's current state once the
/// provider has resolved it, then every later transition, until it is
/// deregistered.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn register(&self, listener: Listener) -> ListenerId;

    /// Returns false if the id was not registered.
    fn deregister(&self, id: ListenerId) -> bool;

    fn current_user(&self) -> Option<User>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError>;

    /// Creates the account and signs it in.
    async fn sign_up(&self, email: &str, password: &str) -> Result<User, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;
}
