use std::sync::Arc;

use roomsvital_core::{time, AdminProfile, UserId};
use roomsvital_storage::{Collection, DocumentStore};

use crate::error::AuthError;
use crate::provider::{IdentityProvider, User};
use crate::routes::Route;

const SIGN_UP_FALLBACK: &str = "Failed to sign up";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpRequest {
    pub admin_name: String,
    pub email: String,
    pub password: String,
}

/// Result of a sign-out attempt. Navigation away from the session happens
/// whether or not the provider call succeeded.
#[derive(Debug)]
pub struct SignOutOutcome {
    pub navigate_to: Route,
    pub error: Option<AuthError>,
}

/// Sign-in, sign-up and sign-out flows on top of the identity provider.
pub struct AccountService {
    provider: Arc<dyn IdentityProvider>,
    store: Arc<dyn DocumentStore>,
}

impl AccountService {
    pub fn new(provider: Arc<dyn IdentityProvider>, store: Arc<dyn DocumentStore>) -> Self {
        Self { provider, store }
    }

    /// On success the caller continues to [`Route::Home`]. Any failure is
    /// reported as [`AuthError::InvalidCredentials`].
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError> {
        match self.provider.sign_in(email, password).await {
            Ok(user) => {
                tracing::info!(user = %user.id, "signed in");
                Ok(user)
            }
            Err(e) => {
                tracing::warn!(error = %e, "sign-in rejected");
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    /// Creates the account and its `admins` profile. On success the caller
    /// continues to [`Route::Login`]. Failures keep the provider's message.
    pub async fn sign_up(&self, request: &SignUpRequest) -> Result<User, AuthError> {
        let user = self
            .provider
            .sign_up(&request.email, &request.password)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "sign-up rejected"))?;
        let profile = AdminProfile {
            admin_name: request.admin_name.clone(),
            email: request.email.clone(),
            created_at_ms: time::now_ms(),
        };
        self.store
            .set(Collection::Admins, &user.id.to_string(), profile.to_document())
            .await
            .inspect_err(|e| tracing::warn!(user = %user.id, error = %e, "admin profile write failed"))?;
        tracing::info!(user = %user.id, "admin account created");
        Ok(user)
    }

    pub async fn sign_out(&self) -> SignOutOutcome {
        let error = match self.provider.sign_out().await {
            Ok(()) => {
                tracing::info!("signed out");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "sign-out failed");
                Some(e)
            }
        };
        SignOutOutcome {
            navigate_to: Route::Login,
            error,
        }
    }

    pub async fn admin_profile(&self, user: UserId) -> Result<Option<AdminProfile>, AuthError> {
        let doc = self.store.get(Collection::Admins, &user.to_string()).await?;
        Ok(doc.as_ref().and_then(AdminProfile::from_document))
    }
}

impl AuthError {
    /// Text shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::Provider { message, .. } if message.is_empty() => SIGN_UP_FALLBACK.to_string(),
            other => other.to_string(),
        }
    }
}
