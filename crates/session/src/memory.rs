use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use roomsvital_core::ids::{ListenerId, UserId};

use crate::error::AuthError;
use crate::provider::{AuthEvent, IdentityProvider, Listener, User};

const MIN_PASSWORD_LEN: usize = 6;

struct Account {
    id: UserId,
    password: String,
}

#[derive(Default)]
struct Inner {
    accounts: BTreeMap<String, Account>,
    current: Option<User>,
    listeners: Vec<(ListenerId, Listener)>,
    /// Replay current state to new listeners only on `flush`.
    deferred: bool,
    unavailable: bool,
}

/// In-process identity provider with email/password accounts.
#[derive(Default)]
pub struct MemoryIdentity {
    inner: Mutex<Inner>,
}

impl MemoryIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider that leaves new listeners unresolved until [`flush`](Self::flush).
    pub fn deferred() -> Self {
        let identity = Self::default();
        identity.inner.lock().deferred = true;
        identity
    }

    /// Emits the current state to every listener.
    pub fn flush(&self) {
        let event = AuthEvent::from_user(self.current_user());
        self.emit(&event);
    }

    /// While set, every provider call fails as if the network were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.lock().unavailable = unavailable;
    }

    pub fn listener_count(&self) -> usize {
        self.inner.lock().listeners.len()
    }

    fn check_available(&self) -> Result<(), AuthError> {
        if self.inner.lock().unavailable {
            return Err(AuthError::provider(
                "auth/network-request-failed",
                "Network error while contacting the identity provider",
            ));
        }
        Ok(())
    }

    // Listeners run outside the lock so they may call back into the provider.
    fn emit(&self, event: &AuthEvent) {
        let listeners: Vec<Listener> = self
            .inner
            .lock()
            .listeners
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener(event);
        }
    }

    fn set_current(&self, user: Option<User>) {
        self.inner.lock().current = user.clone();
        self.emit(&AuthEvent::from_user(user));
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentity {
    fn register(&self, listener: Listener) -> ListenerId {
        let id = ListenerId::new();
        let replay = {
            let mut inner = self.inner.lock();
            inner.listeners.push((id, Arc::clone(&listener)));
            (!inner.deferred).then(|| AuthEvent::from_user(inner.current.clone()))
        };
        if let Some(event) = replay {
            listener(&event);
        }
        id
    }

    fn deregister(&self, id: ListenerId) -> bool {
        let mut inner = self.inner.lock();
        let before = inner.listeners.len();
        inner.listeners.retain(|(lid, _)| *lid != id);
        inner.listeners.len() != before
    }

    fn current_user(&self) -> Option<User> {
        self.inner.lock().current.clone()
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError> {
        self.check_available()?;
        let user = {
            let inner = self.inner.lock();
            match inner.accounts.get(email) {
                Some(account) if account.password == password => User {
                    id: account.id,
                    email: email.to_string(),
                },
                _ => {
                    return Err(AuthError::provider(
                        "auth/invalid-credential",
                        "Firebase: Error (auth/invalid-credential).",
                    ));
                }
            }
        };
        self.set_current(Some(user.clone()));
        Ok(user)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<User, AuthError> {
        self.check_available()?;
        if !email.contains('@') {
            return Err(AuthError::provider(
                "auth/invalid-email",
                "Firebase: Error (auth/invalid-email).",
            ));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::provider(
                "auth/weak-password",
                "Firebase: Password should be at least 6 characters (auth/weak-password).",
            ));
        }
        let user = {
            let mut inner = self.inner.lock();
            if inner.accounts.contains_key(email) {
                return Err(AuthError::provider(
                    "auth/email-already-in-use",
                    "Firebase: Error (auth/email-already-in-use).",
                ));
            }
            let id = UserId::new();
            inner.accounts.insert(
                email.to_string(),
                Account {
                    id,
                    password: password.to_string(),
                },
            );
            User {
                id,
                email: email.to_string(),
            }
        };
        self.set_current(Some(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.check_available()?;
        self.set_current(None);
        Ok(())
    }
}
