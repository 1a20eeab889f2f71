use std::sync::Arc;

use tokio::sync::watch;

use roomsvital_core::ids::ListenerId;

use crate::provider::{AuthEvent, IdentityProvider};
use crate::routes::{Navigation, Route};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// The provider has not reported yet.
    Unknown,
    Authenticated,
    Unauthenticated,
}

impl SessionState {
    pub fn from_event(event: &AuthEvent) -> Self {
        match event {
            AuthEvent::SignedIn(_) => Self::Authenticated,
            AuthEvent::SignedOut => Self::Unauthenticated,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Authenticated => "authenticated",
            Self::Unauthenticated => "unauthenticated",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Placeholder,
    Redirect(Route),
    Render,
}

/// Tracks the provider's auth state for as long as it is alive.
///
/// Mounting registers a listener with the provider; dropping the gate
/// deregisters it. The gate never writes the state itself, it only mirrors
/// provider events.
pub struct SessionGate {
    provider: Arc<dyn IdentityProvider>,
    listener: ListenerId,
    state: Arc<watch::Sender<SessionState>>,
}

impl SessionGate {
    pub fn mount(provider: Arc<dyn IdentityProvider>) -> Self {
        let (tx, _) = watch::channel(SessionState::Unknown);
        let state = Arc::new(tx);
        let sink = Arc::clone(&state);
        let listener = provider.register(Arc::new(move |event: &AuthEvent| {
            let next = SessionState::from_event(event);
            let changed = sink.send_if_modified(|current| {
                let changed = *current != next;
                *current = next;
                changed
            });
            if changed {
                tracing::info!(state = next.as_str(), "session state changed");
            }
        }));
        tracing::debug!(?listener, "session gate mounted");
        Self {
            provider,
            listener,
            state,
        }
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Waits until the provider has reported at least once.
    pub async fn resolved(&self) -> SessionState {
        let mut rx = self.subscribe();
        match rx.wait_for(|s| *s != SessionState::Unknown).await {
            Ok(state) => *state,
            // The sender lives in `self`, so the channel cannot close first.
            Err(_) => self.state(),
        }
    }

    pub fn guard(&self) -> GateDecision {
        match self.state() {
            SessionState::Unknown => GateDecision::Placeholder,
            SessionState::Unauthenticated => GateDecision::Redirect(Route::Login),
            SessionState::Authenticated => GateDecision::Render,
        }
    }

    pub fn navigate(&self, path: &str) -> Navigation {
        crate::routes::navigate(path, self.state())
    }
}

impl Drop for SessionGate {
    fn drop(&mut self) {
        let released = self.provider.deregister(self.listener);
        tracing::debug!(listener = ?self.listener, released, "session gate unmounted");
    }
}

impl std::fmt::Debug for SessionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGate")
            .field("listener", &self.listener)
            .field("state", &self.state())
            .finish()
    }
}
