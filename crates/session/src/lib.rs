pub mod account;
pub mod error;
pub mod gate;
pub mod memory;
pub mod provider;
pub mod routes;

pub use account::{AccountService, SignOutOutcome, SignUpRequest};
pub use error::AuthError;
pub use gate::{GateDecision, SessionGate, SessionState};
pub use memory::MemoryIdentity;
pub use provider::{AuthEvent, IdentityProvider, Listener, User};
pub use routes::{navigate, Navigation, Route};
