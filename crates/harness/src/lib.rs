mod registry;
mod store;

pub use registry::{RecordingNotifier, ScriptedConfirmer, TestRegistry};
pub use store::{FlakyStore, Release, StoreOp};

use tracing_subscriber::EnvFilter;

/// Installs a test-friendly fmt subscriber once per process. `RUST_LOG`
/// overrides the default `warn` level.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
