// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod assessment;
pub mod collaborators;
pub mod config;
pub mod diff;
pub mod error;
pub mod local;
pub mod logging;
pub mod metrics;
pub mod reconciler;
pub mod results;
pub mod runtime;
pub mod session;
pub mod timer;
