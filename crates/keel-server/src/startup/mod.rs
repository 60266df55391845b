//! Application startup utilities module.

mod logging;
mod persistence;

pub use logging::{LogRotation, LoggingConfig, LoggingGuard, init_logging};
pub use persistence::{EmbeddedSeed, build_deployment_service, embedded_persistence};
