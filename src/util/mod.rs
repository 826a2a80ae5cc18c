//! Logging setup and path helpers

pub mod logging;
pub mod paths;

pub use logging::{config_from_env, init_logging, LoggingConfig};
pub use paths::normalize;
