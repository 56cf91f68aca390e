//! Configuration for cqhttp processes.
//!
//! One [`AppConfig`] holds the logging setup and the `cqhttp` client
//! section. It is assembled by [`ConfigLoader`] from defaults, config files
//! and `CQHTTP_*` environment variables, then checked by [`validate_config`].

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    AppConfig, LogFormat, LogLevel, LogOutput, LogRotation, LoggingConfig, SpanEventConfig,
};
pub use validation::validate_config;
