//! Process-level setup for cqhttp bots.
//!
//! This crate provides:
//! - Layered configuration loading (`config`), built on figment
//! - Logging initialization (`logging`), built on `tracing-subscriber`
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use cqhttp::{CqBot, WsApiCaller};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = cqhttp_runtime::bootstrap()?;
//!
//!     let caller = WsApiCaller::new(frame_tx).with_timeout(config.cqhttp.api_timeout());
//!     let bot = CqBot::new(self_id, Arc::new(caller)).with_config(config.cqhttp);
//!     // ...
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod logging;

pub use config::{AppConfig, ConfigError, ConfigLoader, ConfigResult, LoggingConfig};
pub use logging::{LoggingBuilder, SpanEvents};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Loads and validates configuration from the default locations, then
/// installs the global subscriber from its `logging` section.
pub fn bootstrap() -> ConfigResult<AppConfig> {
    let config = config::load_config()?;
    config::validate_config(&config)?;
    logging::init_from_config(&config.logging);
    tracing::info!(
        prefer_sync = config.cqhttp.prefer_sync,
        api_timeout_ms = config.cqhttp.api_timeout_ms,
        "cqhttp runtime initialized"
    );
    Ok(config)
}

/// Commonly used logging macros.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
