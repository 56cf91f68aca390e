//! Configuration types for the CQHTTP client.
//!
//! This section is read from the `cqhttp` table of the global configuration
//! file (see `cqhttp-runtime`).
//!
//! # Example Configuration
//!
//! ```yaml
//! cqhttp:
//!   # Reply through the open inbound transaction only when this is false
//!   prefer_sync: false
//!   api_timeout_ms: 30000
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// CQHTTP client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CqhttpConfig {
    /// Send replies as a fresh synchronous `send_*_msg` call instead of
    /// answering through the inbound transaction.
    pub prefer_sync: bool,

    /// How long the WebSocket caller waits for a response, in milliseconds.
    #[serde(default = "default_api_timeout_ms")]
    pub api_timeout_ms: u64,
}

fn default_api_timeout_ms() -> u64 {
    30_000
}

impl Default for CqhttpConfig {
    fn default() -> Self {
        Self {
            prefer_sync: false,
            api_timeout_ms: default_api_timeout_ms(),
        }
    }
}

impl CqhttpConfig {
    /// Returns the API timeout as a [`Duration`].
    pub fn api_timeout(&self) -> Duration {
        Duration::from_millis(self.api_timeout_ms)
    }
}
