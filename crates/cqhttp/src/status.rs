//! Bot health classification.

use std::fmt;

use tracing::warn;

use crate::bot::CqBot;

/// Health of a bot account as seen from this client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BotStatus {
    /// Online and healthy.
    Good,
    /// The implementation is reachable but the account is offline.
    BotOffline,
    /// The account is online but the implementation reports a fault.
    ServerError,
    /// The status query itself failed.
    NetError,
    /// The account has not finished its initial handshake.
    BotIdle,
}

impl BotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::BotOffline => "bot_offline",
            Self::ServerError => "server_error",
            Self::NetError => "net_error",
            Self::BotIdle => "bot_idle",
        }
    }
}

impl fmt::Display for BotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CqBot {
    /// Classifies the account's health. Never fails.
    ///
    /// An account that is not ready is [`BotStatus::BotIdle`] and no request
    /// is made. Any failure of `get_status` maps to [`BotStatus::NetError`].
    pub async fn status(&self) -> BotStatus {
        if !self.is_ready() {
            return BotStatus::BotIdle;
        }

        match self.get_status().await {
            Ok(info) if info.good => BotStatus::Good,
            Ok(info) if info.online => BotStatus::ServerError,
            Ok(_) => BotStatus::BotOffline,
            Err(e) => {
                warn!(self_id = %self.self_id(), error = %e, "Status query failed");
                BotStatus::NetError
            }
        }
    }
}
