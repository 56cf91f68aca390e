//! Error types for the CQHTTP client.

use serde_json::Value;
use thiserror::Error;

// =============================================================================
// Transport Errors
// =============================================================================

/// Errors raised by an [`ApiCaller`](crate::ApiCaller) while moving a call.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The outbound frame could not be handed to the connection.
    #[error("failed to send request: {0}")]
    SendFailed(String),

    /// The connection was closed while the call was in flight.
    #[error("connection closed: {reason}")]
    ConnectionClosed {
        /// Reason for closure.
        reason: String,
    },

    /// The peer answered with something that is not an action response.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

// =============================================================================
// Sender Errors
// =============================================================================

/// A classified remote failure.
///
/// Raised by [`CqBot::invoke`](crate::CqBot::invoke) when the response
/// retcode is negative or greater than one. The captured `args` are the
/// parameters exactly as the caller passed them, before key-case conversion.
#[derive(Debug, Clone, Error)]
#[error("Error when trying to send to {action}, args: {args}, retcode: {code}")]
pub struct SenderError {
    self_id: String,
    code: i64,
    args: Value,
    action: String,
}

impl SenderError {
    pub(crate) fn new(
        args: Value,
        action: impl Into<String>,
        code: i64,
        self_id: impl Into<String>,
    ) -> Self {
        Self {
            self_id: self_id.into(),
            code,
            args,
            action: action.into(),
        }
    }

    /// The bot account that issued the call.
    pub fn self_id(&self) -> &str {
        &self.self_id
    }

    /// The retcode returned by the remote side.
    pub fn code(&self) -> i64 {
        self.code
    }

    /// The original, domain-cased parameters.
    pub fn args(&self) -> &Value {
        &self.args
    }

    /// The wire action name.
    pub fn action(&self) -> &str {
        &self.action
    }
}

// =============================================================================
// API Errors
// =============================================================================

/// Error type for API calls.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The bot is not connected.
    #[error("bot is not connected")]
    NotConnected,
    /// The transport gave up waiting for a response.
    #[error("API call timed out")]
    Timeout,
    /// The remote side rejected the call.
    #[error(transparent)]
    Sender(#[from] SenderError),
    /// Failed to serialize/deserialize.
    #[error("serialization error: {0}")]
    SerializationError(String),
    /// Transport error.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// A channel id that is not of the form `<type>:<id>`.
    #[error("invalid channel id: {0}")]
    InvalidChannel(String),
    /// The inbound session names neither a group nor a user.
    #[error("missing session info")]
    MissingSession,
    /// The call succeeded without a payload where one was required.
    #[error("action '{action}' returned no data")]
    MissingData {
        /// The wire action name.
        action: String,
    },
    /// No generated operation has this name.
    #[error("unknown operation: {0}")]
    UnknownMethod(String),
}

impl ApiError {
    /// Returns the remote retcode if this is a classified remote failure.
    pub fn retcode(&self) -> Option<i64> {
        match self {
            Self::Sender(e) => Some(e.code()),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

/// Result type for API calls.
pub type ApiResult<T> = Result<T, ApiError>;
