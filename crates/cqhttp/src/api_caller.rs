//! The transport seam: how one action call reaches the CQHTTP server.
//!
//! [`CqBot`](crate::CqBot) holds an `Arc<dyn ApiCaller>` and never performs
//! correlation, reconnection or retries itself. Everything below the
//! [`ApiCaller::call`] boundary belongs to the transport.
//!
//! [`WsApiCaller`] matches responses by echo. Each request is tagged with a
//! numeric `echo`; the response arrives on the shared socket and is routed to
//! the waiting future by
//! [`on_incoming_response`](ApiCaller::on_incoming_response).
//!
//! Other transports (HTTP POST, test doubles) only need to implement
//! [`call`](ApiCaller::call).

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tracing::{debug, trace, warn};

use crate::error::{ApiError, ApiResult, TransportError};

// =============================================================================
// Wire shapes
// =============================================================================

/// A single action request as it is written to the wire.
#[derive(Debug, Clone, Serialize)]
pub struct ActionRequest<'a> {
    /// Wire action name, e.g. `send_group_msg`.
    pub action: &'a str,
    /// Wire-cased parameters.
    pub params: &'a Value,
    /// Correlation token, if the transport needs one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub echo: Option<u64>,
}

/// The raw response to an action call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResponse {
    /// `"ok"`, `"async"` or `"failed"`.
    pub status: String,
    /// Return code; see [`ActionResponse::class`].
    pub retcode: i64,
    /// Wire-cased payload.
    #[serde(default)]
    pub data: Value,
    /// Error message, when the implementation provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    /// Human readable error detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wording: Option<String>,
    /// Echo data from the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub echo: Option<Value>,
}

/// Classification of a response by its retcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseClass {
    /// `retcode == 0`.
    Success,
    /// `retcode == 1`: accepted, but no conclusive result.
    Partial,
    /// Any other retcode.
    Failure,
}

impl ActionResponse {
    /// Builds a successful response carrying `data`.
    pub fn ok(data: Value) -> Self {
        Self::with_retcode("ok", 0, data)
    }

    /// Builds a response with an arbitrary status and retcode.
    pub fn with_retcode(status: &str, retcode: i64, data: Value) -> Self {
        Self {
            status: status.to_string(),
            retcode,
            data,
            msg: None,
            wording: None,
            echo: None,
        }
    }

    /// Classifies this response by its retcode.
    pub fn class(&self) -> ResponseClass {
        match self.retcode {
            0 => ResponseClass::Success,
            1 => ResponseClass::Partial,
            _ => ResponseClass::Failure,
        }
    }
}

// =============================================================================
// ApiCaller trait
// =============================================================================

/// Transport-specific API call mechanism.
#[async_trait]
pub trait ApiCaller: Send + Sync {
    /// Sends one action and waits for its response.
    ///
    /// `params` is already wire-cased. Transport failures (lost connection,
    /// no response) are reported as `Err`; remote failures are reported
    /// through the retcode of an `Ok` response.
    async fn call(&self, action: &str, params: Value) -> ApiResult<ActionResponse>;

    /// Routes an inbound frame that may be an API response.
    ///
    /// Returns `true` if the frame was consumed as a response. The default
    /// returns `false`, which is correct for request/response transports.
    fn on_incoming_response(&self, _data: &Value) -> bool {
        false
    }

    /// Called when the underlying connection is closed.
    ///
    /// Implementations should unblock pending calls with
    /// [`ApiError::NotConnected`].
    fn on_disconnect(&self) {}
}

// =============================================================================
// WsApiCaller
// =============================================================================

/// [`ApiCaller`] for WebSocket transports.
///
/// Each [`call`](ApiCaller::call):
/// 1. Generates a unique numeric echo ID.
/// 2. Registers a one-shot channel keyed on that ID.
/// 3. Pushes the serialized request into the outbound frame channel.
/// 4. Awaits the one-shot receiver, resolved by
///    [`on_incoming_response`](ApiCaller::on_incoming_response).
pub struct WsApiCaller {
    /// Outbound frame channel, drained by the socket write loop.
    message_tx: mpsc::Sender<Vec<u8>>,
    /// Pending call map: echo id → response channel.
    pending_calls: Mutex<HashMap<u64, oneshot::Sender<ApiResult<ActionResponse>>>>,
    /// Monotonically increasing echo counter.
    echo_counter: AtomicU64,
    /// How long to wait for a response before giving up.
    api_timeout: Duration,
}

impl WsApiCaller {
    /// Creates a new caller writing to `message_tx` with a 30 second timeout.
    pub fn new(message_tx: mpsc::Sender<Vec<u8>>) -> Self {
        Self {
            message_tx,
            pending_calls: Mutex::new(HashMap::new()),
            echo_counter: AtomicU64::new(1),
            api_timeout: Duration::from_secs(30),
        }
    }

    /// Overrides the response timeout.
    pub fn with_timeout(mut self, api_timeout: Duration) -> Self {
        self.api_timeout = api_timeout;
        self
    }

    /// Returns the number of calls still waiting for a response.
    pub fn pending_call_count(&self) -> usize {
        self.pending_calls.lock().len()
    }
}

#[async_trait]
impl ApiCaller for WsApiCaller {
    async fn call(&self, action: &str, params: Value) -> ApiResult<ActionResponse> {
        let echo = self.echo_counter.fetch_add(1, Ordering::SeqCst);

        // Register before sending so an early response is never missed.
        let (tx, rx) = oneshot::channel();
        self.pending_calls.lock().insert(echo, tx);

        let request = ActionRequest {
            action,
            params: &params,
            echo: Some(echo),
        };
        let request_bytes = serde_json::to_vec(&request)?;

        debug!(action = %action, echo = %echo, "Calling CQHTTP action via WebSocket");

        if let Err(e) = self.message_tx.send(request_bytes).await {
            self.pending_calls.lock().remove(&echo);
            return Err(TransportError::SendFailed(e.to_string()).into());
        }

        match timeout(self.api_timeout, rx).await {
            Ok(Ok(result)) => result,
            // Sender dropped: the connection went away.
            Ok(Err(_)) => Err(ApiError::NotConnected),
            Err(_) => {
                self.pending_calls.lock().remove(&echo);
                Err(ApiError::Timeout)
            }
        }
    }

    fn on_incoming_response(&self, data: &Value) -> bool {
        let Some(echo) = data.get("echo").and_then(Value::as_u64) else {
            return false;
        };
        let Some(tx) = self.pending_calls.lock().remove(&echo) else {
            warn!(echo = %echo, "Received response for unknown echo (timed out?)");
            return false;
        };
        match serde_json::from_value::<ActionResponse>(data.clone()) {
            Ok(response) => {
                trace!(echo = %echo, retcode = response.retcode, "Routed action response");
                let _ = tx.send(Ok(response));
            }
            Err(e) => {
                warn!(echo = %echo, error = %e, "Malformed action response");
                let _ = tx.send(Err(TransportError::MalformedResponse(e.to_string()).into()));
            }
        }
        true
    }

    fn on_disconnect(&self) {
        let mut pending = self.pending_calls.lock();
        let count = pending.len();
        if count > 0 {
            debug!(count = count, "Clearing pending calls due to disconnect");
            pending.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_response_class() {
        assert_eq!(ActionResponse::ok(Value::Null).class(), ResponseClass::Success);
        assert_eq!(
            ActionResponse::with_retcode("async", 1, Value::Null).class(),
            ResponseClass::Partial
        );
        assert_eq!(
            ActionResponse::with_retcode("failed", -1, Value::Null).class(),
            ResponseClass::Failure
        );
        assert_eq!(
            ActionResponse::with_retcode("failed", 100, Value::Null).class(),
            ResponseClass::Failure
        );
    }

    #[test]
    fn test_deserialize_failure_response() {
        let response: ActionResponse =
            serde_json::from_value(json!({ "status": "failed", "retcode": -1, "data": null }))
                .unwrap();
        assert_eq!(response.retcode, -1);
        assert!(response.data.is_null());
        assert!(response.echo.is_none());
    }

    #[tokio::test]
    async fn test_ws_call_routes_response_by_echo() {
        let (tx, mut rx) = mpsc::channel(4);
        let caller = Arc::new(WsApiCaller::new(tx));

        let peer = Arc::clone(&caller);
        let server = tokio::spawn(async move {
            let frame = rx.recv().await.unwrap();
            let request: Value = serde_json::from_slice(&frame).unwrap();
            assert_eq!(request["action"], "get_login_info");
            assert_eq!(request["params"], json!({}));
            let consumed = peer.on_incoming_response(&json!({
                "status": "ok",
                "retcode": 0,
                "data": { "user_id": 10000, "nickname": "bot" },
                "echo": request["echo"],
            }));
            assert!(consumed);
        });

        let response = caller.call("get_login_info", json!({})).await.unwrap();
        server.await.unwrap();

        assert_eq!(response.retcode, 0);
        assert_eq!(response.data["user_id"], 10000);
        assert_eq!(caller.pending_call_count(), 0);
    }

    #[tokio::test]
    async fn test_ws_malformed_response_fails_call() {
        let (tx, mut rx) = mpsc::channel(4);
        let caller = Arc::new(WsApiCaller::new(tx));

        let peer = Arc::clone(&caller);
        let server = tokio::spawn(async move {
            let frame = rx.recv().await.unwrap();
            let request: Value = serde_json::from_slice(&frame).unwrap();
            assert!(peer.on_incoming_response(&json!({
                "retcode": "not a number",
                "echo": request["echo"],
            })));
        });

        let result = caller.call("get_status", json!({})).await;
        server.await.unwrap();

        assert!(matches!(
            result,
            Err(ApiError::Transport(TransportError::MalformedResponse(_)))
        ));
        assert_eq!(caller.pending_call_count(), 0);
    }

    #[tokio::test]
    async fn test_ws_call_times_out() {
        let (tx, _rx) = mpsc::channel(4);
        let caller = WsApiCaller::new(tx).with_timeout(Duration::from_millis(20));

        let result = caller.call("get_status", json!({})).await;
        assert!(matches!(result, Err(ApiError::Timeout)));
        assert_eq!(caller.pending_call_count(), 0);
    }

    #[tokio::test]
    async fn test_ws_disconnect_fails_pending_calls() {
        let (tx, mut rx) = mpsc::channel(4);
        let caller = Arc::new(WsApiCaller::new(tx));

        let pending = Arc::clone(&caller);
        let call = tokio::spawn(async move { pending.call("get_status", json!({})).await });

        // Wait until the request is on the wire, then drop the connection.
        rx.recv().await.unwrap();
        caller.on_disconnect();

        let result = call.await.unwrap();
        assert!(matches!(result, Err(ApiError::NotConnected)));
    }

    #[tokio::test]
    async fn test_ws_closed_channel_is_send_failure() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let caller = WsApiCaller::new(tx);

        let result = caller.call("get_status", json!({})).await;
        assert!(matches!(
            result,
            Err(ApiError::Transport(TransportError::SendFailed(_)))
        ));
        assert_eq!(caller.pending_call_count(), 0);
    }

    #[test]
    fn test_unknown_echo_is_not_consumed() {
        let (tx, _rx) = mpsc::channel(1);
        let caller = WsApiCaller::new(tx);
        assert!(!caller.on_incoming_response(&json!({ "status": "ok", "retcode": 0, "echo": 99 })));
        assert!(!caller.on_incoming_response(&json!({ "post_type": "message" })));
    }
}
