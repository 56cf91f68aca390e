//! The CQHTTP bot client and its action invoker.
//!
//! [`CqBot`] funnels every remote operation through [`CqBot::invoke`], which
//! owns key-case conversion and retcode classification. The typed methods
//! generated in [`methods`](crate::methods), the send pipeline in
//! [`dispatch`](crate::dispatch) and the status query all sit on top of it.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use cqhttp::{CqBot, WsApiCaller};
//!
//! let caller = Arc::new(WsApiCaller::new(frame_tx));
//! let bot = CqBot::new("10000", caller);
//!
//! let groups = bot.get_group_list().await?;
//! bot.send("group:123456", "hello").await?;
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value;
use tracing::{debug, instrument};

use crate::api_caller::{ApiCaller, ResponseClass};
use crate::case::{to_domain_case, to_wire_case};
use crate::config::CqhttpConfig;
use crate::error::{ApiResult, SenderError};
use crate::hooks::{NoopHooks, SendHooks};

/// A CQHTTP bot account.
pub struct CqBot {
    /// Bot ID (the account's QQ number).
    self_id: String,
    /// Transport used for every action call.
    caller: Arc<dyn ApiCaller>,
    /// Before-send / after-send extension points.
    pub(crate) hooks: Arc<dyn SendHooks>,
    /// Client configuration.
    pub(crate) config: CqhttpConfig,
    /// Set once the account finished its initial handshake.
    ready: AtomicBool,
}

impl CqBot {
    /// Creates a bot with default configuration and no hooks.
    pub fn new(self_id: impl Into<String>, caller: Arc<dyn ApiCaller>) -> Self {
        Self {
            self_id: self_id.into(),
            caller,
            hooks: Arc::new(NoopHooks),
            config: CqhttpConfig::default(),
            ready: AtomicBool::new(false),
        }
    }

    /// Injects the hook collaborator used by the send pipeline.
    pub fn with_hooks(mut self, hooks: Arc<dyn SendHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Replaces the client configuration.
    pub fn with_config(mut self, config: CqhttpConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the bot's account id.
    pub fn self_id(&self) -> &str {
        &self.self_id
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &CqhttpConfig {
        &self.config
    }

    /// Marks the account as ready; [`status`](Self::status) stops reporting
    /// it as idle.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
    }

    /// Whether the account finished its initial handshake.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    // =========================================================================
    // Invoker
    // =========================================================================

    /// Calls one action and classifies its response.
    ///
    /// `params` uses domain (`camelCase`) keys and is converted to wire case
    /// before it reaches the transport; the payload is converted back.
    ///
    /// | retcode | result |
    /// |---------|--------|
    /// | `0` | `Ok(Some(payload))`, or `Ok(None)` when `silent` |
    /// | `1` | `Ok(None)` |
    /// | negative or `> 1` | `Err(ApiError::Sender)`, even when `silent` |
    ///
    /// Transport failures are returned unchanged. There is no retry.
    #[instrument(name = "invoke", skip_all, fields(self_id = %self.self_id, action = %action))]
    pub async fn invoke(
        &self,
        action: &str,
        params: Value,
        silent: bool,
    ) -> ApiResult<Option<Value>> {
        debug!(action = %action, params = %params, "[request]");
        let response = self.caller.call(action, to_wire_case(&params)).await?;
        debug!(
            action = %action,
            status = %response.status,
            retcode = response.retcode,
            "[response]"
        );

        match response.class() {
            ResponseClass::Success if silent => Ok(None),
            ResponseClass::Success => Ok(Some(to_domain_case(&response.data))),
            // TODO: confirm whether retcode 1 should surface its payload.
            ResponseClass::Partial => Ok(None),
            ResponseClass::Failure => Err(SenderError::new(
                params,
                action,
                response.retcode,
                self.self_id.clone(),
            )
            .into()),
        }
    }

    /// Calls the `_async` form of `action` and returns once it is accepted.
    ///
    /// The remote outcome is never checked beyond the acceptance retcode.
    pub async fn invoke_async(&self, action: &str, params: Value) -> ApiResult<()> {
        self.invoke(&format!("{action}_async"), params, true)
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_caller::ActionResponse;
    use crate::error::ApiError;
    use crate::testing::StubCaller;
    use serde_json::json;

    fn bot(caller: &Arc<StubCaller>) -> CqBot {
        CqBot::new("10000", Arc::clone(caller) as Arc<dyn ApiCaller>)
    }

    #[tokio::test]
    async fn test_invoke_converts_both_directions() {
        let caller = StubCaller::new();
        caller.push_ok(json!({ "message_id": 456, "sender": { "user_id": 7 } }));
        let bot = bot(&caller);

        let data = bot
            .invoke(
                "send_group_msg",
                json!({ "groupId": "123", "message": "hi", "autoEscape": false }),
                false,
            )
            .await
            .unwrap();

        assert_eq!(data, Some(json!({ "messageId": 456, "sender": { "userId": 7 } })));
        assert_eq!(
            caller.calls(),
            vec![(
                "send_group_msg".to_string(),
                json!({ "group_id": "123", "message": "hi", "auto_escape": false })
            )]
        );
    }

    #[tokio::test]
    async fn test_invoke_silent_success_returns_nothing() {
        let caller = StubCaller::new();
        caller.push_ok(json!({ "message_id": 1 }));
        let bot = bot(&caller);

        assert_eq!(bot.invoke("delete_msg", json!({}), true).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_invoke_negative_retcode_raises_even_when_silent() {
        for silent in [false, true] {
            let caller = StubCaller::new();
            caller.push(ActionResponse::with_retcode("failed", -1, Value::Null));
            let bot = bot(&caller);

            let params = json!({ "groupId": "1", "userId": "2" });
            let err = bot
                .invoke("set_group_kick", params.clone(), silent)
                .await
                .unwrap_err();

            let ApiError::Sender(err) = err else {
                panic!("expected a sender error");
            };
            assert_eq!(err.args(), &params);
            assert_eq!(err.action(), "set_group_kick");
            assert_eq!(err.code(), -1);
            assert_eq!(err.self_id(), "10000");
        }
    }

    #[tokio::test]
    async fn test_invoke_retcode_above_one_raises() {
        let caller = StubCaller::new();
        caller.push(ActionResponse::with_retcode("failed", 100, Value::Null));
        let bot = bot(&caller);

        let err = bot.invoke("get_msg", json!({}), false).await.unwrap_err();
        assert_eq!(err.retcode(), Some(100));
    }

    #[tokio::test]
    async fn test_invoke_retcode_one_is_neither_value_nor_error() {
        // Current behavior: an "async" acknowledgement resolves empty.
        let caller = StubCaller::new();
        caller.push(ActionResponse::with_retcode("async", 1, json!({ "ignored": true })));
        let bot = bot(&caller);

        assert_eq!(bot.invoke("get_msg", json!({}), false).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_invoke_async_appends_suffix() {
        let caller = StubCaller::new();
        caller.push(ActionResponse::with_retcode("async", 1, Value::Null));
        let bot = bot(&caller);

        bot.invoke_async("clean_plugin_log", json!({})).await.unwrap();
        assert_eq!(caller.actions(), vec!["clean_plugin_log_async"]);
    }

    #[tokio::test]
    async fn test_transport_error_is_propagated() {
        let caller = StubCaller::new();
        caller.push_err(ApiError::NotConnected);
        let bot = bot(&caller);

        let err = bot.invoke("get_status", json!({}), false).await.unwrap_err();
        assert!(matches!(err, ApiError::NotConnected));
    }
}
