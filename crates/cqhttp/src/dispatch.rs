//! The outbound message pipeline.
//!
//! Every send goes through the same steps:
//!
//! 1. Empty content returns immediately without a request.
//! 2. A fresh [`OutboundSession`] is built for the target.
//! 3. The before-send hook sees the session and may rewrite its content or
//!    cancel the send. A cancelled send has no side effects.
//! 4. The (possibly rewritten) content is transmitted.
//!
//! On the awaited path the returned message id is stored on the session and
//! a [`SessionEvent::Send`] notification is emitted. The fire-and-forget
//! path (`*_async`) returns as soon as the request is accepted: it never
//! learns a message id and **never** emits the notification, so listeners
//! only observe awaited sends.

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::bot::CqBot;
use crate::error::{ApiError, ApiResult};
use crate::hooks::SessionEvent;
use crate::model::SendMessageResponse;
use crate::session::{
    ChannelId, InboundSession, MessageType, OutboundSession, QuickReplyPayload, TargetType,
};

impl CqBot {
    // =========================================================================
    // Concrete senders
    // =========================================================================

    /// Sends a group message and returns its id.
    ///
    /// Returns `Ok(None)` when the content is empty, when a hook cancelled
    /// the send, or when the server accepted it without reporting an id.
    pub async fn send_group_msg(
        &self,
        group_id: &str,
        message: &str,
        auto_escape: bool,
    ) -> ApiResult<Option<i64>> {
        self.send_awaited(TargetType::Group, group_id, message, auto_escape)
            .await
    }

    /// Sends a group message without waiting for the result.
    pub async fn send_group_msg_async(
        &self,
        group_id: &str,
        message: &str,
        auto_escape: bool,
    ) -> ApiResult<()> {
        self.send_fire_and_forget(TargetType::Group, group_id, message, auto_escape)
            .await
    }

    /// Sends a private message and returns its id.
    pub async fn send_private_msg(
        &self,
        user_id: &str,
        message: &str,
        auto_escape: bool,
    ) -> ApiResult<Option<i64>> {
        self.send_awaited(TargetType::User, user_id, message, auto_escape)
            .await
    }

    /// Sends a private message without waiting for the result.
    pub async fn send_private_msg_async(
        &self,
        user_id: &str,
        message: &str,
        auto_escape: bool,
    ) -> ApiResult<()> {
        self.send_fire_and_forget(TargetType::User, user_id, message, auto_escape)
            .await
    }

    // =========================================================================
    // Channel routing
    // =========================================================================

    /// Sends `content` to a `<type>:<id>` channel.
    ///
    /// `group:<id>` routes to [`send_group_msg`](Self::send_group_msg), any
    /// other type to [`send_private_msg`](Self::send_private_msg).
    pub async fn send(&self, channel_id: &str, content: &str) -> ApiResult<Option<i64>> {
        let channel: ChannelId = channel_id.parse()?;
        self.send_awaited(channel.target_type, &channel.target_id, content, false)
            .await
    }

    /// Fire-and-forget form of [`send`](Self::send).
    pub async fn send_async(&self, channel_id: &str, content: &str) -> ApiResult<()> {
        let channel: ChannelId = channel_id.parse()?;
        self.send_fire_and_forget(channel.target_type, &channel.target_id, content, false)
            .await
    }

    /// Replies to a received message.
    ///
    /// With `prefer_sync` on, this is an awaited send that returns the
    /// message id. Otherwise the reply is written to the inbound transaction
    /// while it is still open, or falls back to a fire-and-forget send; in
    /// both cases no message id is known.
    ///
    /// Replies go to the group the message came from, or to its sender for
    /// private messages.
    pub async fn reply(
        &self,
        inbound: &InboundSession,
        message: &str,
        auto_escape: bool,
    ) -> ApiResult<Option<i64>> {
        if message.is_empty() {
            return Ok(None);
        }

        let target = inbound.reply_target().ok_or(ApiError::MissingSession)?;

        if self.config.prefer_sync {
            return self
                .send_awaited(target.target_type, &target.target_id, message, auto_escape)
                .await;
        }

        if let Some(quick_reply) = inbound.open_quick_reply() {
            let prepared = self.prepare(
                inbound.message_type,
                target.target_type,
                &target.target_id,
                message,
            );
            let Some(session) = prepared else {
                return Ok(None);
            };
            trace!(channel = %target, "Replying through inbound transaction");
            quick_reply
                .respond(QuickReplyPayload {
                    reply: session.content,
                    auto_escape,
                    at_sender: false,
                })
                .await?;
            return Ok(None);
        }

        self.send_fire_and_forget(target.target_type, &target.target_id, message, auto_escape)
            .await?;
        Ok(None)
    }

    // =========================================================================
    // Pipeline
    // =========================================================================

    /// Builds the session and runs the before-send hook. `None` means the
    /// send was cancelled.
    fn prepare(
        &self,
        message_type: MessageType,
        target_type: TargetType,
        target_id: &str,
        content: &str,
    ) -> Option<OutboundSession> {
        let mut session = OutboundSession::new(
            self.self_id(),
            message_type,
            target_type,
            target_id,
            content,
        );
        if self.hooks.try_intercept(&mut session) {
            debug!(channel = %session.channel_id(), "Send cancelled by hook");
            return None;
        }
        Some(session)
    }

    async fn send_awaited(
        &self,
        target_type: TargetType,
        target_id: &str,
        content: &str,
        auto_escape: bool,
    ) -> ApiResult<Option<i64>> {
        if content.is_empty() {
            return Ok(None);
        }
        let Some(mut session) =
            self.prepare(target_type.message_type(), target_type, target_id, content)
        else {
            return Ok(None);
        };

        let params = message_params(&session, auto_escape);
        let Some(payload) = self.invoke(target_type.send_action(), params, false).await? else {
            return Ok(None);
        };
        let response: SendMessageResponse = serde_json::from_value(payload)?;

        session.message_id = Some(response.message_id);
        self.hooks.notify(SessionEvent::Send, &session);
        Ok(session.message_id)
    }

    async fn send_fire_and_forget(
        &self,
        target_type: TargetType,
        target_id: &str,
        content: &str,
        auto_escape: bool,
    ) -> ApiResult<()> {
        if content.is_empty() {
            return Ok(());
        }
        let Some(session) =
            self.prepare(target_type.message_type(), target_type, target_id, content)
        else {
            return Ok(());
        };

        let params = message_params(&session, auto_escape);
        self.invoke_async(target_type.send_action(), params).await
    }
}

/// Domain-cased `send_*_msg` parameters for a prepared session.
fn message_params(session: &OutboundSession, auto_escape: bool) -> Value {
    let mut params = Map::new();
    params.insert(
        session.target_type.id_param().to_string(),
        Value::String(session.target_id.clone()),
    );
    params.insert("message".into(), Value::String(session.content.clone()));
    params.insert("autoEscape".into(), Value::Bool(auto_escape));
    Value::Object(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_caller::{ActionResponse, ApiCaller};
    use crate::config::CqhttpConfig;
    use crate::hooks::HookBus;
    use crate::session::QuickReply;
    use crate::testing::StubCaller;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::Arc;

    fn bot_with_hooks(caller: &Arc<StubCaller>) -> (CqBot, Arc<HookBus>) {
        let hooks = Arc::new(HookBus::new());
        let bot = CqBot::new("10000", Arc::clone(caller) as Arc<dyn ApiCaller>)
            .with_hooks(Arc::clone(&hooks) as Arc<dyn crate::hooks::SendHooks>);
        (bot, hooks)
    }

    fn record_sends(hooks: &HookBus) -> Arc<Mutex<Vec<OutboundSession>>> {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&sent);
        hooks.on(move |event, session| {
            assert_eq!(event, SessionEvent::Send);
            sink.lock().push(session.clone());
        });
        sent
    }

    #[derive(Default)]
    struct RecordingReply {
        open: bool,
        replies: Mutex<Vec<QuickReplyPayload>>,
    }

    #[async_trait]
    impl QuickReply for RecordingReply {
        fn is_open(&self) -> bool {
            self.open
        }

        async fn respond(&self, payload: QuickReplyPayload) -> ApiResult<()> {
            self.replies.lock().push(payload);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_send_to_group_channel() {
        let caller = StubCaller::new();
        caller.push_ok(json!({ "message_id": 42 }));
        let (bot, hooks) = bot_with_hooks(&caller);
        let sent = record_sends(&hooks);

        assert_eq!(bot.send("group:100", "hello").await.unwrap(), Some(42));

        assert_eq!(
            caller.calls(),
            vec![(
                "send_group_msg".to_string(),
                json!({ "group_id": "100", "message": "hello", "auto_escape": false })
            )]
        );
        let sent = sent.lock();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].message_id, Some(42));
        assert_eq!(sent[0].channel_id(), ChannelId::group("100"));
    }

    #[tokio::test]
    async fn test_send_async_to_user_channel() {
        let caller = StubCaller::new();
        caller.push(ActionResponse::with_retcode("async", 1, Value::Null));
        let (bot, hooks) = bot_with_hooks(&caller);
        let sent = record_sends(&hooks);

        bot.send_async("user:7", "ping").await.unwrap();

        assert_eq!(
            caller.calls(),
            vec![(
                "send_private_msg_async".to_string(),
                json!({ "user_id": "7", "message": "ping", "auto_escape": false })
            )]
        );
        assert!(sent.lock().is_empty());
    }

    #[tokio::test]
    async fn test_empty_content_is_a_no_op() {
        let caller = StubCaller::new();
        let (bot, _hooks) = bot_with_hooks(&caller);

        assert_eq!(bot.send_group_msg("100", "", false).await.unwrap(), None);
        bot.send_private_msg_async("7", "", false).await.unwrap();
        assert!(caller.calls().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_send_has_no_side_effects() {
        let caller = StubCaller::new();
        let (bot, hooks) = bot_with_hooks(&caller);
        let sent = record_sends(&hooks);
        hooks.before_send(|_| true);

        assert_eq!(bot.send("group:100", "hello").await.unwrap(), None);
        bot.send_async("group:100", "hello").await.unwrap();

        assert!(caller.calls().is_empty());
        assert!(sent.lock().is_empty());
    }

    #[tokio::test]
    async fn test_hook_rewrites_content() {
        let caller = StubCaller::new();
        caller.push_ok(json!({ "message_id": 1 }));
        let (bot, hooks) = bot_with_hooks(&caller);
        hooks.before_send(|session| {
            session.content = format!("[bot] {}", session.content);
            false
        });

        bot.send_private_msg("7", "hi", true).await.unwrap();
        assert_eq!(
            caller.calls()[0].1,
            json!({ "user_id": "7", "message": "[bot] hi", "auto_escape": true })
        );
    }

    #[tokio::test]
    async fn test_send_failure_skips_notification() {
        let caller = StubCaller::new();
        caller.push(ActionResponse::with_retcode("failed", -1, Value::Null));
        let (bot, hooks) = bot_with_hooks(&caller);
        let sent = record_sends(&hooks);

        let err = bot.send("private:7", "hi").await.unwrap_err();
        assert_eq!(err.retcode(), Some(-1));
        assert!(sent.lock().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_channel() {
        let caller = StubCaller::new();
        let (bot, _hooks) = bot_with_hooks(&caller);

        let err = bot.send("100", "hello").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidChannel(_)));
        assert!(caller.calls().is_empty());
    }

    #[tokio::test]
    async fn test_reply_through_open_transaction() {
        let caller = StubCaller::new();
        let (bot, _hooks) = bot_with_hooks(&caller);
        let quick = Arc::new(RecordingReply {
            open: true,
            ..Default::default()
        });
        let inbound = InboundSession::group("100", "7")
            .with_quick_reply(Arc::clone(&quick) as Arc<dyn QuickReply>);

        assert_eq!(bot.reply(&inbound, "pong", false).await.unwrap(), None);

        assert!(caller.calls().is_empty());
        assert_eq!(
            *quick.replies.lock(),
            vec![QuickReplyPayload {
                reply: "pong".to_string(),
                auto_escape: false,
                at_sender: false,
            }]
        );
    }

    #[tokio::test]
    async fn test_reply_prefer_sync_issues_new_call() {
        let caller = StubCaller::new();
        caller.push_ok(json!({ "message_id": 9 }));
        let (bot, _hooks) = bot_with_hooks(&caller);
        let bot = bot.with_config(CqhttpConfig {
            prefer_sync: true,
            ..Default::default()
        });
        let quick = Arc::new(RecordingReply {
            open: true,
            ..Default::default()
        });
        let inbound = InboundSession::private("7")
            .with_quick_reply(Arc::clone(&quick) as Arc<dyn QuickReply>);

        assert_eq!(bot.reply(&inbound, "pong", false).await.unwrap(), Some(9));
        assert_eq!(caller.actions(), vec!["send_private_msg"]);
        assert!(quick.replies.lock().is_empty());
    }

    #[tokio::test]
    async fn test_reply_with_closed_transaction() {
        let caller = StubCaller::new();
        caller.push(ActionResponse::with_retcode("async", 1, Value::Null));
        let (bot, hooks) = bot_with_hooks(&caller);
        let sent = record_sends(&hooks);
        let quick = Arc::new(RecordingReply::default());
        let inbound = InboundSession::group("100", "7")
            .with_quick_reply(Arc::clone(&quick) as Arc<dyn QuickReply>);

        assert_eq!(bot.reply(&inbound, "pong", false).await.unwrap(), None);
        assert_eq!(
            caller.calls(),
            vec![(
                "send_group_msg_async".to_string(),
                json!({ "group_id": "100", "message": "pong", "auto_escape": false })
            )]
        );
        assert!(quick.replies.lock().is_empty());
        assert!(sent.lock().is_empty());
    }

    #[tokio::test]
    async fn test_reply_without_transaction_goes_to_sender() {
        let caller = StubCaller::new();
        caller.push(ActionResponse::with_retcode("async", 1, Value::Null));
        let (bot, _hooks) = bot_with_hooks(&caller);

        let inbound = InboundSession::private("7");
        assert_eq!(bot.reply(&inbound, "pong", true).await.unwrap(), None);
        assert_eq!(
            caller.calls(),
            vec![(
                "send_private_msg_async".to_string(),
                json!({ "user_id": "7", "message": "pong", "auto_escape": true })
            )]
        );
    }

    #[tokio::test]
    async fn test_reply_session_keeps_inbound_message_type() {
        let caller = StubCaller::new();
        let (bot, hooks) = bot_with_hooks(&caller);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        hooks.before_send(move |session| {
            sink.lock().push((session.message_type, session.target_type));
            false
        });
        let quick = Arc::new(RecordingReply {
            open: true,
            ..Default::default()
        });
        let mut inbound = InboundSession::group("100", "7")
            .with_quick_reply(Arc::clone(&quick) as Arc<dyn QuickReply>);
        inbound.message_type = MessageType::Private;

        assert_eq!(bot.reply(&inbound, "pong", false).await.unwrap(), None);
        assert_eq!(*seen.lock(), vec![(MessageType::Private, TargetType::Group)]);
        assert_eq!(quick.replies.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_reply_without_target() {
        let caller = StubCaller::new();
        let (bot, _hooks) = bot_with_hooks(&caller);
        let mut inbound = InboundSession::private("7");
        inbound.user_id = None;

        let err = bot.reply(&inbound, "pong", false).await.unwrap_err();
        assert!(matches!(err, ApiError::MissingSession));
    }
}
