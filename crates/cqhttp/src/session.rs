//! Sessions observed by the send pipeline.
//!
//! An [`OutboundSession`] represents one attempt to deliver one message. It
//! is created fresh for every send, handed mutably to the before-send hook,
//! and completed with a message id only on the awaited path.
//!
//! An [`InboundSession`] is the minimal view of a received message that the
//! reply entry point needs: where it came from, and whether the transaction
//! it arrived on can still carry a reply.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};

/// Kind of conversation a message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Group,
    Private,
}

/// Kind of id a message is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Group,
    User,
}

impl TargetType {
    /// Wire action that sends a message to this kind of target.
    pub fn send_action(&self) -> &'static str {
        match self {
            Self::Group => "send_group_msg",
            Self::User => "send_private_msg",
        }
    }

    /// Domain-cased parameter name carrying the target id.
    pub fn id_param(&self) -> &'static str {
        match self {
            Self::Group => "groupId",
            Self::User => "userId",
        }
    }

    /// The message type implied by sending to this target.
    pub fn message_type(&self) -> MessageType {
        match self {
            Self::Group => MessageType::Group,
            Self::User => MessageType::Private,
        }
    }
}

// =============================================================================
// ChannelId
// =============================================================================

/// A logical destination of the form `<type>:<id>`.
///
/// `group:<id>` addresses a group; every other type prefix (`private`,
/// `user`, ...) addresses a user.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelId {
    pub target_type: TargetType,
    pub target_id: String,
}

impl ChannelId {
    pub fn group(id: impl Into<String>) -> Self {
        Self {
            target_type: TargetType::Group,
            target_id: id.into(),
        }
    }

    pub fn private(id: impl Into<String>) -> Self {
        Self {
            target_type: TargetType::User,
            target_id: id.into(),
        }
    }
}

impl FromStr for ChannelId {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s
            .split_once(':')
            .ok_or_else(|| ApiError::InvalidChannel(s.to_string()))?;
        if id.is_empty() {
            return Err(ApiError::InvalidChannel(s.to_string()));
        }
        let target_type = if kind == "group" {
            TargetType::Group
        } else {
            TargetType::User
        };
        Ok(Self {
            target_type,
            target_id: id.to_string(),
        })
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target_type {
            TargetType::Group => write!(f, "group:{}", self.target_id),
            TargetType::User => write!(f, "private:{}", self.target_id),
        }
    }
}

// =============================================================================
// OutboundSession
// =============================================================================

/// One in-flight attempt to deliver a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundSession {
    /// The bot account sending the message.
    pub self_id: String,
    pub message_type: MessageType,
    pub target_type: TargetType,
    pub target_id: String,
    /// Message content; the before-send hook may rewrite it.
    pub content: String,
    /// Filled in after a successful awaited send.
    pub message_id: Option<i64>,
}

impl OutboundSession {
    pub fn new(
        self_id: impl Into<String>,
        message_type: MessageType,
        target_type: TargetType,
        target_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            self_id: self_id.into(),
            message_type,
            target_type,
            target_id: target_id.into(),
            content: content.into(),
            message_id: None,
        }
    }

    /// The channel this session delivers to.
    pub fn channel_id(&self) -> ChannelId {
        ChannelId {
            target_type: self.target_type,
            target_id: self.target_id.clone(),
        }
    }
}

// =============================================================================
// InboundSession
// =============================================================================

/// Body of a same-transaction reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuickReplyPayload {
    pub reply: String,
    pub auto_escape: bool,
    pub at_sender: bool,
}

/// A reply channel bound to the transaction an inbound event arrived on.
#[async_trait]
pub trait QuickReply: Send + Sync {
    /// Whether the transaction can still carry a reply.
    fn is_open(&self) -> bool {
        true
    }

    /// Answers the inbound transaction.
    async fn respond(&self, payload: QuickReplyPayload) -> ApiResult<()>;
}

/// The parts of a received message needed to reply to it.
#[derive(Clone)]
pub struct InboundSession {
    pub message_type: MessageType,
    pub group_id: Option<String>,
    pub user_id: Option<String>,
    pub quick_reply: Option<Arc<dyn QuickReply>>,
}

impl fmt::Debug for InboundSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InboundSession")
            .field("message_type", &self.message_type)
            .field("group_id", &self.group_id)
            .field("user_id", &self.user_id)
            .field("quick_reply", &self.quick_reply.is_some())
            .finish()
    }
}

impl InboundSession {
    /// A session for a message received in a group.
    pub fn group(group_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            message_type: MessageType::Group,
            group_id: Some(group_id.into()),
            user_id: Some(user_id.into()),
            quick_reply: None,
        }
    }

    /// A session for a private message.
    pub fn private(user_id: impl Into<String>) -> Self {
        Self {
            message_type: MessageType::Private,
            group_id: None,
            user_id: Some(user_id.into()),
            quick_reply: None,
        }
    }

    /// Attaches a same-transaction reply channel.
    pub fn with_quick_reply(mut self, quick_reply: Arc<dyn QuickReply>) -> Self {
        self.quick_reply = Some(quick_reply);
        self
    }

    /// Where a reply goes: the group if there is one, otherwise the user.
    pub fn reply_target(&self) -> Option<ChannelId> {
        if let Some(group_id) = &self.group_id {
            Some(ChannelId::group(group_id.clone()))
        } else {
            self.user_id.as_ref().map(|id| ChannelId::private(id.clone()))
        }
    }

    /// The open reply channel, if any.
    pub(crate) fn open_quick_reply(&self) -> Option<&Arc<dyn QuickReply>> {
        self.quick_reply.as_ref().filter(|reply| reply.is_open())
    }
}
