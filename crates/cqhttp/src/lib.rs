//! # CQHTTP Action Client
//!
//! A typed client for the action side of the CQHTTP / OneBot v11 protocol
//! spoken by QQ bot implementations (CoolQ HTTP API, go-cqhttp).
//!
//! ## Overview
//!
//! - [`case`]: `snake_case` ⇄ `camelCase` key conversion at the wire boundary
//! - [`CqBot::invoke`]: one action call, with retcode classification
//! - [`methods`]: the declarative action table and its generated methods
//! - [`dispatch`]: the outbound message pipeline with before-send hooks
//! - [`adapters`]: operations whose arguments or results need reshaping
//! - [`status`]: bot health classification
//! - [`ApiCaller`]: the transport seam, with [`WsApiCaller`] for echo-matched
//!   WebSocket connections
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use cqhttp::{CqBot, HookBus, WsApiCaller};
//!
//! let (frame_tx, frame_rx) = tokio::sync::mpsc::channel(64);
//! let caller = Arc::new(WsApiCaller::new(frame_tx));
//! // Feed inbound frames to `caller.on_incoming_response(&frame)`.
//!
//! let hooks = Arc::new(HookBus::new());
//! let bot = CqBot::new("10000", caller).with_hooks(hooks);
//!
//! let message_id = bot.send("group:123456", "hello").await?;
//! bot.set_group_ban_async("123456", "10001", Some(600)).await?;
//! let members = bot.get_member_map("123456").await?;
//! ```
//!
//! ## Key Case
//!
//! Everything handed to or returned by [`CqBot`] uses `camelCase` keys;
//! everything on the wire uses `snake_case`. Typed models are declared with
//! `#[serde(rename_all = "camelCase")]` accordingly.

pub mod adapters;
pub mod api_caller;
pub mod bot;
pub mod case;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod hooks;
pub mod methods;
pub mod model;
pub mod session;
pub mod status;

#[cfg(test)]
mod testing;

pub use adapters::to_version;
pub use api_caller::{ActionRequest, ActionResponse, ApiCaller, ResponseClass, WsApiCaller};
pub use bot::CqBot;
pub use config::CqhttpConfig;
pub use error::{ApiError, ApiResult, SenderError, TransportError};
pub use hooks::{HookBus, NoopHooks, SendHooks, SessionEvent};
pub use methods::{METHOD_TABLE, MethodDescriptor, MethodKind, MethodTable};
pub use session::{
    ChannelId, InboundSession, MessageType, OutboundSession, QuickReply, QuickReplyPayload,
    TargetType,
};
pub use status::BotStatus;
