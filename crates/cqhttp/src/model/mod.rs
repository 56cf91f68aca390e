//! Data models for CQHTTP action payloads.
//!
//! Response types deserialize from the domain-cased payload, so every field
//! is declared with `rename_all = "camelCase"`. Request-side helpers encode
//! the argument shapes that cannot be expressed as plain positional values.

pub mod api;
pub mod request;

pub use api::*;
pub use request::{
    AnonymousTarget, FriendRequestReply, GroupRequestReply, GroupRequestSubType,
};
