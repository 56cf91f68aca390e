//! Argument shapes that select different wire fields depending on the variant.

use serde_json::{Map, Value};

use super::api::Anonymous;

/// How to answer a friend add request.
///
/// Converts from `bool` (plain approve/reject) and from a string (approve
/// and set that remark).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FriendRequestReply {
    #[default]
    Approve,
    Reject,
    ApproveWithRemark(String),
}

impl FriendRequestReply {
    /// Writes `approve` (and `remark`) into domain-cased params.
    pub(crate) fn write_params(&self, params: &mut Map<String, Value>) {
        match self {
            Self::Approve => {
                params.insert("approve".into(), Value::Bool(true));
            }
            Self::Reject => {
                params.insert("approve".into(), Value::Bool(false));
            }
            Self::ApproveWithRemark(remark) => {
                params.insert("approve".into(), Value::Bool(true));
                params.insert("remark".into(), Value::String(remark.clone()));
            }
        }
    }
}

impl From<bool> for FriendRequestReply {
    fn from(approve: bool) -> Self {
        if approve { Self::Approve } else { Self::Reject }
    }
}

impl From<&str> for FriendRequestReply {
    fn from(remark: &str) -> Self {
        Self::ApproveWithRemark(remark.to_string())
    }
}

impl From<String> for FriendRequestReply {
    fn from(remark: String) -> Self {
        Self::ApproveWithRemark(remark)
    }
}

/// How to answer a group join or invite request.
///
/// Converts from `bool` (plain approve/reject) and from a string (reject
/// with that reason).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GroupRequestReply {
    #[default]
    Approve,
    Reject,
    RejectWithReason(String),
}

impl GroupRequestReply {
    /// Writes `approve` (and `reason`) into domain-cased params.
    pub(crate) fn write_params(&self, params: &mut Map<String, Value>) {
        match self {
            Self::Approve => {
                params.insert("approve".into(), Value::Bool(true));
            }
            Self::Reject => {
                params.insert("approve".into(), Value::Bool(false));
            }
            Self::RejectWithReason(reason) => {
                params.insert("approve".into(), Value::Bool(false));
                params.insert("reason".into(), Value::String(reason.clone()));
            }
        }
    }
}

impl From<bool> for GroupRequestReply {
    fn from(approve: bool) -> Self {
        if approve { Self::Approve } else { Self::Reject }
    }
}

impl From<&str> for GroupRequestReply {
    fn from(reason: &str) -> Self {
        Self::RejectWithReason(reason.to_string())
    }
}

impl From<String> for GroupRequestReply {
    fn from(reason: String) -> Self {
        Self::RejectWithReason(reason)
    }
}

/// Whether a group request is a join request or an invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupRequestSubType {
    Add,
    Invite,
}

impl GroupRequestSubType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Invite => "invite",
        }
    }
}

/// The anonymous member targeted by `set_group_anonymous_ban`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnonymousTarget {
    /// The flag string from an anonymous message (wire key `flag`).
    Flag(String),
    /// The full anonymous object (wire key `anonymous`).
    Anonymous(Anonymous),
}

impl AnonymousTarget {
    pub(crate) fn write_params(&self, params: &mut Map<String, Value>) -> serde_json::Result<()> {
        match self {
            Self::Flag(flag) => {
                params.insert("flag".into(), Value::String(flag.clone()));
            }
            Self::Anonymous(anonymous) => {
                params.insert("anonymous".into(), serde_json::to_value(anonymous)?);
            }
        }
        Ok(())
    }
}

impl From<Anonymous> for AnonymousTarget {
    fn from(anonymous: Anonymous) -> Self {
        Self::Anonymous(anonymous)
    }
}

impl From<&str> for AnonymousTarget {
    fn from(flag: &str) -> Self {
        Self::Flag(flag.to_string())
    }
}
