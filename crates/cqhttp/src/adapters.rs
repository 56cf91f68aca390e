//! Operations whose arguments or results need reshaping around the raw
//! action table.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::bot::CqBot;
use crate::error::ApiResult;
use crate::model::{
    AnonymousTarget, FriendRequestReply, GroupRequestReply, GroupRequestSubType, MessageInfo,
    VersionInfo,
};

/// Formats implementation version info as a user-agent style string.
///
/// go-cqhttp reports `Go-CQHTTP/<version without its leading "v">`; CoolQ
/// plugins report `CoolQ/<Edition> CQHTTP/<plugin version>`.
pub fn to_version(info: &VersionInfo) -> String {
    if info.go_cqhttp {
        let version = info.version.as_deref().unwrap_or_default();
        let mut chars = version.chars();
        chars.next();
        return format!("Go-CQHTTP/{}", chars.as_str());
    }

    let edition = info.coolq_edition.as_deref().unwrap_or_default();
    let mut chars = edition.chars();
    let edition = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
        None => String::new(),
    };
    format!(
        "CoolQ/{} CQHTTP/{}",
        edition,
        info.plugin_version.as_deref().unwrap_or_default()
    )
}

impl CqBot {
    // =========================================================================
    // Lookups
    // =========================================================================

    /// Gets a message with `timestamp`/`content` field names.
    pub async fn get_message(&self, message_id: i64) -> ApiResult<MessageInfo> {
        self.get_msg(message_id).await.map(MessageInfo::from)
    }

    /// Asks the server which account it is logged in as.
    pub async fn get_self_id(&self) -> ApiResult<String> {
        let info = self.get_login_info().await?;
        Ok(info.user_id.to_string())
    }

    /// Maps every member of a group to their display name: the group card
    /// when set, otherwise the nickname.
    pub async fn get_member_map(&self, group_id: &str) -> ApiResult<HashMap<i64, String>> {
        let members = self.get_group_member_list(group_id).await?;
        Ok(members
            .into_iter()
            .map(|member| {
                let name = if member.card.is_empty() {
                    member.nickname
                } else {
                    member.card
                };
                (member.user_id, name)
            })
            .collect())
    }

    // =========================================================================
    // Anonymous bans
    // =========================================================================

    /// Mutes an anonymous member, identified by flag or by the full
    /// anonymous object.
    pub async fn set_group_anonymous_ban(
        &self,
        group_id: &str,
        target: impl Into<AnonymousTarget>,
        duration: Option<u64>,
    ) -> ApiResult<()> {
        let params = anonymous_ban_params(group_id, &target.into(), duration)?;
        self.invoke("set_group_anonymous_ban", params, false).await?;
        Ok(())
    }

    pub async fn set_group_anonymous_ban_async(
        &self,
        group_id: &str,
        target: impl Into<AnonymousTarget>,
        duration: Option<u64>,
    ) -> ApiResult<()> {
        let params = anonymous_ban_params(group_id, &target.into(), duration)?;
        self.invoke_async("set_group_anonymous_ban", params).await
    }

    // =========================================================================
    // Requests
    // =========================================================================

    /// Answers a friend request.
    ///
    /// `reply` accepts `true`/`false`, or a string to approve with a remark:
    ///
    /// ```rust,ignore
    /// bot.set_friend_add_request(&flag, true).await?;
    /// bot.set_friend_add_request(&flag, "met at the conference").await?;
    /// ```
    pub async fn set_friend_add_request(
        &self,
        flag: &str,
        reply: impl Into<FriendRequestReply>,
    ) -> ApiResult<()> {
        let params = friend_request_params(flag, &reply.into());
        self.invoke("set_friend_add_request", params, false).await?;
        Ok(())
    }

    pub async fn set_friend_add_request_async(
        &self,
        flag: &str,
        reply: impl Into<FriendRequestReply>,
    ) -> ApiResult<()> {
        let params = friend_request_params(flag, &reply.into());
        self.invoke_async("set_friend_add_request", params).await
    }

    /// Answers a group join request or invitation.
    ///
    /// `reply` accepts `true`/`false`, or a string to reject with a reason.
    pub async fn set_group_add_request(
        &self,
        flag: &str,
        sub_type: GroupRequestSubType,
        reply: impl Into<GroupRequestReply>,
    ) -> ApiResult<()> {
        let params = group_request_params(flag, sub_type, &reply.into());
        self.invoke("set_group_add_request", params, false).await?;
        Ok(())
    }

    pub async fn set_group_add_request_async(
        &self,
        flag: &str,
        sub_type: GroupRequestSubType,
        reply: impl Into<GroupRequestReply>,
    ) -> ApiResult<()> {
        let params = group_request_params(flag, sub_type, &reply.into());
        self.invoke_async("set_group_add_request", params).await
    }
}

fn anonymous_ban_params(
    group_id: &str,
    target: &AnonymousTarget,
    duration: Option<u64>,
) -> ApiResult<Value> {
    let mut params = Map::new();
    params.insert("groupId".into(), Value::String(group_id.to_string()));
    if let Some(duration) = duration {
        params.insert("duration".into(), Value::from(duration));
    }
    target.write_params(&mut params)?;
    Ok(Value::Object(params))
}

fn friend_request_params(flag: &str, reply: &FriendRequestReply) -> Value {
    let mut params = Map::new();
    params.insert("flag".into(), Value::String(flag.to_string()));
    reply.write_params(&mut params);
    Value::Object(params)
}

fn group_request_params(
    flag: &str,
    sub_type: GroupRequestSubType,
    reply: &GroupRequestReply,
) -> Value {
    let mut params = Map::new();
    params.insert("flag".into(), Value::String(flag.to_string()));
    params.insert("subType".into(), Value::String(sub_type.as_str().to_string()));
    reply.write_params(&mut params);
    Value::Object(params)
}
