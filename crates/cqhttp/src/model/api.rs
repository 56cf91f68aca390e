//! Response payload types.
//!
//! Every struct here is deserialized from a payload that has already been
//! converted to `camelCase` by the invoker.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// Accounts
// =============================================================================

/// Basic account information.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccountInfo {
    /// QQ number.
    pub user_id: i64,
    /// Nickname.
    pub nickname: String,
}

/// Information about a user who is not necessarily a friend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StrangerInfo {
    /// QQ number.
    pub user_id: i64,
    /// Nickname.
    pub nickname: String,
    /// `male`, `female` or `unknown`.
    pub sex: String,
    /// Age.
    pub age: i32,
}

/// An entry of the friend list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FriendInfo {
    /// QQ number.
    pub user_id: i64,
    /// Nickname.
    pub nickname: String,
    /// Remark set by the bot account.
    pub remark: String,
}

/// Message sender information.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Sender {
    /// QQ number.
    pub user_id: Option<i64>,
    /// Nickname.
    pub nickname: Option<String>,
    /// Group card (group nickname).
    pub card: Option<String>,
    /// Gender.
    pub sex: Option<String>,
    /// Age.
    pub age: Option<i32>,
    /// Group role (`owner`, `admin`, `member`).
    pub role: Option<String>,
}

/// Anonymous member information, as delivered with anonymous group messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anonymous {
    /// Anonymous user ID.
    pub id: i64,
    /// Anonymous user name.
    pub name: String,
    /// Flag used to ban this anonymous user.
    pub flag: String,
}

/// Membership VIP details (experimental action).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VipInfo {
    /// QQ number.
    pub user_id: i64,
    /// Nickname.
    pub nickname: String,
    /// Account level.
    pub level: i64,
    /// Level acceleration.
    pub level_speed: f64,
    /// VIP level, a number or a label depending on the implementation.
    pub vip_level: Value,
    /// VIP growth rate.
    pub vip_growth_speed: i64,
    /// Total VIP growth.
    pub vip_growth_total: i64,
}

// =============================================================================
// Groups
// =============================================================================

/// An entry of the group list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListedGroupInfo {
    /// Group number.
    pub group_id: i64,
    /// Group name.
    pub group_name: String,
}

/// Detailed group information.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GroupInfo {
    /// Group number.
    pub group_id: i64,
    /// Group name.
    pub group_name: String,
    /// Current member count.
    pub member_count: i32,
    /// Member limit.
    pub max_member_count: i32,
}

/// Information about one group member.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GroupMemberInfo {
    pub group_id: i64,
    pub user_id: i64,
    pub nickname: String,
    /// Group card; empty when unset.
    pub card: String,
    pub sex: String,
    pub age: i32,
    pub area: String,
    pub join_time: i64,
    pub last_sent_time: i64,
    pub level: String,
    pub role: String,
    pub unfriendly: bool,
    pub title: String,
    pub title_expire_time: i64,
    pub card_changeable: bool,
}

/// Honor categories accepted by `get_group_honor_info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HonorType {
    Talkative,
    Performer,
    Legend,
    StrongNewbie,
    Emotion,
    All,
}

/// The current "dragon king" of a group.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TalkativeMemberInfo {
    pub user_id: i64,
    pub nickname: String,
    pub avatar: String,
    pub day_count: i32,
}

/// A member holding some honor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HonoredMemberInfo {
    pub user_id: i64,
    pub nickname: String,
    pub avatar: String,
    pub description: String,
}

/// Group honor rosters. Lists not requested are absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HonorInfo {
    pub group_id: i64,
    pub current_talkative: Option<TalkativeMemberInfo>,
    pub talkative_list: Vec<HonoredMemberInfo>,
    pub performer_list: Vec<HonoredMemberInfo>,
    pub legend_list: Vec<HonoredMemberInfo>,
    pub strong_newbie_list: Vec<HonoredMemberInfo>,
    pub emotion_list: Vec<HonoredMemberInfo>,
}

/// Text of a group notice.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GroupNoticeMessage {
    pub text: String,
    pub text_face: String,
    pub title: String,
}

/// Display settings of a group notice.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GroupNoticeSettings {
    pub is_show_edit_card: i32,
    pub remind_ts: i64,
}

/// A group notice (experimental action).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GroupNotice {
    pub cn: i64,
    pub fid: String,
    #[serde(rename = "fn")]
    pub fn_: i64,
    pub msg: GroupNoticeMessage,
    /// Publish time.
    pub pubt: i64,
    pub read_num: i64,
    pub settings: GroupNoticeSettings,
    /// Publisher.
    pub u: i64,
    pub vn: i64,
}

// =============================================================================
// Messages
// =============================================================================

/// Response data of `send_group_msg` / `send_private_msg`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResponse {
    /// The ID of the sent message.
    pub message_id: i64,
}

/// A message as returned by `get_msg`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawMessageInfo {
    pub message_id: i64,
    pub real_id: i64,
    pub message_type: String,
    pub sender: Sender,
    /// Send time, seconds since the epoch.
    pub time: i64,
    /// Message body, a CQ-code string or a segment array.
    pub message: Value,
}

/// A message with the field names used by the rest of the bot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MessageInfo {
    pub message_id: i64,
    pub real_id: i64,
    pub message_type: String,
    pub sender: Sender,
    pub timestamp: i64,
    pub content: Value,
}

impl From<RawMessageInfo> for MessageInfo {
    fn from(raw: RawMessageInfo) -> Self {
        Self {
            message_id: raw.message_id,
            real_id: raw.real_id,
            message_type: raw.message_type,
            sender: raw.sender,
            timestamp: raw.time,
            content: raw.message,
        }
    }
}

// =============================================================================
// Credentials & Files
// =============================================================================

/// Cookies plus CSRF token.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Credentials {
    pub cookies: String,
    pub csrf_token: i64,
}

/// Output formats accepted by `get_record`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordFormat {
    Mp3,
    Amr,
    Wma,
    M4a,
    Spx,
    Ogg,
    Wav,
    Flac,
}

/// Result of `get_record`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordInfo {
    /// Path of the converted file.
    pub file: String,
}

/// Result of `get_image`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageInfo {
    /// Path of the downloaded file.
    pub file: String,
    pub size: Option<i64>,
    pub filename: Option<String>,
    pub url: Option<String>,
}

/// Data directories that `clean_data_dir` may wipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataDirectory {
    Image,
    Record,
    Show,
    Bface,
}

// =============================================================================
// System
// =============================================================================

/// Result of `get_status`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatusInfo {
    /// Whether the implementation considers itself healthy.
    pub good: bool,
    /// Whether the account is online.
    pub online: bool,
    /// Whether the app plugin is initialized.
    pub app_initialized: Option<bool>,
    pub app_enabled: Option<bool>,
    pub app_good: Option<bool>,
}

/// Result of `get_version_info`.
///
/// CoolQ-era plugins fill the `coolq_*`/`plugin_*` fields; go-cqhttp sets
/// `go_cqhttp` and `version` instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VersionInfo {
    pub coolq_directory: Option<String>,
    pub coolq_edition: Option<String>,
    pub plugin_version: Option<String>,
    pub plugin_build_number: Option<i64>,
    pub plugin_build_configuration: Option<String>,
    pub version: Option<String>,
    pub go_cqhttp: bool,
    pub runtime_version: Option<String>,
    pub runtime_os: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::to_domain_case;
    use serde_json::json;

    #[test]
    fn test_member_info_from_domain_payload() {
        let wire = json!({
            "group_id": 100,
            "user_id": 7,
            "nickname": "nick",
            "card": "",
            "join_time": 1600000000,
            "title_expire_time": -1,
            "card_changeable": true,
        });
        let info: GroupMemberInfo = serde_json::from_value(to_domain_case(&wire)).unwrap();
        assert_eq!(info.group_id, 100);
        assert_eq!(info.user_id, 7);
        assert_eq!(info.join_time, 1600000000);
        assert_eq!(info.title_expire_time, -1);
        assert!(info.card_changeable);
        assert!(info.card.is_empty());
    }

    #[test]
    fn test_honor_info_from_domain_payload() {
        let wire = json!({
            "group_id": 1,
            "current_talkative": { "user_id": 2, "nickname": "a", "avatar": "u", "day_count": 3 },
            "strong_newbie_list": [
                { "user_id": 4, "nickname": "b", "avatar": "v", "description": "d" },
            ],
        });
        let honor: HonorInfo = serde_json::from_value(to_domain_case(&wire)).unwrap();
        assert_eq!(honor.current_talkative.unwrap().day_count, 3);
        assert_eq!(honor.strong_newbie_list.len(), 1);
        assert!(honor.legend_list.is_empty());
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(serde_json::to_value(HonorType::StrongNewbie).unwrap(), json!("strong_newbie"));
        assert_eq!(serde_json::to_value(RecordFormat::M4a).unwrap(), json!("m4a"));
        assert_eq!(serde_json::to_value(DataDirectory::Bface).unwrap(), json!("bface"));
    }

    #[test]
    fn test_message_info_renames_fields() {
        let raw = RawMessageInfo {
            message_id: 5,
            time: 1234,
            message: json!("hello"),
            ..Default::default()
        };
        let info = MessageInfo::from(raw);
        assert_eq!(info.timestamp, 1234);
        assert_eq!(info.content, json!("hello"));
        assert_eq!(info.message_id, 5);
    }
}
