//! Declarative action table.
//!
//! Around thirty CQHTTP actions differ only in their wire name, their
//! parameter list, whether they are awaited or fire-and-forget, and whether
//! one field is picked out of the payload. They are declared once in the
//! `define_methods!` table below, which produces:
//!
//! - [`METHOD_TABLE`], one [`MethodDescriptor`] per action;
//! - a typed `async fn` on [`CqBot`] per action, plus an `_async` twin for
//!   every fire-and-forget action;
//!
//! and every generated method runs through one of three shared code paths.
//! [`CqBot::call_method`] reaches the same paths by operation name, for
//! callers that only have a name and a list of JSON arguments.
//!
//! Positional arguments are zipped with the declared parameter names. A
//! `None` (or any `null`) argument is left out of the request, so trailing
//! optional parameters simply fall back to the server-side default.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::trace;

use crate::bot::CqBot;
use crate::case::camel_case;
use crate::error::{ApiError, ApiResult};
use crate::model::{
    AccountInfo, Credentials, DataDirectory, FriendInfo, GroupInfo, GroupMemberInfo, GroupNotice,
    HonorInfo, HonorType, ImageInfo, ListedGroupInfo, RawMessageInfo, RecordFormat, RecordInfo,
    StatusInfo, StrangerInfo, VersionInfo, VipInfo,
};

// =============================================================================
// Descriptors
// =============================================================================

/// How a generated operation treats the action's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    /// Returns the payload.
    Awaited,
    /// Discards the payload; also has an `_async` operation.
    FireAndForget,
    /// Returns one named field of the payload.
    Extracting(&'static str),
}

/// One declared action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodDescriptor {
    /// Wire action name, possibly with a leading `_` for experimental actions.
    pub wire_name: &'static str,
    /// Wire parameter names, in positional order.
    pub params: &'static [&'static str],
    pub kind: MethodKind,
}

impl MethodDescriptor {
    /// The camelCase operation name, e.g. `getVipInfo` for `_get_vip_info`.
    pub fn operation_name(&self) -> String {
        let name = self.wire_name.strip_prefix('_').unwrap_or(self.wire_name);
        camel_case(name)
    }

    /// The `...Async` operation name for fire-and-forget actions.
    pub fn async_operation_name(&self) -> Option<String> {
        match self.kind {
            MethodKind::FireAndForget => Some(format!("{}Async", self.operation_name())),
            _ => None,
        }
    }

    /// Zips positional arguments with the parameter names, producing a
    /// domain-cased parameter object.
    ///
    /// Missing and `null` arguments become absent fields; surplus arguments
    /// are ignored.
    pub fn bind(&self, args: Vec<Value>) -> Value {
        let params = self
            .params
            .iter()
            .zip(args)
            .filter(|(_, value)| !value.is_null())
            .map(|(name, value)| (camel_case(name), value))
            .collect::<Map<String, Value>>();
        Value::Object(params)
    }
}

/// Which of a descriptor's operations a name resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodVariant {
    Primary,
    /// The `...Async` operation of a fire-and-forget action.
    Async,
}

/// Name → descriptor index over [`METHOD_TABLE`].
pub struct MethodTable {
    by_name: HashMap<String, (&'static MethodDescriptor, MethodVariant)>,
}

impl MethodTable {
    fn build(descriptors: &'static [MethodDescriptor]) -> Self {
        let mut by_name = HashMap::with_capacity(descriptors.len() * 2);
        for descriptor in descriptors {
            by_name.insert(descriptor.operation_name(), (descriptor, MethodVariant::Primary));
            if let Some(name) = descriptor.async_operation_name() {
                by_name.insert(name, (descriptor, MethodVariant::Async));
            }
        }
        Self { by_name }
    }

    /// The process-wide table, built on first use.
    pub fn global() -> &'static MethodTable {
        static TABLE: OnceLock<MethodTable> = OnceLock::new();
        TABLE.get_or_init(|| MethodTable::build(METHOD_TABLE))
    }

    /// Resolves a camelCase operation name.
    pub fn lookup(&self, operation: &str) -> Option<(&'static MethodDescriptor, MethodVariant)> {
        self.by_name.get(operation).copied()
    }

    /// All operation names, unordered.
    pub fn operation_names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

// =============================================================================
// Shared code paths
// =============================================================================

fn to_arg<T: Serialize>(value: T) -> ApiResult<Value> {
    Ok(serde_json::to_value(value)?)
}

fn decode<T: DeserializeOwned>(action: &str, payload: Option<Value>) -> ApiResult<T> {
    match payload {
        Some(value) => Ok(serde_json::from_value(value)?),
        // Unit and `Option` results accept an empty payload.
        None => serde_json::from_value(Value::Null).map_err(|_| ApiError::MissingData {
            action: action.to_string(),
        }),
    }
}

fn extract_field(
    descriptor: &MethodDescriptor,
    field: &str,
    payload: Option<Value>,
) -> ApiResult<Value> {
    payload
        .and_then(|mut data| data.get_mut(camel_case(field).as_str()).map(Value::take))
        .ok_or_else(|| ApiError::MissingData {
            action: descriptor.wire_name.to_string(),
        })
}

impl CqBot {
    async fn call_awaited<T: DeserializeOwned>(
        &self,
        descriptor: &MethodDescriptor,
        args: Vec<Value>,
    ) -> ApiResult<T> {
        let payload = self
            .invoke(descriptor.wire_name, descriptor.bind(args), false)
            .await?;
        decode(descriptor.wire_name, payload)
    }

    async fn call_fire_and_forget(
        &self,
        descriptor: &MethodDescriptor,
        args: Vec<Value>,
        variant: MethodVariant,
    ) -> ApiResult<()> {
        let params = descriptor.bind(args);
        match variant {
            MethodVariant::Primary => {
                self.invoke(descriptor.wire_name, params, false).await?;
                Ok(())
            }
            MethodVariant::Async => self.invoke_async(descriptor.wire_name, params).await,
        }
    }

    async fn call_extracting<T: DeserializeOwned>(
        &self,
        descriptor: &MethodDescriptor,
        field: &str,
        args: Vec<Value>,
    ) -> ApiResult<T> {
        let payload = self
            .invoke(descriptor.wire_name, descriptor.bind(args), false)
            .await?;
        Ok(serde_json::from_value(extract_field(descriptor, field, payload)?)?)
    }

    /// Calls a generated operation by its camelCase name.
    ///
    /// Awaited operations return the payload, extracting operations the
    /// selected field, and fire-and-forget operations (both forms) `None`.
    pub async fn call_method(&self, operation: &str, args: Vec<Value>) -> ApiResult<Option<Value>> {
        let (descriptor, variant) = MethodTable::global()
            .lookup(operation)
            .ok_or_else(|| ApiError::UnknownMethod(operation.to_string()))?;
        trace!(operation = %operation, action = %descriptor.wire_name, "Dispatching by name");

        match descriptor.kind {
            MethodKind::Awaited => {
                self.invoke(descriptor.wire_name, descriptor.bind(args), false)
                    .await
            }
            MethodKind::FireAndForget => {
                self.call_fire_and_forget(descriptor, args, variant).await?;
                Ok(None)
            }
            MethodKind::Extracting(field) => {
                let payload = self
                    .invoke(descriptor.wire_name, descriptor.bind(args), false)
                    .await?;
                extract_field(descriptor, field, payload).map(Some)
            }
        }
    }
}

// =============================================================================
// Table
// =============================================================================

/// Declares actions.
///
/// ```text
/// awaited "get_msg" => get_msg (message_id: i64) -> RawMessageInfo;
/// fire    "delete_msg" => delete_msg / delete_msg_async (message_id: i64);
/// extract "get_cookies" => get_cookies (domain: Option<&str>) -> String ["cookies"];
/// ```
///
/// A parameter whose wire name is not a valid Rust identifier is written as
/// `rust_name as "wire_name": Type`.
macro_rules! define_methods {
    (@param $arg:ident $wire_arg:literal) => { $wire_arg };
    (@param $arg:ident) => { stringify!($arg) };

    (@descriptor awaited $wire:literal, [$($param:expr),*]) => {
        MethodDescriptor {
            wire_name: $wire,
            params: &[$($param),*],
            kind: MethodKind::Awaited,
        }
    };
    (@descriptor fire $wire:literal, [$($param:expr),*]) => {
        MethodDescriptor {
            wire_name: $wire,
            params: &[$($param),*],
            kind: MethodKind::FireAndForget,
        }
    };
    (@descriptor extract $wire:literal, [$($param:expr),*], $field:literal) => {
        MethodDescriptor {
            wire_name: $wire,
            params: &[$($param),*],
            kind: MethodKind::Extracting($field),
        }
    };

    (@method awaited $desc:expr, [$(#[$meta:meta])*]
        $name:ident ($($arg:ident: $ty:ty),*) -> $ret:ty) => {
        $(#[$meta])*
        pub async fn $name(&self, $($arg: $ty),*) -> ApiResult<$ret> {
            const DESCRIPTOR: MethodDescriptor = $desc;
            self.call_awaited(&DESCRIPTOR, vec![$(to_arg($arg)?),*]).await
        }
    };
    (@method fire $desc:expr, [$(#[$meta:meta])*]
        $name:ident / $async_name:ident ($($arg:ident: $ty:ty),*)) => {
        $(#[$meta])*
        pub async fn $name(&self, $($arg: $ty),*) -> ApiResult<()> {
            const DESCRIPTOR: MethodDescriptor = $desc;
            self.call_fire_and_forget(&DESCRIPTOR, vec![$(to_arg($arg)?),*], MethodVariant::Primary)
                .await
        }

        #[doc = concat!("Fire-and-forget form of [`Self::", stringify!($name), "`].")]
        pub async fn $async_name(&self, $($arg: $ty),*) -> ApiResult<()> {
            const DESCRIPTOR: MethodDescriptor = $desc;
            self.call_fire_and_forget(&DESCRIPTOR, vec![$(to_arg($arg)?),*], MethodVariant::Async)
                .await
        }
    };
    (@method extract $desc:expr, [$(#[$meta:meta])*]
        $name:ident ($($arg:ident: $ty:ty),*) -> $ret:ty [$field:literal]) => {
        $(#[$meta])*
        pub async fn $name(&self, $($arg: $ty),*) -> ApiResult<$ret> {
            const DESCRIPTOR: MethodDescriptor = $desc;
            self.call_extracting(&DESCRIPTOR, $field, vec![$(to_arg($arg)?),*]).await
        }
    };

    ($(
        $(#[$meta:meta])*
        $kind:ident $wire:literal => $name:ident $(/ $async_name:ident)?
            ($($arg:ident $(as $wire_arg:literal)?: $ty:ty),* $(,)?)
            $(-> $ret:ty)? $([$field:literal])?;
    )*) => {
        /// Every declared action, in declaration order.
        pub static METHOD_TABLE: &[MethodDescriptor] = &[
            $(
                define_methods!(@descriptor $kind $wire,
                    [$(define_methods!(@param $arg $($wire_arg)?)),*] $(, $field)?),
            )*
        ];

        impl CqBot {
            $(
                define_methods!(@method $kind
                    define_methods!(@descriptor $kind $wire,
                        [$(define_methods!(@param $arg $($wire_arg)?)),*] $(, $field)?),
                    [$(#[$meta])*] $name $(/ $async_name)?
                    ($($arg: $ty),*) $(-> $ret)? $([$field])?);
            )*
        }
    };
}

define_methods! {
    // =========================================================================
    // Messages
    // =========================================================================

    /// Recalls a message.
    fire "delete_msg" => delete_msg / delete_msg_async (message_id: i64);

    /// Sends profile likes to a user (`times` defaults to 1 on the server).
    fire "send_like" => send_like / send_like_async (user_id: &str, times: Option<u32>);

    /// Gets a message by id, with its original field names.
    ///
    /// See [`CqBot::get_message`] for the renamed form.
    awaited "get_msg" => get_msg (message_id: i64) -> RawMessageInfo;

    // =========================================================================
    // Moderation
    // =========================================================================

    /// Removes a member from a group.
    fire "set_group_kick" => set_group_kick / set_group_kick_async
        (group_id: &str, user_id: &str, reject_add_request: Option<bool>);

    /// Mutes a member for `duration` seconds (0 lifts the mute).
    fire "set_group_ban" => set_group_ban / set_group_ban_async
        (group_id: &str, user_id: &str, duration: Option<u64>);

    fire "set_group_whole_ban" => set_group_whole_ban / set_group_whole_ban_async
        (group_id: &str, enable: Option<bool>);

    fire "set_group_admin" => set_group_admin / set_group_admin_async
        (group_id: &str, user_id: &str, enable: Option<bool>);

    fire "set_group_anonymous" => set_group_anonymous / set_group_anonymous_async
        (group_id: &str, enable: Option<bool>);

    /// Sets a member's group card; an empty or missing card clears it.
    fire "set_group_card" => set_group_card / set_group_card_async
        (group_id: &str, user_id: &str, card: Option<&str>);

    /// Leaves a group, or dismisses it when the bot is the owner.
    fire "set_group_leave" => set_group_leave / set_group_leave_async
        (group_id: &str, is_dismiss: Option<bool>);

    fire "set_group_special_title" => set_group_special_title / set_group_special_title_async
        (group_id: &str, user_id: &str, special_title: Option<&str>, duration: Option<i64>);

    fire "set_group_name" => set_group_name / set_group_name_async
        (group_id: &str, group_name: &str);

    fire "set_group_portrait" => set_group_portrait / set_group_portrait_async
        (group_id: &str, file: &str, cache: Option<bool>);

    /// Posts a group notice (experimental action).
    fire "_send_group_notice" => send_group_notice / send_group_notice_async
        (group_id: &str, title: &str, content: &str);

    // =========================================================================
    // Lookups
    // =========================================================================

    awaited "get_login_info" => get_login_info () -> AccountInfo;

    awaited "get_stranger_info" => get_stranger_info
        (user_id: &str, no_cache: Option<bool>) -> StrangerInfo;

    awaited "get_friend_list" => get_friend_list () -> Vec<FriendInfo>;

    awaited "get_group_list" => get_group_list () -> Vec<ListedGroupInfo>;

    awaited "get_group_info" => get_group_info
        (group_id: &str, no_cache: Option<bool>) -> GroupInfo;

    awaited "get_group_member_info" => get_group_member_info
        (group_id: &str, user_id: &str, no_cache: Option<bool>) -> GroupMemberInfo;

    awaited "get_group_member_list" => get_group_member_list
        (group_id: &str) -> Vec<GroupMemberInfo>;

    awaited "get_group_honor_info" => get_group_honor_info
        (group_id: &str, honor_type as "type": HonorType) -> HonorInfo;

    /// Gets VIP information of the bot account (experimental action).
    awaited "_get_vip_info" => get_vip_info () -> VipInfo;

    /// Lists group notices (experimental action).
    awaited "_get_group_notice" => get_group_notice (group_id: &str) -> Vec<GroupNotice>;

    // =========================================================================
    // Credentials & Files
    // =========================================================================

    extract "get_cookies" => get_cookies (domain: Option<&str>) -> String ["cookies"];

    extract "get_csrf_token" => get_csrf_token () -> i64 ["token"];

    awaited "get_credentials" => get_credentials (domain: Option<&str>) -> Credentials;

    /// Converts a received voice file to `out_format`.
    awaited "get_record" => get_record
        (file: &str, out_format: RecordFormat, full_path: Option<bool>) -> RecordInfo;

    awaited "get_image" => get_image (file: &str) -> ImageInfo;

    extract "can_send_image" => can_send_image () -> bool ["yes"];

    extract "can_send_record" => can_send_record () -> bool ["yes"];

    // =========================================================================
    // Host
    // =========================================================================

    /// Raw status of the implementation; see [`CqBot::status`].
    awaited "get_status" => get_status () -> StatusInfo;

    awaited "get_version_info" => get_version_info () -> VersionInfo;

    /// Restarts the HTTP API plugin after `delay` milliseconds.
    awaited "set_restart_plugin" => set_restart_plugin (delay: Option<u64>) -> Value;

    /// Restarts the host (experimental action).
    awaited "_set_restart" => set_restart
        (clean_log: Option<bool>, clean_cache: Option<bool>, clean_event: Option<bool>) -> Value;

    fire "clean_data_dir" => clean_data_dir / clean_data_dir_async (data_dir: DataDirectory);

    fire "clean_plugin_log" => clean_plugin_log / clean_plugin_log_async ();
}
