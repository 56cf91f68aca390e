//! Key-case conversion between the wire protocol and the domain layer.
//!
//! CQHTTP speaks `snake_case` on the wire, while every value handed to or
//! returned from [`CqBot`](crate::CqBot) uses `camelCase` keys. The two
//! recursive walkers in this module are applied at the invoker boundary, so
//! no mixed-case object ever crosses it.
//!
//! ```rust
//! use cqhttp::case::{to_domain_case, to_wire_case};
//! use serde_json::json;
//!
//! let wire = to_wire_case(&json!({ "groupId": "1", "autoEscape": false }));
//! assert_eq!(wire, json!({ "group_id": "1", "auto_escape": false }));
//! assert_eq!(to_domain_case(&wire), json!({ "groupId": "1", "autoEscape": false }));
//! ```

use serde_json::{Map, Value};

/// Converts a `snake_case` or `kebab-case` identifier to `camelCase`.
///
/// Only a separator followed by a lowercase ASCII letter is folded; any
/// other separator is kept as-is.
pub fn camel_case(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        if (c == '_' || c == '-')
            && let Some(&next) = chars.peek()
            && next.is_ascii_lowercase()
        {
            out.push(next.to_ascii_uppercase());
            chars.next();
        } else {
            out.push(c);
        }
    }
    out
}

/// Converts a `camelCase` identifier to `snake_case`.
///
/// The first character is lowercased without a separator, dashes become
/// underscores and every later uppercase ASCII letter gets a `_` prefix.
pub fn snake_case(source: &str) -> String {
    let mut out = String::with_capacity(source.len() + 4);
    for (index, c) in source.chars().enumerate() {
        match c {
            '-' => out.push('_'),
            c if c.is_ascii_uppercase() => {
                if index > 0 {
                    out.push('_');
                }
                out.push(c.to_ascii_lowercase());
            }
            c => out.push(c),
        }
    }
    out
}

/// Returns a copy of `value` with every object key converted to `snake_case`.
pub fn to_wire_case(value: &Value) -> Value {
    convert_keys(value, snake_case)
}

/// Returns a copy of `value` with every object key converted to `camelCase`.
pub fn to_domain_case(value: &Value) -> Value {
    convert_keys(value, camel_case)
}

fn convert_keys(value: &Value, convert: fn(&str) -> String) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, inner)| (convert(key), convert_keys(inner, convert)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => {
            Value::Array(items.iter().map(|item| convert_keys(item, convert)).collect())
        }
        scalar => scalar.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("group_id"), "groupId");
        assert_eq!(camel_case("strong_newbie_list"), "strongNewbieList");
        assert_eq!(camel_case("data-dir"), "dataDir");
        assert_eq!(camel_case("already"), "already");
        // Separators not followed by a lowercase letter are kept.
        assert_eq!(camel_case("value_1"), "value_1");
        assert_eq!(camel_case("trailing_"), "trailing_");
    }

    #[test]
    fn test_snake_case() {
        assert_eq!(snake_case("groupId"), "group_id");
        assert_eq!(snake_case("rejectAddRequest"), "reject_add_request");
        assert_eq!(snake_case("GroupId"), "group_id");
        assert_eq!(snake_case("user_id"), "user_id");
        assert_eq!(snake_case("data-dir"), "data_dir");
    }

    #[test]
    fn test_nested_conversion() {
        let wire = json!({
            "message_id": 1,
            "sender": { "user_id": 2, "nickname": "foo_bar" },
            "talkative_list": [{ "day_count": 3 }, "plain_string", null],
        });

        let domain = to_domain_case(&wire);
        assert_eq!(
            domain,
            json!({
                "messageId": 1,
                "sender": { "userId": 2, "nickname": "foo_bar" },
                "talkativeList": [{ "dayCount": 3 }, "plain_string", null],
            })
        );

        // Input is left untouched.
        assert!(wire.get("message_id").is_some());
    }

    #[test]
    fn test_round_trip() {
        let params = json!({
            "groupId": "123",
            "autoEscape": false,
            "nested": {
                "specialTitle": "x",
                "list": [{ "noCache": true }, [1, 2, { "outFormat": "mp3" }]],
            },
            "empty": {},
            "nothing": null,
        });
        assert_eq!(to_domain_case(&to_wire_case(&params)), params);
    }

    #[test]
    fn test_scalars_pass_through() {
        assert_eq!(to_wire_case(&Value::Null), Value::Null);
        assert_eq!(to_domain_case(&json!("some_text")), json!("some_text"));
        assert_eq!(to_domain_case(&json!(42)), json!(42));
        assert_eq!(to_wire_case(&json!([true, "aB"])), json!([true, "aB"]));
    }
}
