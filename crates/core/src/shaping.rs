//! Response shaping for API payloads
//!
//! Pure transformations applied to already-parsed JSON values before they are handed
//! back to a caller:
//!
//! - [`compact`] strips heavy content (long text bodies, inline binary avatars) and
//!   collapses embedded user objects to `{id, full_name}`.
//! - [`select_fields`] projects objects down to a caller-chosen set of keys.
//!
//! Callers that use both always run [`compact`] first, then [`select_fields`];
//! [`shape`] does exactly that.

use serde_json::{Map, Value};

/// Fields dropped entirely when compacting: long-form text bodies.
pub const HEAVY_FIELDS: &[&str] = &["description", "html_description", "content"];

/// Image fields dropped when compacting, but only when they embed binary data.
pub const IMAGE_FIELDS: &[&str] = &["avatar_url", "avatar_initials_url", "cover_image_url"];

/// Fields holding a single user object, reduced to `{id, full_name}`.
pub const USER_FIELDS: &[&str] = &["owner", "author", "creator", "user", "updater", "responsible"];

/// Fields holding a list of user objects, each reduced to `{id, full_name}`.
pub const USER_LIST_FIELDS: &[&str] = &["members", "responsibles", "participants", "watchers"];

/// Prefix identifying a self-contained binary payload (`data:image/png;base64,...`).
pub const DATA_URI_PREFIX: &str = "data:";

pub fn is_heavy_field(name: &str) -> bool {
    HEAVY_FIELDS.contains(&name)
}

pub fn is_image_field(name: &str) -> bool {
    IMAGE_FIELDS.contains(&name)
}

pub fn is_user_field(name: &str) -> bool {
    USER_FIELDS.contains(&name)
}

pub fn is_user_list_field(name: &str) -> bool {
    USER_LIST_FIELDS.contains(&name)
}

/// Compact a JSON value.
///
/// When `enabled` is false the value is returned untouched. Otherwise objects are
/// walked recursively:
///
/// - keys in [`HEAVY_FIELDS`] are removed
/// - keys in [`IMAGE_FIELDS`] are removed when their value is a `data:` URI; regular
///   URLs are kept
/// - keys in [`USER_FIELDS`] holding an object are replaced by the minimal user
///   projection (see [`simplify_user`])
/// - keys in [`USER_LIST_FIELDS`] holding an array get the same projection per element
/// - everything else is recursed into with its shape preserved
pub fn compact(value: Value, enabled: bool) -> Value {
    if !enabled {
        return value;
    }
    compact_value(value)
}

fn compact_value(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(compact_object(map)),
        Value::Array(items) => Value::Array(items.into_iter().map(compact_value).collect()),
        other => other,
    }
}

fn compact_object(map: Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::with_capacity(map.len());

    for (key, value) in map {
        if is_heavy_field(&key) {
            continue;
        }

        if is_image_field(&key) && is_data_uri(&value) {
            continue;
        }

        let value = match value {
            Value::Object(user) if is_user_field(&key) => simplify_user(user),
            Value::Array(users) if is_user_list_field(&key) => Value::Array(
                users
                    .into_iter()
                    .map(|item| match item {
                        Value::Object(user) => simplify_user(user),
                        other => other,
                    })
                    .collect(),
            ),
            other => compact_value(other),
        };

        out.insert(key, value);
    }

    out
}

fn is_data_uri(value: &Value) -> bool {
    value
        .as_str()
        .is_some_and(|s| s.starts_with(DATA_URI_PREFIX))
}

/// Reduce an embedded user object to `{id, full_name}`.
///
/// `full_name` falls back to `username`. When the object has neither an `id` nor a
/// usable name it is returned unchanged.
pub fn simplify_user(user: Map<String, Value>) -> Value {
    let id = user.get("id").filter(|v| !v.is_null()).cloned();
    let name = user
        .get("full_name")
        .filter(|v| !v.is_null())
        .or_else(|| user.get("username").filter(|v| !v.is_null()))
        .cloned();

    if id.is_none() && name.is_none() {
        return Value::Object(user);
    }

    let mut out = Map::new();
    if let Some(id) = id {
        out.insert("id".to_string(), id);
    }
    if let Some(name) = name {
        out.insert("full_name".to_string(), name);
    }
    Value::Object(out)
}

/// Parse a comma-separated field list (`"id, title,,state"`) into trimmed names.
pub fn parse_fields(fields: &str) -> Vec<String> {
    fields
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect()
}

/// Keep only the named keys.
///
/// `fields` is a comma-separated list; `None` or an empty list is the identity.
/// Arrays keep only their object elements, each projected; a lone object is
/// projected; any other value is returned as is.
pub fn select_fields(value: Value, fields: Option<&str>) -> Value {
    let wanted = match fields {
        Some(fields) => parse_fields(fields),
        None => return value,
    };
    if wanted.is_empty() {
        return value;
    }

    match value {
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(map) => Some(Value::Object(project(map, &wanted))),
                    _ => None,
                })
                .collect(),
        ),
        Value::Object(map) => Value::Object(project(map, &wanted)),
        other => other,
    }
}

fn project(mut map: Map<String, Value>, wanted: &[String]) -> Map<String, Value> {
    let mut out = Map::new();
    for name in wanted {
        if let Some(v) = map.remove(name) {
            out.insert(name.clone(), v);
        }
    }
    out
}

/// Compact, then select fields.
pub fn shape(value: Value, compact_enabled: bool, fields: Option<&str>) -> Value {
    select_fields(compact(value, compact_enabled), fields)
}
