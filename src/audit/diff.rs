//! Diff generation for audit logging
//!
//! Compares the before/after JSON snapshots of an entity and describes the
//! changed fields, descending into nested objects such as a card's ledgers.

use serde_json::{Map, Value};

/// Fields that change on every write and carry no information
const IGNORED_KEYS: &[&str] = &["updated_at"];

/// Generate a human-readable diff between two JSON values
///
/// Returns `None` when nothing but ignored fields changed.
pub fn generate_diff(before: &Value, after: &Value) -> Option<String> {
    let changes = collect_changes(before, after, "");
    if changes.is_empty() {
        None
    } else {
        Some(changes.join(", "))
    }
}

fn collect_changes(before: &Value, after: &Value, prefix: &str) -> Vec<String> {
    match (before, after) {
        (Value::Object(before_obj), Value::Object(after_obj)) => {
            object_changes(before_obj, after_obj, prefix)
        }
        _ if before != after => vec![format!(
            "{}{} -> {}",
            label(prefix),
            format_value(before),
            format_value(after)
        )],
        _ => Vec::new(),
    }
}

fn object_changes(
    before: &Map<String, Value>,
    after: &Map<String, Value>,
    prefix: &str,
) -> Vec<String> {
    let mut changes = Vec::new();

    for (key, before_val) in before {
        if IGNORED_KEYS.contains(&key.as_str()) {
            continue;
        }
        let path = join(prefix, key);
        match after.get(key) {
            Some(after_val) => changes.extend(collect_changes(before_val, after_val, &path)),
            None => changes.push(format!("{}: {} -> (removed)", path, format_value(before_val))),
        }
    }

    for (key, after_val) in after {
        if !before.contains_key(key) && !IGNORED_KEYS.contains(&key.as_str()) {
            changes.push(format!(
                "{}: (added) -> {}",
                join(prefix, key),
                format_value(after_val)
            ));
        }
    }

    changes
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

fn label(prefix: &str) -> String {
    if prefix.is_empty() {
        String::new()
    } else {
        format!("{}: ", prefix)
    }
}

/// Format a JSON value for human-readable display
fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) if s.chars().count() > 50 => {
            let head: String = s.chars().take(47).collect();
            format!("\"{}...\"", head)
        }
        Value::String(s) => format!("\"{}\"", s),
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} fields}}", obj.len()),
    }
}
