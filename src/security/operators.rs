//! Query-operator key stripping.
//!
//! Document stores interpret keys such as `$where`, `$gt` or `a.b` as
//! operators or paths. Request bodies must never carry them through to a
//! query, so they are removed at every nesting level before dispatch.

use serde_json::Value;

/// True for keys a document store would treat as an operator or a path.
pub fn is_operator_key(key: &str) -> bool {
    key.starts_with('$') || key.contains('.')
}

/// Remove operator keys from every object in `value`.
///
/// Returns the number of keys removed.
pub fn strip_operator_keys(value: &mut Value) -> usize {
    match value {
        Value::Object(map) => {
            let before = map.len();
            map.retain(|key, _| !is_operator_key(key));
            let removed = before - map.len();
            removed + map.values_mut().map(strip_operator_keys).sum::<usize>()
        }
        Value::Array(items) => items.iter_mut().map(strip_operator_keys).sum(),
        _ => 0,
    }
}
