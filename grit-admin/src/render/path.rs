//! Dot-path lookup into JSON records

use serde_json::Value;

/// Resolve a dot-separated key against a record.
///
/// `"author.name"` reads `record["author"]["name"]`; numeric segments index
/// into arrays (`"tags.0"`). Falls back to a case-insensitive key match per
/// segment. Returns `None` when any segment is missing.
pub fn resolve_path<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }

    let mut current = record;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => match map.get(segment) {
                Some(value) => value,
                None => find_case_insensitive(current, segment)?,
            },
            Value::Array(items) => {
                let index: usize = segment.parse().ok()?;
                items.get(index)?
            }
            _ => return None,
        };
    }
    Some(current)
}

/// Find a key in a JSON object using case-insensitive matching
fn find_case_insensitive<'a>(obj: &'a Value, key: &str) -> Option<&'a Value> {
    let obj = obj.as_object()?;
    let key_lower = key.to_lowercase();
    obj.iter()
        .find(|(k, _)| k.to_lowercase() == key_lower)
        .map(|(_, v)| v)
}

/// Numeric id of a record, accepting numbers and numeric strings
pub fn record_id(record: &Value) -> Option<i64> {
    match record.get("id")? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolve_simple_and_nested() {
        let record = json!({"title": "X", "author": {"name": "Ada"}, "tags": [{"id": 4}]});
        assert_eq!(resolve_path(&record, "title"), Some(&json!("X")));
        assert_eq!(resolve_path(&record, "author.name"), Some(&json!("Ada")));
        assert_eq!(resolve_path(&record, "tags.0.id"), Some(&json!(4)));
        assert_eq!(resolve_path(&record, "author.email"), None);
        assert_eq!(resolve_path(&record, "title.length"), None);
    }

    #[test]
    fn test_case_insensitive_fallback() {
        let record = json!({"CreatedAt": "2024-01-01"});
        assert_eq!(resolve_path(&record, "createdat"), Some(&json!("2024-01-01")));
    }

    #[test]
    fn test_record_id() {
        assert_eq!(record_id(&json!({"id": 7})), Some(7));
        assert_eq!(record_id(&json!({"id": "12"})), Some(12));
        assert_eq!(record_id(&json!({"name": "x"})), None);
    }
}
