//! Initial form values from field definitions and an existing record

use serde_json::{Map, Value};

use super::FormValues;
use crate::resource::{FieldDefinition, FieldType};

/// Compute the initial value of every field.
///
/// Precedence per field:
/// 1. multi relationship pickers with a `relationship_key` project the `id`s
///    of the nested array on the record (`[]` when absent or not an array)
/// 2. the record's own value for the key
/// 3. the declared default value
/// 4. `false` for toggles and checkboxes
/// 5. an empty string
pub fn build_defaults(fields: &[FieldDefinition], record: &Map<String, Value>) -> FormValues {
    let mut values = FormValues::new();
    for field in fields {
        values.insert(field.key.clone(), default_for(field, record));
    }
    values
}

fn default_for(field: &FieldDefinition, record: &Map<String, Value>) -> Value {
    if field.field_type == FieldType::MultiRelationshipSelect {
        if let Some(relationship) = &field.relationship_key {
            return project_ids(record.get(relationship));
        }
    }
    if let Some(value) = record.get(&field.key) {
        return value.clone();
    }
    if let Some(default) = &field.default_value {
        return default.clone();
    }
    if field.field_type.is_boolean() {
        return Value::Bool(false);
    }
    Value::String(String::new())
}

fn project_ids(related: Option<&Value>) -> Value {
    match related {
        Some(Value::Array(items)) => Value::Array(
            items
                .iter()
                .filter_map(|item| item.get("id").cloned())
                .collect(),
        ),
        _ => Value::Array(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_record_value_beats_declared_default() {
        let fields = vec![
            FieldDefinition::new("role", "Role", FieldType::Select).default_value("USER"),
            FieldDefinition::new("color", "Color", FieldType::Text).default_value("#ffffff"),
        ];
        let values = build_defaults(&fields, &record(json!({"role": "ADMIN"})));
        assert_eq!(values["role"], json!("ADMIN"));
        assert_eq!(values["color"], json!("#ffffff"));
    }

    #[test]
    fn test_multi_relationship_projects_ids() {
        let fields = vec![
            FieldDefinition::new("label_ids", "Labels", FieldType::MultiRelationshipSelect)
                .relationship_key("labels"),
        ];
        let existing = record(json!({
            "label_ids": [9],
            "labels": [{"id": 1, "name": "a"}, {"id": 3, "name": "b"}]
        }));
        assert_eq!(build_defaults(&fields, &existing)["label_ids"], json!([1, 3]));

        let missing = build_defaults(&fields, &record(json!({"label_ids": [9]})));
        assert_eq!(missing["label_ids"], json!([]));

        let not_array = build_defaults(&fields, &record(json!({"labels": "oops"})));
        assert_eq!(not_array["label_ids"], json!([]));
    }

    #[test]
    fn test_fallbacks_for_empty_record() {
        let fields = vec![
            FieldDefinition::new("active", "Active", FieldType::Toggle),
            FieldDefinition::new("agree", "Agree", FieldType::Checkbox),
            FieldDefinition::new("title", "Title", FieldType::Text),
            FieldDefinition::new("published", "Published", FieldType::Toggle).default_value(true),
        ];
        let values = build_defaults(&fields, &Map::new());
        assert_eq!(values["active"], json!(false));
        assert_eq!(values["agree"], json!(false));
        assert_eq!(values["title"], json!(""));
        assert_eq!(values["published"], json!(true));
    }

    #[test]
    fn test_record_null_is_kept_verbatim() {
        let fields = vec![FieldDefinition::new("title", "Title", FieldType::Text).default_value("x")];
        let values = build_defaults(&fields, &record(json!({"title": null})));
        assert_eq!(values["title"], Value::Null);
    }
}
