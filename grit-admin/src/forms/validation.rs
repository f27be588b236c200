//! Client-side field validation
//!
//! Errors are per-field values shown under the input. They block submission
//! and never leave the form.

use serde_json::Value;
use std::collections::BTreeMap;

use super::FormValues;
use crate::render::format::{as_number, plain_number};
use crate::resource::{FieldDefinition, FieldType};

/// Field key to error message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<String, String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.errors.insert(key.into(), message.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.errors.get(key).map(String::as_str)
    }

    pub fn remove(&mut self, key: &str) {
        self.errors.remove(key);
    }

    /// Replace the errors of `keys` with those found in `other`
    pub fn merge_for(&mut self, keys: &[&str], other: FieldErrors) {
        for key in keys {
            self.errors.remove(*key);
        }
        self.errors.extend(other.errors);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Empty for the purpose of a required rule. Whitespace counts as a value.
pub fn is_empty_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Bool(b)) => !b,
        Some(_) => false,
    }
}

/// Validate one field against its current value
pub fn validate_field(field: &FieldDefinition, value: Option<&Value>) -> Option<String> {
    if is_empty_value(value) {
        if field.has_required_rule() {
            return Some(format!("{} is required", field.label));
        }
        return None;
    }
    let value = value?;

    match field.field_type {
        FieldType::Number => {
            let Some(number) = as_number(value) else {
                return Some(format!("{} must be a number", field.label));
            };
            if let Some(min) = field.min.filter(|min| number < *min) {
                return Some(format!("{} must be at least {}", field.label, plain_number(min)));
            }
            if let Some(max) = field.max.filter(|max| number > *max) {
                return Some(format!("{} must be at most {}", field.label, plain_number(max)));
            }
            None
        }
        FieldType::Select | FieldType::Radio if !field.options.is_empty() => {
            let raw = crate::render::format::display_value(value);
            if field.options.iter().any(|o| o.value == raw) {
                None
            } else {
                Some(format!("{} must be one of the listed options", field.label))
            }
        }
        FieldType::Images | FieldType::Videos | FieldType::Files => {
            let count = value.as_array().map(Vec::len).unwrap_or(0);
            let cap = super::upload::max_items(field);
            if count > cap {
                Some(format!("{} accepts at most {} items", field.label, cap))
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Validate the given fields, collecting every failure
pub fn validate_fields<'a>(
    fields: impl IntoIterator<Item = &'a FieldDefinition>,
    values: &FormValues,
) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for field in fields {
        if let Some(message) = validate_field(field, values.get(&field.key)) {
            errors.insert(field.key.clone(), message);
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::SelectOption;
    use serde_json::json;

    #[test]
    fn test_required_message_uses_label() {
        let email = FieldDefinition::new("email", "Email", FieldType::Text).required();
        assert_eq!(validate_field(&email, Some(&json!(""))).as_deref(), Some("Email is required"));
        assert_eq!(validate_field(&email, None).as_deref(), Some("Email is required"));
        assert_eq!(validate_field(&email, Some(&json!("a@b.c"))), None);
    }

    #[test]
    fn test_whitespace_satisfies_required() {
        let name = FieldDefinition::new("name", "Name", FieldType::Text).required();
        assert_eq!(validate_field(&name, Some(&json!("   "))), None);
        assert!(!is_empty_value(Some(&json!(" "))));
        assert!(is_empty_value(Some(&json!(""))));
    }

    #[test]
    fn test_optional_fields_accept_empty() {
        let title = FieldDefinition::new("title", "Title", FieldType::Text);
        assert_eq!(validate_field(&title, Some(&json!(""))), None);
        let age = FieldDefinition::new("age", "Age", FieldType::Number).min(18.0);
        assert_eq!(validate_field(&age, Some(&json!(""))), None);
    }

    #[test]
    fn test_zero_satisfies_required_number() {
        let qty = FieldDefinition::new("qty", "Quantity", FieldType::Number).required();
        assert_eq!(validate_field(&qty, Some(&json!(0))), None);
    }

    #[test]
    fn test_required_toggle_never_fails() {
        let active = FieldDefinition::new("active", "Active", FieldType::Toggle).required();
        assert_eq!(validate_field(&active, Some(&json!(false))), None);
    }

    #[test]
    fn test_number_bounds() {
        let age = FieldDefinition::new("age", "Age", FieldType::Number).min(18.0).max(99.0);
        assert_eq!(validate_field(&age, Some(&json!(12))).as_deref(), Some("Age must be at least 18"));
        assert_eq!(validate_field(&age, Some(&json!(120))).as_deref(), Some("Age must be at most 99"));
        assert_eq!(validate_field(&age, Some(&json!(30))), None);
    }

    #[test]
    fn test_select_membership() {
        let role = FieldDefinition::new("role", "Role", FieldType::Select)
            .options(vec![SelectOption::new("Admin", "ADMIN")]);
        assert!(validate_field(&role, Some(&json!("ROOT"))).is_some());
        assert_eq!(validate_field(&role, Some(&json!("ADMIN"))), None);
    }

    #[test]
    fn test_validate_fields_collects_all() {
        let fields = vec![
            FieldDefinition::new("first_name", "First Name", FieldType::Text).required(),
            FieldDefinition::new("email", "Email", FieldType::Text).required(),
        ];
        let values = json!({"first_name": "", "email": ""}).as_object().cloned().unwrap();
        let errors = validate_fields(&fields, &values);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("email"), Some("Email is required"));
    }
}
